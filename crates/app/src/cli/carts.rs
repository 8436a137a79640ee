use clap::{Args, Subcommand};
use serde_json::{Value, json};
use storefront_app::{
    context::AppContext, customers::CustomerId, domain::items::models::ItemUuid,
};

use super::CliError;

#[derive(Debug, Args)]
pub(crate) struct CartsCommand {
    #[command(subcommand)]
    command: CartsSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartsSubcommand {
    /// Show a customer's cart priced from the current catalog
    Get(CustomerArgs),

    /// Create an empty cart
    Create(CustomerArgs),

    /// Add an item, merging with an existing line
    Add(LineArgs),

    /// Replace a line's quantity; zero removes the line
    Update(LineArgs),

    /// Remove a line
    Remove(RemoveArgs),

    /// Empty the cart
    Clear(CustomerArgs),

    /// Turn the cart into sales
    Checkout(CustomerArgs),
}

#[derive(Debug, Args)]
struct CustomerArgs {
    /// Customer id issued by the users API
    #[arg(long)]
    customer: CustomerId,
}

#[derive(Debug, Args)]
struct LineArgs {
    /// Customer id issued by the users API
    #[arg(long)]
    customer: CustomerId,

    /// Item UUID
    #[arg(long)]
    item: ItemUuid,

    #[arg(long)]
    quantity: u32,
}

#[derive(Debug, Args)]
struct RemoveArgs {
    /// Customer id issued by the users API
    #[arg(long)]
    customer: CustomerId,

    /// Item UUID
    #[arg(long)]
    item: ItemUuid,
}

pub(crate) async fn run(
    command: CartsCommand,
    ctx: &AppContext,
    token: &str,
) -> Result<Value, CliError> {
    ctx.auth.verify_token(token).await?;

    let output = match command.command {
        CartsSubcommand::Get(args) => serde_json::to_value(ctx.carts.get_cart(args.customer).await?)?,
        CartsSubcommand::Create(args) => {
            serde_json::to_value(ctx.carts.create_cart(args.customer).await?)?
        }
        CartsSubcommand::Add(args) => serde_json::to_value(
            ctx.carts
                .add_item(args.customer, args.item, args.quantity)
                .await?,
        )?,
        CartsSubcommand::Update(args) => serde_json::to_value(
            ctx.carts
                .update_item(args.customer, args.item, args.quantity)
                .await?,
        )?,
        CartsSubcommand::Remove(args) => {
            serde_json::to_value(ctx.carts.remove_item(args.customer, args.item).await?)?
        }
        CartsSubcommand::Clear(args) => {
            ctx.carts.clear_cart(args.customer).await?;

            json!({ "customer_id": args.customer, "cleared": true })
        }
        CartsSubcommand::Checkout(args) => {
            let sales = ctx.checkout.checkout(args.customer).await?;

            json!({ "customer_id": args.customer, "sales": sales })
        }
    };

    Ok(output)
}
