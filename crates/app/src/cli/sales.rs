use clap::{Args, Subcommand};
use serde_json::{Value, json};
use storefront_app::{
    context::AppContext,
    customers::CustomerId,
    domain::{
        items::models::ItemUuid,
        sales::models::{NewSale, SaleUpdate, SaleUuid},
    },
};

use super::CliError;

#[derive(Debug, Args)]
pub(crate) struct SalesCommand {
    #[command(subcommand)]
    command: SalesSubcommand,
}

#[derive(Debug, Subcommand)]
enum SalesSubcommand {
    /// Show one sale
    Get(SaleArgs),

    /// List a customer's sales, oldest first
    List(CustomerArgs),

    /// A customer's sales with count and amount spent
    Summary(CustomerArgs),

    /// Record a sale, taking its quantity out of stock
    Create(CreateSaleArgs),

    /// Change a sale's quantity
    Update(UpdateSaleArgs),

    /// Delete a sale, returning its quantity to stock
    Delete(SaleArgs),
}

#[derive(Debug, Args)]
struct SaleArgs {
    /// Sale UUID
    #[arg(long)]
    sale: SaleUuid,
}

#[derive(Debug, Args)]
struct CustomerArgs {
    /// Customer id issued by the users API
    #[arg(long)]
    customer: CustomerId,
}

#[derive(Debug, Args)]
struct CreateSaleArgs {
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
struct UpdateSaleArgs {
    /// Sale UUID
    #[arg(long)]
    sale: SaleUuid,

    #[arg(long)]
    quantity: u32,
}

pub(crate) async fn run(
    command: SalesCommand,
    ctx: &AppContext,
    token: &str,
) -> Result<Value, CliError> {
    ctx.auth.verify_token(token).await?;

    let output = match command.command {
        SalesSubcommand::Get(args) => serde_json::to_value(ctx.sales.get_sale(args.sale).await?)?,
        SalesSubcommand::List(args) => {
            serde_json::to_value(ctx.sales.get_customer_sales(args.customer).await?)?
        }
        SalesSubcommand::Summary(args) => {
            serde_json::to_value(ctx.sales.customer_summary(args.customer).await?)?
        }
        SalesSubcommand::Create(args) => serde_json::to_value(
            ctx.sales
                .create_sale(NewSale {
                    item: args.item,
                    customer_id: args.customer,
                    quantity: args.quantity,
                })
                .await?,
        )?,
        SalesSubcommand::Update(args) => serde_json::to_value(
            ctx.sales
                .update_sale(
                    args.sale,
                    SaleUpdate {
                        quantity: args.quantity,
                    },
                )
                .await?,
        )?,
        SalesSubcommand::Delete(args) => {
            ctx.sales.delete_sale(args.sale).await?;

            json!({ "deleted": args.sale })
        }
    };

    Ok(output)
}
