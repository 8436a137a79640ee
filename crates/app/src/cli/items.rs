use clap::{Args, Subcommand};
use serde_json::{Value, json};
use storefront_app::{
    context::AppContext,
    domain::items::models::{ItemDetails, ItemUuid, NewItem},
};

use super::CliError;

#[derive(Debug, Args)]
pub(crate) struct ItemsCommand {
    #[command(subcommand)]
    command: ItemsSubcommand,
}

#[derive(Debug, Subcommand)]
enum ItemsSubcommand {
    /// Show one item with its current stock
    Get(ItemArgs),

    /// Create an item (admin)
    Create(CreateItemArgs),

    /// Replace an item's fields (admin)
    Update(UpdateItemArgs),

    /// Delete an item (admin)
    Delete(ItemArgs),

    /// Take stock out only if enough remains (admin)
    TakeStock(StockArgs),

    /// Return stock (admin)
    Restock(StockArgs),
}

#[derive(Debug, Args)]
struct ItemArgs {
    /// Item UUID
    #[arg(long)]
    item: ItemUuid,
}

#[derive(Debug, Args)]
struct ItemFields {
    #[arg(long)]
    name: String,

    #[arg(long)]
    category: String,

    #[arg(long)]
    description: String,

    /// Price in minor currency units
    #[arg(long)]
    price: u64,

    #[arg(long)]
    stock: u32,

    #[arg(long)]
    image_url: Option<String>,
}

impl From<ItemFields> for ItemDetails {
    fn from(fields: ItemFields) -> Self {
        Self {
            name: fields.name,
            category: fields.category,
            description: fields.description,
            price: fields.price,
            stock: fields.stock,
            image_url: fields.image_url,
        }
    }
}

#[derive(Debug, Args)]
struct CreateItemArgs {
    /// Optional item UUID; generated when omitted
    #[arg(long)]
    uuid: Option<ItemUuid>,

    #[command(flatten)]
    fields: ItemFields,
}

#[derive(Debug, Args)]
struct UpdateItemArgs {
    /// Item UUID
    #[arg(long)]
    item: ItemUuid,

    #[command(flatten)]
    fields: ItemFields,
}

#[derive(Debug, Args)]
struct StockArgs {
    /// Item UUID
    #[arg(long)]
    item: ItemUuid,

    #[arg(long)]
    quantity: u32,
}

pub(crate) async fn run(
    command: ItemsCommand,
    ctx: &AppContext,
    token: &str,
) -> Result<Value, CliError> {
    if matches!(command.command, ItemsSubcommand::Get(_)) {
        ctx.auth.verify_token(token).await?;
    } else {
        ctx.auth.verify_admin_token(token).await?;
    }

    let output = match command.command {
        ItemsSubcommand::Get(args) => serde_json::to_value(ctx.items.get_item(args.item).await?)?,
        ItemsSubcommand::Create(args) => {
            let item = ctx
                .items
                .create_item(NewItem {
                    uuid: args.uuid.unwrap_or_else(ItemUuid::new),
                    details: args.fields.into(),
                })
                .await?;

            serde_json::to_value(item)?
        }
        ItemsSubcommand::Update(args) => {
            serde_json::to_value(ctx.items.update_item(args.item, args.fields.into()).await?)?
        }
        ItemsSubcommand::Delete(args) => {
            ctx.items.delete_item(args.item).await?;

            json!({ "deleted": args.item })
        }
        ItemsSubcommand::TakeStock(args) => {
            let taken = ctx
                .items
                .decrement_stock_atomic(args.item, args.quantity)
                .await?;

            json!({ "item": args.item, "quantity": args.quantity, "taken": taken })
        }
        ItemsSubcommand::Restock(args) => {
            ctx.items.increment_stock(args.item, args.quantity).await?;

            json!({ "item": args.item, "quantity": args.quantity, "restocked": true })
        }
    };

    Ok(output)
}
