//! Primary item store.

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, postgres::PgRow, query, query_as};

use crate::{
    database::{Db, try_get_unsigned},
    domain::items::{
        models::{Item, ItemUuid},
        store::ItemStore,
    },
    store::StoreError,
};

const GET_ITEM_SQL: &str = include_str!("../sql/get_item.sql");
const CREATE_ITEM_SQL: &str = include_str!("../sql/create_item.sql");
const UPDATE_ITEM_SQL: &str = include_str!("../sql/update_item.sql");
const DELETE_ITEM_SQL: &str = include_str!("../sql/delete_item.sql");
const DECREMENT_STOCK_SQL: &str = include_str!("../sql/decrement_stock.sql");
const INCREMENT_STOCK_SQL: &str = include_str!("../sql/increment_stock.sql");

#[derive(Debug, Clone)]
pub struct PgItemStore {
    db: Db,
}

impl PgItemStore {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

fn price_param(item: &Item) -> Result<i64, StoreError> {
    i64::try_from(item.price).map_err(|e| StoreError::OutOfRange("price", e))
}

#[async_trait]
impl ItemStore for PgItemStore {
    async fn get_by_id(&self, item: ItemUuid) -> Result<Item, StoreError> {
        let item = query_as::<Postgres, Item>(GET_ITEM_SQL)
            .bind(item.into_uuid())
            .fetch_one(self.db.pool())
            .await?;

        Ok(item)
    }

    async fn create(&self, item: Item) -> Result<Item, StoreError> {
        let created = query_as::<Postgres, Item>(CREATE_ITEM_SQL)
            .bind(item.uuid.into_uuid())
            .bind(&item.name)
            .bind(&item.category)
            .bind(&item.description)
            .bind(price_param(&item)?)
            .bind(i64::from(item.stock))
            .bind(item.image_url.as_deref())
            .bind(SqlxTimestamp::from(item.created_at))
            .bind(SqlxTimestamp::from(item.updated_at))
            .fetch_one(self.db.pool())
            .await?;

        Ok(created)
    }

    async fn update(&self, uuid: ItemUuid, item: Item) -> Result<Item, StoreError> {
        let updated = query_as::<Postgres, Item>(UPDATE_ITEM_SQL)
            .bind(uuid.into_uuid())
            .bind(&item.name)
            .bind(&item.category)
            .bind(&item.description)
            .bind(price_param(&item)?)
            .bind(i64::from(item.stock))
            .bind(item.image_url.as_deref())
            .bind(SqlxTimestamp::from(item.updated_at))
            .fetch_one(self.db.pool())
            .await?;

        Ok(updated)
    }

    async fn delete(&self, item: ItemUuid) -> Result<(), StoreError> {
        let rows_affected = query(DELETE_ITEM_SQL)
            .bind(item.into_uuid())
            .execute(self.db.pool())
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    async fn decrement_stock_atomic(
        &self,
        item: ItemUuid,
        quantity: u32,
    ) -> Result<bool, StoreError> {
        let (found, decremented) = query_as::<Postgres, (bool, bool)>(DECREMENT_STOCK_SQL)
            .bind(item.into_uuid())
            .bind(i64::from(quantity))
            .fetch_one(self.db.pool())
            .await?;

        if !found {
            return Err(StoreError::NotFound);
        }

        Ok(decremented)
    }

    async fn increment_stock(&self, item: ItemUuid, quantity: u32) -> Result<(), StoreError> {
        let rows_affected = query(INCREMENT_STOCK_SQL)
            .bind(item.into_uuid())
            .bind(i64::from(quantity))
            .execute(self.db.pool())
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for Item {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ItemUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            category: row.try_get("category")?,
            description: row.try_get("description")?,
            price: try_get_unsigned(row, "price")?,
            stock: try_get_unsigned(row, "stock")?,
            image_url: row.try_get("image_url")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
