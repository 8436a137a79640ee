//! Primary sale store.

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, postgres::PgRow, query, query_as};

use crate::{
    customers::CustomerId,
    database::{Db, try_get_unsigned},
    domain::{
        items::models::ItemUuid,
        sales::{
            models::{Sale, SaleUuid},
            store::SaleStore,
        },
    },
    store::StoreError,
};

const CREATE_SALE_SQL: &str = include_str!("../sql/create_sale.sql");
const GET_SALE_SQL: &str = include_str!("../sql/get_sale.sql");
const GET_CUSTOMER_SALES_SQL: &str = include_str!("../sql/get_customer_sales.sql");
const UPDATE_SALE_SQL: &str = include_str!("../sql/update_sale.sql");
const DELETE_SALE_SQL: &str = include_str!("../sql/delete_sale.sql");

#[derive(Debug, Clone)]
pub struct PgSaleStore {
    db: Db,
}

impl PgSaleStore {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

fn total_price_param(sale: &Sale) -> Result<i64, StoreError> {
    i64::try_from(sale.total_price).map_err(|e| StoreError::OutOfRange("total_price", e))
}

#[async_trait]
impl SaleStore for PgSaleStore {
    async fn create(&self, sale: Sale) -> Result<Sale, StoreError> {
        let created = query_as::<Postgres, Sale>(CREATE_SALE_SQL)
            .bind(sale.uuid.into_uuid())
            .bind(sale.item.into_uuid())
            .bind(sale.customer_id.get())
            .bind(i64::from(sale.quantity))
            .bind(total_price_param(&sale)?)
            .bind(SqlxTimestamp::from(sale.sold_at))
            .fetch_one(self.db.pool())
            .await?;

        Ok(created)
    }

    async fn get_by_id(&self, sale: SaleUuid) -> Result<Sale, StoreError> {
        let sale = query_as::<Postgres, Sale>(GET_SALE_SQL)
            .bind(sale.into_uuid())
            .fetch_one(self.db.pool())
            .await?;

        Ok(sale)
    }

    async fn get_by_customer_id(&self, customer: CustomerId) -> Result<Vec<Sale>, StoreError> {
        let sales = query_as::<Postgres, Sale>(GET_CUSTOMER_SALES_SQL)
            .bind(customer.get())
            .fetch_all(self.db.pool())
            .await?;

        Ok(sales)
    }

    async fn update(&self, sale: Sale) -> Result<Sale, StoreError> {
        let updated = query_as::<Postgres, Sale>(UPDATE_SALE_SQL)
            .bind(sale.uuid.into_uuid())
            .bind(i64::from(sale.quantity))
            .bind(total_price_param(&sale)?)
            .fetch_one(self.db.pool())
            .await?;

        Ok(updated)
    }

    async fn delete(&self, sale: SaleUuid) -> Result<(), StoreError> {
        let rows_affected = query(DELETE_SALE_SQL)
            .bind(sale.into_uuid())
            .execute(self.db.pool())
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for Sale {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: SaleUuid::from_uuid(row.try_get("uuid")?),
            item: ItemUuid::from_uuid(row.try_get("item_uuid")?),
            customer_id: CustomerId::new(row.try_get("customer_id")?),
            quantity: try_get_unsigned(row, "quantity")?,
            total_price: try_get_unsigned(row, "total_price")?,
            sold_at: row.try_get::<SqlxTimestamp, _>("sold_at")?.to_jiff(),
        })
    }
}
