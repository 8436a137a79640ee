//! Primary cart store.

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, postgres::PgRow, query, query_as, types::Json};

use crate::{
    customers::CustomerId,
    database::{Db, try_get_unsigned},
    domain::carts::{
        models::{Cart, CartLine, CartUuid},
        store::CartStore,
    },
    store::StoreError,
};

const GET_CART_SQL: &str = include_str!("../sql/get_cart.sql");
const CREATE_CART_SQL: &str = include_str!("../sql/create_cart.sql");
const UPDATE_CART_SQL: &str = include_str!("../sql/update_cart.sql");
const UPSERT_CART_SQL: &str = include_str!("../sql/upsert_cart.sql");
const DELETE_CART_SQL: &str = include_str!("../sql/delete_cart.sql");

#[derive(Debug, Clone)]
pub struct PgCartStore {
    db: Db,
}

impl PgCartStore {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    async fn write(&self, sql: &'static str, cart: &Cart) -> Result<Cart, StoreError> {
        let written = query_as::<Postgres, Cart>(sql)
            .bind(cart.uuid.into_uuid())
            .bind(cart.customer_id.get())
            .bind(Json(&cart.items))
            .bind(total_param(cart)?)
            .bind(SqlxTimestamp::from(cart.created_at))
            .bind(SqlxTimestamp::from(cart.updated_at))
            .fetch_one(self.db.pool())
            .await?;

        Ok(written)
    }
}

fn total_param(cart: &Cart) -> Result<i64, StoreError> {
    i64::try_from(cart.total).map_err(|e| StoreError::OutOfRange("total", e))
}

#[async_trait]
impl CartStore for PgCartStore {
    async fn get_by_customer_id(&self, customer: CustomerId) -> Result<Cart, StoreError> {
        let cart = query_as::<Postgres, Cart>(GET_CART_SQL)
            .bind(customer.get())
            .fetch_one(self.db.pool())
            .await?;

        Ok(cart)
    }

    async fn create(&self, cart: Cart) -> Result<Cart, StoreError> {
        self.write(CREATE_CART_SQL, &cart).await
    }

    async fn update(&self, cart: Cart) -> Result<Cart, StoreError> {
        let updated = query_as::<Postgres, Cart>(UPDATE_CART_SQL)
            .bind(cart.customer_id.get())
            .bind(Json(&cart.items))
            .bind(total_param(&cart)?)
            .bind(SqlxTimestamp::from(cart.updated_at))
            .fetch_one(self.db.pool())
            .await?;

        Ok(updated)
    }

    async fn upsert(&self, cart: Cart) -> Result<Cart, StoreError> {
        self.write(UPSERT_CART_SQL, &cart).await
    }

    async fn delete(&self, customer: CustomerId) -> Result<(), StoreError> {
        let rows_affected = query(DELETE_CART_SQL)
            .bind(customer.get())
            .execute(self.db.pool())
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for Cart {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let Json(items) = row.try_get::<Json<Vec<CartLine>>, _>("items")?;

        Ok(Self {
            uuid: CartUuid::from_uuid(row.try_get("uuid")?),
            customer_id: CustomerId::new(row.try_get("customer_id")?),
            items,
            total: try_get_unsigned(row, "total")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
