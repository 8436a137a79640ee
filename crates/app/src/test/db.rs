//! Container-backed test infrastructure
//!
//! One Postgres and one Redis container are started lazily and shared by
//! every test in the binary. Each [`TestDb`] gets its own freshly migrated
//! database; [`TestRedis`] callers isolate themselves through unique keys and
//! channels. When Docker is unavailable the constructors return `None` and
//! the calling test returns early.

use std::time::Duration;

use once_cell::sync::Lazy;
use redis::{Client, aio::ConnectionManager};
use sqlx::{Connection, PgConnection, PgPool};
use testcontainers::{
    ContainerAsync, Image, ImageExt, core::IntoContainerPort, runners::AsyncRunner,
};
use testcontainers_modules::{postgres::Postgres as PostgresImage, redis::Redis as RedisImage};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::database::{self, Db};

const PG_USER: &str = "storefront_test";
const PG_PASSWORD: &str = "storefront_test_password";

/// A started container and where to reach it. The address is resolved once
/// so later tests, running on other runtimes, never talk to the Docker API.
struct Server<I: Image> {
    _container: ContainerAsync<I>,
    host: String,
    port: u16,
}

static POSTGRES: Lazy<OnceCell<Option<Server<PostgresImage>>>> = Lazy::new(OnceCell::new);
static REDIS: Lazy<OnceCell<Option<Server<RedisImage>>>> = Lazy::new(OnceCell::new);

fn host() -> String {
    std::env::var("TESTCONTAINERS_HOST_OVERRIDE").unwrap_or_else(|_| "localhost".to_string())
}

#[expect(clippy::print_stderr, reason = "tell the runner why container tests were skipped")]
fn skipped(image: &str, error: &dyn std::fmt::Display) {
    eprintln!("{image} container unavailable, skipping: {error}");
}

async fn start_postgres() -> Option<Server<PostgresImage>> {
    let started = PostgresImage::default()
        .with_user(PG_USER)
        .with_password(PG_PASSWORD)
        .with_db_name(PG_USER)
        .with_tag("16-alpine")
        .start()
        .await;

    let container = match started {
        Ok(container) => container,
        Err(error) => {
            skipped("postgres", &error);
            return None;
        }
    };

    let port = container
        .get_host_port_ipv4(5432.tcp())
        .await
        .expect("Failed to get postgres port");

    Some(Server {
        _container: container,
        host: host(),
        port,
    })
}

async fn start_redis() -> Option<Server<RedisImage>> {
    let container = match RedisImage::default().start().await {
        Ok(container) => container,
        Err(error) => {
            skipped("redis", &error);
            return None;
        }
    };

    let port = container
        .get_host_port_ipv4(6379.tcp())
        .await
        .expect("Failed to get redis port");

    Some(Server {
        _container: container,
        host: host(),
        port,
    })
}

/// An isolated, migrated database inside the shared Postgres container.
///
/// Databases are left in place; they go away with the container.
#[derive(Debug, Clone)]
pub(crate) struct TestDb {
    pub(crate) db: Db,
    pub(crate) name: String,
}

impl TestDb {
    /// Create a uniquely named database and run every migration on it.
    pub(crate) async fn new() -> Option<Self> {
        let server = POSTGRES.get_or_init(start_postgres).await.as_ref()?;
        let name = format!("storefront_test_{}", Uuid::now_v7().simple());

        let admin_url = format!(
            "postgresql://{PG_USER}:{PG_PASSWORD}@{}:{}/postgres",
            server.host, server.port
        );

        let mut conn = PgConnection::connect(&admin_url)
            .await
            .expect("Failed to connect to postgres database");

        sqlx::query(&format!("CREATE DATABASE \"{name}\""))
            .execute(&mut conn)
            .await
            .expect("Failed to create test database");

        conn.close()
            .await
            .expect("Failed to close admin connection");

        let url = format!(
            "postgresql://{PG_USER}:{PG_PASSWORD}@{}:{}/{name}",
            server.host, server.port
        );

        let pool = database::connect(&url, Duration::from_secs(10))
            .await
            .expect("Failed to create pool for database");

        database::migrate(&pool)
            .await
            .expect("Failed to run migrations on database");

        Some(Self {
            db: Db::new(pool),
            name,
        })
    }

    pub(crate) fn pool(&self) -> &PgPool {
        self.db.pool()
    }
}

/// A connection to the shared Redis container.
#[derive(Clone)]
pub(crate) struct TestRedis {
    pub(crate) client: Client,
    pub(crate) connection: ConnectionManager,
}

impl TestRedis {
    pub(crate) async fn new() -> Option<Self> {
        let server = REDIS.get_or_init(start_redis).await.as_ref()?;

        let client = Client::open(format!("redis://{}:{}", server.host, server.port))
            .expect("Failed to build redis client");

        let connection = client
            .get_connection_manager()
            .await
            .expect("Failed to connect to redis");

        Some(Self { client, connection })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[tokio::test]
    async fn every_test_database_is_migrated_and_distinct() -> TestResult {
        let (Some(first), Some(second)) = (TestDb::new().await, TestDb::new().await) else {
            return Ok(());
        };

        assert_ne!(first.name, second.name);

        let tables: i64 = sqlx::query_scalar(
            "SELECT count(*) FROM information_schema.tables \
             WHERE table_schema = 'public' AND table_name IN ('items', 'carts', 'sales')",
        )
        .fetch_one(first.pool())
        .await?;

        assert_eq!(tables, 3);

        Ok(())
    }
}
