use clap::{Parser, Subcommand};
use serde_json::Value;
use storefront_app::{
    auth::AuthError,
    config::AppConfig,
    context::{AppContext, AppInitError},
    domain::{
        carts::CartsServiceError, checkout::CheckoutError, items::ItemsServiceError,
        sales::SalesServiceError,
    },
    errors::ErrorKind,
    observability::ObservabilityError,
};
use thiserror::Error;
use tokio::time::error::Elapsed;
use tracing::{Instrument, debug, info_span};
use zeroize::Zeroizing;

mod carts;
mod items;
mod sales;

#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront fulfilment CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) config: AppConfig,

    /// Bearer token verified against the users API
    #[arg(long, env = "STOREFRONT_TOKEN", hide_env_values = true, default_value = "")]
    token: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Catalog and stock administration
    Items(items::ItemsCommand),

    /// Customer carts and checkout
    Carts(carts::CartsCommand),

    /// Sales ledger
    Sales(sales::SalesCommand),
}

#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Logging(#[from] ObservabilityError),

    #[error(transparent)]
    Init(#[from] AppInitError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Items(#[from] ItemsServiceError),

    #[error(transparent)]
    Carts(#[from] CartsServiceError),

    #[error(transparent)]
    Sales(#[from] SalesServiceError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error("failed to encode output")]
    Encode(#[from] serde_json::Error),

    #[error("command did not finish before its deadline")]
    Timeout(#[from] Elapsed),
}

impl CliError {
    pub(crate) fn kind(&self) -> ErrorKind {
        match self {
            Self::Auth(error) => error.kind(),
            Self::Items(error) => error.kind(),
            Self::Carts(error) => error.kind(),
            Self::Sales(error) => error.kind(),
            Self::Checkout(error) => error.kind(),
            Self::Logging(_) | Self::Init(_) | Self::Encode(_) | Self::Timeout(_) => ErrorKind::Io,
        }
    }
}

impl Cli {
    /// Run the command under the configured deadline and print its result.
    pub(crate) async fn run(self) -> Result<(), CliError> {
        let Self {
            config,
            token,
            command,
        } = self;

        let token = Zeroizing::new(token);
        let deadline = config.request_timeout();

        let output = tokio::time::timeout(deadline, execute(&config, command, &token)).await??;

        debug!("command finished");

        print_json(&output)
    }
}

async fn execute(config: &AppConfig, command: Commands, token: &str) -> Result<Value, CliError> {
    let ctx = AppContext::from_config(config).await?;

    match command {
        Commands::Items(command) => {
            items::run(command, &ctx, token)
                .instrument(info_span!("items"))
                .await
        }
        Commands::Carts(command) => {
            carts::run(command, &ctx, token)
                .instrument(info_span!("carts"))
                .await
        }
        Commands::Sales(command) => {
            sales::run(command, &ctx, token)
                .instrument(info_span!("sales"))
                .await
        }
    }
}

#[expect(clippy::print_stdout, reason = "results are the command's output")]
fn print_json(output: &Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(output)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    const BASE: [&str; 5] = [
        "storefront",
        "--database-url",
        "postgres://localhost/storefront",
        "--redis-url",
        "redis://localhost",
    ];

    fn parse(rest: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(BASE.iter().chain(rest))
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_checkout() {
        let cli = parse(&["carts", "checkout", "--customer", "42"]);

        assert!(
            matches!(&cli, Ok(Cli { command: Commands::Carts(_), .. })),
            "expected carts command, got {cli:?}"
        );
    }

    #[test]
    fn rejects_malformed_item_ids() {
        let cli = parse(&["items", "get", "--item", "not-a-uuid"]);

        assert!(cli.is_err(), "expected parse error, got {cli:?}");
    }

    #[test]
    fn rejects_negative_quantities() {
        let cli = parse(&[
            "sales",
            "create",
            "--customer",
            "7",
            "--item",
            "0191b5b6-34a2-7c3e-9f4e-2c1d3b4a5f60",
            "--quantity",
            "-1",
        ]);

        assert!(cli.is_err(), "expected parse error, got {cli:?}");
    }

    #[test]
    fn encode_failures_map_to_io() {
        let error = CliError::Encode(serde_json::Error::io(std::io::Error::other("closed")));

        assert_eq!(error.kind(), ErrorKind::Io);
    }
}
