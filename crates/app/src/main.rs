//! Storefront operator CLI

use std::process::ExitCode;

use clap::Parser;
use storefront_app::observability;

mod cli;

use cli::{Cli, CliError};

#[tokio::main]
async fn main() -> ExitCode {
    _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(error) = observability::init_logging(&cli.config.logging) {
        report(&CliError::Logging(error));
        return ExitCode::FAILURE;
    }

    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            report(&error);
            ExitCode::FAILURE
        }
    }
}

#[expect(clippy::print_stderr, reason = "failures are reported on stderr")]
fn report(error: &CliError) {
    let kind = error.kind();

    eprintln!(
        "{}",
        serde_json::json!({
            "error": kind.to_string(),
            "status": kind.http_status(),
            "message": error.to_string(),
        })
    );
}
