mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "storeapi-cli")]
#[command(about = "Store management API command line interface")]
struct Cli {
    /// Log every request URL and page count at info level.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch one endpoint and print its data.
    Get {
        endpoint: String,
        /// Query parameter as key=value (repeatable).
        #[arg(short, long = "query", value_parser = commands::parse_query_pair)]
        query: Vec<(String, String)>,
    },
    /// Fetch every page of a collection and print the combined records.
    GetAll {
        endpoint: String,
        #[arg(short, long = "query", value_parser = commands::parse_query_pair)]
        query: Vec<(String, String)>,
    },
    /// Create a resource from a JSON body.
    Post {
        endpoint: String,
        #[arg(long, value_parser = commands::parse_json_body)]
        body: serde_json::Value,
    },
    /// Update a resource from a JSON body.
    Put {
        endpoint: String,
        #[arg(long, value_parser = commands::parse_json_body)]
        body: serde_json::Value,
    },
    /// Delete a resource.
    Delete {
        endpoint: String,
        #[arg(short, long = "query", value_parser = commands::parse_query_pair)]
        query: Vec<(String, String)>,
    },
    /// Delete every record matching the query, one page at a time.
    DeleteAll {
        endpoint: String,
        #[arg(short, long = "query", value_parser = commands::parse_query_pair)]
        query: Vec<(String, String)>,
        /// Records fetched and deleted per round (defaults to STOREAPI_DELETE_LIMIT).
        #[arg(long)]
        limit: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = storeapi_core::load_app_config()?;
    config.debug |= cli.debug;
    init_tracing(&config.log_level)?;
    tracing::debug!(?config, "loaded configuration");

    let client = commands::build_api_client(&config)?;
    let output = commands::run(&client, &config, cli.command).await?;
    if let Some(value) = output {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }

    Ok(())
}

/// `RUST_LOG` wins over the configured level when set. Logs go to stderr so
/// stdout carries only JSON output.
fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
