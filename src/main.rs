use clap::{Parser, Subcommand};
use tracing::info;

use insights_api::config::Config;
use insights_api::selector::Selector;
use insights_api::server::{self, AppState};
use insights_api::storage::{InMemoryStore, ReportStore};
use insights_api::{logging, metrics};
use std::path::Path;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "insights_api")]
#[command(about = "Page performance insights API")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the insights API over HTTP
    Serve {
        /// Port to listen on (overrides config and INSIGHTS_PORT)
        #[arg(long)]
        port: Option<u16>,
        /// JSON seed file of records per table
        #[arg(long)]
        data: Option<String>,
    },
    /// Run one selection + normalization pass and print the result
    Show {
        /// Page to query. Available: home, term, saving
        #[arg(long)]
        page: String,
        /// Lookback window in days
        #[arg(long)]
        days: Option<u32>,
        /// JSON seed file of records per table
        #[arg(long)]
        data: Option<String>,
    },
}

fn build_store(data_file: Option<&str>) -> anyhow::Result<Arc<dyn ReportStore>> {
    let store = match data_file {
        Some(path) => {
            info!(path, "seeding store from file");
            InMemoryStore::from_json_file(Path::new(path))?
        }
        None => InMemoryStore::new(),
    };
    Ok(Arc::new(store))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Initialize logging
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Serve { port, data } => {
            metrics::init_metrics();

            let port = port
                .or_else(|| {
                    std::env::var("INSIGHTS_PORT")
                        .ok()
                        .and_then(|s| s.parse().ok())
                })
                .unwrap_or(config.server.port);

            let data_file = data.or_else(|| config.server.data_file.clone());
            let store = build_store(data_file.as_deref())?;

            let state = AppState {
                store,
                selector: Selector::new(config.selector.clone()),
                config: Arc::new(config),
            };
            server::start_server(state, port).await?;
        }
        Commands::Show { page, days, data } => {
            let data_file = data.or_else(|| config.server.data_file.clone());
            let store = build_store(data_file.as_deref())?;
            let selector = Selector::new(config.selector.clone());

            let body = server::page_insights(
                store.as_ref(),
                &config,
                &selector,
                &page,
                days,
                chrono::Utc::now(),
            )
            .await?;
            println!("{}", serde_json::to_string_pretty(&serde_json::Value::Array(body))?);
        }
    }

    Ok(())
}
