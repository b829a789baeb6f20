//! Account Collector plugin entry point
//!
//! Serves the plugin operations over HTTP, or runs one of them from the
//! command line.

use account_collector_plugin::config::PluginConfig;
use account_collector_plugin::contracts::*;
use account_collector_plugin::env::ProcessEnv;
use account_collector_plugin::handler::{create_router, AccountCollectorService, AppState};
use account_collector_plugin::manager::{ManagerFactory, StaticCollectorManager};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "account-collector")]
#[command(about = "Account Collector plugin - options schema and account sync")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the plugin server
    Serve {
        /// Port to listen on [env: PORT]
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to [env: HOST]
        #[arg(long)]
        host: Option<String>,

        /// Collection service base URL [env: COLLECTOR_MANAGER_URL]
        #[arg(long)]
        collector_url: Option<String>,

        /// Collection request timeout in seconds [env: COLLECTOR_TIMEOUT_SECS]
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Print init metadata for the given options
    Init {
        /// Path to options file (JSON/YAML)
        #[arg(short, long)]
        options: Option<String>,
    },

    /// Run one sync and print the results
    Sync {
        /// Path to sync params file (JSON/YAML)
        #[arg(short, long)]
        params: String,

        /// Return records from this file instead of calling the collection service
        #[arg(short, long)]
        records: Option<String>,
    },
}

fn read_document<T: DeserializeOwned>(file: &str) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(file)?;
    let value = if file.ends_with(".yaml") || file.ends_with(".yml") {
        serde_yaml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };
    Ok(value)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let cli = Cli::parse();
    let mut config = PluginConfig::from_env(&ProcessEnv)?;

    match cli.command {
        Commands::Serve {
            port,
            host,
            collector_url,
            timeout,
        } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(url) = collector_url {
                config = config.with_collector_url(url);
            }
            if let Some(secs) = timeout {
                config.collector_timeout = Duration::from_secs(secs);
            }

            let addr = config.bind_addr()?;
            let service = AccountCollectorService::new(config.manager_factory());
            let state = Arc::new(AppState::new(service)?);
            let router = create_router(state.clone());

            tracing::info!("Starting Account Collector plugin on {}", addr);
            tracing::info!(
                "Plugin ID: {}, Version: {}, Manager: {}",
                PLUGIN_ID,
                PLUGIN_VERSION,
                state.service.manager_name()
            );
            if config.collector_url.is_none() {
                tracing::warn!("COLLECTOR_MANAGER_URL is not set; sync requests will fail");
            }

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, router).await?;
        }

        Commands::Init { options } => {
            let params = match options {
                Some(file) => InitParams::with_options(read_document(&file)?),
                None => InitParams::default(),
            };

            let service = AccountCollectorService::new(config.manager_factory());
            let response = service.init(&params);

            println!("{}", serde_json::to_string_pretty(&response)?);
        }

        Commands::Sync { params, records } => {
            let params: SyncParams = read_document(&params)?;

            let factory: Arc<dyn ManagerFactory> = match records {
                Some(file) => {
                    let records: Vec<AccountRecord> = read_document(&file)?;
                    Arc::new(StaticCollectorManager::factory(records))
                }
                None => config.manager_factory(),
            };

            let service = AccountCollectorService::new(factory);
            let response = service.sync(params).await?;

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
