use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::api;
use resolver_core::config::{self, AppConfig};
use resolver_core::models::CreateRequest;
use resolver_core::pipeline::build_vector_store;
use resolver_core::{build_services, loader};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { host, port } => run_serve(cfg, host, port).await,
        Commands::Query { name, uuid } => run_query(cfg, name, uuid).await,
        Commands::Create {
            uuid,
            standard_name,
            name,
        } => run_create(cfg, uuid, standard_name, name).await,
        Commands::Load {
            path,
            reset,
            delay_ms,
        } => run_load(cfg, path, reset, delay_ms).await,
        Commands::InitCollection => run_init_collection(cfg).await,
    }
}

#[derive(Parser)]
#[command(name = "element-resolver")]
#[command(about = "Semantic data-element resolution service", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Override server.host
        #[arg(long)]
        host: Option<String>,
        /// Override server.port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Find stored data elements similar to a name
    Query {
        /// Data element name
        name: String,
        /// External id whose record is ranked first when stored
        #[arg(long)]
        uuid: Option<String>,
    },
    /// Describe, classify, embed and store a data element
    Create {
        /// External id of the new element
        #[arg(long)]
        uuid: String,
        /// Standard the element comes from
        #[arg(long)]
        standard_name: String,
        /// Data element name
        name: String,
    },
    /// Bulk-create data elements from a CSV file
    Load {
        /// CSV file with id, name, source and optional category columns
        path: PathBuf,
        /// Drop and recreate the collection first
        #[arg(long, default_value_t = false)]
        reset: bool,
        /// Override loader.delay_ms
        #[arg(long)]
        delay_ms: Option<u64>,
    },
    /// Drop and recreate the vector collection
    InitCollection,
}

async fn run_serve(cfg: AppConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    let services = build_services(&cfg)?;
    let host = host.unwrap_or(cfg.server.host);
    let port = port.unwrap_or(cfg.server.port);
    api::serve(services, &host, port).await?;
    Ok(())
}

async fn run_query(cfg: AppConfig, name: String, uuid: Option<String>) -> Result<()> {
    let services = build_services(&cfg)?;
    let matches = resolver_core::resolve(&services, &name, uuid.as_deref()).await?;
    println!("{}", serde_json::to_string_pretty(&matches)?);
    Ok(())
}

async fn run_create(
    cfg: AppConfig,
    uuid: String,
    standard_name: String,
    name: String,
) -> Result<()> {
    let services = build_services(&cfg)?;
    let request = CreateRequest {
        external_id: uuid,
        data_source: standard_name,
        name,
        category: None,
    };
    let outcome = resolver_core::create(&services, &request).await;
    let response = api::CreateElementResponse::from(outcome);
    println!("{}", serde_json::to_string_pretty(&response)?);
    if let Some(error) = response.error {
        anyhow::bail!("data element creation failed: {error}");
    }
    Ok(())
}

async fn run_load(
    mut cfg: AppConfig,
    path: PathBuf,
    reset: bool,
    delay_ms: Option<u64>,
) -> Result<()> {
    if let Some(ms) = delay_ms {
        cfg.loader.delay_ms = ms;
    }
    let services = build_services(&cfg)?;
    if reset {
        services.store.reset(services.dimension).await?;
    }
    let summary = loader::load_csv(&services, &path, &cfg.loader).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn run_init_collection(cfg: AppConfig) -> Result<()> {
    let store = build_vector_store(&cfg)?;
    store.reset(cfg.embeddings.dimension).await?;
    info!(collection = %cfg.vectors.collection, "collection initialized");
    Ok(())
}
