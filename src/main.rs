//! Domain companion service.
//!
//! Redirects managed hosts to their configured targets and forwards email
//! sent to managed aliases.
//!
//! # Architecture Overview
//!
//! ```text
//!   HTTP request / edge event            email-trigger event
//!            │                                   │
//!            ▼                                   ▼
//!   ┌─────────────────┐                 ┌─────────────────┐
//!   │ http::server    │                 │ mail::forward   │
//!   │ http::edge      │                 │  store → address│
//!   └────────┬────────┘                 │  → reconstruct  │
//!            │                          │  → delivery     │
//!            ▼                          └────────┬────────┘
//!   ┌─────────────────┐                          │
//!   │ routing         │◀──── domain_map ────────▶┘
//!   └─────────────────┘    (immutable, Arc)
//!
//!   cross-cutting: config, observability, lifecycle
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use domain_companion::config::{load_config, ServiceConfig};
use domain_companion::domain_map::{load_domain_map_file, ConfigModel};
use domain_companion::http::{handle_edge_event, EdgeRequest, HttpServer};
use domain_companion::lifecycle::{spawn_signal_listener, Shutdown};
use domain_companion::mail::{DirectoryStore, EmailEvent, EmailForwarder, SmtpRelay};
use domain_companion::observability::{logging, metrics};
use domain_companion::routing::RedirectResolver;

#[derive(Parser)]
#[command(name = "domain-companion")]
#[command(about = "Host redirects and alias email forwarding for managed domains", long_about = None)]
struct Cli {
    /// Service settings (TOML). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Domain map (JSON), overriding the path in the settings.
    #[arg(short, long)]
    domain_map: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve redirects over HTTP
    Serve,
    /// Forward one stored message to its alias recipients
    Forward {
        /// Message id in the store
        #[arg(long, required_unless_present = "event", conflicts_with = "event")]
        message_id: Option<String>,
        /// Email-trigger event (JSON file)
        #[arg(long)]
        event: Option<PathBuf>,
    },
    /// Print the redirect response for a host
    Redirect {
        #[arg(long, required_unless_present = "event", conflicts_with = "event")]
        host: Option<String>,
        #[arg(long, default_value = "/")]
        path: String,
        /// Edge redirect event (JSON file)
        #[arg(long)]
        event: Option<PathBuf>,
    },
    /// Validate settings and the domain map
    Check,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    logging::init_logging(&config.observability.log_level);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "domain-companion starting");

    let map_path = cli
        .domain_map
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.store.domain_map_path));
    let model = Arc::new(load_domain_map_file(&map_path)?);

    match cli.command {
        Commands::Serve => serve(config, model).await?,
        Commands::Forward { message_id, event } => {
            let message_id = match (message_id, event) {
                (Some(id), _) => id,
                (None, Some(path)) => read_email_event(&path)?
                    .message_id()
                    .ok_or("event carries no message id")?
                    .to_string(),
                (None, None) => return Err("either --message-id or --event is required".into()),
            };

            let store = DirectoryStore::new(&config.store.message_dir, config.store.message_prefix.clone());
            let relay = SmtpRelay::from_config(&config.delivery)?;
            let forwarder = EmailForwarder::new(model, Arc::new(store), Arc::new(relay));

            let receipt = tokio::task::spawn_blocking(move || forwarder.forward(&message_id)).await??;
            println!("{receipt}");
        }
        Commands::Redirect { host, path, event } => {
            let request = match (host, event) {
                (Some(host), _) => EdgeRequest::new(&host, &path),
                (None, Some(event)) => serde_json::from_slice(&std::fs::read(event)?)?,
                (None, None) => return Err("either --host or --event is required".into()),
            };
            let resolver = RedirectResolver::new(model, &config.redirect);
            let response = handle_edge_event(&request, &resolver);
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Check => {
            println!(
                "ok: {} zones, {} redirects, {} aliases",
                model.zones().len(),
                model.redirect_count(),
                model.alias_count()
            );
        }
    }

    Ok(())
}

async fn serve(config: ServiceConfig, model: Arc<ConfigModel>) -> Result<(), Box<dyn std::error::Error>> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        request_timeout_secs = config.timeouts.request_secs,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    HttpServer::new(config, model)
        .run(listener, shutdown.signalled())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn read_email_event(path: &Path) -> Result<EmailEvent, Box<dyn std::error::Error>> {
    Ok(serde_json::from_slice(&std::fs::read(path)?)?)
}
