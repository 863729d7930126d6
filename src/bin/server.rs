use clap::Parser;
use relay_panel::db::services::{
    ensure_schema, SeaOrmLoginIpRepository, SeaOrmNodeRepository, SeaOrmUserDirectory,
};
use relay_panel::dns::CloudflareDnsSync;
use relay_panel::login::LoginAnomalyRecorder;
use relay_panel::nodes::{AddressResolver, DnsTarget, NodeEventSettings, NodeMutationService, SystemResolver};
use relay_panel::notifications::NotificationService;
use relay_panel::server::config::{DnsConfig, PanelConfig};
use relay_panel::web::create_axum_router;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,
}

fn init_logging(log_dir: &str) {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily(log_dir, "relay-panel.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .json();

    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    // Default to `info,sea_orm=warn` level if RUST_LOG is not set.
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sea_orm=warn,sqlx::query=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

fn dns_target(config: &DnsConfig) -> Option<DnsTarget> {
    if !config.enabled {
        return None;
    }
    // Presence of the credentials is checked when the config is loaded.
    let (Some(api_token), Some(zone_id)) = (&config.api_token, &config.zone_id) else {
        return None;
    };
    let sync = CloudflareDnsSync::new(
        api_token.clone(),
        zone_id.clone(),
        config.base_domain.clone(),
        config.proxied,
    );
    Some(DnsTarget {
        base_domain: config.base_domain.clone(),
        sync: Arc::new(sync),
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received, stopping server.");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let config = match PanelConfig::load(args.config.as_deref()) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Failed to load panel configuration: {e}");
            return Err(e.into());
        }
    };

    init_logging(&config.log_dir);
    info!("Starting {}, version: {}", config.app_name, VERSION);

    // --- Database Pool Setup ---
    let mut opt = ConnectOptions::new(config.database_url.to_owned());
    opt.max_connections(10);
    let db_pool: DatabaseConnection = match Database::connect(opt).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to create database connection: {}", e);
            return Err(e.into());
        }
    };
    ensure_schema(&db_pool).await?;

    // --- Service Wiring ---
    let notifier = Arc::new(NotificationService::new(
        config.notifications.channel.clone(),
        Arc::new(SeaOrmUserDirectory::new(db_pool.clone())),
    ));
    let dns = dns_target(&config.dns);
    if dns.is_some() {
        info!(base_domain = %config.dns.base_domain, "DNS sync enabled.");
    }

    let node_service = Arc::new(NodeMutationService::new(
        Arc::new(SeaOrmNodeRepository::new(db_pool.clone())),
        AddressResolver::new(Arc::new(SystemResolver)),
        dns,
        notifier.clone(),
        NodeEventSettings::from(&config.notifications),
    ));
    let login_recorder = Arc::new(LoginAnomalyRecorder::new(
        Arc::new(SeaOrmLoginIpRepository::new(db_pool.clone())),
        notifier,
        config.login,
        config.app_name.clone(),
    ));

    let app = create_axum_router(node_service, login_recorder);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(Box::new)?;

    Ok(())
}
