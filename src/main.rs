use axum::http::HeaderValue;
use clap::Parser;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_core::adapters::PostgresOrderStore;
use storefront_core::cli::{self, Cli, Commands, DbCommands, OrderCommands};
use storefront_core::config::{Config, LogFormat};
use storefront_core::services::OrderService;
use storefront_core::{create_app, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    init_tracing(config.log_format);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Db(DbCommands::Migrate) => cli::handle_db_migrate(&config).await,
        Commands::Config => cli::handle_config_validate(&config),
        Commands::Order(command) => {
            let service = OrderService::new(Arc::new(connect_store(&config).await?));
            match command {
                OrderCommands::Place { buyer, items } => {
                    cli::handle_order_place(&service, buyer, items).await
                }
                OrderCommands::List { buyer } => cli::handle_order_list(&service, buyer).await,
                OrderCommands::Show { buyer, order_id } => {
                    cli::handle_order_show(&service, buyer, &order_id).await
                }
            }
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn connect_store(config: &Config) -> anyhow::Result<PostgresOrderStore> {
    let pool = db::create_pool(config).await?;
    Ok(PostgresOrderStore::new(pool).with_lock_timeout(config.order_lock_timeout_ms))
}

fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any))
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let store = connect_store(&config).await?;
    db::run_migrations(store.pool(), Path::new("./migrations")).await?;

    let mut app = create_app(AppState::from_store(store));
    if let Some(origins) = &config.cors_allowed_origins {
        app = app.layer(cors_layer(origins)?);
        tracing::info!(origins = ?origins, "CORS enabled");
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
