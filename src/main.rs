use backon::{ExponentialBuilder, Retryable};
use cibil_nexus::CibilError;
use cibil_nexus::config::{CONFIG, DatabaseConfig};
use cibil_nexus::db::{self, CibilStorage};
use mimalloc::MiMalloc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn connect_retry_policy(retries: usize) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(500))
        .with_max_delay(Duration::from_secs(5))
        .with_max_times(retries)
        .with_jitter()
}

async fn open_storage(cfg: &DatabaseConfig) -> Result<CibilStorage, CibilError> {
    let pool = (|| db::connect(&cfg.url, cfg.max_connections))
        .retry(connect_retry_policy(cfg.connect_retries))
        .notify(|err, dur: Duration| {
            warn!("database connect failed: {}, retrying in {:?}", err, dur);
        })
        .await?;
    let storage = CibilStorage::new(pool);
    storage.init_schema().await?;
    Ok(storage)
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        return;
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &*CONFIG;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database.url,
        listen_addr = %cfg.basic.listen_addr,
        loglevel = %cfg.basic.loglevel,
        allow_all_origins = cfg.cors.allow_all_origins
    );

    let storage = open_storage(&cfg.database).await?;
    let ledger = cibil_nexus::service::score_ledger::spawn(storage.clone()).await?;

    let state = cibil_nexus::router::CibilState::new(storage, ledger);
    let app = cibil_nexus::router::cibil_router(state, &cfg.cors);

    let listener = TcpListener::bind(cfg.basic.listen_addr.as_str()).await?;
    info!("HTTP server listening on {}", cfg.basic.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
