use std::sync::Arc;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tracklet::config::{Config, MAIN_CONNECTION};
use tracklet::db::ConnectionRegistry;
use tracklet::install::artifact;
use tracklet::router::{self, InstallState, TrackletState};
use tracklet::service::scm::ScmRegistry;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Arc::new(Config::load()?);

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
        listen_addr = %cfg.basic.listen_addr,
        base_path = %cfg.install.base_path.display(),
        artifact = %cfg.install.artifact_file().display(),
        loglevel = %cfg.basic.loglevel,
    );

    if cfg.basic.cookie_secret.is_none() {
        warn!("cookie_secret unset; sessions will not survive a restart");
    }
    let key = router::cookie_key(&cfg.basic);

    let app = if cfg.install.is_installed() {
        let db = artifact::load(&cfg.install.artifact_file(), &cfg.install.base_path)?;
        let mut registry = ConnectionRegistry::new(cfg.database.max_connections);
        registry.open(&db, MAIN_CONNECTION).await?;
        info!(backend = %db.backend(), prefix = %db.prefix, "database connection opened");

        let state = TrackletState::new(cfg.clone(), registry, ScmRegistry::default(), key)?;
        router::tracklet_router(state)
    } else {
        warn!("no installation artifact found, serving the installer");
        router::install_router(InstallState::new(cfg.clone(), key))
    };

    let listener = TcpListener::bind(&cfg.basic.listen_addr).await?;
    info!("HTTP server listening on {}", cfg.basic.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "could not listen for shutdown signal");
            }
            info!("shutting down");
        })
        .await?;
    Ok(())
}
