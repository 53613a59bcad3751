mod api;
mod middleware;
mod scheduler;

use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = adlens_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = adlens_db::PoolConfig::from_app_config(&config);
    let pool = adlens_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = adlens_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations up to date");

    let state = AppState::from_config(pool, &config)?;

    let _scheduler = match config.scrape_cron.as_deref() {
        Some(schedule) => Some(scheduler::build_scheduler(state.clone(), schedule).await?),
        None => {
            tracing::info!("ADLENS_SCRAPE_CRON not set; scheduled scraping disabled");
            None
        }
    };

    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = ?config.env, "adlens-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, draining connections");
}
