use chrono::Local;
use mileage_tracker::{AppState, Config, load_data, persist_data, router, upstream::UpstreamClient};
use std::net::SocketAddr;
use tokio::fs;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    if let Some(parent) = config.data_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let mut data = load_data(&config.data_path).await;
    if config.seed_example && data.seed_example(Local::now().date_naive())? {
        persist_data(&config.data_path, &data).await?;
        info!("seeded example athlete");
    }
    info!(
        athletes = data.athletes.len(),
        path = %config.data_path.display(),
        "loaded roster"
    );

    let mut state = AppState::new(config.data_path.clone(), data);
    if let Some(url) = &config.upstream_url {
        info!(upstream = %url, "weekly summaries read from upstream backend");
        state = state.with_upstream(UpstreamClient::new(url.clone()));
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
