use anyhow::Result;
use heatfence::*;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    let (chart_tx, _) =
        broadcast::channel::<models::Chart>(app_config.publishing.broadcast_capacity);
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let panel = panel::Panel::new(app_config.panel.tz()?);
    let (panel_handle, worker_handle) = worker::spawn(
        panel,
        app_config.publishing.command_capacity,
        chart_tx.clone(),
        shutdown_rx,
    );

    if let Some(path) = app_config.panel.geojson_path.as_deref() {
        let saved = geojson::load(std::path::Path::new(path))
            .await
            .map_err(|e| anyhow::anyhow!("loading {}: {}", path, e))?;
        let restored = panel_handle.import(saved).await?;
        tracing::info!(path, restored, "restored saved polygons");
    }

    let app = routes::app(panel_handle, chart_tx, app_config.clone());
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = async {
            #[cfg(unix)]
            {
                let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(s) => s,
                    Err(_) => {
                        let _ = tokio::signal::ctrl_c().await;
                        return;
                    }
                };
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            #[cfg(not(unix))]
            {
                let _ = tokio::signal::ctrl_c().await;
            }
        } => {
            tracing::info!("Received shutdown signal");
            let _ = shutdown_tx.send(());
            let _ = worker_handle.await;
        }
    }

    Ok(())
}
