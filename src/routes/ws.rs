// WebSocket chart stream: current chart on connect, then every chart the worker publishes

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use bytes::Bytes;
use tokio::sync::broadcast;
use tokio::time::{Duration, Instant, timeout};

use super::AppState;
use crate::models::Chart;
use crate::worker::PanelHandle;

pub(super) const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
pub(super) const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

pub(super) async fn ws_chart(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let tx = state.chart_tx.clone();
    let panel = state.panel.clone();
    ws.on_upgrade(move |socket| async move {
        // Subscribe before reading the current chart so nothing published in between is lost.
        let mut rx = tx.subscribe();
        if let Err(e) = stream_chart(socket, &mut rx, panel).await {
            tracing::info!("Chart stream error: {}", e);
        }
    })
}

/// Sends `chart` unless it is older than what this client already has. Returns false when the socket is gone.
async fn send_chart(
    socket: &mut WebSocket,
    chart: &Chart,
    last_sent: &mut Option<u64>,
) -> anyhow::Result<bool> {
    if last_sent.is_some_and(|last| chart.generation <= last) {
        return Ok(true);
    }
    let json = serde_json::to_string(chart)?;
    let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Text(json.into()))).await;
    if r.is_err() || r.unwrap_or(Ok(())).is_err() {
        return Ok(false);
    }
    *last_sent = Some(chart.generation);
    Ok(true)
}

async fn stream_chart(
    mut socket: WebSocket,
    rx: &mut broadcast::Receiver<Chart>,
    panel: PanelHandle,
) -> anyhow::Result<()> {
    tracing::info!("Client connected to chart stream");
    let mut last_sent: Option<u64> = None;

    let current = panel.chart().await?;
    if !send_chart(&mut socket, &current, &mut last_sent).await? {
        return Ok(());
    }

    let mut ping_interval =
        tokio::time::interval_at(Instant::now() + WS_PING_INTERVAL, WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(chart) => {
                        if !send_chart(&mut socket, &chart, &mut last_sent).await? {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("WebSocket /ws/chart client lagged, skipped {} charts", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            _ = ping_interval.tick() => {
                let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Ping(Bytes::new()))).await;
                if r.is_err() || r.unwrap_or(Ok(())).is_err() {
                    break;
                }
            }
        }
    }
    Ok(())
}
