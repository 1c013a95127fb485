// Panel worker: owns the Panel and applies commands strictly one at a time (mpsc),
// so an index is always fully rebuilt before any query runs against it.
// Every new chart is published on the broadcast channel; consumers keep the latest generation.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};

use crate::error::PanelError;
use crate::geojson::{FeatureCollection, SavedPolygon};
use crate::models::{BucketedFrame, Chart, DrawnPolygon, FrameBatch, PolygonId, RingInput};
use crate::panel::Panel;

type Reply<T> = oneshot::Sender<T>;

/// Commands accepted by the worker. Each carries its reply channel.
pub enum PanelCommand {
    LoadFrames(FrameBatch, Reply<Chart>),
    AddPolygon(RingInput, Reply<(PolygonId, Chart)>),
    ModifyPolygon(PolygonId, RingInput, Reply<Result<Chart, PanelError>>),
    RenamePolygon(PolygonId, Option<String>, Reply<Result<(), PanelError>>),
    RemovePolygon(PolygonId, Reply<Result<DrawnPolygon, PanelError>>),
    Undo(Reply<Option<DrawnPolygon>>),
    Clear(Reply<Chart>),
    Import(Vec<SavedPolygon>, Reply<usize>),
    Export(Reply<FeatureCollection>),
    GetChart(Reply<Chart>),
    GetFrame(Reply<Option<Arc<BucketedFrame>>>),
}

/// Channel capacity for panel commands.
pub fn command_channel_capacity(requested: usize) -> usize {
    requested.max(8)
}

/// Cloneable front end to the worker, used by the HTTP handlers.
#[derive(Clone)]
pub struct PanelHandle {
    tx: mpsc::Sender<PanelCommand>,
}

impl PanelHandle {
    async fn call<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> PanelCommand,
    ) -> Result<T, PanelError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(make(reply_tx))
            .await
            .map_err(|_| PanelError::WorkerGone)?;
        reply_rx.await.map_err(|_| PanelError::WorkerGone)
    }

    pub async fn load_frames(&self, batch: FrameBatch) -> Result<Chart, PanelError> {
        self.call(|r| PanelCommand::LoadFrames(batch, r)).await
    }

    pub async fn add_polygon(&self, input: RingInput) -> Result<(PolygonId, Chart), PanelError> {
        self.call(|r| PanelCommand::AddPolygon(input, r)).await
    }

    pub async fn modify_polygon(
        &self,
        id: PolygonId,
        input: RingInput,
    ) -> Result<Chart, PanelError> {
        self.call(|r| PanelCommand::ModifyPolygon(id, input, r))
            .await?
    }

    pub async fn rename_polygon(
        &self,
        id: PolygonId,
        name: Option<String>,
    ) -> Result<(), PanelError> {
        self.call(|r| PanelCommand::RenamePolygon(id, name, r))
            .await?
    }

    pub async fn remove_polygon(&self, id: PolygonId) -> Result<DrawnPolygon, PanelError> {
        self.call(|r| PanelCommand::RemovePolygon(id, r)).await?
    }

    pub async fn undo(&self) -> Result<Option<DrawnPolygon>, PanelError> {
        self.call(PanelCommand::Undo).await
    }

    pub async fn clear(&self) -> Result<Chart, PanelError> {
        self.call(PanelCommand::Clear).await
    }

    pub async fn import(&self, saved: Vec<SavedPolygon>) -> Result<usize, PanelError> {
        self.call(|r| PanelCommand::Import(saved, r)).await
    }

    pub async fn export(&self) -> Result<FeatureCollection, PanelError> {
        self.call(PanelCommand::Export).await
    }

    pub async fn chart(&self) -> Result<Chart, PanelError> {
        self.call(PanelCommand::GetChart).await
    }

    pub async fn frame(&self) -> Result<Option<Arc<BucketedFrame>>, PanelError> {
        self.call(PanelCommand::GetFrame).await
    }
}

/// Spawns the worker. It runs until shutdown fires or every handle is dropped.
pub fn spawn(
    panel: Panel,
    command_capacity: usize,
    chart_tx: broadcast::Sender<Chart>,
    shutdown_rx: oneshot::Receiver<()>,
) -> (PanelHandle, tokio::task::JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(command_channel_capacity(command_capacity));
    let handle = tokio::spawn(run(panel, rx, chart_tx, shutdown_rx));
    (PanelHandle { tx }, handle)
}

async fn run(
    mut panel: Panel,
    mut rx: mpsc::Receiver<PanelCommand>,
    chart_tx: broadcast::Sender<Chart>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut commands_applied: u64 = 0;
    // A dropped shutdown sender is not a shutdown request.
    let mut shutdown_armed = true;
    loop {
        tokio::select! {
            cmd = rx.recv() => {
                let Some(cmd) = cmd else { break };
                let before = panel.chart().generation;
                apply(&mut panel, cmd);
                commands_applied += 1;
                if panel.chart().generation != before {
                    // No receivers is fine: nobody is watching /ws/chart.
                    let _ = chart_tx.send(panel.chart().clone());
                }
            }
            res = &mut shutdown_rx, if shutdown_armed => {
                if res.is_ok() {
                    tracing::info!("Received shutdown; stopping panel worker");
                    break;
                }
                shutdown_armed = false;
            }
        }
    }
    tracing::debug!(commands_applied, "Panel worker shutting down");
}

// A dropped reply receiver only means the caller went away; the command still applied.
fn apply(panel: &mut Panel, cmd: PanelCommand) {
    match cmd {
        PanelCommand::LoadFrames(batch, reply) => {
            let _ = reply.send(panel.load_frames(batch).clone());
        }
        PanelCommand::AddPolygon(input, reply) => {
            let ring = input.to_lon_lat();
            let (id, chart) = panel.add_polygon(ring, input.name);
            let _ = reply.send((id, chart.clone()));
        }
        PanelCommand::ModifyPolygon(id, input, reply) => {
            let result = panel.modify_polygon(id, input.to_lon_lat()).cloned();
            if let Err(e) = &result {
                tracing::warn!(polygon_id = id, error = %e, "modify rejected");
            }
            let _ = reply.send(result);
        }
        PanelCommand::RenamePolygon(id, name, reply) => {
            let _ = reply.send(panel.rename_polygon(id, name));
        }
        PanelCommand::RemovePolygon(id, reply) => {
            let _ = reply.send(panel.remove_polygon(id));
        }
        PanelCommand::Undo(reply) => {
            let _ = reply.send(panel.undo());
        }
        PanelCommand::Clear(reply) => {
            let _ = reply.send(panel.clear().clone());
        }
        PanelCommand::Import(saved, reply) => {
            let _ = reply.send(panel.import(saved));
        }
        PanelCommand::Export(reply) => {
            let _ = reply.send(panel.export());
        }
        PanelCommand::GetChart(reply) => {
            let _ = reply.send(panel.chart().clone());
        }
        PanelCommand::GetFrame(reply) => {
            let _ = reply.send(panel.frame().cloned());
        }
    }
}
