//! Turns the core event stream into structured log lines.

use tokio::sync::mpsc::Receiver;
use tokio::task::JoinHandle;
use tp_protocol::ipc::Event;
use tracing::{debug, error, info, warn};

/// Log every event until all senders are dropped.
pub fn spawn_event_logger(mut events_rx: Receiver<Event>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            log_event(&event);
        }
        debug!("Event channel closed");
    })
}

pub fn log_event(event: &Event) {
    match event {
        Event::JobStarted { job_id } => info!(%job_id, "Job started"),
        Event::JobStatusUpdate { job_id, status } => {
            debug!(%job_id, ?status, "Job status changed")
        }
        Event::StageStarted { job_id, stage } => info!(%job_id, %stage, "Stage started"),
        Event::JobLogChunk { job_id, content } => info!(%job_id, "{content}"),
        Event::JobCompleted {
            job_id,
            youtube_link,
        } => info!(%job_id, %youtube_link, "Job complete"),
        Event::JobFailed {
            job_id,
            stage,
            error,
        } => error!(%job_id, stage = ?stage, %error, "Job failed"),
        Event::JobCancelled { job_id, stage } => warn!(%job_id, stage = ?stage, "Job cancelled"),
    }
}
