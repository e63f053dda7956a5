//! Test fixtures for building configs, engines and managers.

use super::mock_generators::StubCompositor;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tp_core::engine::PipelineEngine;
use tp_core::generators::GeneratorSet;
use tp_core::state::JobManager;
use tp_protocol::config_models::PipelineConfig;
use tp_protocol::ipc::Event;

/// A mock-provider configuration writing under `work_dir`.
///
/// The video size is tiny so resizing stays fast.
pub fn test_config(work_dir: &Path) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.storage.work_dir = work_dir.display().to_string();
    config.story.provider = "mock".to_string();
    config.image.provider = "mock".to_string();
    config.voice.provider = "mock".to_string();
    config.upload.provider = "mock".to_string();
    config.video.width = 32;
    config.video.height = 18;
    config
}

/// Engine over the given generators with a stub compositor.
pub fn build_engine(generators: GeneratorSet, config: PipelineConfig) -> PipelineEngine {
    build_engine_with(generators, StubCompositor::new(), config)
}

pub fn build_engine_with(
    generators: GeneratorSet,
    compositor: StubCompositor,
    config: PipelineConfig,
) -> PipelineEngine {
    PipelineEngine::new(generators, Arc::new(compositor), config)
}

/// Manager whose events are discarded.
#[allow(dead_code)]
pub fn build_manager(generators: GeneratorSet, config: PipelineConfig) -> JobManager {
    let (events_tx, events_rx) = mpsc::channel(100);
    drain(events_rx);
    JobManager::new(build_engine(generators, config), events_tx)
}

/// Consume events in the background so senders never block.
pub fn drain(mut events_rx: mpsc::Receiver<Event>) {
    tokio::spawn(async move { while events_rx.recv().await.is_some() {} });
}

/// Collect events until a terminal one arrives, the channel closes or
/// `timeout` elapses.
#[allow(dead_code)]
pub async fn collect_events_until_terminal(
    events_rx: &mut mpsc::Receiver<Event>,
    timeout: Duration,
) -> Vec<Event> {
    let mut events = Vec::new();
    let start = tokio::time::Instant::now();

    while start.elapsed() < timeout {
        match tokio::time::timeout(Duration::from_millis(100), events_rx.recv()).await {
            Ok(Some(event)) => {
                let is_terminal = event.is_terminal();
                events.push(event);
                if is_terminal {
                    break;
                }
            }
            Ok(None) => break,  // Channel closed
            Err(_) => continue, // Timeout, keep waiting
        }
    }

    events
}
