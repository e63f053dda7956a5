//! Job state machine implementation.
//!
//! Transitions mutate the job and return the events describing the change.
//! They never send anything themselves: callers hold the job's lock while
//! transitioning and publish the events with [`emit`] after releasing it.
//!
//! Once a job is terminal (`Completed`, `Failed`, `Cancelled`) further
//! transitions are ignored and return no events.

use chrono::Utc;
use tokio::sync::mpsc::Sender;
use tp_protocol::ipc::Event;
use tp_protocol::job_models::{Job, JobStatus};
use tp_protocol::pipeline_models::Stage;
use uuid::Uuid;

/// Create a new Job with Pending status.
pub fn create_job() -> Job {
    Job {
        id: Uuid::new_v4(),
        status: JobStatus::Pending,
        stage: None,
        youtube_link: String::new(),
        error: None,
        logs: Vec::new(),
        created_at: Utc::now(),
        started_at: None,
        finished_at: None,
    }
}

/// Transition the job from Pending to Running.
pub fn start_job(job: &mut Job) -> Vec<Event> {
    if job.status != JobStatus::Pending {
        return Vec::new();
    }
    job.status = JobStatus::Running;
    job.started_at = Some(Utc::now());
    vec![
        Event::JobStarted { job_id: job.id },
        Event::JobStatusUpdate {
            job_id: job.id,
            status: job.status,
        },
    ]
}

/// Record that the job is about to perform the work of `stage`.
pub fn enter_stage(job: &mut Job, stage: Stage) -> Vec<Event> {
    if job.status.is_terminal() {
        return Vec::new();
    }
    job.stage = Some(stage);
    vec![Event::StageStarted {
        job_id: job.id,
        stage,
    }]
}

/// Append a log message to the job logs.
pub fn log_to_job(job: &mut Job, message: String) -> Vec<Event> {
    job.logs.push(message.clone());
    vec![Event::JobLogChunk {
        job_id: job.id,
        content: message,
    }]
}

/// Mark the job as completed; the watch link becomes visible at the same time.
pub fn complete_job(job: &mut Job, youtube_link: String) -> Vec<Event> {
    if job.status.is_terminal() {
        return Vec::new();
    }
    job.status = JobStatus::Completed;
    job.youtube_link = youtube_link.clone();
    job.finished_at = Some(Utc::now());
    vec![
        Event::JobStatusUpdate {
            job_id: job.id,
            status: job.status,
        },
        Event::JobCompleted {
            job_id: job.id,
            youtube_link,
        },
    ]
}

/// Mark the job as failed. `stage` is left at the stage that failed.
pub fn fail_job(job: &mut Job, error: String) -> Vec<Event> {
    if job.status.is_terminal() {
        return Vec::new();
    }
    job.status = JobStatus::Failed;
    job.error = Some(error.clone());
    job.finished_at = Some(Utc::now());
    vec![
        Event::JobStatusUpdate {
            job_id: job.id,
            status: job.status,
        },
        Event::JobFailed {
            job_id: job.id,
            stage: job.stage,
            error,
        },
    ]
}

/// Mark the job as cancelled.
pub fn cancel_job(job: &mut Job, reason: String) -> Vec<Event> {
    if job.status.is_terminal() {
        return Vec::new();
    }
    job.status = JobStatus::Cancelled;
    job.error = Some(reason);
    job.finished_at = Some(Utc::now());
    vec![
        Event::JobStatusUpdate {
            job_id: job.id,
            status: job.status,
        },
        Event::JobCancelled {
            job_id: job.id,
            stage: job.stage,
        },
    ]
}

/// Publish events in order. A closed channel is not an error; nobody is listening.
pub async fn emit(events_tx: &Sender<Event>, events: Vec<Event>) {
    for event in events {
        let _ = events_tx.send(event).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_create_job() {
        let job = create_job();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.stage, None);
        assert!(job.youtube_link.is_empty());
        assert!(job.logs.is_empty());
        assert_eq!(job.step_label(), "Idle");
    }

    #[test]
    fn test_start_job() {
        let mut job = create_job();
        let events = start_job(&mut job);

        assert_eq!(job.status, JobStatus::Running);
        assert!(job.started_at.is_some());
        assert!(matches!(events[0], Event::JobStarted { .. }));
        assert!(matches!(
            events[1],
            Event::JobStatusUpdate {
                status: JobStatus::Running,
                ..
            }
        ));

        // Starting twice is a no-op
        assert!(start_job(&mut job).is_empty());
    }

    #[test]
    fn test_enter_stage_sets_label() {
        let mut job = create_job();
        start_job(&mut job);

        let events = enter_stage(&mut job, Stage::GeneratingVoiceover);
        assert_eq!(job.step_label(), "Generating Voiceover");
        assert!(matches!(
            events[0],
            Event::StageStarted {
                stage: Stage::GeneratingVoiceover,
                ..
            }
        ));
    }

    #[test]
    fn test_complete_job() {
        let mut job = create_job();
        start_job(&mut job);
        enter_stage(&mut job, Stage::UploadingToYoutube);
        assert!(job.youtube_link.is_empty());

        let events = complete_job(&mut job, "https://www.youtube.com/watch?v=abc123".to_string());

        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.step_label(), "Complete");
        assert_eq!(job.youtube_link, "https://www.youtube.com/watch?v=abc123");
        assert!(job.finished_at.is_some());
        assert!(matches!(events[1], Event::JobCompleted { ref youtube_link, .. } if youtube_link.ends_with("abc123")));
    }

    #[test]
    fn test_fail_job_keeps_stage() {
        let mut job = create_job();
        start_job(&mut job);
        enter_stage(&mut job, Stage::GeneratingStoryImage);

        let events = fail_job(&mut job, "content policy".to_string());

        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.stage, Some(Stage::GeneratingStoryImage));
        assert_eq!(job.error.as_deref(), Some("content policy"));
        assert_eq!(job.status_record().step, "Failed");
        assert!(matches!(
            &events[1],
            Event::JobFailed { stage: Some(Stage::GeneratingStoryImage), error, .. } if error == "content policy"
        ));
    }

    #[test]
    fn test_terminal_jobs_ignore_transitions() {
        let mut job = create_job();
        start_job(&mut job);
        fail_job(&mut job, "boom".to_string());

        assert!(cancel_job(&mut job, "late".to_string()).is_empty());
        assert!(complete_job(&mut job, "link".to_string()).is_empty());
        assert!(enter_stage(&mut job, Stage::CreatingVideo).is_empty());

        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("boom"));
        assert!(job.youtube_link.is_empty());
    }

    #[test]
    fn test_cancel_job() {
        let mut job = create_job();
        start_job(&mut job);
        enter_stage(&mut job, Stage::CreatingVideo);

        let events = cancel_job(&mut job, "Cancelled on request".to_string());

        assert_eq!(job.status, JobStatus::Cancelled);
        assert_eq!(job.step_label(), "Cancelled");
        assert!(matches!(
            events[1],
            Event::JobCancelled {
                stage: Some(Stage::CreatingVideo),
                ..
            }
        ));
    }

    #[test]
    fn test_log_to_job() {
        let mut job = create_job();
        let events = log_to_job(&mut job, "Story generated".to_string());

        assert_eq!(job.logs, vec!["Story generated".to_string()]);
        assert!(matches!(&events[0], Event::JobLogChunk { content, .. } if content == "Story generated"));
    }

    #[tokio::test]
    async fn test_emit_preserves_order() {
        let mut job = create_job();
        let (tx, mut rx) = mpsc::channel(10);

        emit(&tx, start_job(&mut job)).await;
        emit(&tx, enter_stage(&mut job, Stage::GeneratingStory)).await;

        assert!(matches!(rx.recv().await.unwrap(), Event::JobStarted { .. }));
        assert!(matches!(rx.recv().await.unwrap(), Event::JobStatusUpdate { .. }));
        assert!(matches!(rx.recv().await.unwrap(), Event::StageStarted { .. }));
    }

    #[tokio::test]
    async fn test_emit_to_closed_channel() {
        let mut job = create_job();
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        // Must not panic or block
        emit(&tx, start_job(&mut job)).await;
    }
}
