use std::sync::Arc;
use std::time::Duration;

use grabber_logging::{grabber_debug, grabber_warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{Backend, ClientError, StatusOutcome};

#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    Status {
        job_id: String,
        outcome: StatusOutcome,
    },
    /// One tick failed; the poller keeps going.
    TransientFailure { job_id: String, error: ClientError },
}

pub trait PollSink: Send + Sync {
    fn emit(&self, event: PollEvent);
}

/// Why a poller task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerExit {
    Cancelled,
    /// The backend reported a terminal status.
    Terminal,
}

/// Handle to a running status poller. Dropping it does not stop the task.
#[derive(Debug)]
pub struct PollerHandle {
    job_id: String,
    token: CancellationToken,
    task: JoinHandle<PollerExit>,
}

impl PollerHandle {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Idempotent; the task stops at its next await point.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn join(self) -> PollerExit {
        self.task.await.unwrap_or(PollerExit::Cancelled)
    }
}

/// Spawns a poller on the current tokio runtime.
///
/// Ticks are fixed-delay from completion: sleep `interval`, await one status
/// response, repeat. Responses never overlap. The task ends on its own after
/// emitting a terminal status, or when cancelled.
pub fn spawn_poller(
    backend: Arc<dyn Backend>,
    job_id: String,
    interval: Duration,
    sink: Arc<dyn PollSink>,
) -> PollerHandle {
    let token = CancellationToken::new();
    let task = tokio::spawn(poll_loop(
        backend,
        job_id.clone(),
        interval,
        sink,
        token.clone(),
    ));
    PollerHandle {
        job_id,
        token,
        task,
    }
}

async fn poll_loop(
    backend: Arc<dyn Backend>,
    job_id: String,
    interval: Duration,
    sink: Arc<dyn PollSink>,
    token: CancellationToken,
) -> PollerExit {
    grabber_debug!("Poller started job={} interval={:?}", job_id, interval);
    let mut tick: u64 = 0;
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
        tick += 1;

        let result = tokio::select! {
            _ = token.cancelled() => break,
            result = backend.download_status(&job_id) => result,
        };

        match result {
            Ok(report) => {
                let outcome = report.outcome();
                let terminal = outcome.is_terminal();
                sink.emit(PollEvent::Status {
                    job_id: job_id.clone(),
                    outcome,
                });
                if terminal {
                    grabber_debug!("Poller done job={} after {} ticks", job_id, tick);
                    return PollerExit::Terminal;
                }
            }
            Err(error) => {
                grabber_warn!("Poll tick {} failed job={}: {}", tick, job_id, error);
                sink.emit(PollEvent::TransientFailure {
                    job_id: job_id.clone(),
                    error,
                });
            }
        }
    }
    grabber_debug!("Poller cancelled job={} after {} ticks", job_id, tick);
    PollerExit::Cancelled
}
