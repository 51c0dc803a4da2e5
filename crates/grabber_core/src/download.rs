/// Opaque job token issued by the backend.
pub type JobId = String;

/// Correlates a request effect with the message carrying its result.
pub type RequestId = u64;

/// A status report from one poll tick, already classified.
#[derive(Debug, Clone, PartialEq)]
pub enum JobUpdate {
    Downloading { percent: Option<f64> },
    /// Any other non-terminal backend status (`starting`, `converting`, ...).
    Working { status: String, percent: Option<f64> },
    Finished,
    Failed { message: String },
}

impl JobUpdate {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobUpdate::Finished | JobUpdate::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DownloadPhase {
    #[default]
    Idle,
    Starting { request_id: RequestId },
    Polling { job_id: JobId },
    Completed { job_id: JobId },
    Failed,
}

impl DownloadPhase {
    pub fn polling_job(&self) -> Option<&JobId> {
        match self {
            DownloadPhase::Polling { job_id } => Some(job_id),
            _ => None,
        }
    }
}

/// What the progress indicator shows.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressDisplay {
    pub percent: f64,
    pub status_text: String,
}

impl ProgressDisplay {
    pub(crate) fn preparing() -> Self {
        Self {
            percent: 0.0,
            status_text: "Preparing download...".to_string(),
        }
    }

    pub(crate) fn completed() -> Self {
        Self {
            percent: 100.0,
            status_text: "Download completed!".to_string(),
        }
    }

    pub(crate) fn set_percent(&mut self, percent: f64) {
        self.percent = if percent.is_nan() {
            0.0
        } else {
            percent.clamp(0.0, 100.0)
        };
    }
}

/// `converting` becomes `Converting...`.
pub(crate) fn status_label(status: &str) -> String {
    let mut chars = status.chars();
    match chars.next() {
        Some(first) => format!("{}{}...", first.to_uppercase(), chars.as_str()),
        None => "Working...".to_string(),
    }
}
