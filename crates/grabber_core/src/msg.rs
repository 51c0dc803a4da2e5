use crate::{JobId, JobUpdate, MediaKind, RequestId, VideoMetadata};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited the URL input.
    InputChanged(String),
    /// User asked for the current URL to be analyzed.
    AnalyzeClicked,
    /// Metadata lookup finished.
    MetadataLoaded {
        request_id: RequestId,
        result: Result<VideoMetadata, String>,
    },
    MediaKindSelected(MediaKind),
    /// User picked a quality option by its selector token.
    QualitySelected(String),
    /// User picked a container format by its extension.
    ContainerSelected(String),
    DownloadClicked,
    /// Download-start request finished.
    DownloadStarted {
        request_id: RequestId,
        result: Result<JobId, String>,
    },
    /// A poll tick produced a status report.
    JobStatus { job_id: JobId, update: JobUpdate },
    /// A poll tick failed in transport or decoding.
    PollFailed { job_id: JobId, message: String },
    /// User wants to quit.
    LeaveRequested,
    LeaveConfirmed,
    LeaveCancelled,
}
