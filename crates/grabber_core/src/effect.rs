use crate::{DownloadRequest, JobId, RequestId};

/// Side effects requested by `update`; executed by the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LookupMetadata { request_id: RequestId, url: String },
    StartDownload {
        request_id: RequestId,
        request: DownloadRequest,
    },
    StartPolling { job_id: JobId },
    CancelPolling { job_id: JobId },
    Exit,
}
