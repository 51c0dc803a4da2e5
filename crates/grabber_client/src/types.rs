use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body of the metadata-lookup response.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct MetadataResponse {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
    /// Seconds; some extractors report fractional durations.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub formats: Vec<FormatEntry>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormatKind {
    Video,
    Audio,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FormatEntry {
    #[serde(rename = "type")]
    pub kind: WireFormatKind,
    pub format_id: String,
    #[serde(default)]
    pub resolution: String,
    #[serde(default)]
    pub ext: String,
    #[serde(default)]
    pub filesize: Option<u64>,
}

/// Body of the download-start request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartRequest {
    pub url: String,
    pub format_id: String,
    pub audio_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub(crate) struct StartResponse {
    #[serde(default)]
    pub download_id: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of the download-status response.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct StatusReport {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A status report reduced to what the poller and UI act on.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusOutcome {
    Downloading { percent: Option<f64> },
    Working { status: String, percent: Option<f64> },
    Finished,
    Failed { message: String },
}

impl StatusOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StatusOutcome::Finished | StatusOutcome::Failed { .. })
    }
}

impl StatusReport {
    /// An error field wins over everything; `downloading` wins over a
    /// progress of 100, any other status at 100 counts as finished.
    pub fn outcome(&self) -> StatusOutcome {
        if let Some(message) = &self.error {
            return StatusOutcome::Failed {
                message: message.clone(),
            };
        }
        let reached_end = self.progress.is_some_and(|p| p >= 100.0);
        match self.status.as_deref() {
            Some("downloading") => StatusOutcome::Downloading {
                percent: self.progress,
            },
            Some("finished") => StatusOutcome::Finished,
            _ if reached_end => StatusOutcome::Finished,
            Some("error") => StatusOutcome::Failed {
                message: "Download failed".to_string(),
            },
            Some(other) => StatusOutcome::Working {
                status: other.to_string(),
                percent: self.progress,
            },
            None => StatusOutcome::Working {
                status: "pending".to_string(),
                percent: self.progress,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ClientError {
    pub kind: FailureKind,
    pub message: String,
}

impl ClientError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    /// The backend answered with an explicit error message.
    Rejected,
    Timeout,
    Network,
    Decode,
    Runtime,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Rejected => write!(f, "rejected by backend"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "undecodable response"),
            FailureKind::Runtime => write!(f, "runtime unavailable"),
        }
    }
}
