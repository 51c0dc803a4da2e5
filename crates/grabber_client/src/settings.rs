use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ClientError, FailureKind};

/// Backend route paths, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Routes {
    pub metadata: String,
    pub start: String,
    /// The job id is appended as a path segment.
    pub status: String,
    /// The job id is appended as a path segment.
    pub file: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            metadata: "/get_video_info".to_string(),
            start: "/download_video".to_string(),
            status: "/download_progress".to_string(),
            file: "/download_file".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Delay between the end of one status poll and the start of the next.
    pub poll_interval: Duration,
    pub routes: Routes,
}

impl BackendSettings {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(1000),
            routes: Routes::default(),
        }
    }

    pub fn parse(base_url: &str) -> Result<Self, ClientError> {
        let url = Url::parse(base_url)
            .map_err(|err| ClientError::new(FailureKind::InvalidUrl, format!("{base_url}: {err}")))?;
        if url.cannot_be_a_base() {
            return Err(ClientError::new(
                FailureKind::InvalidUrl,
                format!("{base_url}: not usable as a base url"),
            ));
        }
        Ok(Self::new(url))
    }

    /// `route` resolved against the base URL, keeping any base path prefix.
    pub fn endpoint(&self, route: &str) -> Result<Url, ClientError> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            route.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    /// `route` with `job_id` appended as one percent-encoded path segment.
    pub fn job_endpoint(&self, route: &str, job_id: &str) -> Result<Url, ClientError> {
        let mut url = self.endpoint(route)?;
        url.path_segments_mut()
            .map_err(|_| ClientError::new(FailureKind::InvalidUrl, "base url cannot carry a path"))?
            .pop_if_empty()
            .push(job_id);
        Ok(url)
    }
}
