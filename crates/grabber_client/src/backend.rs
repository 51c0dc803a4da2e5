use grabber_logging::{grabber_debug, grabber_trace};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::types::StartResponse;
use crate::{
    BackendSettings, ClientError, FailureKind, MetadataResponse, StartRequest, StatusReport,
};

const START_FAILED: &str = "Failed to start download";

/// The remote service that extracts metadata and runs download jobs.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn lookup_metadata(&self, url: &str) -> Result<MetadataResponse, ClientError>;

    /// Returns the job id on acceptance.
    async fn start_download(&self, request: &StartRequest) -> Result<String, ClientError>;

    async fn download_status(&self, job_id: &str) -> Result<StatusReport, ClientError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    settings: BackendSettings,
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ClientError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    async fn read_body(
        &self,
        response: reqwest::Response,
    ) -> Result<(StatusCode, String), ClientError> {
        let status = response.status();
        let body = response.text().await.map_err(map_reqwest_error)?;
        grabber_trace!("Backend answered {} with {} bytes", status, body.len());
        Ok((status, body))
    }
}

#[async_trait::async_trait]
impl Backend for ReqwestBackend {
    async fn lookup_metadata(&self, url: &str) -> Result<MetadataResponse, ClientError> {
        let endpoint = self.settings.endpoint(&self.settings.routes.metadata)?;
        grabber_debug!("POST {} url={}", endpoint, url);
        let response = self
            .client
            .post(endpoint)
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let (status, body) = self.read_body(response).await?;

        let parsed: Option<MetadataResponse> = decode(&body).ok();
        if let Some(message) = parsed.as_ref().and_then(|data| data.error.clone()) {
            return Err(ClientError::new(FailureKind::Rejected, message));
        }
        if !status.is_success() {
            return Err(ClientError::new(
                FailureKind::HttpStatus(status.as_u16()),
                format!("Server error: {}", status.as_u16()),
            ));
        }
        match parsed {
            Some(metadata) => Ok(metadata),
            None => decode(&body),
        }
    }

    async fn start_download(&self, request: &StartRequest) -> Result<String, ClientError> {
        let endpoint = self.settings.endpoint(&self.settings.routes.start)?;
        grabber_debug!(
            "POST {} format_id={} audio_only={}",
            endpoint,
            request.format_id,
            request.audio_only
        );
        let response = self
            .client
            .post(endpoint)
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let (status, body) = self.read_body(response).await?;

        let parsed: StartResponse = match decode(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(ClientError::new(
                    FailureKind::HttpStatus(status.as_u16()),
                    START_FAILED,
                ));
            }
            Err(err) => return Err(err),
        };
        if let Some(message) = parsed.error {
            return Err(ClientError::new(FailureKind::Rejected, message));
        }
        if !status.is_success() {
            return Err(ClientError::new(
                FailureKind::HttpStatus(status.as_u16()),
                START_FAILED,
            ));
        }
        match parsed.download_id {
            Some(serde_json::Value::String(id)) if !id.is_empty() => Ok(id),
            Some(serde_json::Value::Number(id)) => Ok(id.to_string()),
            _ => Err(ClientError::new(
                FailureKind::Decode,
                "response carried no download_id",
            )),
        }
    }

    async fn download_status(&self, job_id: &str) -> Result<StatusReport, ClientError> {
        let endpoint = self
            .settings
            .job_endpoint(&self.settings.routes.status, job_id)?;
        let response = self
            .client
            .get(endpoint)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        // The body carries the verdict even on 404 ("Download not found").
        let (_status, body) = self.read_body(response).await?;
        decode(&body)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|err| ClientError::new(FailureKind::Decode, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::new(FailureKind::Timeout, err.to_string());
    }
    ClientError::new(FailureKind::Network, err.to_string())
}
