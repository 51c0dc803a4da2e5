use std::time::Duration;

use grabber_client::{
    ClientEvent, ClientHandle, FormatEntry, MetadataResponse, PollEvent, StartRequest,
    StatusOutcome, WireFormatKind,
};
use grabber_core::{
    DownloadRequest, Effect, FormatKind, JobUpdate, MediaFormat, Msg, VideoMetadata,
};
use grabber_logging::{grabber_debug, grabber_info, grabber_warn};

const UNKNOWN_TITLE: &str = "Unknown Title";

/// Executes core effects against the backend client and turns client
/// events back into core messages.
pub struct EffectRunner {
    client: ClientHandle,
}

impl EffectRunner {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }

    /// Returns true when an `Exit` effect was among `effects`.
    pub fn enqueue(&self, effects: Vec<Effect>) -> bool {
        let mut exit = false;
        for effect in effects {
            match effect {
                Effect::LookupMetadata { request_id, url } => {
                    grabber_info!("LookupMetadata request={} url={}", request_id, url);
                    self.client.lookup_metadata(request_id, url);
                }
                Effect::StartDownload {
                    request_id,
                    request,
                } => {
                    grabber_info!(
                        "StartDownload request={} format_id={}",
                        request_id,
                        request.format_selector
                    );
                    self.client.start_download(request_id, start_request(request));
                }
                Effect::StartPolling { job_id } => {
                    grabber_debug!("StartPolling job={}", job_id);
                    self.client.start_polling(job_id);
                }
                Effect::CancelPolling { job_id } => {
                    grabber_debug!("CancelPolling job={}", job_id);
                    self.client.cancel_polling(job_id);
                }
                Effect::Exit => exit = true,
            }
        }
        exit
    }

    /// Waits up to `timeout` for the next client event.
    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.client.recv_timeout(timeout).map(event_to_msg)
    }
}

fn start_request(request: DownloadRequest) -> StartRequest {
    StartRequest {
        url: request.url,
        format_id: request.format_selector,
        audio_only: request.audio_only,
        file_format: Some(request.container_format),
    }
}

pub(crate) fn event_to_msg(event: ClientEvent) -> Msg {
    match event {
        ClientEvent::MetadataLoaded { request_id, result } => Msg::MetadataLoaded {
            request_id,
            result: result.map(video_metadata).map_err(|err| err.message),
        },
        ClientEvent::DownloadStarted { request_id, result } => Msg::DownloadStarted {
            request_id,
            result: result.map_err(|err| err.message),
        },
        ClientEvent::Poll(PollEvent::Status { job_id, outcome }) => Msg::JobStatus {
            job_id,
            update: job_update(outcome),
        },
        ClientEvent::Poll(PollEvent::TransientFailure { job_id, error }) => {
            grabber_warn!("Status poll failed job={} kind={}", job_id, error.kind);
            Msg::PollFailed {
                job_id,
                message: error.message,
            }
        }
    }
}

pub(crate) fn video_metadata(response: MetadataResponse) -> VideoMetadata {
    VideoMetadata {
        title: response
            .title
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        uploader: response.uploader,
        duration_seconds: response
            .duration
            .filter(|seconds| seconds.is_finite() && *seconds >= 0.0)
            .map(|seconds| seconds.round() as u64),
        view_count: response.view_count,
        thumbnail_url: response.thumbnail,
        formats: response.formats.into_iter().filter_map(media_format).collect(),
    }
}

fn media_format(entry: FormatEntry) -> Option<MediaFormat> {
    let kind = match entry.kind {
        WireFormatKind::Video => FormatKind::Video,
        WireFormatKind::Audio => FormatKind::Audio,
        WireFormatKind::Other => return None,
    };
    Some(MediaFormat {
        kind,
        format_id: entry.format_id,
        resolution: entry.resolution,
        ext: entry.ext,
        filesize: entry.filesize,
    })
}

pub(crate) fn job_update(outcome: StatusOutcome) -> JobUpdate {
    match outcome {
        StatusOutcome::Downloading { percent } => JobUpdate::Downloading { percent },
        StatusOutcome::Working { status, percent } => JobUpdate::Working { status, percent },
        StatusOutcome::Finished => JobUpdate::Finished,
        StatusOutcome::Failed { message } => JobUpdate::Failed { message },
    }
}
