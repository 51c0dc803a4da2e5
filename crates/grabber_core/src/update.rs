use grabber_logging::{grabber_debug, grabber_info, grabber_warn};

use crate::download::{status_label, ProgressDisplay};
use crate::state::{ErrorKind, LookupState, UserError};
use crate::{AppState, DownloadPhase, Effect, JobId, JobUpdate, Msg, ValidationError};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            state.set_url_input(text);
            Vec::new()
        }
        Msg::AnalyzeClicked => analyze(&mut state),
        Msg::MetadataLoaded { request_id, result } => {
            if state.lookup() != &(LookupState::Pending { request_id }) {
                grabber_debug!("Ignoring stale metadata result request={}", request_id);
                return (state, Vec::new());
            }
            match result {
                Ok(metadata) => {
                    grabber_info!(
                        "Metadata ready request={} title={:?} formats={}",
                        request_id,
                        metadata.title,
                        metadata.formats.len()
                    );
                    state.finish_lookup(LookupState::Ready(metadata));
                }
                Err(message) => {
                    grabber_info!("Metadata lookup rejected request={}: {}", request_id, message);
                    state.finish_lookup(LookupState::Failed);
                    state.set_error(Some(UserError::new(ErrorKind::ServerRejection, message)));
                }
            }
            Vec::new()
        }
        Msg::MediaKindSelected(kind) => {
            if state.metadata().is_some() {
                state.selection_mut().choose_media_kind(kind);
                clear_error(&mut state);
            }
            Vec::new()
        }
        Msg::QualitySelected(token) => {
            let known = state
                .quality_options()
                .iter()
                .any(|option| option.selector == token);
            if known && state.selection_mut().choose_quality(token.clone()) {
                clear_error(&mut state);
            } else {
                grabber_debug!("Ignoring quality selection {:?}", token);
            }
            Vec::new()
        }
        Msg::ContainerSelected(extension) => {
            let known = state
                .container_options()
                .iter()
                .any(|option| option.extension == extension);
            if known && state.selection_mut().choose_container_format(extension.clone()) {
                clear_error(&mut state);
            } else {
                grabber_debug!("Ignoring container selection {:?}", extension);
            }
            Vec::new()
        }
        Msg::DownloadClicked => start_download(&mut state),
        Msg::DownloadStarted { request_id, result } => {
            if state.download() != &(DownloadPhase::Starting { request_id }) {
                grabber_debug!("Ignoring stale download start request={}", request_id);
                return (state, Vec::new());
            }
            match result {
                Ok(job_id) => {
                    grabber_info!("Download accepted job={}", job_id);
                    state.set_download(DownloadPhase::Polling {
                        job_id: job_id.clone(),
                    });
                    vec![Effect::StartPolling { job_id }]
                }
                Err(message) => {
                    grabber_info!("Download rejected request={}: {}", request_id, message);
                    state.set_download(DownloadPhase::Failed);
                    state.set_progress(None);
                    state.set_error(Some(UserError::new(ErrorKind::ServerRejection, message)));
                    Vec::new()
                }
            }
        }
        Msg::JobStatus { job_id, update } => apply_job_update(&mut state, job_id, update),
        Msg::PollFailed { job_id, message } => {
            grabber_warn!("Poll failed job={}: {}; retrying next tick", job_id, message);
            Vec::new()
        }
        Msg::LeaveRequested => match state.download().polling_job() {
            Some(_) => {
                state.set_leave_prompt(true);
                Vec::new()
            }
            None => vec![Effect::Exit],
        },
        Msg::LeaveConfirmed => {
            if !state.leave_prompt_shown() {
                return (state, Vec::new());
            }
            state.set_leave_prompt(false);
            let mut effects = Vec::with_capacity(2);
            if let Some(job_id) = state.tear_down_download() {
                effects.push(Effect::CancelPolling { job_id });
            }
            effects.push(Effect::Exit);
            effects
        }
        Msg::LeaveCancelled => {
            if state.leave_prompt_shown() {
                state.set_leave_prompt(false);
            }
            Vec::new()
        }
    };

    (state, effects)
}

fn analyze(state: &mut AppState) -> Vec<Effect> {
    if state.is_lookup_pending() {
        grabber_debug!("Analyze ignored; a lookup is already pending");
        return Vec::new();
    }
    let url = state.url_input().trim().to_string();
    if url.is_empty() {
        state.set_error(Some(UserError::new(
            ErrorKind::Validation,
            ValidationError::EmptyUrl.to_string(),
        )));
        return Vec::new();
    }

    let mut effects = Vec::with_capacity(2);
    if let Some(job_id) = state.tear_down_download() {
        effects.push(Effect::CancelPolling { job_id });
    }
    let request_id = state.allocate_request_id();
    state.begin_lookup(request_id);
    grabber_debug!("Lookup started request={} url={}", request_id, url);
    effects.push(Effect::LookupMetadata { request_id, url });
    effects
}

fn start_download(state: &mut AppState) -> Vec<Effect> {
    if matches!(state.download(), DownloadPhase::Starting { .. }) {
        grabber_debug!("Download click ignored; a start request is in flight");
        return Vec::new();
    }
    let request = match state.selection().build_request(state.url_input()) {
        Ok(request) => request,
        Err(err) => {
            state.set_error(Some(UserError::new(ErrorKind::Validation, err.to_string())));
            return Vec::new();
        }
    };

    let mut effects = Vec::with_capacity(2);
    if let Some(job_id) = state.download().polling_job().cloned() {
        effects.push(Effect::CancelPolling { job_id });
    }
    let request_id = state.allocate_request_id();
    state.set_download(DownloadPhase::Starting { request_id });
    state.set_progress(Some(ProgressDisplay::preparing()));
    state.set_error(None);
    grabber_info!(
        "Download requested request={} selector={} audio_only={} container={}",
        request_id,
        request.format_selector,
        request.audio_only,
        request.container_format
    );
    effects.push(Effect::StartDownload {
        request_id,
        request,
    });
    effects
}

fn apply_job_update(state: &mut AppState, job_id: JobId, update: JobUpdate) -> Vec<Effect> {
    if state.download().polling_job() != Some(&job_id) {
        grabber_debug!("Ignoring status for inactive job={}", job_id);
        return Vec::new();
    }
    match update {
        JobUpdate::Downloading { percent } => {
            let progress = state.progress_mut();
            progress.set_percent(percent.unwrap_or(0.0));
            progress.status_text = "Downloading...".to_string();
            Vec::new()
        }
        JobUpdate::Working { status, percent } => {
            let progress = state.progress_mut();
            if let Some(percent) = percent {
                progress.set_percent(percent);
            }
            progress.status_text = status_label(&status);
            Vec::new()
        }
        JobUpdate::Finished => {
            grabber_info!("Download finished job={}", job_id);
            state.set_progress(Some(ProgressDisplay::completed()));
            state.set_download(DownloadPhase::Completed {
                job_id: job_id.clone(),
            });
            vec![Effect::CancelPolling { job_id }]
        }
        JobUpdate::Failed { message } => {
            grabber_info!("Download failed job={}: {}", job_id, message);
            state.set_download(DownloadPhase::Failed);
            state.set_progress(None);
            state.set_error(Some(UserError::new(ErrorKind::JobFailure, message)));
            vec![Effect::CancelPolling { job_id }]
        }
    }
}

fn clear_error(state: &mut AppState) {
    if state.error().is_some() {
        state.set_error(None);
    }
}
