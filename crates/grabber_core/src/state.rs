use crate::catalog::{container_catalog, quality_catalog};
use crate::download::ProgressDisplay;
use crate::view_model::{AppViewModel, ChoiceView, MetadataView, ProgressView};
use crate::{
    display, CatalogMode, ContainerOption, DownloadPhase, JobId, MediaKind, QualityOption,
    RequestId, SelectionState, VideoMetadata,
};

pub const DEFAULT_FILE_ROUTE: &str = "/download_file";

const LEAVE_PROMPT: &str = "Download in progress. Are you sure you want to leave?";

/// Static knobs for the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreSettings {
    pub catalog_mode: CatalogMode,
    /// Route prefix for the completion link; the job id is appended.
    pub file_route: String,
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            catalog_mode: CatalogMode::Static,
            file_route: DEFAULT_FILE_ROUTE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LookupState {
    #[default]
    Idle,
    Pending { request_id: RequestId },
    Ready(VideoMetadata),
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input problem caught locally; no request was sent.
    Validation,
    /// Backend refused a lookup or a download start.
    ServerRejection,
    /// Backend reported the job itself as failed.
    JobFailure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserError {
    pub kind: ErrorKind,
    pub message: String,
}

impl UserError {
    pub(crate) fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// The single state record driven by `update`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    settings: CoreSettings,
    url_input: String,
    lookup: LookupState,
    selection: SelectionState,
    download: DownloadPhase,
    progress: Option<ProgressDisplay>,
    error: Option<UserError>,
    leave_prompt: bool,
    next_request_id: RequestId,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: CoreSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &CoreSettings {
        &self.settings
    }

    pub fn url_input(&self) -> &str {
        &self.url_input
    }

    pub fn lookup(&self) -> &LookupState {
        &self.lookup
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn download(&self) -> &DownloadPhase {
        &self.download
    }

    pub fn error(&self) -> Option<&UserError> {
        self.error.as_ref()
    }

    pub fn metadata(&self) -> Option<&VideoMetadata> {
        match &self.lookup {
            LookupState::Ready(metadata) => Some(metadata),
            _ => None,
        }
    }

    /// Quality options for the chosen media kind; empty until one is chosen.
    pub fn quality_options(&self) -> Vec<QualityOption> {
        match (self.selection.media_kind(), self.metadata()) {
            (Some(kind), Some(metadata)) => {
                quality_catalog(self.settings.catalog_mode, kind, &metadata.formats)
            }
            _ => Vec::new(),
        }
    }

    /// Container options; empty until a quality is chosen.
    pub fn container_options(&self) -> Vec<ContainerOption> {
        match (self.selection.media_kind(), self.selection.quality_id()) {
            (Some(kind), Some(_)) => container_catalog(kind),
            _ => Vec::new(),
        }
    }

    /// File route plus the job id as one percent-encoded path segment.
    pub fn completion_link(&self) -> Option<String> {
        match &self.download {
            DownloadPhase::Completed { job_id } => Some(format!(
                "{}/{}",
                self.settings.file_route.trim_end_matches('/'),
                urlencoding::encode(job_id)
            )),
            _ => None,
        }
    }

    pub fn view(&self) -> AppViewModel {
        let selection_visible = self.metadata().is_some();
        let chosen_kind = self.selection.media_kind();

        let media_kinds = if selection_visible {
            MediaKind::ALL
                .iter()
                .map(|kind| ChoiceView {
                    label: kind.label().to_string(),
                    value: kind.to_string(),
                    detail: None,
                    selected: chosen_kind == Some(*kind),
                })
                .collect()
        } else {
            Vec::new()
        };

        let quality_options = chosen_kind.filter(|_| selection_visible).map(|_| {
            self.quality_options()
                .into_iter()
                .map(|option| ChoiceView {
                    selected: self.selection.quality_id() == Some(option.selector.as_str()),
                    label: option.label,
                    value: option.selector,
                    detail: None,
                })
                .collect()
        });

        let container_options = self
            .selection
            .quality_id()
            .filter(|_| selection_visible)
            .map(|_| {
                self.container_options()
                    .into_iter()
                    .map(|option| ChoiceView {
                        selected: self.selection.container_format()
                            == Some(option.extension.as_str()),
                        label: option.label,
                        value: option.extension,
                        detail: option.description,
                    })
                    .collect()
            });

        AppViewModel {
            url_input: self.url_input.clone(),
            loading: self.is_lookup_pending(),
            analyze_enabled: !self.is_lookup_pending(),
            metadata: self.metadata().map(|metadata| MetadataView {
                title: metadata.title.clone(),
                uploader: metadata
                    .uploader
                    .clone()
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| "Unknown".to_string()),
                duration: display::format_duration(metadata.duration_seconds),
                views: display::format_count(metadata.view_count),
                thumbnail_url: metadata.thumbnail_url.clone().filter(|url| !url.is_empty()),
            }),
            selection_visible,
            media_kinds,
            quality_options,
            container_options,
            submit_enabled: selection_visible
                && self.selection.can_submit()
                && !matches!(self.download, DownloadPhase::Starting { .. }),
            phase: self.download.clone(),
            progress: self.progress.as_ref().map(|progress| ProgressView {
                percent: progress.percent,
                status_text: progress.status_text.clone(),
            }),
            completion_link: self.completion_link(),
            error: self.error.clone(),
            leave_prompt: self.leave_prompt.then(|| LEAVE_PROMPT.to_string()),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn is_lookup_pending(&self) -> bool {
        matches!(self.lookup, LookupState::Pending { .. })
    }

    pub(crate) fn set_url_input(&mut self, text: String) {
        if self.url_input != text {
            self.url_input = text;
            self.mark_dirty();
        }
    }

    pub(crate) fn allocate_request_id(&mut self) -> RequestId {
        self.next_request_id += 1;
        self.next_request_id
    }

    pub(crate) fn set_error(&mut self, error: Option<UserError>) {
        self.error = error;
        self.mark_dirty();
    }

    pub(crate) fn begin_lookup(&mut self, request_id: RequestId) {
        self.lookup = LookupState::Pending { request_id };
        self.selection.reset();
        self.error = None;
        self.mark_dirty();
    }

    pub(crate) fn finish_lookup(&mut self, lookup: LookupState) {
        self.lookup = lookup;
        self.selection.reset();
        self.mark_dirty();
    }

    pub(crate) fn selection_mut(&mut self) -> &mut SelectionState {
        self.mark_dirty();
        &mut self.selection
    }

    pub(crate) fn set_download(&mut self, phase: DownloadPhase) {
        self.download = phase;
        self.mark_dirty();
    }

    pub(crate) fn set_progress(&mut self, progress: Option<ProgressDisplay>) {
        self.progress = progress;
        self.mark_dirty();
    }

    pub(crate) fn progress_mut(&mut self) -> &mut ProgressDisplay {
        self.dirty = true;
        self.progress.get_or_insert_with(ProgressDisplay::preparing)
    }

    pub(crate) fn leave_prompt_shown(&self) -> bool {
        self.leave_prompt
    }

    pub(crate) fn set_leave_prompt(&mut self, shown: bool) {
        self.leave_prompt = shown;
        self.mark_dirty();
    }

    /// Drops the download UI; returns the job whose poller must be cancelled.
    pub(crate) fn tear_down_download(&mut self) -> Option<JobId> {
        let polled = self.download.polling_job().cloned();
        if self.download != DownloadPhase::Idle || self.progress.is_some() {
            self.download = DownloadPhase::Idle;
            self.progress = None;
            self.mark_dirty();
        }
        polled
    }
}
