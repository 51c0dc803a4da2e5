use crate::{DownloadPhase, UserError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataView {
    pub title: String,
    pub uploader: String,
    pub duration: String,
    pub views: String,
    pub thumbnail_url: Option<String>,
}

/// One selectable control in a wizard step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceView {
    pub label: String,
    /// Value to send back in the matching `Msg`.
    pub value: String,
    pub detail: Option<String>,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressView {
    pub percent: f64,
    pub status_text: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub url_input: String,
    pub analyze_enabled: bool,
    pub loading: bool,
    pub metadata: Option<MetadataView>,
    pub selection_visible: bool,
    pub media_kinds: Vec<ChoiceView>,
    /// `None` while the quality step is hidden.
    pub quality_options: Option<Vec<ChoiceView>>,
    /// `None` while the container step is hidden.
    pub container_options: Option<Vec<ChoiceView>>,
    pub submit_enabled: bool,
    pub phase: DownloadPhase,
    pub progress: Option<ProgressView>,
    pub completion_link: Option<String>,
    pub error: Option<UserError>,
    pub leave_prompt: Option<String>,
    pub dirty: bool,
}
