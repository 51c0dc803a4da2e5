use std::fmt;

use thiserror::Error;

use crate::MediaKind;

/// Where the wizard currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionStep {
    #[default]
    Empty,
    MediaKindChosen,
    QualityChosen,
    ReadyToSubmit,
}

/// A wizard step the user still has to complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    MediaKind,
    Quality,
    ContainerFormat,
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WizardStep::MediaKind => write!(f, "a format (Video or Audio)"),
            WizardStep::Quality => write!(f, "a quality option"),
            WizardStep::ContainerFormat => write!(f, "a file format"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a video URL")]
    EmptyUrl,
    #[error("Please select {}", join_steps(.missing))]
    Incomplete { missing: Vec<WizardStep> },
}

fn join_steps(steps: &[WizardStep]) -> String {
    let names: Vec<String> = steps.iter().map(ToString::to_string).collect();
    match names.as_slice() {
        [] => String::new(),
        [only] => only.clone(),
        [head @ .., last] => format!("{} and {}", head.join(", "), last),
    }
}

/// Payload for the download-start request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub format_selector: String,
    pub audio_only: bool,
    pub container_format: String,
}

/// The user's choices in the three-step wizard.
///
/// Downstream fields are only ever set while their upstream field is set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionState {
    media_kind: Option<MediaKind>,
    quality_id: Option<String>,
    container_format: Option<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn media_kind(&self) -> Option<MediaKind> {
        self.media_kind
    }

    pub fn quality_id(&self) -> Option<&str> {
        self.quality_id.as_deref()
    }

    pub fn container_format(&self) -> Option<&str> {
        self.container_format.as_deref()
    }

    pub fn step(&self) -> SelectionStep {
        match (
            self.media_kind.is_some(),
            self.quality_id.is_some(),
            self.container_format.is_some(),
        ) {
            (true, true, true) => SelectionStep::ReadyToSubmit,
            (true, true, false) => SelectionStep::QualityChosen,
            (true, false, _) => SelectionStep::MediaKindChosen,
            (false, _, _) => SelectionStep::Empty,
        }
    }

    pub fn can_submit(&self) -> bool {
        self.step() == SelectionStep::ReadyToSubmit
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Always applies; discards any quality and container already chosen.
    pub fn choose_media_kind(&mut self, kind: MediaKind) {
        self.media_kind = Some(kind);
        self.quality_id = None;
        self.container_format = None;
    }

    /// Returns `false` and leaves the state untouched when no media kind is set.
    pub fn choose_quality(&mut self, token: impl Into<String>) -> bool {
        if self.media_kind.is_none() {
            return false;
        }
        self.quality_id = Some(token.into());
        self.container_format = None;
        true
    }

    /// Returns `false` and leaves the state untouched when no quality is set.
    pub fn choose_container_format(&mut self, extension: impl Into<String>) -> bool {
        if self.quality_id.is_none() {
            return false;
        }
        self.container_format = Some(extension.into());
        true
    }

    pub fn missing_steps(&self) -> Vec<WizardStep> {
        let mut missing = Vec::new();
        if self.media_kind.is_none() {
            missing.push(WizardStep::MediaKind);
        }
        if self.quality_id.is_none() {
            missing.push(WizardStep::Quality);
        }
        if self.container_format.is_none() {
            missing.push(WizardStep::ContainerFormat);
        }
        missing
    }

    /// Builds the download payload. Missing steps are reported before an
    /// empty URL.
    pub fn build_request(&self, url: &str) -> Result<DownloadRequest, ValidationError> {
        let (Some(kind), Some(quality), Some(container)) =
            (&self.media_kind, &self.quality_id, &self.container_format)
        else {
            return Err(ValidationError::Incomplete {
                missing: self.missing_steps(),
            });
        };
        let url = url.trim();
        if url.is_empty() {
            return Err(ValidationError::EmptyUrl);
        }
        Ok(DownloadRequest {
            url: url.to_string(),
            format_selector: quality.clone(),
            audio_only: *kind == MediaKind::Audio,
            container_format: container.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_before_media_kind_is_ignored() {
        let mut selection = SelectionState::new();
        assert!(!selection.choose_quality("best[height<=720]"));
        assert_eq!(selection.step(), SelectionStep::Empty);
    }

    #[test]
    fn container_before_quality_is_ignored() {
        let mut selection = SelectionState::new();
        selection.choose_media_kind(MediaKind::Audio);
        assert!(!selection.choose_container_format("mp3"));
        assert_eq!(selection.step(), SelectionStep::MediaKindChosen);
    }

    #[test]
    fn new_quality_clears_container() {
        let mut selection = SelectionState::new();
        selection.choose_media_kind(MediaKind::Video);
        selection.choose_quality("best[height<=720]");
        selection.choose_container_format("mkv");
        assert!(selection.can_submit());

        selection.choose_quality("best[height<=480]");
        assert_eq!(selection.step(), SelectionStep::QualityChosen);
        assert_eq!(selection.container_format(), None);
    }

    #[test]
    fn incomplete_message_names_every_missing_step() {
        let err = SelectionState::new()
            .build_request("https://example.com/v")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please select a format (Video or Audio), a quality option and a file format"
        );

        let mut selection = SelectionState::new();
        selection.choose_media_kind(MediaKind::Video);
        selection.choose_quality("best[height<=720]");
        let err = selection.build_request("https://example.com/v").unwrap_err();
        assert_eq!(err.to_string(), "Please select a file format");
    }

    #[test]
    fn missing_steps_are_reported_before_empty_url() {
        let err = SelectionState::new().build_request("   ").unwrap_err();
        assert_eq!(
            err,
            ValidationError::Incomplete {
                missing: vec![
                    WizardStep::MediaKind,
                    WizardStep::Quality,
                    WizardStep::ContainerFormat
                ],
            }
        );

        let mut selection = SelectionState::new();
        selection.choose_media_kind(MediaKind::Video);
        selection.choose_quality("best");
        selection.choose_container_format("mp4");
        assert_eq!(
            selection.build_request("   ").unwrap_err(),
            ValidationError::EmptyUrl
        );
    }

    #[test]
    fn audio_request_sets_audio_only() {
        let mut selection = SelectionState::new();
        selection.choose_media_kind(MediaKind::Audio);
        selection.choose_quality("bestaudio");
        selection.choose_container_format("flac");

        let request = selection.build_request(" https://example.com/v ").unwrap();
        assert_eq!(
            request,
            DownloadRequest {
                url: "https://example.com/v".to_string(),
                format_selector: "bestaudio".to_string(),
                audio_only: true,
                container_format: "flac".to_string(),
            }
        );
    }
}
