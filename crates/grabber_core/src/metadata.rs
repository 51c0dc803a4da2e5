/// Which group a backend-reported format belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    Video,
    Audio,
}

/// One concrete format the backend can deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFormat {
    pub kind: FormatKind,
    pub format_id: String,
    pub resolution: String,
    pub ext: String,
    pub filesize: Option<u64>,
}

/// Result of a successful metadata lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VideoMetadata {
    pub title: String,
    pub uploader: Option<String>,
    pub duration_seconds: Option<u64>,
    pub view_count: Option<u64>,
    pub thumbnail_url: Option<String>,
    pub formats: Vec<MediaFormat>,
}
