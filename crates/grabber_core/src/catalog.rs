use std::fmt;

use crate::display::format_file_size;
use crate::metadata::{FormatKind, MediaFormat};

/// Top-level choice between video output and audio-only output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    pub const ALL: [MediaKind; 2] = [MediaKind::Video, MediaKind::Audio];

    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Video => "Video",
            MediaKind::Audio => "Audio",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Video => write!(f, "video"),
            MediaKind::Audio => write!(f, "audio"),
        }
    }
}

/// Where quality options come from once a media kind is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogMode {
    /// Fixed height/bitrate bounded selectors.
    #[default]
    Static,
    /// Concrete formats reported by the metadata lookup.
    FromMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityOption {
    pub label: String,
    /// Opaque selector handed to the backend unchanged.
    pub selector: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerOption {
    pub label: String,
    pub extension: String,
    pub description: Option<String>,
}

const VIDEO_TIERS: [(u32, &str); 8] = [
    (2160, "4K (2160p)"),
    (1440, "2K (1440p)"),
    (1080, "Full HD (1080p)"),
    (720, "HD (720p)"),
    (480, "SD (480p)"),
    (360, "Low (360p)"),
    (240, "Very Low (240p)"),
    (144, "Mobile (144p)"),
];

const AUDIO_BITRATES: [u32; 5] = [320, 256, 192, 128, 96];

const VIDEO_CONTAINERS: [(&str, &str, &str); 5] = [
    ("mp4", "MP4", "Most compatible"),
    ("webm", "WebM", "High quality"),
    ("mkv", "MKV", "Best quality"),
    ("3gp", "3GP", "Mobile friendly"),
    ("avi", "AVI", "Classic format"),
];

const AUDIO_CONTAINERS: [(&str, &str, &str); 5] = [
    ("mp3", "MP3", "Most compatible"),
    ("m4a", "M4A", "High quality"),
    ("ogg", "OGG", "Open source"),
    ("wav", "WAV", "Uncompressed"),
    ("flac", "FLAC", "Lossless"),
];

/// Fixed quality tiers, best first.
pub fn static_quality_catalog(kind: MediaKind) -> Vec<QualityOption> {
    match kind {
        MediaKind::Video => VIDEO_TIERS
            .iter()
            .map(|(height, label)| QualityOption {
                label: (*label).to_string(),
                selector: format!("best[height<={height}]"),
            })
            .collect(),
        MediaKind::Audio => std::iter::once(QualityOption {
            label: "Best Quality".to_string(),
            selector: "bestaudio".to_string(),
        })
        .chain(AUDIO_BITRATES.iter().map(|abr| QualityOption {
            label: format!("{abr} kbps"),
            selector: format!("bestaudio[abr<={abr}]"),
        }))
        .collect(),
    }
}

/// Quality options built from the formats a metadata lookup returned.
///
/// Keeps the backend's order; the selector is the backend's `format_id`.
pub fn derived_quality_catalog(kind: MediaKind, formats: &[MediaFormat]) -> Vec<QualityOption> {
    let wanted = match kind {
        MediaKind::Video => FormatKind::Video,
        MediaKind::Audio => FormatKind::Audio,
    };
    formats
        .iter()
        .filter(|format| format.kind == wanted)
        .map(|format| QualityOption {
            label: derived_label(format),
            selector: format.format_id.clone(),
        })
        .collect()
}

fn derived_label(format: &MediaFormat) -> String {
    let base = format!("{} - {}", format.resolution, format.ext.to_uppercase());
    match format.filesize.filter(|size| *size > 0) {
        Some(size) => format!("{base} ({})", format_file_size(size)),
        None => base,
    }
}

pub fn container_catalog(kind: MediaKind) -> Vec<ContainerOption> {
    let table = match kind {
        MediaKind::Video => &VIDEO_CONTAINERS,
        MediaKind::Audio => &AUDIO_CONTAINERS,
    };
    table
        .iter()
        .map(|(extension, label, description)| ContainerOption {
            label: (*label).to_string(),
            extension: (*extension).to_string(),
            description: Some((*description).to_string()),
        })
        .collect()
}

pub fn quality_catalog(
    mode: CatalogMode,
    kind: MediaKind,
    formats: &[MediaFormat],
) -> Vec<QualityOption> {
    match mode {
        CatalogMode::Static => static_quality_catalog(kind),
        CatalogMode::FromMetadata => derived_quality_catalog(kind, formats),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(kind: FormatKind, id: &str, resolution: &str, ext: &str, size: Option<u64>) -> MediaFormat {
        MediaFormat {
            kind,
            format_id: id.to_string(),
            resolution: resolution.to_string(),
            ext: ext.to_string(),
            filesize: size,
        }
    }

    #[test]
    fn video_tiers_run_from_2160_down_to_144() {
        let selectors: Vec<_> = static_quality_catalog(MediaKind::Video)
            .into_iter()
            .map(|option| option.selector)
            .collect();
        assert_eq!(selectors.len(), 8);
        assert_eq!(selectors.first().map(String::as_str), Some("best[height<=2160]"));
        assert_eq!(selectors.last().map(String::as_str), Some("best[height<=144]"));
    }

    #[test]
    fn audio_tiers_start_with_best() {
        let catalog = static_quality_catalog(MediaKind::Audio);
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog[0].selector, "bestaudio");
        assert_eq!(catalog[0].label, "Best Quality");
        assert_eq!(catalog[5].selector, "bestaudio[abr<=96]");
        assert_eq!(catalog[5].label, "96 kbps");
    }

    #[test]
    fn derived_catalog_filters_by_kind_and_labels_sizes() {
        let formats = vec![
            format(FormatKind::Video, "137", "1920x1080", "mp4", Some(5 * 1024 * 1024)),
            format(FormatKind::Audio, "140", "audio only", "m4a", None),
            format(FormatKind::Video, "18", "640x360", "mp4", Some(0)),
        ];

        let video = derived_quality_catalog(MediaKind::Video, &formats);
        assert_eq!(video.len(), 2);
        assert_eq!(video[0].selector, "137");
        assert_eq!(video[0].label, "1920x1080 - MP4 (5.0 MB)");
        assert_eq!(video[1].label, "640x360 - MP4");

        let audio = derived_quality_catalog(MediaKind::Audio, &formats);
        assert_eq!(audio.len(), 1);
        assert_eq!(audio[0].label, "audio only - M4A");
    }

    #[test]
    fn containers_differ_per_kind() {
        let video: Vec<_> = container_catalog(MediaKind::Video)
            .into_iter()
            .map(|c| c.extension)
            .collect();
        let audio: Vec<_> = container_catalog(MediaKind::Audio)
            .into_iter()
            .map(|c| c.extension)
            .collect();
        assert_eq!(video, ["mp4", "webm", "mkv", "3gp", "avi"]);
        assert_eq!(audio, ["mp3", "m4a", "ogg", "wav", "flac"]);
    }
}
