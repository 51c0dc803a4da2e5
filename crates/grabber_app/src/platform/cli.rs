use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use grabber_core::MediaKind;

use super::config::CatalogSource;

/// Fetch video metadata from a grabber backend and download it in a chosen
/// quality and container.
#[derive(Debug, Parser)]
#[command(name = "grabber", version, about)]
pub struct Cli {
    /// Video page URL to analyze.
    pub url: String,

    /// Video or audio-only output; prompted for when omitted.
    #[arg(long, value_enum)]
    pub kind: Option<KindArg>,

    /// Quality selector token or 1-based position in the quality list.
    #[arg(long)]
    pub quality: Option<String>,

    /// Container file extension, e.g. mp4 or mp3.
    #[arg(long)]
    pub container: Option<String>,

    /// Print metadata and available choices, then exit.
    #[arg(long)]
    pub list: bool,

    /// RON configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overriding the configuration file.
    #[arg(long)]
    pub backend: Option<String>,

    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    #[arg(long, value_enum)]
    pub catalog: Option<CatalogSource>,

    /// Also write logs to this file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Video,
    Audio,
}

impl From<KindArg> for MediaKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Video => MediaKind::Video,
            KindArg::Audio => MediaKind::Audio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_wizard_flags() {
        let cli = Cli::try_parse_from([
            "grabber",
            "https://example.com/v",
            "--kind",
            "audio",
            "--quality",
            "2",
            "--container",
            "flac",
            "--catalog",
            "metadata",
        ])
        .unwrap();
        assert_eq!(cli.kind, Some(KindArg::Audio));
        assert_eq!(cli.quality.as_deref(), Some("2"));
        assert_eq!(cli.container.as_deref(), Some("flac"));
        assert_eq!(cli.catalog, Some(CatalogSource::Metadata));
        assert!(!cli.list);
    }

    #[test]
    fn url_is_required() {
        assert!(Cli::try_parse_from(["grabber"]).is_err());
    }
}
