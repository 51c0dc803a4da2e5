use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ValueEnum;
use grabber_client::{BackendSettings, Routes};
use grabber_core::{CatalogMode, CoreSettings};
use serde::{Deserialize, Serialize};

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILENAME: &str = "grabber.ron";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum CatalogSource {
    /// Fixed quality tiers.
    #[default]
    Static,
    /// Formats reported by the backend for the analyzed URL.
    Metadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrabberConfig {
    pub backend_url: String,
    pub poll_interval_ms: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub catalog: CatalogSource,
    pub routes: Routes,
    pub log_file: Option<PathBuf>,
    /// File the values were read from; `None` for built-in defaults.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for GrabberConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:5000".to_string(),
            poll_interval_ms: 1000,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            catalog: CatalogSource::Static,
            routes: Routes::default(),
            log_file: None,
            source: None,
        }
    }
}

impl GrabberConfig {
    /// An explicit path must exist; the default file is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::read(path),
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILENAME);
                if path.is_file() {
                    Self::read(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let mut config: GrabberConfig = ron::from_str(&content)
            .with_context(|| format!("Failed to parse config from {:?}", path))?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn with_overrides(
        mut self,
        backend: Option<&str>,
        poll_interval_ms: Option<u64>,
        catalog: Option<CatalogSource>,
        log_file: Option<&Path>,
    ) -> Self {
        if let Some(backend) = backend {
            self.backend_url = backend.to_string();
        }
        if let Some(ms) = poll_interval_ms {
            self.poll_interval_ms = ms;
        }
        if let Some(catalog) = catalog {
            self.catalog = catalog;
        }
        if let Some(path) = log_file {
            self.log_file = Some(path.to_path_buf());
        }
        self
    }

    pub fn backend_settings(&self) -> Result<BackendSettings> {
        let mut settings = BackendSettings::parse(&self.backend_url)
            .with_context(|| format!("Invalid backend url {:?}", self.backend_url))?;
        settings.connect_timeout = Duration::from_secs(self.connect_timeout_secs);
        settings.request_timeout = Duration::from_secs(self.request_timeout_secs);
        settings.poll_interval = Duration::from_millis(self.poll_interval_ms.max(1));
        settings.routes = self.routes.clone();
        Ok(settings)
    }

    pub fn core_settings(&self) -> CoreSettings {
        CoreSettings {
            catalog_mode: match self.catalog {
                CatalogSource::Static => CatalogMode::Static,
                CatalogSource::Metadata => CatalogMode::FromMetadata,
            },
            file_route: self.routes.file.clone(),
        }
    }
}
