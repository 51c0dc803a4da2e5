//! Grabber core: pure selection/download state machine and view-model helpers.
mod catalog;
pub mod display;
mod download;
mod effect;
mod metadata;
mod msg;
mod selection;
mod state;
mod update;
mod view_model;

pub use catalog::{
    container_catalog, derived_quality_catalog, quality_catalog, static_quality_catalog,
    CatalogMode, ContainerOption, MediaKind, QualityOption,
};
pub use download::{DownloadPhase, JobId, JobUpdate, RequestId};
pub use effect::Effect;
pub use metadata::{FormatKind, MediaFormat, VideoMetadata};
pub use msg::Msg;
pub use selection::{DownloadRequest, SelectionState, SelectionStep, ValidationError, WizardStep};
pub use state::{AppState, CoreSettings, ErrorKind, LookupState, UserError, DEFAULT_FILE_ROUTE};
pub use update::update;
pub use view_model::{AppViewModel, ChoiceView, MetadataView, ProgressView};
