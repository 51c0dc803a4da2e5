//! Grabber client: backend HTTP calls, the status poller and the runtime-owning client handle.
mod backend;
mod engine;
mod poller;
mod settings;
mod types;

pub use backend::{Backend, ReqwestBackend};
pub use engine::{ClientEvent, ClientHandle, RequestId};
pub use poller::{spawn_poller, PollEvent, PollSink, PollerExit, PollerHandle};
pub use settings::{BackendSettings, Routes};
pub use types::{
    ClientError, FailureKind, FormatEntry, MetadataResponse, StartRequest, StatusOutcome,
    StatusReport, WireFormatKind,
};
