use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use grabber_logging::{grabber_debug, grabber_info};

use crate::poller::{spawn_poller, PollEvent, PollSink, PollerHandle};
use crate::{
    Backend, BackendSettings, ClientError, FailureKind, MetadataResponse, ReqwestBackend,
    StartRequest,
};

pub type RequestId = u64;

enum ClientCommand {
    LookupMetadata { request_id: RequestId, url: String },
    StartDownload {
        request_id: RequestId,
        request: StartRequest,
    },
    StartPolling { job_id: String },
    CancelPolling { job_id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    MetadataLoaded {
        request_id: RequestId,
        result: Result<MetadataResponse, ClientError>,
    },
    DownloadStarted {
        request_id: RequestId,
        result: Result<String, ClientError>,
    },
    Poll(PollEvent),
}

struct ChannelPollSink {
    tx: mpsc::Sender<ClientEvent>,
}

impl PollSink for ChannelPollSink {
    fn emit(&self, event: PollEvent) {
        let _ = self.tx.send(ClientEvent::Poll(event));
    }
}

/// Owns a tokio runtime on a background thread and runs backend calls on it.
///
/// At most one poller is alive; starting another cancels the previous one
/// first. Dropping the handle cancels the active poller and stops the runtime.
pub struct ClientHandle {
    cmd_tx: mpsc::Sender<ClientCommand>,
    event_rx: mpsc::Receiver<ClientEvent>,
}

impl ClientHandle {
    pub fn new(settings: BackendSettings) -> Result<Self, ClientError> {
        let poll_interval = settings.poll_interval;
        let backend = Arc::new(ReqwestBackend::new(settings)?);
        Self::with_backend(backend, poll_interval)
    }

    pub fn with_backend(
        backend: Arc<dyn Backend>,
        poll_interval: Duration,
    ) -> Result<Self, ClientError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(|err| ClientError::new(FailureKind::Runtime, err.to_string()))?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let _guard = runtime.enter();
            let mut active: Option<PollerHandle> = None;
            while let Ok(command) = cmd_rx.recv() {
                handle_command(
                    &runtime,
                    backend.clone(),
                    poll_interval,
                    &mut active,
                    command,
                    event_tx.clone(),
                );
            }
            if let Some(poller) = active.take() {
                poller.cancel();
            }
            grabber_debug!("Client command loop stopped");
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn lookup_metadata(&self, request_id: RequestId, url: impl Into<String>) {
        let _ = self.cmd_tx.send(ClientCommand::LookupMetadata {
            request_id,
            url: url.into(),
        });
    }

    pub fn start_download(&self, request_id: RequestId, request: StartRequest) {
        let _ = self
            .cmd_tx
            .send(ClientCommand::StartDownload { request_id, request });
    }

    pub fn start_polling(&self, job_id: impl Into<String>) {
        let _ = self.cmd_tx.send(ClientCommand::StartPolling {
            job_id: job_id.into(),
        });
    }

    pub fn cancel_polling(&self, job_id: impl Into<String>) {
        let _ = self.cmd_tx.send(ClientCommand::CancelPolling {
            job_id: job_id.into(),
        });
    }

    pub fn try_recv(&self) -> Option<ClientEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<ClientEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

fn handle_command(
    runtime: &tokio::runtime::Runtime,
    backend: Arc<dyn Backend>,
    poll_interval: Duration,
    active: &mut Option<PollerHandle>,
    command: ClientCommand,
    event_tx: mpsc::Sender<ClientEvent>,
) {
    match command {
        ClientCommand::LookupMetadata { request_id, url } => {
            runtime.spawn(async move {
                let result = backend.lookup_metadata(&url).await;
                let _ = event_tx.send(ClientEvent::MetadataLoaded { request_id, result });
            });
        }
        ClientCommand::StartDownload {
            request_id,
            request,
        } => {
            runtime.spawn(async move {
                let result = backend.start_download(&request).await;
                let _ = event_tx.send(ClientEvent::DownloadStarted { request_id, result });
            });
        }
        ClientCommand::StartPolling { job_id } => {
            if let Some(previous) = active.take() {
                grabber_info!(
                    "Replacing poller job={} with job={}",
                    previous.job_id(),
                    job_id
                );
                previous.cancel();
            }
            let sink = Arc::new(ChannelPollSink { tx: event_tx });
            *active = Some(spawn_poller(backend, job_id, poll_interval, sink));
        }
        ClientCommand::CancelPolling { job_id } => {
            match active.take() {
                Some(poller) if poller.job_id() == job_id => {
                    grabber_debug!("Cancelling poller job={}", job_id);
                    poller.cancel();
                }
                other => {
                    grabber_debug!("No active poller for job={}", job_id);
                    *active = other;
                }
            }
        }
    }
}
