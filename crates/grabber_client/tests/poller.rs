use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use grabber_client::{
    spawn_poller, Backend, BackendSettings, ClientError, MetadataResponse, PollEvent, PollSink,
    PollerExit, ReqwestBackend, StartRequest, StatusOutcome, StatusReport,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TICK: Duration = Duration::from_millis(10);

#[derive(Default)]
struct TestSink {
    events: Mutex<Vec<PollEvent>>,
}

impl TestSink {
    fn take(&self) -> Vec<PollEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl PollSink for TestSink {
    fn emit(&self, event: PollEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn backend_for(server: &MockServer) -> Arc<dyn Backend> {
    let settings = BackendSettings::parse(&server.uri()).unwrap();
    Arc::new(ReqwestBackend::new(settings).unwrap())
}

async fn mount_once(server: &MockServer, job: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/download_progress/{job}")))
        .respond_with(response)
        .up_to_n_times(1)
        .mount(server)
        .await;
}

fn status(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

#[tokio::test]
async fn polls_until_finished_and_stops_itself() {
    let server = MockServer::start().await;
    mount_once(&server, "7", status(json!({"status": "downloading", "progress": 10.0}))).await;
    mount_once(&server, "7", status(json!({"status": "downloading", "progress": 55.0}))).await;
    mount_once(&server, "7", status(json!({"status": "finished", "progress": 100.0}))).await;

    let sink = Arc::new(TestSink::default());
    let poller = spawn_poller(backend_for(&server), "7".to_string(), TICK, sink.clone());
    let exit = tokio::time::timeout(Duration::from_secs(5), poller.join())
        .await
        .expect("poller ends");

    assert_eq!(exit, PollerExit::Terminal);
    let outcomes: Vec<_> = sink
        .take()
        .into_iter()
        .map(|event| match event {
            PollEvent::Status { job_id, outcome } => {
                assert_eq!(job_id, "7");
                outcome
            }
            other => panic!("unexpected event {other:?}"),
        })
        .collect();
    assert_eq!(
        outcomes,
        vec![
            StatusOutcome::Downloading {
                percent: Some(10.0)
            },
            StatusOutcome::Downloading {
                percent: Some(55.0)
            },
            StatusOutcome::Finished,
        ]
    );
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn transport_failure_is_retried_on_next_tick() {
    let server = MockServer::start().await;
    mount_once(&server, "8", ResponseTemplate::new(500).set_body_string("oops")).await;
    mount_once(&server, "8", status(json!({"status": "downloading", "progress": 20.0}))).await;
    mount_once(&server, "8", status(json!({"status": "finished"}))).await;

    let sink = Arc::new(TestSink::default());
    let poller = spawn_poller(backend_for(&server), "8".to_string(), TICK, sink.clone());
    let exit = tokio::time::timeout(Duration::from_secs(5), poller.join())
        .await
        .expect("poller ends");

    assert_eq!(exit, PollerExit::Terminal);
    let events = sink.take();
    assert_eq!(events.len(), 3);
    assert!(matches!(events[0], PollEvent::TransientFailure { .. }));
    assert_eq!(
        events[1],
        PollEvent::Status {
            job_id: "8".to_string(),
            outcome: StatusOutcome::Downloading {
                percent: Some(20.0)
            },
        }
    );
    assert!(matches!(
        events[2],
        PollEvent::Status {
            outcome: StatusOutcome::Finished,
            ..
        }
    ));
}

#[tokio::test]
async fn error_status_ends_the_poller() {
    let server = MockServer::start().await;
    mount_once(&server, "9", status(json!({"status": "error", "error": "403 Forbidden"}))).await;

    let sink = Arc::new(TestSink::default());
    let poller = spawn_poller(backend_for(&server), "9".to_string(), TICK, sink.clone());
    let exit = tokio::time::timeout(Duration::from_secs(5), poller.join())
        .await
        .expect("poller ends");

    assert_eq!(exit, PollerExit::Terminal);
    assert_eq!(
        sink.take(),
        vec![PollEvent::Status {
            job_id: "9".to_string(),
            outcome: StatusOutcome::Failed {
                message: "403 Forbidden".to_string()
            },
        }]
    );
}

#[tokio::test]
async fn cancelled_poller_stops_polling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download_progress/10"))
        .respond_with(status(json!({"status": "downloading", "progress": 5.0})))
        .mount(&server)
        .await;

    let sink = Arc::new(TestSink::default());
    let poller = spawn_poller(backend_for(&server), "10".to_string(), TICK, sink.clone());
    tokio::time::sleep(Duration::from_millis(60)).await;
    poller.cancel();
    poller.cancel();
    let exit = tokio::time::timeout(Duration::from_secs(5), poller.join())
        .await
        .expect("poller ends");
    assert_eq!(exit, PollerExit::Cancelled);

    let seen = server.received_requests().await.unwrap().len();
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(server.received_requests().await.unwrap().len(), seen);
}

/// Counts concurrent status calls; answers slowly, finishes on the fourth.
#[derive(Default)]
struct SlowBackend {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

#[async_trait::async_trait]
impl Backend for SlowBackend {
    async fn lookup_metadata(&self, _url: &str) -> Result<MetadataResponse, ClientError> {
        Ok(MetadataResponse::default())
    }

    async fn start_download(&self, _request: &StartRequest) -> Result<String, ClientError> {
        Ok("slow".to_string())
    }

    async fn download_status(&self, _job_id: &str) -> Result<StatusReport, ClientError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(30)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(StatusReport {
            status: Some(if call >= 4 { "finished" } else { "downloading" }.to_string()),
            progress: Some(call as f64 * 25.0),
            error: None,
        })
    }
}

#[tokio::test]
async fn slow_responses_never_overlap() {
    let backend = Arc::new(SlowBackend::default());
    let sink = Arc::new(TestSink::default());
    let poller = spawn_poller(
        backend.clone(),
        "slow".to_string(),
        Duration::from_millis(1),
        sink.clone(),
    );
    let exit = tokio::time::timeout(Duration::from_secs(5), poller.join())
        .await
        .expect("poller ends");

    assert_eq!(exit, PollerExit::Terminal);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 4);
    assert_eq!(backend.max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(sink.take().len(), 4);
}
