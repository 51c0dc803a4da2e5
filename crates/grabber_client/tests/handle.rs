use std::time::{Duration, Instant};

use grabber_client::{
    BackendSettings, ClientEvent, ClientHandle, FailureKind, PollEvent, StartRequest,
    StatusOutcome,
};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings_for(server: &MockServer) -> BackendSettings {
    BackendSettings {
        poll_interval: Duration::from_millis(10),
        ..BackendSettings::parse(&server.uri()).unwrap()
    }
}

/// Collects events until `done` says stop or the deadline passes.
fn collect_until(
    handle: &ClientHandle,
    deadline: Duration,
    mut done: impl FnMut(&ClientEvent) -> bool,
) -> Vec<ClientEvent> {
    let start = Instant::now();
    let mut events = Vec::new();
    while start.elapsed() < deadline {
        if let Some(event) = handle.recv_timeout(Duration::from_millis(20)) {
            let stop = done(&event);
            events.push(event);
            if stop {
                break;
            }
        }
    }
    events
}

#[tokio::test(flavor = "multi_thread")]
async fn lookup_result_comes_back_as_event() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/get_video_info"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "invalid url"})))
        .mount(&server)
        .await;

    let handle = ClientHandle::new(settings_for(&server)).unwrap();
    handle.lookup_metadata(3, "bogus");
    let events = collect_until(&handle, Duration::from_secs(5), |_| true);

    match events.as_slice() {
        [ClientEvent::MetadataLoaded {
            request_id: 3,
            result: Err(err),
        }] => {
            assert_eq!(err.kind, FailureKind::Rejected);
            assert_eq!(err.message, "invalid url");
        }
        other => panic!("unexpected events {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn start_then_poll_to_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/download_video"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"download_id": "42"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/download_progress/42"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "downloading", "progress": 30.0})),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/download_progress/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "finished"})))
        .mount(&server)
        .await;

    let handle = ClientHandle::new(settings_for(&server)).unwrap();
    handle.start_download(
        5,
        StartRequest {
            url: "https://example.com/v".to_string(),
            format_id: "bestaudio".to_string(),
            audio_only: true,
            file_format: Some("mp3".to_string()),
        },
    );
    let events = collect_until(&handle, Duration::from_secs(5), |_| true);
    assert_eq!(
        events,
        vec![ClientEvent::DownloadStarted {
            request_id: 5,
            result: Ok("42".to_string()),
        }]
    );

    handle.start_polling("42");
    let events = collect_until(&handle, Duration::from_secs(5), |event| {
        matches!(
            event,
            ClientEvent::Poll(PollEvent::Status {
                outcome: StatusOutcome::Finished,
                ..
            })
        )
    });
    let outcomes: Vec<_> = events
        .into_iter()
        .filter_map(|event| match event {
            ClientEvent::Poll(PollEvent::Status { outcome, .. }) => Some(outcome),
            _ => None,
        })
        .collect();
    assert_eq!(
        outcomes,
        vec![
            StatusOutcome::Downloading {
                percent: Some(30.0)
            },
            StatusOutcome::Finished,
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn starting_a_new_poller_replaces_the_old_one() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download_progress/old"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "downloading"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/download_progress/new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "downloading"})))
        .mount(&server)
        .await;

    let handle = ClientHandle::new(settings_for(&server)).unwrap();
    handle.start_polling("old");
    collect_until(&handle, Duration::from_secs(5), |_| true);
    handle.start_polling("new");
    std::thread::sleep(Duration::from_millis(50));
    while handle.try_recv().is_some() {}

    let events = collect_until(&handle, Duration::from_millis(200), |_| false);
    assert!(!events.is_empty());
    assert!(events.iter().all(|event| matches!(
        event,
        ClientEvent::Poll(PollEvent::Status { job_id, .. }) if job_id == "new"
    )));

    handle.cancel_polling("new");
    std::thread::sleep(Duration::from_millis(50));
    while handle.try_recv().is_some() {}
    let events = collect_until(&handle, Duration::from_millis(100), |_| false);
    assert!(events.is_empty());
}
