use std::sync::{Arc, Mutex};
use std::time::Duration;

use fitcalc_core::{StreamMessage, SubmitForm};
use fitcalc_stream::{
    EngineEvent, EngineHandle, EventSink, EventStreamer, FailureKind, ReqwestStreamer,
    StreamSettings,
};
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BODY: &str = concat!(
    r#"{"type":"progress","current":1,"total":2,"item":"Hull"}"#,
    "\n",
    r#"{"type":"progress","current":2,"total":2,"item":"Module"}"#,
    "\n",
    r#"{"type":"done","parsed":{"Low Slots":[]},"totals":{"volume":5,"subtotal_jita":100,"subtotal_gsf":120,"min_price":100,"markup_pct":10,"marked_up_price":110},"buy_lists":{"JITA":[],"C-J":[]}}"#,
);

#[derive(Default)]
struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn settings(server: &MockServer) -> StreamSettings {
    StreamSettings {
        base_url: server.uri(),
        ..StreamSettings::default()
    }
}

fn form() -> SubmitForm {
    SubmitForm {
        fitting: "[Rifter, test]\nGyrostabilizer II".to_string(),
        include_hull: true,
    }
}

fn kinds(events: &[EngineEvent]) -> Vec<String> {
    events
        .iter()
        .map(|event| match event {
            EngineEvent::Opened { .. } => "opened".to_string(),
            EngineEvent::Message { message, .. } => message.kind().to_string(),
            EngineEvent::Malformed { .. } => "malformed".to_string(),
            EngineEvent::Finished { .. } => "finished".to_string(),
        })
        .collect()
}

#[tokio::test]
async fn streamer_posts_form_and_emits_messages_in_order() {
    engine_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stream"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("fitting=%5BRifter%2C+test%5D"))
        .and(body_string_contains("include_hull=on"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(BODY, "application/x-ndjson"))
        .expect(1)
        .mount(&server)
        .await;

    let streamer = ReqwestStreamer::new(settings(&server));
    let sink = TestSink::new();
    let summary = streamer
        .stream(4, &form(), &sink, &CancellationToken::new())
        .await
        .expect("stream ok");

    assert_eq!(summary.lines, 3);
    assert_eq!(summary.malformed, 0);
    assert_eq!(summary.bytes, BODY.len() as u64);

    let events = sink.take();
    // The final message has no trailing newline and still arrives exactly once.
    assert_eq!(kinds(&events), vec!["opened", "progress", "progress", "done"]);
    assert!(events.iter().all(|event| event.generation() == 4));
}

#[tokio::test]
async fn unchecked_hull_is_omitted_from_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&server)
        .await;

    let streamer = ReqwestStreamer::new(settings(&server));
    let form = SubmitForm {
        include_hull: false,
        ..form()
    };
    streamer
        .stream(1, &form, &TestSink::new(), &CancellationToken::new())
        .await
        .expect("stream ok");

    let requests = server.received_requests().await.expect("recording enabled");
    let body = String::from_utf8_lossy(&requests[0].body).into_owned();
    assert!(body.starts_with("fitting="));
    assert!(!body.contains("include_hull"));
}

#[tokio::test]
async fn malformed_line_is_skipped_and_stream_continues() {
    let server = MockServer::start().await;
    let body = format!(
        "{}\nnot json at all\n{}\n",
        r#"{"type":"progress","current":1,"total":2,"item":"Hull"}"#,
        r#"{"type":"error","message":"price lookup failed"}"#
    );
    Mock::given(method("POST"))
        .and(path("/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let streamer = ReqwestStreamer::new(settings(&server));
    let sink = TestSink::new();
    let summary = streamer
        .stream(1, &form(), &sink, &CancellationToken::new())
        .await
        .expect("stream ok");

    assert_eq!(summary.lines, 3);
    assert_eq!(summary.malformed, 1);
    let events = sink.take();
    assert_eq!(kinds(&events), vec!["opened", "progress", "malformed", "error"]);
}

#[tokio::test]
async fn streamer_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stream"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let streamer = ReqwestStreamer::new(settings(&server));
    let sink = TestSink::new();
    let err = streamer
        .stream(1, &form(), &sink, &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
    assert!(sink.take().is_empty());
}

#[tokio::test]
async fn invalid_base_url_is_reported() {
    let streamer = ReqwestStreamer::new(StreamSettings {
        base_url: "not a url".to_string(),
        ..StreamSettings::default()
    });
    let err = streamer
        .stream(1, &form(), &TestSink::new(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}

#[tokio::test]
async fn cancelled_token_stops_before_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stream"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_string(BODY),
        )
        .mount(&server)
        .await;

    let streamer = ReqwestStreamer::new(settings(&server));
    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
    });

    let sink = TestSink::new();
    let err = streamer.stream(1, &form(), &sink, &token).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Cancelled);
    assert!(sink.take().is_empty());
}

fn drain_until_finished(engine: &EngineHandle, generation: u64) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = engine.recv_timeout(Duration::from_secs(5)) {
        let finished =
            matches!(event, EngineEvent::Finished { generation: g, .. } if g == generation);
        events.push(event);
        if finished {
            break;
        }
    }
    events
}

#[test]
fn engine_handle_runs_stream_to_completion() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let server = runtime.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/stream"))
            .respond_with(ResponseTemplate::new(200).set_body_string(BODY))
            .mount(&server)
            .await;
        server
    });

    let engine = EngineHandle::new(settings(&server)).expect("engine");
    engine.start(9, form());
    let events = drain_until_finished(&engine, 9);

    assert_eq!(
        kinds(&events),
        vec!["opened", "progress", "progress", "done", "finished"]
    );
    match events.last() {
        Some(EngineEvent::Finished { result: Ok(summary), .. }) => assert_eq!(summary.lines, 3),
        other => panic!("unexpected {other:?}"),
    }
    let done = events.iter().find_map(|event| match event {
        EngineEvent::Message {
            message: StreamMessage::Done(payload),
            ..
        } => Some(payload.clone()),
        _ => None,
    });
    assert_eq!(done.map(|p| p.totals.markup_pct), Some(10.0));
}

#[test]
fn engine_handle_cancels_superseded_stream() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let server = runtime.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/stream"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(10))
                    .set_body_string(BODY),
            )
            .mount(&server)
            .await;
        server
    });

    let engine = EngineHandle::new(settings(&server)).expect("engine");
    engine.start(1, form());
    std::thread::sleep(Duration::from_millis(100));
    engine.cancel(1);

    let events = drain_until_finished(&engine, 1);
    match events.as_slice() {
        [EngineEvent::Finished {
            generation: 1,
            result: Err(err),
        }] => assert_eq!(err.kind, FailureKind::Cancelled),
        other => panic!("unexpected {other:?}"),
    }
}
