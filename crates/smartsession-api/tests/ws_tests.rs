//! End-to-end WebSocket tests against a live listener.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use smartsession_api::{create_router, ApiConfig, AppState};
use smartsession_models::{BoundingBox, GazeDirection, Status, StatusUpdate};
use smartsession_vision::{FaceProvider, Frame};

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// base64 of "hello"; the scripted provider never looks at the bytes.
const FRAME: &str = "aGVsbG8=";

/// Provider returning the same detections for every frame.
struct ScriptedProvider {
    faces: Vec<BoundingBox>,
    eyes: Vec<BoundingBox>,
}

impl ScriptedProvider {
    fn faces(n: usize) -> Self {
        Self {
            faces: vec![BoundingBox::new(100.0, 100.0, 200.0, 200.0); n],
            eyes: Vec::new(),
        }
    }

    /// One face, squinting, head tilted about 18 degrees.
    fn confused_face() -> Self {
        Self {
            faces: vec![BoundingBox::new(100.0, 100.0, 200.0, 200.0)],
            eyes: vec![
                BoundingBox::new(10.0, 10.0, 20.0, 4.0),
                BoundingBox::new(40.0, 20.0, 20.0, 4.0),
            ],
        }
    }
}

impl FaceProvider for ScriptedProvider {
    fn detect_faces(&self, _frame: &Frame) -> Vec<BoundingBox> {
        self.faces.clone()
    }

    fn detect_eyes(&self, _frame: &Frame, _face: &BoundingBox) -> Vec<BoundingBox> {
        self.eyes.clone()
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

fn test_state(provider: ScriptedProvider) -> AppState {
    let mut config = ApiConfig::default();
    config.monitor.confusion_min_duration = Duration::ZERO;
    AppState::with_provider(config, Arc::new(provider))
}

async fn spawn_server(state: AppState) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_router(state, None);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn connect(addr: SocketAddr, path: &str) -> WsClient {
    let (ws, _) = connect_async(format!("ws://{}{}", addr, path)).await.unwrap();
    ws
}

async fn wait_until<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..200 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met in time");
}

async fn wait_for_consumers(state: &AppState, n: usize) {
    wait_until(|| {
        let state = state.clone();
        async move { state.registry.consumer_count().await == n }
    })
    .await;
}

async fn send_frame(ws: &mut WsClient, frame: &str, gaze: &str) {
    let body = serde_json::json!({ "frame": frame, "gaze_direction": gaze });
    ws.send(Message::Text(body.to_string())).await.unwrap();
}

async fn next_status(ws: &mut WsClient) -> StatusUpdate {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for status")
            .expect("stream ended")
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

#[tokio::test]
async fn test_status_reaches_observer() {
    let state = test_state(ScriptedProvider::faces(1));
    let addr = spawn_server(state.clone()).await;

    let mut teacher = connect(addr, "/ws/teacher").await;
    wait_for_consumers(&state, 1).await;
    let mut student = connect(addr, "/ws/student").await;

    send_frame(&mut student, FRAME, "center").await;
    let update = next_status(&mut teacher).await;
    assert_eq!(update.status, Status::Focused);
    assert_eq!(update.face_count, 1);
    assert_eq!(update.gaze_direction, GazeDirection::Center);
    assert!(update.timestamp > 0.0);
}

#[tokio::test]
async fn test_malformed_messages_are_skipped() {
    let state = test_state(ScriptedProvider::faces(1));
    let addr = spawn_server(state.clone()).await;

    let mut teacher = connect(addr, "/ws/teacher").await;
    wait_for_consumers(&state, 1).await;
    let mut student = connect(addr, "/ws/student").await;

    student.send(Message::Text("not json".into())).await.unwrap();
    student
        .send(Message::Text(r#"{"frame":"aGVsbG8="}"#.into()))
        .await
        .unwrap();
    send_frame(&mut student, FRAME, "sideways").await;
    send_frame(&mut student, "!!not base64!!", "center").await;
    send_frame(&mut student, &format!("data:image/jpeg;base64,{}", FRAME), "left").await;

    // Only the last frame produces an update, and the connection survived.
    let update = next_status(&mut teacher).await;
    assert_eq!(update.gaze_direction, GazeDirection::Left);
    assert_eq!(state.registry.producer_count().await, 1);
}

#[tokio::test]
async fn test_multiple_faces_raise_alert() {
    let state = test_state(ScriptedProvider::faces(2));
    let addr = spawn_server(state.clone()).await;

    let mut teacher = connect(addr, "/ws/teacher").await;
    wait_for_consumers(&state, 1).await;
    let mut student = connect(addr, "/ws/student").await;

    send_frame(&mut student, FRAME, "center").await;
    let update = next_status(&mut teacher).await;
    assert_eq!(update.status, Status::ProctorAlert);
    assert_eq!(update.face_count, 2);
}

#[tokio::test]
async fn test_confusion_confirmed_on_second_frame() {
    let state = test_state(ScriptedProvider::confused_face());
    let addr = spawn_server(state.clone()).await;

    let mut teacher = connect(addr, "/ws/teacher").await;
    wait_for_consumers(&state, 1).await;
    let mut student = connect(addr, "/ws/student").await;

    send_frame(&mut student, FRAME, "center").await;
    assert_eq!(next_status(&mut teacher).await.status, Status::Focused);

    send_frame(&mut student, FRAME, "center").await;
    assert_eq!(next_status(&mut teacher).await.status, Status::Confused);
}

#[tokio::test]
async fn test_every_observer_receives_updates() {
    let state = test_state(ScriptedProvider::faces(1));
    let addr = spawn_server(state.clone()).await;

    let mut first = connect(addr, "/ws/teacher").await;
    let mut second = connect(addr, "/ws/teacher").await;
    wait_for_consumers(&state, 2).await;
    let mut student = connect(addr, "/ws/student").await;

    send_frame(&mut student, FRAME, "up").await;
    assert_eq!(next_status(&mut first).await.gaze_direction, GazeDirection::Up);
    assert_eq!(next_status(&mut second).await.gaze_direction, GazeDirection::Up);
}

#[tokio::test]
async fn test_disconnect_unregisters() {
    let state = test_state(ScriptedProvider::faces(1));
    let addr = spawn_server(state.clone()).await;

    let mut teacher = connect(addr, "/ws/teacher").await;
    wait_for_consumers(&state, 1).await;
    let mut student = connect(addr, "/ws/student").await;
    wait_until(|| {
        let state = state.clone();
        async move { state.registry.producer_count().await == 1 }
    })
    .await;

    student.close(None).await.unwrap();
    wait_until(|| {
        let state = state.clone();
        async move { state.registry.producer_count().await == 0 }
    })
    .await;

    teacher.close(None).await.unwrap();
    wait_for_consumers(&state, 0).await;
}
