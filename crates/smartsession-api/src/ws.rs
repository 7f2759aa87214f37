//! WebSocket handlers for subjects and observers.
//!
//! `/ws/student` streams frames in; each one is analysed, fed through the
//! connection's [`FramePipeline`] and the resulting status is broadcast.
//! `/ws/teacher` only receives those broadcasts.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::Instrument;

use smartsession_models::{GazeDirection, SubjectFrame};
use smartsession_monitor::{ChannelSink, FramePipeline};
use smartsession_vision::{analyze_frame, decode_frame, FrameObservation};

use crate::logging::{ConnectionLogger, ConnectionRole};
use crate::metrics;
use crate::state::AppState;

/// Configuration for WebSocket backpressure.
const WS_SEND_BUFFER_SIZE: usize = 32;
const WS_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Subject (producer) endpoint.
pub async fn ws_student(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    metrics::record_ws_connection(ConnectionRole::Student.as_str());
    ws.on_upgrade(|socket| handle_student_socket(socket, state))
}

/// Observer (consumer) endpoint.
pub async fn ws_teacher(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    metrics::record_ws_connection(ConnectionRole::Teacher.as_str());
    ws.on_upgrade(|socket| handle_teacher_socket(socket, state))
}

async fn handle_student_socket(mut socket: WebSocket, state: AppState) {
    let id = state.registry.register_producer().await;
    let logger = ConnectionLogger::new(&id, ConnectionRole::Student);
    let span = logger.create_span();

    async {
        logger.log_open();
        refresh_active_gauges(&state).await;

        let mut pipeline = FramePipeline::new(&state.config.monitor);

        // Frames are handled strictly in arrival order; the next one waits
        // until the previous broadcast has finished.
        while let Some(msg) = socket.recv().await {
            let text = match msg {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(e) => {
                    logger.log_warning(&format!("receive failed: {}", e));
                    break;
                }
            };
            metrics::record_ws_message_received(ConnectionRole::Student.as_str());

            let Some((observation, direction)) = analyze_message(&state, &logger, &text).await
            else {
                continue;
            };

            let outcome = pipeline.apply(observation, direction);
            if outcome.changed() {
                logger.log_transition(outcome.previous, outcome.update.status, observation.face_count);
                metrics::record_status_transition(outcome.update.status);
            }

            let result = state.registry.broadcast(&outcome.update).await;
            metrics::record_broadcast(&result);
            if !result.pruned.is_empty() {
                refresh_active_gauges(&state).await;
            }
        }

        state.registry.unregister(&id).await;
        refresh_active_gauges(&state).await;
        logger.log_close();
    }
    .instrument(span)
    .await;
}

/// Parse, decode and analyse one inbound message.
///
/// Returns `None` for anything malformed; the caller skips the frame and
/// keeps the connection open.
async fn analyze_message(
    state: &AppState,
    logger: &ConnectionLogger,
    text: &str,
) -> Option<(FrameObservation, GazeDirection)> {
    let message: SubjectFrame = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(e) => {
            logger.log_skipped("invalid_message", &e.to_string());
            metrics::record_frame_dropped("invalid_message");
            return None;
        }
    };

    let frame = match decode_frame(&message.frame) {
        Ok(f) => f,
        Err(e) => {
            logger.log_skipped("invalid_frame", &e.to_string());
            metrics::record_frame_dropped("invalid_frame");
            return None;
        }
    };

    let vision = Arc::clone(&state.vision);
    let start = Instant::now();
    let observation =
        match tokio::task::spawn_blocking(move || analyze_frame(vision.as_ref(), &frame)).await {
            Ok(o) => o,
            Err(e) => {
                logger.log_warning(&format!("frame analysis task failed: {}", e));
                metrics::record_frame_dropped("analysis_failed");
                return None;
            }
        };
    metrics::record_frame_processed(observation.face_count, start.elapsed().as_secs_f64());

    Some((observation, message.gaze_direction))
}

async fn handle_teacher_socket(socket: WebSocket, state: AppState) {
    let (mut ws_sender, mut receiver) = socket.split();

    // Bounded channel between the registry and the socket writer.
    let (tx, mut rx) = mpsc::channel::<Arc<str>>(WS_SEND_BUFFER_SIZE);

    let id = state
        .registry
        .register_consumer(Arc::new(ChannelSink::new(tx)))
        .await;
    let logger = ConnectionLogger::new(&id, ConnectionRole::Teacher);
    let span = logger.create_span();

    async {
        logger.log_open();
        refresh_active_gauges(&state).await;

        let writer_logger = logger.clone();
        let mut send_task = tokio::spawn(async move {
            let mut heartbeat = interval(WS_HEARTBEAT_INTERVAL);
            // The first tick completes immediately.
            heartbeat.tick().await;

            loop {
                tokio::select! {
                    payload = rx.recv() => {
                        let Some(payload) = payload else { break };
                        if ws_sender.send(Message::Text(payload.to_string())).await.is_err() {
                            break;
                        }
                        metrics::record_ws_message_sent(ConnectionRole::Teacher.as_str(), "status");
                    }
                    _ = heartbeat.tick() => {
                        if ws_sender.send(Message::Ping(Vec::new())).await.is_err() {
                            writer_logger.log_warning("heartbeat failed, client disconnected");
                            break;
                        }
                    }
                }
            }
            let _ = ws_sender.close().await;
        });

        // Observers never send anything meaningful; just wait for them to go.
        loop {
            tokio::select! {
                msg = receiver.next() => match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        logger.log_warning(&format!("receive failed: {}", e));
                        break;
                    }
                    Some(Ok(_)) => {}
                },
                _ = &mut send_task => break,
            }
        }

        state.registry.unregister(&id).await;
        send_task.abort();
        refresh_active_gauges(&state).await;
        logger.log_close();
    }
    .instrument(span)
    .await;
}

async fn refresh_active_gauges(state: &AppState) {
    metrics::set_ws_active_connections(
        ConnectionRole::Student.as_str(),
        state.registry.producer_count().await,
    );
    metrics::set_ws_active_connections(
        ConnectionRole::Teacher.as_str(),
        state.registry.consumer_count().await,
    );
}
