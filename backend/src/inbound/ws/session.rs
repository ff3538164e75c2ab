//! Per-connection recognition session.
//!
//! Each connection processes at most one frame at a time. A frame arriving
//! while another is processed waits in a single slot; a newer frame replaces
//! it, so a slow engine never builds a backlog of stale camera images.
//! Replies are sent in processing order. Fragmented messages are reassembled
//! before parsing. The socket pings every 5s and considers the client gone
//! after 10s without traffic; tests shorten both.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_ws::{
    AggregatedMessage, AggregatedMessageStream, CloseCode, CloseReason, Closed, ProtocolError,
    Session,
};
use futures_util::future::BoxFuture;
use tokio::time;
use tracing::{debug, warn};

use crate::domain::ports::{FrameProcessor, FrameRequest};
use crate::domain::{Error, FrameReport, TraceId};
use crate::inbound::ws::messages::{FrameMessage, FrameReply};

/// Time between heartbeats to the client (5s in production, shorter in tests).
#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Max idle time before disconnecting the client (10s in production, shorter in tests).
#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(300);

type InFlight = BoxFuture<'static, Result<FrameReport, Error>>;

pub(super) async fn handle_ws_session(
    recognition: Arc<dyn FrameProcessor>,
    session: Session,
    stream: AggregatedMessageStream,
) {
    WsSession::new(recognition).run(session, stream).await;
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    InvalidPayload,
    Network(Closed),
}

enum CloseAction {
    None,
    Close(Option<CloseReason>),
}

struct WsSession {
    recognition: Arc<dyn FrameProcessor>,
    in_flight: Option<InFlight>,
    waiting: Option<FrameRequest>,
}

impl WsSession {
    fn new(recognition: Arc<dyn FrameProcessor>) -> Self {
        Self {
            recognition,
            in_flight: None,
            waiting: None,
        }
    }

    async fn run(mut self, mut session: Session, mut stream: AggregatedMessageStream) {
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        loop {
            let processing = self.in_flight.is_some();
            let result = tokio::select! {
                _ = heartbeat.tick() => {
                    handle_heartbeat_tick(&mut session, &last_heartbeat).await
                }
                message = stream.recv() => {
                    self.handle_stream_message(&mut last_heartbeat, &mut session, message)
                        .await
                }
                outcome = poll_in_flight(&mut self.in_flight), if processing => {
                    self.finish_frame(&mut session, outcome).await
                }
            };

            if let Err(error) = result {
                log_shutdown_reason(&error);
                close_session_if_needed(session, close_action_for(&error)).await;
                return;
            }
        }
    }

    async fn handle_stream_message(
        &mut self,
        last_heartbeat: &mut Instant,
        session: &mut Session,
        message: Option<Result<AggregatedMessage, ProtocolError>>,
    ) -> Result<(), SessionError> {
        let Some(message) = message else {
            return Err(SessionError::StreamClosed);
        };

        match message {
            Ok(AggregatedMessage::Ping(payload)) => {
                *last_heartbeat = Instant::now();
                session.pong(&payload).await.map_err(SessionError::Network)
            }
            Ok(AggregatedMessage::Text(text)) => {
                *last_heartbeat = Instant::now();
                self.accept_frame(text.as_ref())
            }
            Ok(AggregatedMessage::Pong(_) | AggregatedMessage::Binary(_)) => {
                *last_heartbeat = Instant::now();
                Ok(())
            }
            Ok(AggregatedMessage::Close(reason)) => Err(SessionError::ClientClosed(reason)),
            Err(error) => Err(SessionError::Protocol(error)),
        }
    }

    fn accept_frame(&mut self, text: &str) -> Result<(), SessionError> {
        let frame = match serde_json::from_str::<FrameMessage>(text) {
            Ok(frame) => FrameRequest::from(frame),
            Err(error) => {
                warn!(error = %error, "Rejected malformed WebSocket payload");
                return Err(SessionError::InvalidPayload);
            }
        };
        if self.in_flight.is_some() {
            if self.waiting.replace(frame).is_some() {
                debug!("superseded waiting frame");
            }
        } else {
            self.start(frame);
        }
        Ok(())
    }

    fn start(&mut self, frame: FrameRequest) {
        let recognition = Arc::clone(&self.recognition);
        let trace_id = TraceId::generate();
        debug!(trace_id = %trace_id, "processing frame");
        self.in_flight = Some(Box::pin(TraceId::scope(trace_id, async move {
            recognition.process_frame(frame).await
        })));
    }

    async fn finish_frame(
        &mut self,
        session: &mut Session,
        outcome: Result<FrameReport, Error>,
    ) -> Result<(), SessionError> {
        self.in_flight = None;
        if let Some(next) = self.waiting.take() {
            self.start(next);
        }
        send_json(session, &FrameReply::from_result(outcome))
            .await
            .map_err(SessionError::Network)
    }
}

/// Drive the in-flight frame; only polled while one exists.
async fn poll_in_flight(in_flight: &mut Option<InFlight>) -> Result<FrameReport, Error> {
    match in_flight.as_mut() {
        Some(frame) => frame.await,
        None => std::future::pending().await,
    }
}

async fn handle_heartbeat_tick(
    session: &mut Session,
    last_heartbeat: &Instant,
) -> Result<(), SessionError> {
    if Instant::now().duration_since(*last_heartbeat) > CLIENT_TIMEOUT {
        return Err(SessionError::HeartbeatTimeout);
    }
    session.ping(b"").await.map_err(SessionError::Network)
}

async fn send_json(session: &mut Session, reply: &FrameReply) -> Result<(), Closed> {
    match serde_json::to_string(reply) {
        Ok(body) => session.text(body).await,
        Err(error) => {
            warn!(error = %error, "Failed to serialize WebSocket payload");
            Ok(())
        }
    }
}

fn log_shutdown_reason(error: &SessionError) {
    match error {
        SessionError::HeartbeatTimeout => {
            warn!("WebSocket heartbeat timeout; closing connection");
        }
        SessionError::Protocol(error) => {
            warn!(error = %error, "WebSocket protocol error");
        }
        SessionError::Network(error) => {
            warn!(error = %error, "WebSocket send failed; closing connection");
        }
        SessionError::InvalidPayload | SessionError::ClientClosed(_) | SessionError::StreamClosed => {
        }
    }
}

fn close_action_for(error: &SessionError) -> CloseAction {
    match error {
        SessionError::HeartbeatTimeout => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Normal,
            description: Some("heartbeat timeout".to_owned()),
        })),
        SessionError::Protocol(_) => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Protocol,
            description: Some("protocol error".to_owned()),
        })),
        SessionError::InvalidPayload => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Policy,
            description: Some("invalid payload".to_owned()),
        })),
        SessionError::ClientClosed(reason) => CloseAction::Close(reason.clone()),
        SessionError::StreamClosed | SessionError::Network(_) => CloseAction::None,
    }
}

async fn close_session_if_needed(session: Session, close_action: CloseAction) {
    if let CloseAction::Close(reason) = close_action {
        if let Err(error) = session.close(reason).await {
            warn!(error = %error, "Failed to close WebSocket session");
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
