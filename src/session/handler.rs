//! Per-Connection Protocol Handler
//!
//! Turns each inbound text frame into the ordered list of replies for that
//! frame. Holds the only per-connection state: the frame counter and the
//! current frame stride.

use super::context::AppContext;
use super::messages::{
    InboundMessage, OutboundMessage, ParseError, RecognizeGesture, RefreshDetection, ServerEvent,
    UpdateConfidence, unix_timestamp,
};
use crate::detection::codec::decode_frame;
use crate::detection::types::Detection;
use crate::gesture::matcher::{Template, MIN_TRAJECTORY_POINTS};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const GREETING: &str = "Frame streaming ready";
const SAVE_TEMPLATE_NOTICE: &str =
    "Templates are stored client-side only. Send them with each recognize_gesture request.";

/// Protocol state for one connection
pub struct SessionHandler {
    ctx: Arc<AppContext>,
    id: Uuid,
    frames_seen: u64,
    frame_stride: u32,
    forced_stride: u32,
}

impl SessionHandler {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        let settings = ctx.session_settings();
        Self {
            ctx,
            id: Uuid::new_v4(),
            frames_seen: 0,
            frame_stride: settings.frame_stride,
            forced_stride: settings.forced_frame_stride,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Detection runs on every Nth frame
    pub fn frame_stride(&self) -> u32 {
        self.frame_stride
    }

    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    /// First message sent on a new connection
    pub fn greeting(&self) -> OutboundMessage {
        let thresholds = self.ctx.thresholds();
        ServerEvent::ConnectionEstablished {
            message: GREETING.to_string(),
            current_hand_confidence: thresholds.hand_detection,
            current_gesture_confidence: thresholds.gesture_recognition,
        }
        .into()
    }

    /// Handle one text frame and return the replies in send order
    pub async fn handle_text(&mut self, text: &str) -> Vec<OutboundMessage> {
        match InboundMessage::parse(text) {
            Ok(message) => {
                if !matches!(message, InboundMessage::Ping | InboundMessage::Frame(_)) {
                    info!("Session {}: received {}", self.id, message.kind());
                }
                self.dispatch(message).await
            }
            Err(ParseError::InvalidJson(e)) => {
                error!("Session {}: invalid JSON received: {}", self.id, e);
                vec![OutboundMessage::error("Invalid JSON format")]
            }
            Err(ParseError::UnknownType(kind)) => {
                warn!("Session {}: unknown message type: {}", self.id, kind);
                vec![OutboundMessage::status_error(format!("Unknown message type: {}", kind))]
            }
            Err(e) => {
                warn!("Session {}: rejected message: {}", self.id, e);
                vec![OutboundMessage::error(e.to_string())]
            }
        }
    }

    async fn dispatch(&mut self, message: InboundMessage) -> Vec<OutboundMessage> {
        match message {
            InboundMessage::Ping => vec![ServerEvent::Pong {
                timestamp: unix_timestamp(),
            }
            .into()],
            InboundMessage::StartTracking => {
                self.ctx.pipeline().set_tracking(true);
                vec![OutboundMessage::success("Tracking started")]
            }
            InboundMessage::StopTracking => {
                self.ctx.pipeline().set_tracking(false);
                vec![OutboundMessage::success("Tracking stopped")]
            }
            InboundMessage::SaveTemplate => vec![ServerEvent::Info {
                message: SAVE_TEMPLATE_NOTICE.to_string(),
            }
            .into()],
            InboundMessage::RecognizeGesture(request) => vec![self.recognize(request)],
            InboundMessage::UpdateConfidence(update) => vec![self.update_confidence(update)],
            InboundMessage::Frame(payload) => {
                let detection = self.handle_frame(payload.image_data()).await;
                vec![
                    ServerEvent::FrameReceived.into(),
                    OutboundMessage::detection(detection, None),
                ]
            }
            InboundMessage::RefreshDetection(request) => vec![self.refresh(request)],
        }
    }

    fn recognize(&self, request: RecognizeGesture) -> OutboundMessage {
        if request.trajectory.len() < MIN_TRAJECTORY_POINTS {
            return not_recognized("Trajectory must have at least 2 points");
        }
        if request.templates.is_empty() {
            return not_recognized("No templates provided for recognition");
        }

        let threshold = request
            .confidence_threshold
            .filter(|t| t.is_finite())
            .unwrap_or_else(|| self.ctx.thresholds().gesture_recognition);
        info!(
            "Recognizing {} point trajectory against {} templates (threshold {:.2})",
            request.trajectory.len(),
            request.templates.len(),
            threshold
        );

        let templates = Template::from_specs(&request.templates);
        match self.ctx.matcher().recognize(&request.trajectory, &templates, threshold) {
            Some(found) => ServerEvent::GestureRecognized {
                template_name: found.name,
                similarity: found.similarity,
                command: found.command,
            }
            .into(),
            None => not_recognized("No matching gesture found"),
        }
    }

    fn update_confidence(&self, update: UpdateConfidence) -> OutboundMessage {
        let thresholds = self.ctx.update_thresholds(
            update.hand_detection_confidence,
            update.gesture_recognition_confidence,
        );
        ServerEvent::ConfidenceUpdated {
            hand_detection_confidence: thresholds.hand_detection,
            gesture_recognition_confidence: thresholds.gesture_recognition,
        }
        .into()
    }

    /// Count the frame and run detection when it lands on the stride
    async fn handle_frame(&mut self, data: Option<&str>) -> Option<Detection> {
        self.frames_seen += 1;
        let due = self.frames_seen % u64::from(self.frame_stride) == 0;

        let data = data?;
        if !due || !self.ctx.pipeline().tracking_enabled() {
            return None;
        }

        let ctx = Arc::clone(&self.ctx);
        let data = data.to_string();
        let session = self.id;
        let outcome = tokio::task::spawn_blocking(move || match decode_frame(&data) {
            Ok(image) => {
                let threshold = ctx.thresholds().hand_detection;
                ctx.pipeline().process_frame(Some(&image), threshold)
            }
            Err(e) => {
                error!("Session {}: frame processing error: {}", session, e);
                None
            }
        })
        .await;

        match outcome {
            Ok(detection) => detection,
            Err(e) => {
                error!("Session {}: detection task failed: {}", self.id, e);
                None
            }
        }
    }

    fn refresh(&mut self, request: RefreshDetection) -> OutboundMessage {
        let pipeline = self.ctx.pipeline();
        if !pipeline.tracking_enabled() {
            pipeline.set_tracking(true);
            info!("Session {}: re-enabled tracking on refresh request", self.id);
        }
        if request.force_process {
            self.frame_stride = self.forced_stride;
            debug!("Session {}: frame stride now {}", self.id, self.frame_stride);
        }
        OutboundMessage::detection(pipeline.current_detection(), Some("refresh_request"))
    }
}

fn not_recognized(message: &str) -> OutboundMessage {
    ServerEvent::GestureNotRecognized {
        message: message.to_string(),
    }
    .into()
}
