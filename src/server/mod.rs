//! HTTP and WebSocket Server
//!
//! Routes:
//! - `GET /health`: pipeline counters and detector availability
//! - `/ws`, `/ws/frames`: the session protocol, one handler per connection

use crate::detection::pipeline::HealthReport;
use crate::session::{AppContext, OutboundMessage, SessionHandler};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// Build the application router
pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ws", get(upgrade))
        .route("/ws/frames", get(upgrade))
        .with_state(ctx)
}

/// Serve until Ctrl-C
pub async fn serve(ctx: Arc<AppContext>, addr: SocketAddr) -> crate::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        return;
    }
    info!("Shutdown requested");
}

async fn health(State(ctx): State<Arc<AppContext>>) -> Json<HealthReport> {
    Json(ctx.pipeline().health())
}

async fn upgrade(ws: WebSocketUpgrade, State(ctx): State<Arc<AppContext>>) -> Response {
    ws.on_upgrade(move |socket| run_session(socket, ctx))
}

/// Drive one connection until the client goes away
async fn run_session(mut socket: WebSocket, ctx: Arc<AppContext>) {
    let mut handler = SessionHandler::new(ctx);
    let id = handler.id();
    info!("Session {} connected", id);

    if !send(&mut socket, &handler.greeting()).await {
        info!("Session {} closed before greeting", id);
        return;
    }

    while let Some(frame) = socket.recv().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(Message::Binary(_)) => {
                debug!("Session {}: ignoring binary frame", id);
                continue;
            }
            Ok(_) => continue,
            Err(e) => {
                warn!("Session {} receive error: {}", id, e);
                break;
            }
        };

        for reply in handler.handle_text(&text).await {
            if !send(&mut socket, &reply).await {
                info!("Session {} disconnected mid-reply", id);
                return;
            }
        }
    }

    info!("Session {} disconnected after {} frames", id, handler.frames_seen());
}

/// Returns false once the socket can no longer be written
async fn send(socket: &mut WebSocket, message: &OutboundMessage) -> bool {
    let text = match message.to_json() {
        Ok(text) => text,
        Err(e) => {
            error!("Failed to encode reply: {}", e);
            return true;
        }
    };
    match socket.send(Message::Text(text)).await {
        Ok(()) => true,
        Err(e) => {
            debug!("Send failed: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::config::Config;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_health_handler_reports_counters() {
        let ctx = Arc::new(AppContext::from_config(&Config::default(), None));
        let Json(report) = health(State(ctx)).await;
        assert_eq!(report.status, "healthy");
        assert!(report.tracking_enabled);
        assert_eq!(report.frames_processed, 0);
        assert!(!report.inference_available);
        assert!(!report.model_loaded);
    }

    #[tokio::test]
    async fn test_serve_binds_and_answers_health() {
        let ctx = Arc::new(AppContext::from_config(&Config::default(), None));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, router(ctx)).await.unwrap();
        });

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("\"status\":\"healthy\""));
        assert!(response.contains("\"model_loaded\":false"));
        server.abort();
    }
}
