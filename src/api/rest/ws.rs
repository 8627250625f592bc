use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, warn};

use crate::session::Session;
use crate::state::AppState;

/// Text a client sends to ask for a fresh snapshot.
const SYNC_REQUEST: &str = "sync";

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum SessionFrame {
    /// Sent on connect and on every sync request.
    Snapshot { session: Session },
    Changed { session: Session },
}

pub async fn session_ws(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| follow_session(socket, state))
}

async fn follow_session(socket: WebSocket, state: Arc<AppState>) {
    let (mut sink, mut incoming) = socket.split();
    let mut changes = WatchStream::from_changes(state.watcher.subscribe());

    debug!("session follower attached");

    let mut frame = Some(SessionFrame::Snapshot {
        session: state.watcher.current(),
    });

    loop {
        if let Some(frame) = frame.take() {
            if !push(&mut sink, &frame).await {
                break;
            }
        }

        frame = tokio::select! {
            changed = changes.next() => match changed {
                Some(session) => Some(SessionFrame::Changed { session }),
                None => break,
            },
            message = incoming.next() => match message {
                Some(Ok(Message::Text(text))) if text.trim() == SYNC_REQUEST => {
                    Some(SessionFrame::Snapshot { session: state.watcher.current() })
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => None,
            },
        };
    }

    debug!("session follower detached");
}

/// False once the peer is gone.
async fn push(sink: &mut SplitSink<WebSocket, Message>, frame: &SessionFrame) -> bool {
    let text = match serde_json::to_string(frame) {
        Ok(text) => text,
        Err(err) => {
            warn!(error = %err, "session frame not serializable");
            return true;
        }
    };

    sink.send(Message::Text(text)).await.is_ok()
}
