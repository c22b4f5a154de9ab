//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::logic::*;
use crate::protocol::{stats_out, ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "zadachnik_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "zadachnik_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target = "zadachnik_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "zadachnik_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "zadachnik_backend", "WebSocket disconnected");
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::NewProblem { exam, topic, user_id } => {
      let (out, origin) = serve_problem(state, &exam, &topic, user_id).await;
      tracing::info!(target: "problem", %exam, %topic, id = %out.id, %origin, "WS new_problem served");
      ServerWsMessage::Problem { problem: out }
    }

    ClientWsMessage::SubmitAnswer { problem_id, user_id, answer } => {
      let (correct, expected, hint) = evaluate_answer(state, &problem_id, user_id, &answer).await;
      tracing::info!(target: "problem", id = %problem_id, %correct, "WS submit_answer evaluated");
      ServerWsMessage::AnswerResult { correct, expected, hint }
    }

    ClientWsMessage::Hint { problem_id } => {
      let text = get_hint_text(state, &problem_id).await;
      tracing::info!(target: "problem", id = %problem_id, "WS hint served");
      ServerWsMessage::Hint { text }
    }

    ClientWsMessage::Stats { user_id } => {
      let progress = get_stats(state, user_id).await;
      ServerWsMessage::Stats { stats: stats_out(progress) }
    }
  }
}
