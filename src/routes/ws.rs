//! WebSocket upgrade + message loop. Each connection owns at most one hint session;
//! every client message is parsed as JSON and answered with a single JSON message.
//!
//! While a session is open the socket is read under the configured idle timeout.
//! A session that times out, or whose socket closes, is dropped without recording.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};

use crate::logic::*;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::session::HintSession;
use crate::state::{AppState, SessionClaim};
use crate::util::normalize_user_id;

type ActiveSession = Option<(HintSession, SessionClaim)>;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "hintladder_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "hintladder_backend", "WebSocket connected");
  let mut active: ActiveSession = None;

  loop {
    let deadline = read_deadline(state.settings.session_timeout_minutes, &active);
    let Some(next) = recv_within(deadline, socket.recv()).await else {
      let timed_out = expire_session(&mut active);
      if !send_json(&mut socket, &timed_out).await {
        break;
      }
      continue;
    };

    let Some(Ok(msg)) = next else { break };
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "hintladder_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state, &mut active).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };
        if !send_json(&mut socket, &reply_msg).await {
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }

  if let Some((session, _claim)) = active.take() {
    info!(target: "tutor", session_id = %session.session_id(), "Socket closed with open session; outcome discarded");
  }
  info!(target: "hintladder_backend", "WebSocket disconnected");
}

/// Idle limit for the next read: only while a session is open, and never when the
/// configured timeout is 0.
fn read_deadline(timeout_minutes: u64, active: &ActiveSession) -> Option<Duration> {
  if active.is_none() || timeout_minutes == 0 {
    return None;
  }
  Some(Duration::from_secs(timeout_minutes.saturating_mul(60)))
}

/// `None` when the deadline passed before `recv` completed.
async fn recv_within<F: Future>(deadline: Option<Duration>, recv: F) -> Option<F::Output> {
  match deadline {
    Some(limit) => tokio::time::timeout(limit, recv).await.ok(),
    None => Some(recv.await),
  }
}

/// Drop the open session without recording it; its claim is released with it.
fn expire_session(active: &mut ActiveSession) -> ServerWsMessage {
  if let Some((session, _claim)) = active.take() {
    let open_for = Utc::now() - session.started_at();
    warn!(
      target: "tutor",
      session_id = %session.session_id(),
      user_id = %session.learner().user_id,
      minutes_open = open_for.num_minutes(),
      "Session timed out; outcome discarded"
    );
  }
  ServerWsMessage::Error { message: "Session timed out due to inactivity".into() }
}

async fn send_json(socket: &mut WebSocket, msg: &ServerWsMessage) -> bool {
  let out = serde_json::to_string(msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  });
  if let Err(e) = socket.send(Message::Text(out)).await {
    error!(target: "hintladder_backend", error = %e, "WS send error");
    return false;
  }
  true
}

fn no_session() -> ServerWsMessage {
  ServerWsMessage::Error { message: "No active session; send start_session first".into() }
}

#[instrument(level = "info", skip(state, active))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState, active: &mut ActiveSession) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::StartSession { user_id, problem_id, statement } => {
      if let Some((session, _)) = active.as_ref() {
        return ServerWsMessage::Error {
          message: format!("Session {} is still open; finish it first", session.session_id()),
        };
      }
      let user_id = normalize_user_id(&user_id);
      let context = match resolve_problem(state, problem_id.as_deref(), statement.as_deref()) {
        Ok(c) => c,
        Err(message) => return ServerWsMessage::Error { message },
      };
      match open_session(state, &user_id, context).await {
        Ok((session, claim)) => {
          info!(
            target: "tutor",
            session_id = %session.session_id(),
            %user_id,
            domain = %session.context().domain_tag,
            ladder = session.ladder_len(),
            "WS session started"
          );
          let started = ServerWsMessage::SessionStarted {
            session_id: session.session_id().to_string(),
            context: session.context().clone(),
            intro: session.intro(),
          };
          *active = Some((session, claim));
          started
        }
        Err(message) => ServerWsMessage::Error { message },
      }
    }

    ClientWsMessage::Hint => match active.as_mut() {
      Some((session, _)) => {
        let reply = session.request_hint();
        debug!(target: "tutor", session_id = %session.session_id(), level = session.hint_level(), state = ?session.state(), "WS hint served");
        ServerWsMessage::Tutor { reply }
      }
      None => no_session(),
    },

    ClientWsMessage::Approach { text } => match active.as_mut() {
      Some((session, _)) => ServerWsMessage::Tutor { reply: session.share_approach(&text) },
      None => no_session(),
    },

    ClientWsMessage::Question { text } => match active.as_mut() {
      Some((session, _)) => ServerWsMessage::Tutor { reply: session.ask_question(&text) },
      None => no_session(),
    },

    ClientWsMessage::Analogy => match active.as_ref() {
      Some((session, _)) => ServerWsMessage::Tutor { reply: session.request_analogy() },
      None => no_session(),
    },

    ClientWsMessage::Finish { solved } => match active.take() {
      Some((session, claim)) => {
        let (summary, recorded) = close_session(state, session, claim, solved).await;
        ServerWsMessage::SessionFinished { summary, recorded }
      }
      None => no_session(),
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::TutorConfig;
  use crate::session::ReplyKind;

  fn state() -> AppState {
    AppState::from_config(TutorConfig::default(), None)
  }

  fn start(user: &str) -> ClientWsMessage {
    ClientWsMessage::StartSession { user_id: user.into(), problem_id: Some("p101".into()), statement: None }
  }

  #[tokio::test]
  async fn actions_need_an_open_session() {
    let state = state();
    let mut active = None;
    let reply = handle_client_ws(ClientWsMessage::Hint, &state, &mut active).await;
    assert!(matches!(reply, ServerWsMessage::Error { .. }));
    let reply = handle_client_ws(ClientWsMessage::Finish { solved: true }, &state, &mut active).await;
    assert!(matches!(reply, ServerWsMessage::Error { .. }));
    assert!(matches!(handle_client_ws(ClientWsMessage::Ping, &state, &mut active).await, ServerWsMessage::Pong));
  }

  #[tokio::test]
  async fn full_session_over_the_dispatcher() {
    let state = state();
    let mut active = None;
    let reply = handle_client_ws(start("ana"), &state, &mut active).await;
    assert!(matches!(reply, ServerWsMessage::SessionStarted { .. }));
    assert!(active.is_some());

    // second start on the same connection is refused
    let reply = handle_client_ws(start("ana"), &state, &mut active).await;
    assert!(matches!(reply, ServerWsMessage::Error { .. }));

    match handle_client_ws(ClientWsMessage::Hint, &state, &mut active).await {
      ServerWsMessage::Tutor { reply } => {
        assert_eq!(reply.kind, ReplyKind::Hint);
        assert_eq!(reply.hint_id.as_deref(), Some("array:1"));
      }
      other => panic!("unexpected {other:?}"),
    }

    match handle_client_ws(ClientWsMessage::Finish { solved: true }, &state, &mut active).await {
      ServerWsMessage::SessionFinished { summary, recorded } => {
        assert!(recorded);
        assert!(summary.text.contains("Hints used: 1"));
      }
      other => panic!("unexpected {other:?}"),
    }
    assert!(active.is_none());
    assert_eq!(state.active_session_count(), 0);
    assert_eq!(profile_view(&state, "ana").await.problems_solved, 1);
  }

  #[tokio::test]
  async fn unknown_problem_is_reported() {
    let state = state();
    let mut active = None;
    let msg = ClientWsMessage::StartSession { user_id: "ben".into(), problem_id: Some("zzz".into()), statement: None };
    assert!(matches!(handle_client_ws(msg, &state, &mut active).await, ServerWsMessage::Error { .. }));
    assert!(active.is_none());
  }

  #[tokio::test]
  async fn deadline_applies_only_to_open_sessions() {
    let state = state();
    let mut active = None;
    assert_eq!(read_deadline(30, &active), None);
    handle_client_ws(start("cy"), &state, &mut active).await;
    assert_eq!(read_deadline(30, &active), Some(Duration::from_secs(30 * 60)));
    assert_eq!(read_deadline(0, &active), None);
  }

  #[tokio::test(start_paused = true)]
  async fn idle_session_expires_without_recording() {
    let state = state();
    let mut active = None;
    handle_client_ws(start("dan"), &state, &mut active).await;
    handle_client_ws(ClientWsMessage::Hint, &state, &mut active).await;
    assert_eq!(state.active_session_count(), 1);

    let deadline = read_deadline(1, &active);
    let silent = std::future::pending::<Option<Result<Message, axum::Error>>>();
    assert!(recv_within(deadline, silent).await.is_none());

    let reply = expire_session(&mut active);
    assert!(matches!(reply, ServerWsMessage::Error { ref message } if message.contains("timed out")));
    assert!(active.is_none());
    assert_eq!(state.active_session_count(), 0);
    assert_eq!(profile_view(&state, "dan").await.problems_attempted, 0);

    // the user can start again after expiry
    let reply = handle_client_ws(start("dan"), &state, &mut active).await;
    assert!(matches!(reply, ServerWsMessage::SessionStarted { .. }));
  }

  #[tokio::test(start_paused = true)]
  async fn message_inside_deadline_is_delivered() {
    let deadline = Some(Duration::from_secs(60));
    assert_eq!(recv_within(deadline, async { 7 }).await, Some(7));
    assert_eq!(recv_within(None, async { 8 }).await, Some(8));
  }

  #[test]
  fn client_messages_parse_from_json() {
    let m: ClientWsMessage = serde_json::from_str(r#"{"type":"start_session","userId":"u1","statement":"Reverse a string"}"#).expect("parse");
    assert!(matches!(m, ClientWsMessage::StartSession { problem_id: None, statement: Some(_), .. }));
    let m: ClientWsMessage = serde_json::from_str(r#"{"type":"finish"}"#).expect("parse");
    assert!(matches!(m, ClientWsMessage::Finish { solved: false }));
  }
}
