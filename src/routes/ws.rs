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
use tracing::{info, error, instrument, debug};

use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::protocol::{fact_to_out, leaderboard_to_out, stats_to_out, to_out};
use crate::logic::*;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "wonderbox_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "wonderbox_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target = "wonderbox_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "wonderbox_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "wonderbox_backend", "WebSocket disconnected");
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::DailyPuzzle => {
      let puzzle = state.daily().map(to_out);
      let completed_today = state.store.completed_on(&state.today_key()).await;
      let attempts = state.daily_attempts().await;
      if let Some(p) = &puzzle {
        tracing::info!(target: "puzzle", id = %p.id, %completed_today, "WS daily puzzle served");
      }
      ServerWsMessage::Puzzle { puzzle, completed_today, attempts }
    }

    ClientWsMessage::StartPractice => {
      let outcome = start_practice(state).await;
      ServerWsMessage::PracticeStart {
        puzzle: outcome.puzzle.as_ref().map(to_out),
        remaining_today: outcome.remaining_today,
        message: outcome.message,
      }
    }

    ClientWsMessage::SubmitAnswer { answer, practice } => {
      let o = submit_answer(state, &answer, practice).await;
      tracing::info!(target: "puzzle", correct = o.correct, points = o.points_awarded, "WS submit_answer evaluated");
      ServerWsMessage::AnswerResult {
        correct: o.correct,
        points_awarded: o.points_awarded,
        attempts: o.attempts,
        completed_today: o.completed_today,
        message: o.message,
      }
    }

    ClientWsMessage::Stats => {
      let snapshot = stats_snapshot(state).await;
      ServerWsMessage::Stats { stats: stats_to_out(&snapshot) }
    }

    ClientWsMessage::OpenBox => {
      let o = open_box(state).await;
      ServerWsMessage::BoxOpened {
        fact: o.fact.as_ref().map(fact_to_out),
        boxes_opened: o.boxes_opened,
        message: o.message,
      }
    }

    ClientWsMessage::TodayFact => {
      let fact = today_fact(state).await;
      ServerWsMessage::Fact { fact: fact.as_ref().map(fact_to_out) }
    }

    ClientWsMessage::RateFact { rating } => {
      let o = rate_fact(state, rating).await;
      ServerWsMessage::RateResult { ok: o.ok, message: o.message }
    }

    ClientWsMessage::LevelUp => {
      let o = level_up(state).await;
      ServerWsMessage::LevelUpResult { ok: o.ok, level: o.level, points: o.points, message: o.message }
    }

    ClientWsMessage::BoxHistory => {
      ServerWsMessage::BoxHistory { entries: box_history(state).await }
    }

    ClientWsMessage::Leaderboard => {
      ServerWsMessage::Leaderboard { rows: leaderboard_to_out(leaderboard(state).await) }
    }

    ClientWsMessage::Generate { prompt, model } => {
      match relay_generate(state, &prompt, model.as_deref()).await {
        Ok(text) => ServerWsMessage::Generated { text },
        Err(message) => ServerWsMessage::Error { message },
      }
    }
  }
}
