//! Minimal Hugging Face inference client for practice-puzzle generation and
//! the text-generation relay endpoint.
//!
//! The remote model is treated as unreliable by design: a single best-effort
//! request, no retries, and any network/status/parse failure sends the caller
//! down the local fallback path. Calls log model names and latencies, never
//! the API key.

use std::time::Duration;

use regex::Regex;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde_json::Value;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::config::Prompts;
use crate::domain::{Difficulty, Puzzle, PuzzleDraft, PuzzleKind, PuzzleSource};
use crate::selection::max_puzzle_difficulty;
use crate::util::{fill_template, trunc_for_log};

#[derive(Clone)]
pub struct Generator {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

impl Generator {
  /// Construct the client if we find HF_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("HF_API_KEY").ok()?;
    let base_url = std::env::var("HF_BASE_URL")
      .unwrap_or_else(|_| "https://api-inference.huggingface.co/models".into());
    let model = std::env::var("HF_MODEL").unwrap_or_else(|_| "google/flan-t5-large".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, model })
  }

  /// One text completion against the hosted inference API. Used both by
  /// puzzle generation and verbatim by the relay endpoint.
  #[instrument(level = "info", skip(self, prompt), fields(prompt_len = prompt.len()))]
  pub async fn text_completion(&self, prompt: &str, model: Option<&str>) -> Result<String, String> {
    let model = model.unwrap_or(&self.model);
    let url = format!("{}/{}", self.base_url, model);
    let body = serde_json::json!({ "inputs": prompt });

    let start = std::time::Instant::now();
    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "wonderbox-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&body)
      .send()
      .await
      .map_err(|e| e.to_string())?;
    let elapsed = start.elapsed();

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_hf_error(&body).unwrap_or(body);
      return Err(format!("HF HTTP {}: {}", status, trunc_for_log(&msg, 200)));
    }

    let text = res.text().await.map_err(|e| e.to_string())?;
    info!(%model, ?elapsed, response_len = text.len(), "Inference response received");
    Ok(extract_generated_text(&text))
  }

  /// Generate one ephemeral practice puzzle for the given level.
  #[instrument(level = "info", skip(self, prompts), fields(%level, model = %self.model))]
  pub async fn generate_puzzle(
    &self,
    prompts: &Prompts,
    level: u32,
    kind: PuzzleKind,
  ) -> Result<Puzzle, String> {
    let rank = max_puzzle_difficulty(level.max(1));
    let difficulty = Difficulty::from_rank(rank);
    let prompt = fill_template(
      &prompts.generate_template,
      &[("difficulty", difficulty_label(difficulty)), ("category", kind_label(kind))],
    );

    let text = match self.text_completion(&prompt, None).await {
      Ok(t) => t,
      Err(e) => {
        error!(target: "puzzle", %level, error = %e, "Remote generation failed");
        return Err(e);
      }
    };

    let draft = parse_generated_text(&text)?;
    let puzzle = draft_to_puzzle(draft, kind, difficulty, points_for_rank(rank));
    info!(
      target: "puzzle",
      id = %puzzle.id,
      question_preview = %trunc_for_log(&puzzle.question, 60),
      "Generated practice puzzle"
    );
    Ok(puzzle)
  }
}

/// Points for a generated puzzle scale with its difficulty rank.
pub fn points_for_rank(rank: u32) -> u32 {
  match rank {
    0 | 1 => 15,
    2 => 30,
    _ => 50,
  }
}

fn kind_label(kind: PuzzleKind) -> &'static str {
  match kind {
    PuzzleKind::Riddle => "riddle",
    PuzzleKind::Word => "word",
    PuzzleKind::Math => "math",
    PuzzleKind::Logic => "logic",
    PuzzleKind::History => "history",
    PuzzleKind::Science => "science",
    PuzzleKind::Psychology => "psychology",
    PuzzleKind::Music => "music",
  }
}

fn difficulty_label(d: Difficulty) -> &'static str {
  match d {
    Difficulty::Easy => "easy",
    Difficulty::Medium => "medium",
    Difficulty::Hard => "hard",
  }
}

fn kind_from_str(s: &str) -> Option<PuzzleKind> {
  match s.trim().to_lowercase().as_str() {
    "riddle" => Some(PuzzleKind::Riddle),
    "word" => Some(PuzzleKind::Word),
    "math" => Some(PuzzleKind::Math),
    "logic" => Some(PuzzleKind::Logic),
    "history" => Some(PuzzleKind::History),
    "science" => Some(PuzzleKind::Science),
    "psychology" => Some(PuzzleKind::Psychology),
    "music" => Some(PuzzleKind::Music),
    _ => None,
  }
}

fn difficulty_from_str(s: &str) -> Option<Difficulty> {
  match s.trim().to_lowercase().as_str() {
    "easy" => Some(Difficulty::Easy),
    "medium" => Some(Difficulty::Medium),
    "hard" => Some(Difficulty::Hard),
    _ => None,
  }
}

/// HF responses come back as `[{"generated_text": ...}]`, as a bare object,
/// or as plain text depending on the model. Unwrap what we can.
fn extract_generated_text(body: &str) -> String {
  match serde_json::from_str::<Value>(body) {
    Ok(Value::Array(items)) => items
      .first()
      .and_then(|v| v.get("generated_text"))
      .and_then(|v| v.as_str())
      .map(|s| s.to_string())
      .unwrap_or_else(|| body.to_string()),
    Ok(Value::Object(map)) => map
      .get("generated_text")
      .and_then(|v| v.as_str())
      .map(|s| s.to_string())
      .unwrap_or_else(|| body.to_string()),
    Ok(Value::String(s)) => s,
    _ => body.to_string(),
  }
}

/// Parse the model output into a draft. Primary mode: a JSON object with the
/// draft fields. Secondary mode: `Q:` / `A:` / `HINT:` line extraction.
/// A draft without a question and an answer is unusable.
pub fn parse_generated_text(text: &str) -> Result<PuzzleDraft, String> {
  let trimmed = text.trim();
  if let Ok(draft) = serde_json::from_str::<PuzzleDraft>(trimmed) {
    return Ok(draft);
  }

  let q_re = Regex::new(r"(?m)^\s*Q:\s*(.+)$").map_err(|e| e.to_string())?;
  let a_re = Regex::new(r"(?m)^\s*A:\s*(.+)$").map_err(|e| e.to_string())?;
  let h_re = Regex::new(r"(?m)^\s*HINT:\s*(.+)$").map_err(|e| e.to_string())?;

  let grab = |re: &Regex| {
    re.captures(trimmed)
      .and_then(|c| c.get(1))
      .map(|m| m.as_str().trim().to_string())
  };

  let question = grab(&q_re).ok_or_else(|| "no Q: line in model output".to_string())?;
  let answer = grab(&a_re).ok_or_else(|| "no A: line in model output".to_string())?;

  Ok(PuzzleDraft {
    question,
    answer,
    hint: grab(&h_re),
    category: None,
    points: None,
    difficulty: None,
  })
}

fn draft_to_puzzle(
  draft: PuzzleDraft,
  requested_kind: PuzzleKind,
  requested_difficulty: Difficulty,
  default_points: u32,
) -> Puzzle {
  Puzzle {
    // The "gen-" prefix marks the entry as ephemeral, never a catalog id.
    id: format!("gen-{}", Uuid::new_v4()),
    kind: draft.category.as_deref().and_then(kind_from_str).unwrap_or(requested_kind),
    source: PuzzleSource::Generated,
    question: draft.question,
    answer: draft.answer,
    hint: draft.hint.unwrap_or_else(|| "Think hard!".into()),
    points: draft.points.unwrap_or(default_points),
    difficulty: draft
      .difficulty
      .as_deref()
      .and_then(difficulty_from_str)
      .unwrap_or(requested_difficulty),
  }
}

/// Try to extract a clean error message from an HF error body.
fn extract_hf_error(body: &str) -> Option<String> {
  serde_json::from_str::<Value>(body)
    .ok()?
    .get("error")
    .and_then(|e| e.as_str().map(|s| s.to_string()))
}
