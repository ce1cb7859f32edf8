//! Domain models: puzzles, facts, ratings, user stats, and history records.

use serde::{Deserialize, Serialize};

/// What kind of puzzle is presented to the user?
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PuzzleKind {
  Riddle,
  Word,
  Math,
  Logic,
  History,
  Science,
  Psychology,
  Music,
}

impl PuzzleKind {
  pub const ALL: [PuzzleKind; 8] = [
    PuzzleKind::Riddle,
    PuzzleKind::Word,
    PuzzleKind::Math,
    PuzzleKind::Logic,
    PuzzleKind::History,
    PuzzleKind::Science,
    PuzzleKind::Psychology,
    PuzzleKind::Music,
  ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  /// Numeric rank used by the level gate: easy=1, medium=2, hard=3.
  pub fn rank(self) -> u32 {
    match self {
      Difficulty::Easy => 1,
      Difficulty::Medium => 2,
      Difficulty::Hard => 3,
    }
  }

  pub fn from_rank(rank: u32) -> Difficulty {
    match rank {
      0 | 1 => Difficulty::Easy,
      2 => Difficulty::Medium,
      _ => Difficulty::Hard,
    }
  }
}

/// Where did the puzzle come from?
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PuzzleSource {
  Catalog,    // built-in catalog entry
  ConfigBank, // from user-provided TOML bank
  Generated,  // generated via the remote text model, ephemeral
}

/// Immutable puzzle entry. Catalog entries are static; generated entries live
/// only for one practice round and carry a distinct id prefix.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Puzzle {
  pub id: String,
  pub kind: PuzzleKind,
  pub source: PuzzleSource,
  pub question: String,
  pub answer: String,
  pub hint: String,
  pub points: u32,
  pub difficulty: Difficulty,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactCategory {
  Science,
  Psychology,
  Culture,
  History,
  Nature,
}

/// A discovery-box fact. `difficulty_level` gates eligibility by user level;
/// `fun_level` is presentation only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Fact {
  pub id: String,
  pub category: FactCategory,
  pub title: String,
  pub content: String,
  pub fun_level: u32,        // 1-10
  pub difficulty_level: u32, // 1-5
}

/// One entry of the append-only rating log (at most one per calendar day,
/// gated by the day-scoped rated flag).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRating {
  pub fact_id: String,
  pub rating: u32, // 1-5
  pub category: FactCategory,
  pub timestamp: i64,
}

/// The single mutable stats record. Owned by the progression calculator;
/// never deleted, only reset on a storage-schema version bump.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserStats {
  pub level: u32,
  pub points: u32,
  pub boxes_opened: u32,
  pub streak: u32,
  pub total_correct_answers: u32,
}

impl Default for UserStats {
  fn default() -> Self {
    Self { level: 1, points: 0, boxes_opened: 0, streak: 0, total_correct_answers: 0 }
  }
}

/// One entry of the append-only box-opening history.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoxOpenEntry {
  pub date: String,
  pub timestamp: i64,
}

/// Per-day practice bookkeeping; resets whenever the stored date differs from
/// the current date.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PracticeMeta {
  pub date: String,
  pub count: u32,
}

/// Shape of a remotely generated puzzle before it becomes a `Puzzle`.
/// Everything beyond question/answer is optional; the generator fills gaps.
#[derive(Clone, Debug, Deserialize)]
pub struct PuzzleDraft {
  pub question: String,
  pub answer: String,
  #[serde(default)] pub hint: Option<String>,
  #[serde(default)] pub category: Option<String>,
  #[serde(default)] pub points: Option<u32>,
  #[serde(default)] pub difficulty: Option<String>,
}
