//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{BoxOpenEntry, Difficulty, Fact, FactCategory, Puzzle, PuzzleKind, PuzzleSource};
use crate::logic::{
    AnswerOutcome, BoxOutcome, LeaderboardRow, LevelUpOutcome, PracticeStartOutcome, RateOutcome,
    StatsSnapshot,
};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    DailyPuzzle,
    StartPractice,
    SubmitAnswer {
        answer: String,
        #[serde(default)]
        practice: bool,
    },
    Stats,
    OpenBox,
    TodayFact,
    RateFact {
        rating: u32,
    },
    LevelUp,
    BoxHistory,
    Leaderboard,
    Generate {
        prompt: String,
        model: Option<String>,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Puzzle {
        puzzle: Option<PuzzleOut>,
        completed_today: bool,
        attempts: u32,
    },
    PracticeStart {
        puzzle: Option<PuzzleOut>,
        remaining_today: u32,
        message: String,
    },
    AnswerResult {
        correct: bool,
        points_awarded: u32,
        attempts: u32,
        completed_today: bool,
        message: String,
    },
    Stats {
        stats: StatsOut,
    },
    BoxOpened {
        fact: Option<FactOut>,
        boxes_opened: u32,
        message: String,
    },
    Fact {
        fact: Option<FactOut>,
    },
    RateResult {
        ok: bool,
        message: String,
    },
    LevelUpResult {
        ok: bool,
        level: u32,
        points: u32,
        message: String,
    },
    BoxHistory {
        entries: Vec<BoxOpenEntry>,
    },
    Leaderboard {
        rows: Vec<LeaderboardRowOut>,
    },
    Generated {
        text: String,
    },
    Error {
        message: String,
    },
}

/// DTO used by both WS and HTTP for puzzle delivery. The answer stays
/// server-side; clients only ever see question, hint, and metadata.
#[derive(Debug, Serialize)]
pub struct PuzzleOut {
    pub id: String,
    pub kind: PuzzleKind,
    pub source: PuzzleSource,
    pub question: String,
    pub hint: String,
    pub points: u32,
    pub difficulty: Difficulty,
}

/// Convert full `Puzzle` (internal) to the public DTO.
pub fn to_out(p: &Puzzle) -> PuzzleOut {
    PuzzleOut {
        id: p.id.clone(),
        kind: p.kind,
        source: p.source,
        question: p.question.clone(),
        hint: p.hint.clone(),
        points: p.points,
        difficulty: p.difficulty,
    }
}

#[derive(Debug, Serialize)]
pub struct FactOut {
    pub id: String,
    pub category: FactCategory,
    pub title: String,
    pub content: String,
    pub fun_level: u32,
}

pub fn fact_to_out(f: &Fact) -> FactOut {
    FactOut {
        id: f.id.clone(),
        category: f.category,
        title: f.title.clone(),
        content: f.content.clone(),
        fun_level: f.fun_level,
    }
}

#[derive(Debug, Serialize)]
pub struct StatsOut {
    pub level: u32,
    pub points: u32,
    pub streak: u32,
    pub total_correct_answers: u32,
    pub boxes_opened: u32,
    pub points_to_next_level: u32,
    pub can_level_up: bool,
    pub practice_count: u32,
    pub practice_remaining: u32,
    pub practice_locked: bool,
    pub completed_today: bool,
    pub box_opened_today: bool,
    pub fact_rated_today: bool,
}

pub fn stats_to_out(s: &StatsSnapshot) -> StatsOut {
    StatsOut {
        level: s.stats.level,
        points: s.stats.points,
        streak: s.stats.streak,
        total_correct_answers: s.stats.total_correct_answers,
        boxes_opened: s.stats.boxes_opened,
        points_to_next_level: s.points_to_next_level,
        can_level_up: s.can_level_up,
        practice_count: s.practice_count,
        practice_remaining: s.practice_remaining,
        practice_locked: s.practice_locked,
        completed_today: s.completed_today,
        box_opened_today: s.box_opened_today,
        fact_rated_today: s.fact_rated_today,
    }
}

#[derive(Debug, Serialize)]
pub struct LeaderboardRowOut {
    pub rank: u32,
    pub name: String,
    pub level: u32,
    pub points: u32,
    pub streak: u32,
    pub is_you: bool,
}

pub fn leaderboard_to_out(rows: Vec<LeaderboardRow>) -> Vec<LeaderboardRowOut> {
    rows.into_iter()
        .map(|r| LeaderboardRowOut {
            rank: r.rank,
            name: r.name,
            level: r.level,
            points: r.points,
            streak: r.streak,
            is_you: r.is_you,
        })
        .collect()
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Serialize)]
pub struct DailyOut {
    pub puzzle: Option<PuzzleOut>,
    pub completed_today: bool,
    pub attempts: u32,
}

#[derive(Debug, Serialize)]
pub struct PracticeOut {
    pub puzzle: Option<PuzzleOut>,
    pub remaining_today: u32,
    pub message: String,
}

pub fn practice_to_out(o: PracticeStartOutcome) -> PracticeOut {
    PracticeOut {
        puzzle: o.puzzle.as_ref().map(to_out),
        remaining_today: o.remaining_today,
        message: o.message,
    }
}

#[derive(Deserialize)]
pub struct AnswerIn {
    pub answer: String,
    #[serde(default)]
    pub practice: bool,
}

#[derive(Serialize)]
pub struct AnswerOut {
    pub correct: bool,
    pub points_awarded: u32,
    pub attempts: u32,
    pub completed_today: bool,
    pub message: String,
}

pub fn answer_to_out(o: AnswerOutcome) -> AnswerOut {
    AnswerOut {
        correct: o.correct,
        points_awarded: o.points_awarded,
        attempts: o.attempts,
        completed_today: o.completed_today,
        message: o.message,
    }
}

#[derive(Serialize)]
pub struct BoxOpenOut {
    pub fact: Option<FactOut>,
    pub boxes_opened: u32,
    pub message: String,
}

pub fn box_to_out(o: BoxOutcome) -> BoxOpenOut {
    BoxOpenOut {
        fact: o.fact.as_ref().map(fact_to_out),
        boxes_opened: o.boxes_opened,
        message: o.message,
    }
}

#[derive(Serialize)]
pub struct TodayFactOut {
    pub fact: Option<FactOut>,
}

#[derive(Deserialize)]
pub struct RateIn {
    pub rating: u32,
}

#[derive(Serialize)]
pub struct RateOut {
    pub ok: bool,
    pub message: String,
}

pub fn rate_to_out(o: RateOutcome) -> RateOut {
    RateOut { ok: o.ok, message: o.message }
}

#[derive(Serialize)]
pub struct LevelUpOut {
    pub ok: bool,
    pub level: u32,
    pub points: u32,
    pub message: String,
}

pub fn level_up_to_out(o: LevelUpOutcome) -> LevelUpOut {
    LevelUpOut { ok: o.ok, level: o.level, points: o.points, message: o.message }
}

#[derive(Serialize)]
pub struct BoxHistoryOut {
    pub entries: Vec<BoxOpenEntry>,
}

#[derive(Serialize)]
pub struct LeaderboardOut {
    pub rows: Vec<LeaderboardRowOut>,
}

#[derive(Deserialize)]
pub struct GenerateIn {
    pub prompt: String,
    pub model: Option<String>,
}

#[derive(Serialize)]
pub struct GenerateOut {
    pub text: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
