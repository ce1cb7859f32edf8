//! Application state: catalogs, the persisted store, the clock, the optional
//! remote generator, and the in-memory round bookkeeping.
//!
//! Attempt counters for the active rounds are ephemeral by design (they reset
//! with the process, like the original per-round state); everything durable
//! lives in the `Store`.

use std::sync::Arc;

use rand::seq::SliceRandom;
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::clock::{date_key, day_of_year0, Clock, SystemClock};
use crate::config::{load_config_from_env, Prompts, WonderboxConfig};
use crate::domain::{Fact, Puzzle, PuzzleKind, PuzzleSource};
use crate::generator::{points_for_rank, Generator};
use crate::selection::{any_puzzle, daily_puzzle, pick_practice, practice_pool};
use crate::store::Store;
use crate::{catalog, selection};

/// An in-flight practice round: the served puzzle plus its attempt count.
#[derive(Clone, Debug)]
pub struct PracticeRound {
    pub puzzle: Puzzle,
    pub attempts: u32,
}

#[derive(Default)]
struct Rounds {
    daily_date: String,
    daily_attempts: u32,
    practice: Option<PracticeRound>,
}

pub struct AppState {
    pub store: Store,
    pub clock: Arc<dyn Clock>,
    pub generator: Option<Generator>,
    pub prompts: Prompts,
    puzzles: Vec<Puzzle>,
    facts: Vec<Fact>,
    fallback_facts: Vec<Fact>,
    leaderboard_seeds: Vec<catalog::LeaderboardSeed>,
    rounds: RwLock<Rounds>,
}

impl AppState {
    /// Build state from env: storage backend, TOML config bank, generator.
    #[instrument(level = "info", skip_all)]
    pub fn from_env() -> Self {
        let store = Store::from_env();
        let cfg = load_config_from_env();
        let generator = Generator::from_env();
        if let Some(g) = &generator {
            info!(target: "wonderbox_backend", base_url = %g.base_url, model = %g.model, "Remote generation enabled.");
        } else {
            info!(target: "wonderbox_backend", "Remote generation disabled (no HF_API_KEY). Practice falls back to the local catalog.");
        }
        Self::new(store, Arc::new(SystemClock), generator, cfg)
    }

    pub fn new(
        store: Store,
        clock: Arc<dyn Clock>,
        generator: Option<Generator>,
        cfg: Option<WonderboxConfig>,
    ) -> Self {
        let prompts = cfg.as_ref().map(|c| c.prompts.clone()).unwrap_or_default();

        let mut puzzles = catalog::puzzle_catalog();
        let mut facts = catalog::fact_catalog();

        // Append config-bank entries without disturbing built-in order
        // (the daily index depends on it).
        if let Some(cfg) = &cfg {
            for pc in &cfg.puzzles {
                if pc.question.trim().is_empty() || pc.answer.trim().is_empty() {
                    error!(target: "puzzle", "Skipping bank puzzle: empty question or answer.");
                    continue;
                }
                let id = pc.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
                if puzzles.iter().any(|p| p.id == id) {
                    warn!(target: "puzzle", %id, "Skipping bank puzzle: duplicate id.");
                    continue;
                }
                puzzles.push(Puzzle {
                    id,
                    kind: pc.kind,
                    source: PuzzleSource::ConfigBank,
                    question: pc.question.clone(),
                    answer: pc.answer.clone(),
                    hint: pc.hint.clone().unwrap_or_default(),
                    points: pc.points.unwrap_or_else(|| points_for_rank(pc.difficulty.rank())),
                    difficulty: pc.difficulty,
                });
            }
            for fc in &cfg.facts {
                let id = fc.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
                if facts.iter().any(|f| f.id == id) {
                    warn!(target: "discovery", %id, "Skipping bank fact: duplicate id.");
                    continue;
                }
                facts.push(Fact {
                    id,
                    category: fc.category,
                    title: fc.title.clone(),
                    content: fc.content.clone(),
                    fun_level: fc.fun_level.clamp(1, 10),
                    difficulty_level: fc.difficulty_level.clamp(1, 5),
                });
            }
        }

        // Startup inventory by difficulty/source.
        let bank = puzzles.iter().filter(|p| p.source == PuzzleSource::ConfigBank).count();
        info!(
            target: "puzzle",
            catalog = puzzles.len() - bank,
            config_bank = bank,
            facts = facts.len(),
            "Startup content inventory"
        );

        Self {
            store,
            clock,
            generator,
            prompts,
            puzzles,
            facts,
            fallback_facts: catalog::fallback_facts(),
            leaderboard_seeds: catalog::leaderboard_seeds(),
            rounds: RwLock::new(Rounds::default()),
        }
    }

    pub fn puzzles(&self) -> &[Puzzle] {
        &self.puzzles
    }

    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    pub fn fallback_facts(&self) -> &[Fact] {
        &self.fallback_facts
    }

    pub fn leaderboard_seeds(&self) -> &[catalog::LeaderboardSeed] {
        &self.leaderboard_seeds
    }

    pub fn today_key(&self) -> String {
        date_key(self.clock.today())
    }

    pub fn day_of_year(&self) -> u32 {
        day_of_year0(self.clock.today())
    }

    /// Today's puzzle: a pure function of the calendar date.
    pub fn daily(&self) -> Option<&Puzzle> {
        daily_puzzle(&self.puzzles, self.day_of_year())
    }

    /// Attempts logged against today's daily puzzle; the counter rolls over
    /// with the calendar date.
    pub async fn daily_attempts(&self) -> u32 {
        let today = self.today_key();
        let mut rounds = self.rounds.write().await;
        if rounds.daily_date != today {
            rounds.daily_date = today;
            rounds.daily_attempts = 0;
        }
        rounds.daily_attempts
    }

    pub async fn bump_daily_attempts(&self) -> u32 {
        let today = self.today_key();
        let mut rounds = self.rounds.write().await;
        if rounds.daily_date != today {
            rounds.daily_date = today;
            rounds.daily_attempts = 0;
        }
        rounds.daily_attempts += 1;
        rounds.daily_attempts
    }

    pub async fn practice_round(&self) -> Option<PracticeRound> {
        self.rounds.read().await.practice.clone()
    }

    pub async fn set_practice_round(&self, puzzle: Puzzle) {
        self.rounds.write().await.practice = Some(PracticeRound { puzzle, attempts: 0 });
    }

    pub async fn bump_practice_attempts(&self) -> Option<u32> {
        let mut rounds = self.rounds.write().await;
        let round = rounds.practice.as_mut()?;
        round.attempts += 1;
        Some(round.attempts)
    }

    pub async fn clear_practice_round(&self) {
        self.rounds.write().await.practice = None;
    }

    /// Practice selection policy, graceful-degradation order:
    /// unused-and-suitable catalog entry -> remote generation -> any catalog
    /// entry (repeats allowed). Returns None only with an empty catalog.
    #[instrument(level = "info", skip(self), fields(%level))]
    pub async fn choose_practice_puzzle(&self, level: u32) -> Option<(Puzzle, &'static str)> {
        let today = self.today_key();
        let used = self.store.practice_used(&today).await;

        let picked = {
            let pool = practice_pool(&self.puzzles, level, &used);
            let mut rng = rand::thread_rng();
            pick_practice(&pool, &mut rng).cloned()
        };
        if let Some(p) = picked {
            info!(target: "puzzle", %level, chosen = %p.id, source = "local_pool", "Practice puzzle selected");
            return Some((p, "local_pool"));
        }

        if let Some(generator) = &self.generator {
            let kind = {
                let mut rng = rand::thread_rng();
                PuzzleKind::ALL.choose(&mut rng).copied().unwrap_or(PuzzleKind::Riddle)
            };
            match generator.generate_puzzle(&self.prompts, level, kind).await {
                Ok(p) => {
                    info!(target: "puzzle", %level, chosen = %p.id, source = "generated", "Practice puzzle generated");
                    return Some((p, "generated"));
                }
                Err(e) => {
                    error!(target: "puzzle", %level, error = %e, "Remote generation failed; falling back to any catalog entry");
                }
            }
        }

        // Last resort: repeats are allowed rather than failing the round.
        let any = {
            let mut rng = rand::thread_rng();
            any_puzzle(&self.puzzles, &mut rng).cloned()
        };
        let p = any?;
        warn!(target: "puzzle", %level, chosen = %p.id, source = "any_catalog", "Practice pool exhausted; serving a possible repeat");
        Some((p, "any_catalog"))
    }

    /// Today's fact under current preferences (pure given the day snapshot).
    pub fn select_fact_for<'a>(
        &'a self,
        level: u32,
        prefs: &std::collections::HashMap<crate::domain::FactCategory, f64>,
    ) -> Option<&'a Fact> {
        selection::select_fact(&self.facts, &self.fallback_facts, level, prefs, self.day_of_year())
    }

    pub fn fact_by_id(&self, id: &str) -> Option<&Fact> {
        self.facts
            .iter()
            .find(|f| f.id == id)
            .or_else(|| self.fallback_facts.iter().find(|f| f.id == id))
    }
}
