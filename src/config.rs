//! Loading service configuration (generation prompt + optional content bank)
//! from TOML.
//!
//! See `WonderboxConfig` for the expected schema.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{Difficulty, FactCategory, PuzzleKind};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct WonderboxConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub puzzles: Vec<PuzzleCfg>,
  #[serde(default)]
  pub facts: Vec<FactCfg>,
}

/// Extra puzzle entry accepted in TOML configuration; appended to the
/// built-in catalog at startup.
#[derive(Clone, Debug, Deserialize)]
pub struct PuzzleCfg {
  #[serde(default)] pub id: Option<String>,
  pub kind: PuzzleKind,
  pub question: String,
  pub answer: String,
  #[serde(default)] pub hint: Option<String>,
  #[serde(default)] pub points: Option<u32>,
  pub difficulty: Difficulty,
}

/// Extra fact entry accepted in TOML configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct FactCfg {
  #[serde(default)] pub id: Option<String>,
  pub category: FactCategory,
  pub title: String,
  pub content: String,
  #[serde(default = "default_fun_level")] pub fun_level: u32,
  #[serde(default = "default_difficulty_level")] pub difficulty_level: u32,
}

fn default_fun_level() -> u32 { 5 }
fn default_difficulty_level() -> u32 { 1 }

/// Prompt template sent to the text-generation relay when the local practice
/// pool runs dry. Override in TOML to tune tone/structure.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  pub generate_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      generate_template: "Generate a {difficulty} {category} trivia or logic puzzle. Provide:\nQ: (question)\nA: (answer)\nHINT: (hint)\nThe answer must be one word/short phrase if possible.".into(),
    }
  }
}

/// Attempt to load `WonderboxConfig` from WONDERBOX_CONFIG_PATH.
/// On any parsing/IO error, returns None.
pub fn load_config_from_env() -> Option<WonderboxConfig> {
  let path = std::env::var("WONDERBOX_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<WonderboxConfig>(&s) {
      Ok(cfg) => {
        info!(target: "wonderbox_backend", %path, "Loaded config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "wonderbox_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "wonderbox_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bank_entries_parse_with_defaults() {
    let cfg: WonderboxConfig = toml::from_str(
      r#"
      [[puzzles]]
      kind = "word"
      question = "What word is spelled incorrectly in every dictionary?"
      answer = "incorrectly"
      difficulty = "easy"

      [[facts]]
      category = "nature"
      title = "Wombat Cubes"
      content = "Wombats produce cube-shaped droppings."
      "#,
    )
    .expect("toml parses");

    assert_eq!(cfg.puzzles.len(), 1);
    assert!(cfg.puzzles[0].hint.is_none());
    assert_eq!(cfg.facts[0].fun_level, 5);
    assert_eq!(cfg.facts[0].difficulty_level, 1);
    assert!(cfg.prompts.generate_template.contains("{difficulty}"));
  }
}
