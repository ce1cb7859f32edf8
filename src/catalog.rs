//! Built-in content: the puzzle catalog, the fact catalog, the always-available
//! fallback facts, and the leaderboard seed roster.
//!
//! Catalog entries are static so the daily pick stays a pure function of the
//! calendar date. Extra entries can be appended from the TOML config bank,
//! which grows the catalogs but never reorders the built-ins.

use crate::domain::{Difficulty, Fact, FactCategory, Puzzle, PuzzleKind, PuzzleSource};

fn p(
  id: &str,
  kind: PuzzleKind,
  question: &str,
  answer: &str,
  hint: &str,
  points: u32,
  difficulty: Difficulty,
) -> Puzzle {
  Puzzle {
    id: id.into(),
    kind,
    source: PuzzleSource::Catalog,
    question: question.into(),
    answer: answer.into(),
    hint: hint.into(),
    points,
    difficulty,
  }
}

/// The built-in puzzle catalog. Order matters: the daily index is taken
/// modulo this list's length.
pub fn puzzle_catalog() -> Vec<Puzzle> {
  use Difficulty::{Easy, Hard, Medium};
  vec![
    p("1", PuzzleKind::Riddle,
      "I am the silence between notes that gives music meaning, the pause between words that creates emphasis, and the space between thoughts that allows understanding. What am I?",
      "rest",
      "Think about what gives structure to time-based art forms.",
      50, Hard),
    p("2", PuzzleKind::Word,
      "What English word becomes shorter when you add two letters to it?",
      "short",
      "Think literally about the word's meaning when letters are added.",
      45, Medium),
    p("3", PuzzleKind::Logic,
      "In a room of 23 people, what's the probability that at least two share the same birthday?",
      "50%",
      "This famous paradox seems counterintuitive - think about all possible pairs.",
      60, Hard),
    p("4", PuzzleKind::Math,
      "What is the only number that is equal to the sum of its digits raised to consecutive powers starting from 1?",
      "135",
      "Try: 1^1 + 3^2 + 5^3",
      55, Hard),
    p("5", PuzzleKind::History,
      "Which Byzantine Emperor's legal code became the foundation for modern European law and is still studied today?",
      "justinian",
      "His code was compiled around 529-534 CE and influenced legal systems for over 1000 years.",
      50, Medium),
    p("6", PuzzleKind::Science,
      "What quantum phenomenon allows particles to instantaneously affect each other regardless of distance?",
      "entanglement",
      "Einstein called it 'spooky action at a distance' but it's now proven real.",
      45, Medium),
    p("7", PuzzleKind::Psychology,
      "What cognitive bias causes people to overestimate their ability to predict outcomes after they've already occurred?",
      "hindsight bias",
      "Also known as the 'I-knew-it-all-along' effect.",
      40, Medium),
    p("8", PuzzleKind::Music,
      "What musical interval, when inverted, creates its complement to reach an octave?",
      "tritone",
      "This 'devil's interval' inverts to itself - 6 semitones up or down.",
      55, Hard),
    p("9", PuzzleKind::Riddle,
      "I am not visible, yet I shape everything you see. I have no mass, yet I bend light. I can be curved, folded, and torn. What am I?",
      "spacetime",
      "Einstein showed that this fabric of reality can be manipulated by mass and energy.",
      65, Hard),
    p("10", PuzzleKind::History,
      "What ancient trading network connected civilizations from Rome to China, but was never actually a single road?",
      "silk road",
      "Named by a 19th-century German geographer, this was actually multiple routes.",
      35, Medium),
    p("11", PuzzleKind::Science,
      "What recently discovered state of matter occurs when atoms are cooled to near absolute zero and begin to behave as a single quantum entity?",
      "bose-einstein condensate",
      "Predicted in 1924-25, first created in 1995, earning a Nobel Prize in 2001.",
      60, Hard),
    p("12", PuzzleKind::Logic,
      "In the Monty Hall problem, should you switch doors after the host opens a losing door?",
      "yes",
      "Your chance doubles from 1/3 to 2/3 if you switch.",
      40, Medium),
    p("13", PuzzleKind::Word,
      "What word can be a noun meaning 'a small stream' and a verb meaning 'to tolerate'?",
      "brook",
      "One meaning involves water, the other involves patience.",
      35, Medium),
    p("14", PuzzleKind::Math,
      "What is the name for a number that equals the sum of its proper divisors?",
      "perfect",
      "The first few are 6, 28, 496... they're quite rare.",
      45, Medium),
    p("15", PuzzleKind::Psychology,
      "What phenomenon explains why people in groups tend to make more extreme decisions than individuals?",
      "polarization",
      "Groups amplify the initial tendencies of their members.",
      45, Medium),
    p("16", PuzzleKind::History,
      "Which lost civilization built the massive stone heads on Easter Island using a 'walking' technique?",
      "rapa nui",
      "Recent experiments proved the statues could be 'walked' upright using ropes.",
      50, Medium),
    p("17", PuzzleKind::Science,
      "What type of stellar remnant is so dense that a teaspoon would weigh as much as Mount Everest?",
      "neutron star",
      "These form when massive stars collapse, creating matter made entirely of neutrons.",
      45, Medium),
    p("18", PuzzleKind::Riddle,
      "I exist only in potential until observed, I can be in multiple states simultaneously, yet measurement forces me to choose. What am I?",
      "quantum superposition",
      "Schrödinger's famous thought experiment illustrates this principle.",
      70, Hard),
    p("19", PuzzleKind::Music,
      "What tuning system divides the octave into 12 equal parts, allowing music to be played in any key?",
      "equal temperament",
      "This compromise system replaced pure mathematical ratios for practical flexibility.",
      50, Medium),
    p("20", PuzzleKind::Logic,
      "What paradox demonstrates that a set of all sets that do not contain themselves creates a logical contradiction?",
      "russell's paradox",
      "If such a set contains itself, it shouldn't; if it doesn't, it should.",
      65, Hard),
    // A few easy warm-ups so level-1 users have a practice pool.
    p("21", PuzzleKind::Word,
      "What five-letter word becomes shorter with the same pronunciation when you remove its last four letters?",
      "queue",
      "Think of waiting in line.",
      20, Easy),
    p("22", PuzzleKind::Math,
      "What is the smallest prime number?",
      "2",
      "It is also the only even one.",
      15, Easy),
    p("23", PuzzleKind::Riddle,
      "What has keys but can't open locks?",
      "piano",
      "It also has pedals but no wheels.",
      15, Easy),
    p("24", PuzzleKind::Science,
      "What planet is known as the Red Planet?",
      "mars",
      "Its color comes from iron oxide dust.",
      15, Easy),
  ]
}

fn f(
  id: &str,
  category: FactCategory,
  title: &str,
  content: &str,
  fun_level: u32,
  difficulty_level: u32,
) -> Fact {
  Fact {
    id: id.into(),
    category,
    title: title.into(),
    content: content.into(),
    fun_level,
    difficulty_level,
  }
}

/// The built-in fact catalog revealed by the discovery box.
pub fn fact_catalog() -> Vec<Fact> {
  vec![
    f("1", FactCategory::Science, "Octopuses Have Three Hearts",
      "Octopuses have three hearts! Two pump blood to the gills, while the third pumps blood to the rest of the body. Interestingly, the main heart stops beating when they swim, which is why they prefer crawling to avoid exhaustion.",
      9, 1),
    f("2", FactCategory::Psychology, "The Paradox of Choice",
      "Having too many options can actually make us less happy with our decisions. Psychologist Barry Schwartz found that when faced with 24 varieties of jam, only 3% of customers made a purchase, compared to 30% when offered just 6 varieties.",
      8, 2),
    f("3", FactCategory::Culture, "The Japanese Art of Forest Bathing",
      "In Japan, \"Shinrin-yoku\" or forest bathing is a recognized form of therapy. Simply spending mindful time in forests has been scientifically proven to reduce stress hormones, boost immune function, and improve overall well-being.",
      7, 1),
    f("4", FactCategory::History, "Cleopatra Lived Closer to Moon Landing",
      "Cleopatra lived closer in time to the Moon landing (1969) than to the construction of the Great Pyramid of Giza. The pyramid was built around 2580-2560 BCE, while Cleopatra lived from 69-30 BCE - a difference of about 2,500 years!",
      10, 2),
    f("5", FactCategory::Nature, "Trees Can Communicate",
      "Trees in forests communicate through an underground network called the \"Wood Wide Web.\" Through fungal networks connected to their roots, they can share nutrients, warn each other of dangers, and even help nurture their young.",
      9, 1),
    f("6", FactCategory::Science, "Your Body Glows in the Dark",
      "Humans actually emit a faint visible light through bioluminescence, but it's about 1,000 times weaker than what our eyes can detect. The glow is strongest around your mouth and cheeks, and it fluctuates throughout the day.",
      8, 3),
    f("7", FactCategory::Psychology, "The Reminiscence Bump",
      "People remember events from their teens and twenties more vividly than other periods of their life. This \"reminiscence bump\" occurs because this is when we form our identity and experience many \"firsts\" - first love, first job, first independence.",
      7, 3),
  ]
}

/// Absolute last-resort facts: always eligible regardless of level, so the
/// discovery box can never come up empty.
pub fn fallback_facts() -> Vec<Fact> {
  vec![
    f("fb-1", FactCategory::Science, "Honey Never Spoils",
      "Archaeologists have found pots of honey in ancient Egyptian tombs that are over 3,000 years old and still perfectly edible. Honey's low moisture and acidity make it one of the only foods that never goes bad.",
      8, 1),
    f("fb-2", FactCategory::Nature, "Bananas Are Berries",
      "Botanically speaking, bananas are berries but strawberries are not. A true berry develops from a single flower with one ovary, which is exactly how a banana grows.",
      7, 1),
    f("fb-3", FactCategory::History, "Oxford Is Older Than the Aztecs",
      "Teaching at the University of Oxford began around 1096, while the Aztec city of Tenochtitlan was founded in 1325. The university predates the empire by more than two centuries.",
      8, 1),
  ]
}

#[derive(Clone, Debug)]
pub struct LeaderboardSeed {
  pub name: &'static str,
  pub level: u32,
  pub points: u32,
  pub streak: u32,
}

/// Fixed roster merged with the live user on the leaderboard tab.
pub fn leaderboard_seeds() -> Vec<LeaderboardSeed> {
  vec![
    LeaderboardSeed { name: "Sarah Chen", level: 12, points: 1250, streak: 15 },
    LeaderboardSeed { name: "Alex Johnson", level: 10, points: 980, streak: 8 },
    LeaderboardSeed { name: "Maya Patel", level: 9, points: 875, streak: 12 },
    LeaderboardSeed { name: "David Kim", level: 8, points: 720, streak: 5 },
    LeaderboardSeed { name: "Emma Wilson", level: 7, points: 650, streak: 9 },
    LeaderboardSeed { name: "Michael Brown", level: 6, points: 540, streak: 3 },
  ]
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn catalogs_are_non_empty_with_unique_ids() {
    let puzzles = puzzle_catalog();
    assert!(!puzzles.is_empty());
    let ids: HashSet<_> = puzzles.iter().map(|p| p.id.clone()).collect();
    assert_eq!(ids.len(), puzzles.len());

    let facts = fact_catalog();
    assert!(!facts.is_empty());
    let ids: HashSet<_> = facts.iter().map(|f| f.id.clone()).collect();
    assert_eq!(ids.len(), facts.len());
  }

  #[test]
  fn level_one_always_has_a_practice_pool() {
    // Level 1 gates practice to easy puzzles; the catalog must contain some.
    assert!(puzzle_catalog().iter().any(|p| p.difficulty.rank() == 1));
  }

  #[test]
  fn fact_levels_stay_in_range() {
    for fact in fact_catalog().into_iter().chain(fallback_facts()) {
      assert!((1..=10).contains(&fact.fun_level), "fact {}", fact.id);
      assert!((1..=5).contains(&fact.difficulty_level), "fact {}", fact.id);
    }
  }

  #[test]
  fn fallback_facts_are_always_eligible() {
    // The last-resort list must pass the strictest gate (level 1 => max 1).
    assert!(fallback_facts().iter().all(|f| f.difficulty_level == 1));
  }
}
