//! Spelling-Grid Engine
//!
//! A picture prompts a word; a letter grid hides the word's letters among
//! random fillers. Letters must be clicked in strict left-to-right order.
//! Wrong clicks are counted but never scored against — the clock is the
//! only pressure. Each finished round banks a flat fifteen points; the last
//! round adds the seconds still on the clock. The color variant shows a
//! carrier sentence and scaffolds the first letter.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::catalog::content::SpellingEntry;
use crate::catalog::level::{SpellingVariant, StageConfig, StageParams};
use crate::core::rng::DeterministicRng;
use super::action::PlayerAction;
use super::engine::{
    confirm_timeout, countdown_step, enter_completed, report_finish,
    MiniGame, Phase, StepOutcome, TimerKind, TimerRequest,
};
use super::events::EngineEvent;

/// Flat points banked per completed round.
const ROUND_POINTS: u32 = 15;
/// Success pause between rounds.
const ROUND_PAUSE_MS: u64 = 1_500;
/// Success display delay before the final score is reported.
const FINISH_DELAY_MS: u64 = 1_000;

/// One clickable cell in the letter grid.
#[derive(Clone, Debug, Serialize)]
pub struct GridCell {
    /// Cell id within the grid.
    pub id: u32,
    /// The letter shown.
    pub ch: char,
    /// For target letters, their position in the word; None for fillers.
    pub target_index: Option<usize>,
}

/// One round: a word, its prompt and its generated grid.
#[derive(Clone, Debug, Serialize)]
pub struct SpellingRound {
    /// Pool entry id.
    pub entry: u32,
    /// The word to spell, uppercase.
    pub word: String,
    /// Asset key for the prompt picture.
    pub image: String,
    /// Carrier sentence (color variant).
    pub sentence: Option<String>,
    /// The letter grid, in display order.
    pub grid: Vec<GridCell>,
}

/// Build a letter grid: the word's letters tagged with their positions,
/// padded to `grid_size` with fillers drawn only from letters NOT in the
/// word (so a filler can never satisfy an expected letter).
pub fn generate_grid(word: &str, grid_size: usize, rng: &mut DeterministicRng) -> Vec<GridCell> {
    let word = word.to_uppercase();
    let word_letters: BTreeSet<char> = word.chars().collect();

    let mut cells: Vec<GridCell> = word
        .chars()
        .enumerate()
        .map(|(i, ch)| GridCell { id: 0, ch, target_index: Some(i) })
        .collect();

    let alphabet: Vec<char> = ('A'..='Z').filter(|c| !word_letters.contains(c)).collect();
    let fill_count = grid_size.saturating_sub(cells.len());
    for _ in 0..fill_count {
        let ch = rng.choose(&alphabet).copied().unwrap_or('X');
        cells.push(GridCell { id: 0, ch, target_index: None });
    }

    rng.shuffle(&mut cells);
    for (i, cell) in cells.iter_mut().enumerate() {
        cell.id = i as u32;
    }
    cells
}

/// Spelling-grid state machine.
#[derive(Debug, Serialize)]
pub struct SpellingEngine {
    rounds: Vec<SpellingRound>,
    round_index: usize,
    /// Letters found so far this round; doubles as the next expected index.
    found: usize,
    used_cells: BTreeSet<u32>,
    variant: SpellingVariant,
    mistakes: u32,
    score: u32,
    time_left: u32,
    phase: Phase,
}

impl SpellingEngine {
    /// Draw the stage's round count from `pool` and generate every grid.
    pub fn new(stage: &StageConfig, pool: &[SpellingEntry], rng: &mut DeterministicRng) -> Self {
        let (variant, round_count, grid_size) = match stage.params {
            StageParams::Spelling { variant, rounds, grid_size } => (variant, rounds, grid_size),
            _ => (SpellingVariant::Animal, 2, 9),
        };

        let rounds: Vec<SpellingRound> = rng
            .sample(pool, round_count)
            .into_iter()
            .map(|entry| SpellingRound {
                entry: entry.id,
                word: entry.word.to_uppercase(),
                image: entry.image.to_string(),
                sentence: entry.sentence.map(str::to_string),
                grid: generate_grid(entry.word, grid_size, rng),
            })
            .collect();

        let mut engine = Self {
            rounds,
            round_index: 0,
            found: 0,
            used_cells: BTreeSet::new(),
            variant,
            mistakes: 0,
            score: 0,
            time_left: stage.time_limit,
            phase: Phase::Briefing,
        };
        engine.apply_scaffold();
        engine
    }

    /// The round currently being spelled.
    pub fn current_round(&self) -> Option<&SpellingRound> {
        self.rounds.get(self.round_index)
    }

    /// Letters found so far in the current round.
    pub fn found(&self) -> usize {
        self.found
    }

    /// Wrong clicks so far (tracked, never scored).
    pub fn mistakes(&self) -> u32 {
        self.mistakes
    }

    /// Color rounds start with the first letter already found.
    fn apply_scaffold(&mut self) {
        self.found = 0;
        self.used_cells.clear();
        if self.variant != SpellingVariant::Color {
            return;
        }
        if let Some(round) = self.rounds.get(self.round_index) {
            if let Some(first) = round.grid.iter().find(|c| c.target_index == Some(0)) {
                self.used_cells.insert(first.id);
                self.found = 1;
            }
        }
    }

    fn pick(&mut self, cell_id: u32) -> StepOutcome {
        if self.phase != Phase::Active {
            return StepOutcome::none();
        }
        let Some(round) = self.rounds.get(self.round_index) else {
            return StepOutcome::none();
        };
        if self.used_cells.contains(&cell_id) {
            return StepOutcome::none();
        }
        let Some(cell) = round.grid.iter().find(|c| c.id == cell_id) else {
            return StepOutcome::none();
        };
        let Some(expected) = round.word.chars().nth(self.found) else {
            return StepOutcome::none();
        };

        let mut out = StepOutcome::none();
        if cell.ch == expected {
            // Correct!
            let position = self.found;
            let word_len = round.word.chars().count();
            self.used_cells.insert(cell_id);
            self.found += 1;
            out.events.push(EngineEvent::LetterFound { position });

            if self.found == word_len {
                self.complete_round(&mut out);
            }
        } else {
            // Wrong letter: counted, not penalized
            self.mistakes += 1;
            out.events.push(EngineEvent::Mistake { total: self.mistakes, score: self.score });
        }

        out
    }

    fn complete_round(&mut self, out: &mut StepOutcome) {
        self.score += ROUND_POINTS;
        out.events.push(EngineEvent::RoundCompleted {
            round: self.round_index,
            score: self.score,
        });

        if self.round_index + 1 < self.rounds.len() {
            // Success pause; the clock stops while the celebration shows
            out.cancel.push(TimerKind::Countdown);
            out.schedule.push(TimerRequest::after(TimerKind::AdvanceRound, ROUND_PAUSE_MS));
        } else {
            // Last round banks the remaining seconds
            self.score += self.time_left;
            enter_completed(&mut self.phase, FINISH_DELAY_MS, out);
        }
    }
}

impl MiniGame for SpellingEngine {
    fn phase(&self) -> Phase {
        self.phase
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn time_left(&self) -> u32 {
        self.time_left
    }

    fn boot(&mut self) -> StepOutcome {
        // Countdown waits behind the start modal.
        StepOutcome::none()
    }

    fn handle(&mut self, action: &PlayerAction) -> StepOutcome {
        match action {
            PlayerAction::Ready => {
                if self.phase != Phase::Briefing {
                    return StepOutcome::none();
                }
                self.phase = Phase::Active;
                let mut out = StepOutcome::none();
                out.phase_change(Phase::Briefing, Phase::Active);
                out.schedule.push(TimerRequest::countdown());
                out
            }
            PlayerAction::PickLetter { cell } => self.pick(*cell),
            // Timeout keeps the rounds banked so far
            PlayerAction::ConfirmTimeout => confirm_timeout(&mut self.phase, self.score),
            _ => StepOutcome::none(),
        }
    }

    fn on_timer(&mut self, kind: TimerKind) -> StepOutcome {
        match kind {
            TimerKind::Countdown => countdown_step(&mut self.phase, &mut self.time_left),
            TimerKind::AdvanceRound => {
                if self.phase != Phase::Active {
                    return StepOutcome::none();
                }
                self.round_index += 1;
                self.apply_scaffold();

                let mut out = StepOutcome::none();
                out.events.push(EngineEvent::RoundStarted { round: self.round_index });
                out.schedule.push(TimerRequest::countdown());
                out
            }
            TimerKind::FinishDelay => report_finish(&mut self.phase, self.score),
            _ => StepOutcome::none(),
        }
    }

    fn view(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

// =============================================================================
// TESTS
// =============================================================================
