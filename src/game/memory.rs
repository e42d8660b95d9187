//! Card-Memory Engine
//!
//! Classic memory with text pairs (verb forms, antonyms): all cards face
//! down, flip two at a time. A match banks ten points; a mismatch just flips
//! back after a second. Matching the last pair adds the seconds left on the
//! clock. A timeout keeps the matches banked so far.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::catalog::content::PairEntry;
use crate::catalog::level::{StageConfig, StageParams};
use crate::core::rng::DeterministicRng;
use super::action::PlayerAction;
use super::engine::{
    confirm_timeout, countdown_step, enter_completed, report_finish,
    MiniGame, Phase, StepOutcome, TimerKind, TimerRequest,
};
use super::events::EngineEvent;

/// Points per matched pair.
const MATCH_POINTS: u32 = 10;
/// Mismatched cards stay visible this long before flipping back.
const FLIP_BACK_MS: u64 = 1_000;
/// Success display delay before the score is reported.
const FINISH_DELAY_MS: u64 = 1_000;

/// One face-down text card.
#[derive(Clone, Debug, Serialize)]
pub struct MemoryCard {
    /// Unique card id within the deal.
    pub uid: u32,
    /// Pair this card belongs to.
    pub pair: u32,
    /// The text revealed when flipped.
    pub text: String,
}

/// Card-memory state machine.
#[derive(Debug, Serialize)]
pub struct MemoryEngine {
    cards: Vec<MemoryCard>,
    pair_count: usize,
    flipped: Vec<u32>,
    matched: BTreeSet<u32>,
    mistakes: u32,
    score: u32,
    time_left: u32,
    phase: Phase,
}

impl MemoryEngine {
    /// Deal a new game from the text-pair `pool`.
    pub fn new(stage: &StageConfig, pool: &[PairEntry], rng: &mut DeterministicRng) -> Self {
        let want = match stage.params {
            StageParams::CardMemory { pair_count } => pair_count,
            _ => 6,
        };

        let drawn = rng.sample(pool, want);
        let mut cards = Vec::with_capacity(drawn.len() * 2);
        let mut uid = 0u32;
        for entry in &drawn {
            let (first, second) = match entry {
                PairEntry::TextPair { first, second, .. } => {
                    ((*first).to_string(), (*second).to_string())
                }
                // A picture pool in a memory deck degrades to word/word
                PairEntry::WordImage { word, .. } => ((*word).to_string(), (*word).to_string()),
            };
            for text in [first, second] {
                cards.push(MemoryCard { uid, pair: entry.id(), text });
                uid += 1;
            }
        }
        rng.shuffle(&mut cards);

        Self {
            pair_count: drawn.len(),
            cards,
            flipped: Vec::new(),
            matched: BTreeSet::new(),
            mistakes: 0,
            score: 0,
            time_left: stage.time_limit,
            phase: Phase::Briefing,
        }
    }

    /// The dealt cards, in display order.
    pub fn cards(&self) -> &[MemoryCard] {
        &self.cards
    }

    /// Pairs matched so far.
    pub fn matched(&self) -> usize {
        self.matched.len()
    }

    /// Mismatches so far (tracked, never scored).
    pub fn mistakes(&self) -> u32 {
        self.mistakes
    }

    fn flip(&mut self, card: u32) -> StepOutcome {
        if self.phase != Phase::Active || self.flipped.len() >= 2 {
            return StepOutcome::none();
        }
        let Some(picked) = self.cards.iter().find(|c| c.uid == card) else {
            return StepOutcome::none();
        };
        if self.matched.contains(&picked.pair) || self.flipped.contains(&card) {
            return StepOutcome::none();
        }
        let picked_pair = picked.pair;

        let mut out = StepOutcome::none();
        self.flipped.push(card);
        out.events.push(EngineEvent::CardRevealed { card });

        if self.flipped.len() < 2 {
            return out;
        }

        let first_uid = self.flipped[0];
        let first_pair = self
            .cards
            .iter()
            .find(|c| c.uid == first_uid)
            .map(|c| c.pair);

        if first_pair == Some(picked_pair) {
            // Match!
            self.matched.insert(picked_pair);
            self.flipped.clear();
            self.score += MATCH_POINTS;
            out.events.push(EngineEvent::MatchFound { pair: picked_pair, score: self.score });

            if self.matched.len() == self.pair_count {
                // Final match banks the remaining seconds
                self.score += self.time_left;
                enter_completed(&mut self.phase, FINISH_DELAY_MS, &mut out);
            }
        } else {
            // No match
            self.mistakes += 1;
            out.events.push(EngineEvent::Mistake { total: self.mistakes, score: self.score });
            out.schedule.push(TimerRequest::after(TimerKind::ClearSelection, FLIP_BACK_MS));
        }

        out
    }
}

impl MiniGame for MemoryEngine {
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
            PlayerAction::SelectCard { card } => self.flip(*card),
            // Timeout keeps the matches banked so far
            PlayerAction::ConfirmTimeout => confirm_timeout(&mut self.phase, self.score),
            _ => StepOutcome::none(),
        }
    }

    fn on_timer(&mut self, kind: TimerKind) -> StepOutcome {
        match kind {
            TimerKind::Countdown => countdown_step(&mut self.phase, &mut self.time_left),
            TimerKind::ClearSelection => {
                if self.phase != Phase::Active || self.flipped.len() < 2 {
                    return StepOutcome::none();
                }
                self.flipped.clear();
                let mut out = StepOutcome::none();
                out.events.push(EngineEvent::SelectionCleared);
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
