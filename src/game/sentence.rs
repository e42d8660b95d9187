//! Sentence-Builder Engine
//!
//! A picture and a bank of shuffled word tokens: tap tokens into the
//! sentence area, then check. Only an exact, order-sensitive match wins the
//! round — twenty points plus up to ten bonus seconds. A failed check just
//! shakes and clears its highlight after a second; nothing is deducted. The
//! clock spans all rounds, and a timeout keeps the rounds already banked.

use serde::Serialize;

use crate::catalog::content::SentenceEntry;
use crate::catalog::level::{StageConfig, StageParams};
use crate::core::rng::DeterministicRng;
use super::action::PlayerAction;
use super::engine::{
    confirm_timeout, countdown_step, enter_completed, report_finish,
    MiniGame, Phase, StepOutcome, TimerKind, TimerRequest,
};
use super::events::EngineEvent;

/// Points for a correct sentence.
const ROUND_POINTS: u32 = 20;
/// Cap on the per-round time bonus.
const TIME_BONUS_CAP: u32 = 10;
/// Pause after a correct round before the next appears.
const ROUND_PAUSE_MS: u64 = 1_500;
/// How long the rejection highlight stays.
const FEEDBACK_MS: u64 = 1_000;

/// One sentence scenario.
#[derive(Clone, Debug, Serialize)]
pub struct SentenceRound {
    /// Pool entry id.
    pub entry: u32,
    /// Asset key for the scenario picture.
    pub image: String,
    /// The target sentence.
    pub target: String,
    /// Target tokens; a token's index is its id.
    pub tokens: Vec<String>,
}

/// Sentence-builder state machine.
#[derive(Debug, Serialize)]
pub struct SentenceEngine {
    rounds: Vec<SentenceRound>,
    round_index: usize,
    /// Token ids currently in the bank, display order.
    bank: Vec<u32>,
    /// Token ids currently in the sentence, build order.
    built: Vec<u32>,
    /// A failed check highlights until cleared.
    rejected: bool,
    /// The current round passed its check; input locked until advance.
    round_locked: bool,
    score: u32,
    time_left: u32,
    phase: Phase,
    rng: DeterministicRng,
}

impl SentenceEngine {
    /// Draw the stage's scenario count from `pool`.
    pub fn new(stage: &StageConfig, pool: &[SentenceEntry], rng: &mut DeterministicRng) -> Self {
        let count = match stage.params {
            StageParams::SentenceBuilder { rounds } => rounds,
            _ => 2,
        };

        let mut rng = rng.fork();
        let rounds: Vec<SentenceRound> = rng
            .sample(pool, count)
            .into_iter()
            .map(|entry| SentenceRound {
                entry: entry.id,
                image: entry.image.to_string(),
                target: entry.sentence.to_string(),
                tokens: entry.sentence.split(' ').map(str::to_string).collect(),
            })
            .collect();

        let mut engine = Self {
            rounds,
            round_index: 0,
            bank: Vec::new(),
            built: Vec::new(),
            rejected: false,
            round_locked: false,
            score: 0,
            time_left: stage.time_limit,
            phase: Phase::Active,
            rng,
        };
        engine.deal_bank();
        engine
    }

    /// The scenario currently being built.
    pub fn current_round(&self) -> Option<&SentenceRound> {
        self.rounds.get(self.round_index)
    }

    /// Token ids in the bank, display order.
    pub fn bank(&self) -> &[u32] {
        &self.bank
    }

    /// Token ids in the sentence, build order.
    pub fn built(&self) -> &[u32] {
        &self.built
    }

    /// Whether the last check was rejected (highlight still showing).
    pub fn rejected(&self) -> bool {
        self.rejected
    }

    /// The sentence as currently built.
    pub fn built_text(&self) -> String {
        let Some(round) = self.current_round() else {
            return String::new();
        };
        self.built
            .iter()
            .filter_map(|id| round.tokens.get(*id as usize))
            .cloned()
            .collect::<Vec<String>>()
            .join(" ")
    }

    fn deal_bank(&mut self) {
        self.built.clear();
        self.rejected = false;
        self.round_locked = false;
        let mut bank: Vec<u32> = self
            .rounds
            .get(self.round_index)
            .map(|r| (0..r.tokens.len() as u32).collect())
            .unwrap_or_default();
        self.rng.shuffle(&mut bank);
        self.bank = bank;
    }

    fn place(&mut self, word: u32) -> StepOutcome {
        if self.phase != Phase::Active || self.round_locked {
            return StepOutcome::none();
        }
        let Some(pos) = self.bank.iter().position(|w| *w == word) else {
            return StepOutcome::none();
        };
        self.bank.remove(pos);
        self.built.push(word);
        self.rejected = false;
        StepOutcome::none()
    }

    fn remove(&mut self, word: u32) -> StepOutcome {
        if self.phase != Phase::Active || self.round_locked {
            return StepOutcome::none();
        }
        let Some(pos) = self.built.iter().position(|w| *w == word) else {
            return StepOutcome::none();
        };
        self.built.remove(pos);
        self.bank.push(word);
        self.rejected = false;
        StepOutcome::none()
    }

    fn check(&mut self) -> StepOutcome {
        if self.phase != Phase::Active || self.round_locked || self.built.is_empty() {
            return StepOutcome::none();
        }
        let Some(round) = self.rounds.get(self.round_index) else {
            return StepOutcome::none();
        };

        let mut out = StepOutcome::none();
        if self.built_text() == round.target {
            // Correct!
            self.round_locked = true;
            self.rejected = false;
            self.score += ROUND_POINTS + self.time_left.min(TIME_BONUS_CAP);
            out.events.push(EngineEvent::RoundCompleted {
                round: self.round_index,
                score: self.score,
            });

            if self.round_index + 1 < self.rounds.len() {
                // The clock keeps running while the celebration shows
                out.schedule.push(TimerRequest::after(TimerKind::AdvanceRound, ROUND_PAUSE_MS));
            } else {
                enter_completed(&mut self.phase, ROUND_PAUSE_MS, &mut out);
            }
        } else {
            self.rejected = true;
            out.events.push(EngineEvent::SentenceRejected);
            out.schedule.push(TimerRequest::after(TimerKind::ClearFeedback, FEEDBACK_MS));
        }

        out
    }

    fn reset_round(&mut self) -> StepOutcome {
        if self.phase != Phase::Active || self.round_locked {
            return StepOutcome::none();
        }
        self.deal_bank();
        StepOutcome::none()
    }
}

impl MiniGame for SentenceEngine {
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
        let mut out = StepOutcome::none();
        if self.rounds.is_empty() {
            // Configuration gap: nothing to build, only a placeholder
            self.phase = Phase::TimedOut;
            return out;
        }
        out.schedule.push(TimerRequest::countdown());
        out
    }

    fn handle(&mut self, action: &PlayerAction) -> StepOutcome {
        match action {
            PlayerAction::PlaceWord { word } => self.place(*word),
            PlayerAction::RemoveWord { word } => self.remove(*word),
            PlayerAction::CheckSentence => self.check(),
            PlayerAction::ResetRound => self.reset_round(),
            // Timeout keeps the rounds banked so far
            PlayerAction::ConfirmTimeout => confirm_timeout(&mut self.phase, self.score),
            _ => StepOutcome::none(),
        }
    }

    fn on_timer(&mut self, kind: TimerKind) -> StepOutcome {
        match kind {
            TimerKind::Countdown => countdown_step(&mut self.phase, &mut self.time_left),
            TimerKind::ClearFeedback => {
                self.rejected = false;
                StepOutcome::none()
            }
            TimerKind::AdvanceRound => {
                if self.phase != Phase::Active {
                    return StepOutcome::none();
                }
                self.round_index += 1;
                self.deal_bank();

                let mut out = StepOutcome::none();
                out.events.push(EngineEvent::RoundStarted { round: self.round_index });
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::content::ContentCatalog;
    use crate::catalog::level::{LevelId, StageKind};

    fn engine(rounds: usize, seed: u64) -> SentenceEngine {
        let stage = StageConfig {
            id: 1,
            kind: StageKind::SentenceBuilder,
            base_score: 20,
            time_limit: 120,
            params: StageParams::SentenceBuilder { rounds },
        };
        let catalog = ContentCatalog::bundled();
        let mut rng = DeterministicRng::new(seed);
        SentenceEngine::new(&stage, catalog.sentences(LevelId::HighFlyers), &mut rng)
    }

    /// Build the target sentence token-for-token in order.
    fn build_exact(engine: &mut SentenceEngine) {
        let token_count = engine.current_round().unwrap().tokens.len() as u32;
        for id in 0..token_count {
            engine.handle(&PlayerAction::PlaceWord { word: id });
        }
    }

    #[test]
    fn test_exact_build_completes() {
        let mut engine = engine(1, 1);
        let target = engine.current_round().unwrap().target.clone();

        build_exact(&mut engine);
        assert_eq!(engine.built_text(), target);

        let out = engine.handle(&PlayerAction::CheckSentence);
        assert!(out.events.iter().any(|e| matches!(e, EngineEvent::RoundCompleted { .. })));
        assert_eq!(engine.phase(), Phase::Completed);

        // 20 + min(120, 10) with no seconds burned
        let out = engine.on_timer(TimerKind::FinishDelay);
        assert_eq!(out.events.last(), Some(&EngineEvent::Finished { score: 30 }));
    }

    #[test]
    fn test_single_token_swap_rejects_without_scoring() {
        let mut engine = engine(1, 2);
        let token_count = engine.current_round().unwrap().tokens.len() as u32;
        assert!(token_count >= 2);

        // Swap the last two tokens
        for id in 0..token_count - 2 {
            engine.handle(&PlayerAction::PlaceWord { word: id });
        }
        engine.handle(&PlayerAction::PlaceWord { word: token_count - 1 });
        engine.handle(&PlayerAction::PlaceWord { word: token_count - 2 });

        let out = engine.handle(&PlayerAction::CheckSentence);
        assert!(out.events.contains(&EngineEvent::SentenceRejected));
        assert!(engine.rejected());
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.phase(), Phase::Active);

        // The highlight clears on its own
        engine.on_timer(TimerKind::ClearFeedback);
        assert!(!engine.rejected());
    }

    #[test]
    fn test_duplicate_words_build_by_token_id() {
        // "She has a beautiful pink dress" has no duplicates, but token ids
        // (not strings) drive the build, so any pool sentence works the same.
        let mut engine = engine(2, 3);
        build_exact(&mut engine);
        let out = engine.handle(&PlayerAction::CheckSentence);
        assert!(out.events.iter().any(|e| matches!(e, EngineEvent::RoundCompleted { .. })));
    }

    #[test]
    fn test_two_rounds_accumulate_with_shared_clock() {
        let mut engine = engine(2, 4);

        // Burn 15 seconds so the bonus caps at 10
        for _ in 0..15 {
            engine.on_timer(TimerKind::Countdown);
        }

        build_exact(&mut engine);
        let out = engine.handle(&PlayerAction::CheckSentence);
        assert_eq!(engine.score(), 30);
        assert!(out.schedule.iter().any(|r| r.kind == TimerKind::AdvanceRound));

        // Input is locked during the celebration
        assert!(engine.handle(&PlayerAction::PlaceWord { word: 0 }).events.is_empty());

        engine.on_timer(TimerKind::AdvanceRound);
        build_exact(&mut engine);
        engine.handle(&PlayerAction::CheckSentence);

        assert_eq!(engine.score(), 60);
        assert_eq!(engine.phase(), Phase::Completed);
    }

    #[test]
    fn test_reset_returns_all_tokens() {
        let mut engine = engine(1, 5);
        engine.handle(&PlayerAction::PlaceWord { word: 0 });
        engine.handle(&PlayerAction::PlaceWord { word: 1 });
        assert_eq!(engine.built().len(), 2);

        engine.handle(&PlayerAction::ResetRound);
        assert!(engine.built().is_empty());
        let token_count = engine.current_round().unwrap().tokens.len();
        assert_eq!(engine.bank().len(), token_count);
    }

    #[test]
    fn test_check_on_empty_build_is_silent() {
        let mut engine = engine(1, 6);
        let out = engine.handle(&PlayerAction::CheckSentence);
        assert!(out.events.is_empty());
    }

    #[test]
    fn test_timeout_keeps_banked_rounds() {
        let mut engine = engine(2, 7);
        build_exact(&mut engine);
        engine.handle(&PlayerAction::CheckSentence);
        engine.on_timer(TimerKind::AdvanceRound);
        let banked = engine.score();
        assert!(banked > 0);

        engine.time_left = 1;
        engine.on_timer(TimerKind::Countdown);
        assert_eq!(engine.phase(), Phase::TimedOut);

        let out = engine.handle(&PlayerAction::ConfirmTimeout);
        assert_eq!(out.events.last(), Some(&EngineEvent::Finished { score: banked }));
    }
}
