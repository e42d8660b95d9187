//! Find-the-Pair Engine
//!
//! Face-down picture cards hide several pairs, but only ONE pair is the
//! target. The player is shown the target word, the grid shuffles itself for
//! a moment, then the hunt starts. Finding a correct-but-wrong pair flips
//! back and counts as a mistake; finding the target pair wins the stage.

use serde::Serialize;

use crate::catalog::content::PairEntry;
use crate::catalog::level::{StageConfig, StageParams};
use crate::core::rng::DeterministicRng;
use super::action::PlayerAction;
use super::engine::{
    confirm_timeout, countdown_step, enter_completed, report_finish,
    MiniGame, Phase, StepOutcome, TimerKind, TimerRequest,
};
use super::events::EngineEvent;

/// Interval between shuffle pulses while the grid mixes itself.
const RESHUFFLE_MS: u64 = 500;
/// Total length of the shuffle phase.
const SHUFFLE_PHASE_MS: u64 = 2_500;
/// Wrong reveal stays visible this long before flipping back.
const FLIP_BACK_MS: u64 = 1_000;
/// Success display delay before the score is reported.
const FINISH_DELAY_MS: u64 = 1_000;
/// Mistakes tolerated before penalties start.
const MISTAKE_GRACE: u32 = 5;
/// Points lost per mistake past the grace.
const MISTAKE_PENALTY: u32 = 2;

/// Briefing sub-state: reading the target, or watching the shuffle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
enum BriefingStep {
    Instruction,
    Shuffling,
}

/// One face-down card.
#[derive(Clone, Debug, Serialize)]
pub struct HiddenCard {
    /// Unique card id within the deal.
    pub uid: u32,
    /// Pair this card belongs to.
    pub pair: u32,
    /// Word naming the picture (shown for the target).
    pub word: String,
    /// Asset key for the picture face.
    pub image: String,
}

/// Find-the-pair state machine.
#[derive(Debug, Serialize)]
pub struct FindPairEngine {
    cards: Vec<HiddenCard>,
    target_pair: u32,
    target_word: String,
    briefing: BriefingStep,
    selected: Vec<u32>,
    found: bool,
    mistakes: u32,
    score: u32,
    time_left: u32,
    phase: Phase,
    rng: DeterministicRng,
}

impl FindPairEngine {
    /// Deal a new game from the picture-pair `pool`.
    pub fn new(stage: &StageConfig, pool: &[PairEntry], rng: &mut DeterministicRng) -> Self {
        let (grid_size, pair_count) = match stage.params {
            StageParams::FindPair { grid_size, pair_count } => (grid_size, pair_count),
            _ => (12, 6),
        };
        // A 3x3 grid only fits 4 pairs plus the odd cell out.
        let want = if grid_size == 9 { 4 } else { pair_count };

        let mut rng = rng.fork();
        let drawn = rng.sample(pool, want);
        let mut cards = Vec::with_capacity(drawn.len() * 2);
        let mut uid = 0u32;
        for entry in &drawn {
            let (word, image) = match entry {
                PairEntry::WordImage { word, image, .. } => ((*word).to_string(), (*image).to_string()),
                PairEntry::TextPair { first, .. } => ((*first).to_string(), String::new()),
            };
            for _ in 0..2 {
                cards.push(HiddenCard {
                    uid,
                    pair: entry.id(),
                    word: word.clone(),
                    image: image.clone(),
                });
                uid += 1;
            }
        }
        rng.shuffle(&mut cards);

        let (target_pair, target_word) = rng
            .choose(&cards)
            .map(|c| (c.pair, c.word.clone()))
            .unwrap_or((0, String::new()));

        Self {
            cards,
            target_pair,
            target_word,
            briefing: BriefingStep::Instruction,
            selected: Vec::new(),
            found: false,
            mistakes: 0,
            score: stage.base_score,
            time_left: stage.time_limit,
            phase: Phase::Briefing,
            rng,
        }
    }

    /// The word naming the pair to hunt.
    pub fn target_word(&self) -> &str {
        &self.target_word
    }

    /// The dealt cards, in current display order.
    pub fn cards(&self) -> &[HiddenCard] {
        &self.cards
    }

    /// Mistakes made so far.
    pub fn mistakes(&self) -> u32 {
        self.mistakes
    }

    fn record_mistake(&mut self, out: &mut StepOutcome) {
        self.mistakes += 1;
        if self.mistakes > MISTAKE_GRACE {
            self.score = self.score.saturating_sub(MISTAKE_PENALTY);
        }
        out.events.push(EngineEvent::Mistake { total: self.mistakes, score: self.score });
        out.schedule.push(TimerRequest::after(TimerKind::ClearSelection, FLIP_BACK_MS));
    }

    fn select(&mut self, card: u32) -> StepOutcome {
        if self.phase != Phase::Active || self.found || self.selected.len() >= 2 {
            return StepOutcome::none();
        }
        let Some(picked) = self.cards.iter().find(|c| c.uid == card) else {
            return StepOutcome::none();
        };
        if self.selected.contains(&card) {
            return StepOutcome::none();
        }
        let picked_pair = picked.pair;

        let mut out = StepOutcome::none();
        self.selected.push(card);
        out.events.push(EngineEvent::CardRevealed { card });

        if self.selected.len() < 2 {
            return out;
        }

        let first_uid = self.selected[0];
        let first_pair = self
            .cards
            .iter()
            .find(|c| c.uid == first_uid)
            .map(|c| c.pair);

        if first_pair == Some(picked_pair) {
            if picked_pair == self.target_pair {
                // Success!
                self.found = true;
                self.selected.clear();
                out.events.push(EngineEvent::MatchFound { pair: picked_pair, score: self.score });
                enter_completed(&mut self.phase, FINISH_DELAY_MS, &mut out);
            } else {
                // Correct pair, but not the one asked for
                self.record_mistake(&mut out);
            }
        } else {
            // Not a pair
            self.record_mistake(&mut out);
        }

        out
    }
}

impl MiniGame for FindPairEngine {
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
        // Countdown waits for the briefing to clear.
        StepOutcome::none()
    }

    fn handle(&mut self, action: &PlayerAction) -> StepOutcome {
        match action {
            PlayerAction::Ready => {
                if self.phase != Phase::Briefing || self.briefing != BriefingStep::Instruction {
                    return StepOutcome::none();
                }
                self.briefing = BriefingStep::Shuffling;
                let mut out = StepOutcome::none();
                out.schedule.push(TimerRequest::after(TimerKind::Reshuffle, RESHUFFLE_MS));
                out.schedule.push(TimerRequest::after(TimerKind::BeginSearch, SHUFFLE_PHASE_MS));
                out
            }
            PlayerAction::SelectCard { card } => self.select(*card),
            PlayerAction::ConfirmTimeout => confirm_timeout(&mut self.phase, 0),
            _ => StepOutcome::none(),
        }
    }

    fn on_timer(&mut self, kind: TimerKind) -> StepOutcome {
        match kind {
            TimerKind::Reshuffle => {
                if self.phase != Phase::Briefing || self.briefing != BriefingStep::Shuffling {
                    return StepOutcome::none();
                }
                self.rng.shuffle(&mut self.cards);
                let mut out = StepOutcome::none();
                out.events.push(EngineEvent::GridShuffled);
                out.schedule.push(TimerRequest::after(TimerKind::Reshuffle, RESHUFFLE_MS));
                out
            }
            TimerKind::BeginSearch => {
                if self.phase != Phase::Briefing {
                    return StepOutcome::none();
                }
                self.phase = Phase::Active;
                let mut out = StepOutcome::none();
                out.phase_change(Phase::Briefing, Phase::Active);
                out.cancel.push(TimerKind::Reshuffle);
                out.schedule.push(TimerRequest::countdown());
                out
            }
            TimerKind::Countdown => countdown_step(&mut self.phase, &mut self.time_left),
            TimerKind::ClearSelection => {
                if self.phase != Phase::Active || self.selected.len() < 2 {
                    return StepOutcome::none();
                }
                self.selected.clear();
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::content::ContentCatalog;
    use crate::catalog::level::{LevelId, StageKind};

    fn stage(grid_size: usize, pair_count: usize) -> StageConfig {
        StageConfig {
            id: 1,
            kind: StageKind::FindPair,
            base_score: 15,
            time_limit: 30,
            params: StageParams::FindPair { grid_size, pair_count },
        }
    }

    fn engine(grid_size: usize, pair_count: usize, seed: u64) -> FindPairEngine {
        let catalog = ContentCatalog::bundled();
        let pool = catalog.picture_pairs(LevelId::SmallStars);
        let mut rng = DeterministicRng::new(seed);
        FindPairEngine::new(&stage(grid_size, pair_count), &pool, &mut rng)
    }

    fn start_search(engine: &mut FindPairEngine) {
        engine.handle(&PlayerAction::Ready);
        engine.on_timer(TimerKind::BeginSearch);
    }

    fn uids_of_pair(engine: &FindPairEngine, pair: u32) -> (u32, u32) {
        let uids: Vec<u32> = engine
            .cards()
            .iter()
            .filter(|c| c.pair == pair)
            .map(|c| c.uid)
            .collect();
        (uids[0], uids[1])
    }

    #[test]
    fn test_grid_nine_forces_four_pairs() {
        let engine = engine(9, 6, 1);
        assert_eq!(engine.cards().len(), 8);
    }

    #[test]
    fn test_briefing_blocks_clicks_and_timer() {
        let mut engine = engine(12, 6, 2);
        assert_eq!(engine.phase(), Phase::Briefing);

        let uid = engine.cards()[0].uid;
        assert!(engine.handle(&PlayerAction::SelectCard { card: uid }).events.is_empty());

        // Countdown pulses are ignored until the search begins
        engine.on_timer(TimerKind::Countdown);
        assert_eq!(engine.time_left(), 30);
    }

    #[test]
    fn test_shuffle_phase_reshuffles_then_starts() {
        let mut engine = engine(12, 6, 3);
        let out = engine.handle(&PlayerAction::Ready);
        assert!(out.schedule.iter().any(|r| r.kind == TimerKind::Reshuffle));
        assert!(out.schedule.iter().any(|r| r.kind == TimerKind::BeginSearch));

        let before: Vec<u32> = engine.cards().iter().map(|c| c.uid).collect();
        let out = engine.on_timer(TimerKind::Reshuffle);
        assert!(out.events.contains(&EngineEvent::GridShuffled));
        assert!(out.schedule.iter().any(|r| r.kind == TimerKind::Reshuffle));
        let after: Vec<u32> = engine.cards().iter().map(|c| c.uid).collect();
        assert_eq!(before.len(), after.len());

        let out = engine.on_timer(TimerKind::BeginSearch);
        assert_eq!(engine.phase(), Phase::Active);
        assert!(out.cancel.contains(&TimerKind::Reshuffle));
        assert!(out.schedule.iter().any(|r| r.kind == TimerKind::Countdown));
    }

    #[test]
    fn test_target_pair_wins() {
        let mut engine = engine(12, 6, 4);
        start_search(&mut engine);

        let (a, b) = uids_of_pair(&engine, engine.target_pair);
        engine.handle(&PlayerAction::SelectCard { card: a });
        let out = engine.handle(&PlayerAction::SelectCard { card: b });

        assert_eq!(engine.phase(), Phase::Completed);
        assert!(out.events.iter().any(|e| matches!(e, EngineEvent::MatchFound { .. })));

        let out = engine.on_timer(TimerKind::FinishDelay);
        assert_eq!(out.events.last(), Some(&EngineEvent::Finished { score: 15 }));
    }

    #[test]
    fn test_non_target_pair_is_a_mistake() {
        let mut engine = engine(12, 6, 5);
        start_search(&mut engine);

        let other = engine
            .cards()
            .iter()
            .map(|c| c.pair)
            .find(|p| *p != engine.target_pair)
            .unwrap();
        let (a, b) = uids_of_pair(&engine, other);

        engine.handle(&PlayerAction::SelectCard { card: a });
        let out = engine.handle(&PlayerAction::SelectCard { card: b });

        assert_eq!(engine.phase(), Phase::Active);
        assert!(out.events.iter().any(|e| matches!(e, EngineEvent::Mistake { total: 1, .. })));
        assert!(out.schedule.iter().any(|r| r.kind == TimerKind::ClearSelection));

        // Still at base score: within the mistake grace
        assert_eq!(engine.score(), 15);
    }

    #[test]
    fn test_timeout_pays_zero() {
        let mut engine = engine(12, 6, 6);
        start_search(&mut engine);
        engine.time_left = 1;

        engine.on_timer(TimerKind::Countdown);
        assert_eq!(engine.phase(), Phase::TimedOut);

        let out = engine.handle(&PlayerAction::ConfirmTimeout);
        assert_eq!(out.events.last(), Some(&EngineEvent::Finished { score: 0 }));
    }

    #[test]
    fn test_target_word_names_a_dealt_pair() {
        let engine = engine(12, 6, 7);
        assert!(engine
            .cards()
            .iter()
            .any(|c| c.pair == engine.target_pair && c.word == engine.target_word()));
    }
}
