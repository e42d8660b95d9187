//! Pair-Match Engine
//!
//! All cards face up; the player clicks two at a time hunting matching
//! pairs (picture/word or word/word). Wrong picks start costing points
//! after the fifth mistake. Running out of time forfeits the whole stage.

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

/// Wrong pair stays visible this long before clearing.
const CLEAR_DELAY_MS: u64 = 1_000;
/// Success animation delay before the score is reported.
const FINISH_DELAY_MS: u64 = 1_500;
/// Mistakes tolerated before penalties start.
const MISTAKE_GRACE: u32 = 5;
/// Points lost per mistake past the grace.
const MISTAKE_PENALTY: u32 = 2;

/// What a card shows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum CardFace {
    /// A picture card (asset key).
    Image(String),
    /// A word card.
    Text(String),
}

/// One dealt card.
#[derive(Clone, Debug, Serialize)]
pub struct Card {
    /// Unique card id within the deal.
    pub uid: u32,
    /// Pair this card belongs to.
    pub pair: u32,
    /// What the card shows.
    pub face: CardFace,
}

/// Pair-match state machine.
#[derive(Debug, Serialize)]
pub struct PairMatchEngine {
    cards: Vec<Card>,
    pair_count: usize,
    selected: Vec<u32>,
    matched: BTreeSet<u32>,
    mistakes: u32,
    score: u32,
    time_left: u32,
    phase: Phase,
}

impl PairMatchEngine {
    /// Deal a new game from `pool`, sampling the stage's pair count.
    pub fn new(stage: &StageConfig, pool: &[PairEntry], rng: &mut DeterministicRng) -> Self {
        let want = match stage.params {
            StageParams::PairMatch { pairs } => pairs,
            _ => 8,
        };

        let drawn = rng.sample(pool, want);
        let mut cards = Vec::with_capacity(drawn.len() * 2);
        let mut uid = 0u32;
        for entry in &drawn {
            let (first, second) = match entry {
                PairEntry::WordImage { word, image, .. } => (
                    CardFace::Image((*image).to_string()),
                    CardFace::Text((*word).to_string()),
                ),
                PairEntry::TextPair { first, second, .. } => (
                    CardFace::Text((*first).to_string()),
                    CardFace::Text((*second).to_string()),
                ),
            };
            for face in [first, second] {
                cards.push(Card { uid, pair: entry.id(), face });
                uid += 1;
            }
        }
        rng.shuffle(&mut cards);

        Self {
            pair_count: drawn.len(),
            cards,
            selected: Vec::new(),
            matched: BTreeSet::new(),
            mistakes: 0,
            score: stage.base_score,
            time_left: stage.time_limit,
            phase: Phase::Active,
        }
    }

    /// The dealt cards, in display order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Mistakes made so far.
    pub fn mistakes(&self) -> u32 {
        self.mistakes
    }

    fn select(&mut self, card: u32) -> StepOutcome {
        if self.phase != Phase::Active || self.selected.len() >= 2 {
            return StepOutcome::none();
        }
        let Some(picked) = self.cards.iter().find(|c| c.uid == card) else {
            return StepOutcome::none();
        };
        if self.matched.contains(&picked.pair) || self.selected.contains(&card) {
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
            // Match!
            self.matched.insert(picked_pair);
            self.selected.clear();
            out.events.push(EngineEvent::MatchFound { pair: picked_pair, score: self.score });

            if self.matched.len() == self.pair_count {
                enter_completed(&mut self.phase, FINISH_DELAY_MS, &mut out);
            }
        } else {
            // No match
            self.mistakes += 1;
            if self.mistakes > MISTAKE_GRACE {
                self.score = self.score.saturating_sub(MISTAKE_PENALTY);
            }
            out.events.push(EngineEvent::Mistake { total: self.mistakes, score: self.score });
            out.schedule.push(TimerRequest::after(TimerKind::ClearSelection, CLEAR_DELAY_MS));
        }

        out
    }
}

impl MiniGame for PairMatchEngine {
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
        // No briefing: the countdown starts at mount.
        let mut out = StepOutcome::none();
        out.schedule.push(TimerRequest::countdown());
        out
    }

    fn handle(&mut self, action: &PlayerAction) -> StepOutcome {
        match action {
            PlayerAction::SelectCard { card } => self.select(*card),
            PlayerAction::ConfirmTimeout => confirm_timeout(&mut self.phase, 0),
            _ => StepOutcome::none(),
        }
    }

    fn on_timer(&mut self, kind: TimerKind) -> StepOutcome {
        match kind {
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

    fn stage(pairs: usize) -> StageConfig {
        StageConfig {
            id: 1,
            kind: StageKind::PairMatch,
            base_score: 15,
            time_limit: 90,
            params: StageParams::PairMatch { pairs },
        }
    }

    fn engine(pairs: usize, seed: u64) -> PairMatchEngine {
        let catalog = ContentCatalog::bundled();
        let mut rng = DeterministicRng::new(seed);
        PairMatchEngine::new(&stage(pairs), catalog.pairs(LevelId::SmallStars), &mut rng)
    }

    fn uids_of_pair(engine: &PairMatchEngine, pair: u32) -> (u32, u32) {
        let uids: Vec<u32> = engine
            .cards()
            .iter()
            .filter(|c| c.pair == pair)
            .map(|c| c.uid)
            .collect();
        (uids[0], uids[1])
    }

    #[test]
    fn test_deal_six_pairs_from_pool_of_eight() {
        let engine = engine(6, 1);

        assert_eq!(engine.cards().len(), 12);

        let mut pairs: Vec<u32> = engine.cards().iter().map(|c| c.pair).collect();
        pairs.sort_unstable();

        // Six unique pair ids, each appearing exactly twice
        let unique: BTreeSet<u32> = pairs.iter().copied().collect();
        assert_eq!(unique.len(), 6);
        for id in &unique {
            assert_eq!(pairs.iter().filter(|p| **p == *id).count(), 2);
        }
    }

    #[test]
    fn test_redeal_varies_by_seed() {
        let a: Vec<u32> = engine(6, 1).cards().iter().map(|c| c.uid).collect();
        let mut found_different = false;
        for seed in 2..10u64 {
            let b: Vec<u32> = engine(6, seed).cards().iter().map(|c| c.uid).collect();
            if a != b {
                found_different = true;
                break;
            }
        }
        assert!(found_different);
    }

    #[test]
    fn test_match_and_win() {
        let mut engine = engine(2, 3);
        let pairs: BTreeSet<u32> = engine.cards().iter().map(|c| c.pair).collect();

        for (i, pair) in pairs.iter().enumerate() {
            let (a, b) = uids_of_pair(&engine, *pair);
            engine.handle(&PlayerAction::SelectCard { card: a });
            let out = engine.handle(&PlayerAction::SelectCard { card: b });
            assert!(out.events.iter().any(|e| matches!(e, EngineEvent::MatchFound { .. })));

            if i + 1 == pairs.len() {
                assert_eq!(engine.phase(), Phase::Completed);
                assert!(out.schedule.iter().any(|r| r.kind == TimerKind::FinishDelay));
            }
        }

        // Finish delay fires the single report at full base score
        let out = engine.on_timer(TimerKind::FinishDelay);
        assert_eq!(out.events.last(), Some(&EngineEvent::Finished { score: 15 }));
        assert_eq!(engine.phase(), Phase::Reported);

        // Absorbing afterwards
        assert!(engine.on_timer(TimerKind::FinishDelay).events.is_empty());
    }

    #[test]
    fn test_penalty_starts_after_fifth_mistake() {
        let mut engine = engine(6, 4);
        let pairs: Vec<u32> = {
            let unique: BTreeSet<u32> = engine.cards().iter().map(|c| c.pair).collect();
            unique.into_iter().collect()
        };

        // A mismatch: first card of pair 0, first card of pair 1
        for n in 1..=7u32 {
            let (a, _) = uids_of_pair(&engine, pairs[0]);
            let (b, _) = uids_of_pair(&engine, pairs[1]);
            engine.handle(&PlayerAction::SelectCard { card: a });
            engine.handle(&PlayerAction::SelectCard { card: b });
            engine.on_timer(TimerKind::ClearSelection);

            if n <= 5 {
                assert_eq!(engine.score(), 15, "no penalty within grace");
            }
        }

        // Mistakes 6 and 7 each cost 2
        assert_eq!(engine.mistakes(), 7);
        assert_eq!(engine.score(), 11);
    }

    #[test]
    fn test_selection_locked_while_mismatch_showing() {
        let mut engine = engine(3, 5);
        let pairs: Vec<u32> = {
            let unique: BTreeSet<u32> = engine.cards().iter().map(|c| c.pair).collect();
            unique.into_iter().collect()
        };
        let (a, _) = uids_of_pair(&engine, pairs[0]);
        let (b, _) = uids_of_pair(&engine, pairs[1]);
        let (c, _) = uids_of_pair(&engine, pairs[2]);

        engine.handle(&PlayerAction::SelectCard { card: a });
        engine.handle(&PlayerAction::SelectCard { card: b });

        // Third click while two cards are showing: ignored
        let out = engine.handle(&PlayerAction::SelectCard { card: c });
        assert!(out.events.is_empty());

        engine.on_timer(TimerKind::ClearSelection);
        let out = engine.handle(&PlayerAction::SelectCard { card: c });
        assert_eq!(out.events.len(), 1);
    }

    #[test]
    fn test_timeout_forfeits_stage() {
        let mut engine = engine(6, 6);
        engine.time_left = 1;

        let out = engine.on_timer(TimerKind::Countdown);
        assert_eq!(engine.phase(), Phase::TimedOut);
        assert!(out.events.iter().any(|e| matches!(
            e,
            EngineEvent::PhaseChanged { to: Phase::TimedOut, .. }
        )));

        // Clicks after timeout have no effect
        let uid = engine.cards()[0].uid;
        assert!(engine.handle(&PlayerAction::SelectCard { card: uid }).events.is_empty());

        // The only way out is the confirm button, and it pays zero
        let out = engine.handle(&PlayerAction::ConfirmTimeout);
        assert_eq!(out.events.last(), Some(&EngineEvent::Finished { score: 0 }));
    }
}
