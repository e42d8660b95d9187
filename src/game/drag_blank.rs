//! Drag-to-Blank Engine
//!
//! Sentences with a missing word each offer three draggable options. A
//! correct drop locks the blank; a wrong drop on the blank costs two points
//! immediately; a release anywhere else snaps back silently. Running out of
//! time forfeits the whole stage.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::catalog::content::BlankEntry;
use crate::catalog::level::{StageConfig, StageParams};
use crate::core::rng::DeterministicRng;
use super::action::PlayerAction;
use super::engine::{
    confirm_timeout, countdown_step, enter_completed, report_finish,
    MiniGame, Phase, StepOutcome, TimerKind, TimerRequest,
};
use super::events::EngineEvent;

/// Success display delay before the score is reported.
const FINISH_DELAY_MS: u64 = 1_000;
/// Points lost per wrong drop.
const WRONG_DROP_PENALTY: u32 = 2;

/// One sentence with its blank and options.
#[derive(Clone, Debug, Serialize)]
pub struct BlankQuestion {
    /// Question id (doubles as the blank's drop-target id).
    pub id: u32,
    /// Sentence with a `___` placeholder.
    pub sentence: String,
    /// The correct option.
    pub answer: String,
    /// Draggable options.
    pub options: Vec<String>,
}

/// Drag-to-blank state machine.
#[derive(Debug, Serialize)]
pub struct DragBlankEngine {
    questions: Vec<BlankQuestion>,
    completed: BTreeSet<u32>,
    mistakes: u32,
    score: u32,
    time_left: u32,
    phase: Phase,
}

impl DragBlankEngine {
    /// Draw the stage's question count from `pool`.
    pub fn new(stage: &StageConfig, pool: &[BlankEntry], rng: &mut DeterministicRng) -> Self {
        let count = match stage.params {
            StageParams::DragBlank { count } => count,
            _ => 5,
        };

        let questions = rng
            .sample(pool, count)
            .into_iter()
            .map(|entry| BlankQuestion {
                id: entry.id,
                sentence: entry.sentence.to_string(),
                answer: entry.answer.to_string(),
                options: entry.options.iter().map(|o| o.to_string()).collect(),
            })
            .collect();

        Self {
            questions,
            completed: BTreeSet::new(),
            mistakes: 0,
            score: stage.base_score,
            time_left: stage.time_limit,
            phase: Phase::Active,
        }
    }

    /// The drawn questions.
    pub fn questions(&self) -> &[BlankQuestion] {
        &self.questions
    }

    /// Blanks filled so far.
    pub fn filled(&self) -> usize {
        self.completed.len()
    }

    fn drop_word(&mut self, question: u32, option: usize, target: Option<u32>) -> StepOutcome {
        if self.phase != Phase::Active {
            return StepOutcome::none();
        }
        // Released outside any blank: the chip snaps back, nothing happened.
        let Some(target) = target else {
            return StepOutcome::none();
        };
        // Each option only tests against its own question's blank.
        if target != question {
            return StepOutcome::none();
        }
        let Some(q) = self.questions.iter().find(|q| q.id == question) else {
            return StepOutcome::none();
        };
        if self.completed.contains(&question) {
            return StepOutcome::none();
        }
        let Some(word) = q.options.get(option) else {
            return StepOutcome::none();
        };

        let mut out = StepOutcome::none();
        if *word == q.answer {
            // Correct!
            self.completed.insert(question);
            out.events.push(EngineEvent::BlankFilled {
                question,
                filled: self.completed.len(),
            });

            if self.completed.len() == self.questions.len() {
                enter_completed(&mut self.phase, FINISH_DELAY_MS, &mut out);
            }
        } else {
            // Incorrect: immediate penalty
            self.mistakes += 1;
            self.score = self.score.saturating_sub(WRONG_DROP_PENALTY);
            out.events.push(EngineEvent::Mistake { total: self.mistakes, score: self.score });
        }

        out
    }
}

impl MiniGame for DragBlankEngine {
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
        out.schedule.push(TimerRequest::countdown());
        out
    }

    fn handle(&mut self, action: &PlayerAction) -> StepOutcome {
        match action {
            PlayerAction::DropOnBlank { question, option, target } => {
                self.drop_word(*question, *option, *target)
            }
            PlayerAction::ConfirmTimeout => confirm_timeout(&mut self.phase, 0),
            _ => StepOutcome::none(),
        }
    }

    fn on_timer(&mut self, kind: TimerKind) -> StepOutcome {
        match kind {
            TimerKind::Countdown => countdown_step(&mut self.phase, &mut self.time_left),
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

    fn engine(seed: u64) -> DragBlankEngine {
        let stage = StageConfig {
            id: 2,
            kind: StageKind::DragBlank,
            base_score: 20,
            time_limit: 120,
            params: StageParams::DragBlank { count: 5 },
        };
        let catalog = ContentCatalog::bundled();
        let mut rng = DeterministicRng::new(seed);
        DragBlankEngine::new(&stage, catalog.blanks(LevelId::Trailblazers), &mut rng)
    }

    fn correct_option(q: &BlankQuestion) -> usize {
        q.options.iter().position(|o| *o == q.answer).unwrap()
    }

    fn wrong_option(q: &BlankQuestion) -> usize {
        q.options.iter().position(|o| *o != q.answer).unwrap()
    }

    #[test]
    fn test_all_correct_drops_win_at_full_score() {
        let mut engine = engine(1);
        let plan: Vec<(u32, usize)> = engine
            .questions()
            .iter()
            .map(|q| (q.id, correct_option(q)))
            .collect();

        for (i, (id, opt)) in plan.iter().enumerate() {
            let out = engine.handle(&PlayerAction::DropOnBlank {
                question: *id,
                option: *opt,
                target: Some(*id),
            });
            assert!(out.events.iter().any(|e| matches!(e, EngineEvent::BlankFilled { .. })));
            if i + 1 == plan.len() {
                assert_eq!(engine.phase(), Phase::Completed);
            }
        }

        let out = engine.on_timer(TimerKind::FinishDelay);
        assert_eq!(out.events.last(), Some(&EngineEvent::Finished { score: 20 }));
    }

    #[test]
    fn test_wrong_drop_costs_two_immediately() {
        let mut engine = engine(2);
        let q = engine.questions()[0].clone();

        engine.handle(&PlayerAction::DropOnBlank {
            question: q.id,
            option: wrong_option(&q),
            target: Some(q.id),
        });

        assert_eq!(engine.score(), 18);
        assert_eq!(engine.filled(), 0);
    }

    #[test]
    fn test_drop_outside_is_silent() {
        let mut engine = engine(3);
        let q = engine.questions()[0].clone();

        let out = engine.handle(&PlayerAction::DropOnBlank {
            question: q.id,
            option: wrong_option(&q),
            target: None,
        });

        assert!(out.events.is_empty());
        assert_eq!(engine.score(), 20);
    }

    #[test]
    fn test_drop_on_other_blank_is_silent() {
        let mut engine = engine(4);
        let first = engine.questions()[0].clone();
        let second = engine.questions()[1].clone();

        let out = engine.handle(&PlayerAction::DropOnBlank {
            question: first.id,
            option: correct_option(&first),
            target: Some(second.id),
        });

        assert!(out.events.is_empty());
        assert_eq!(engine.filled(), 0);
    }

    #[test]
    fn test_filled_blank_rejects_further_drops() {
        let mut engine = engine(5);
        let q = engine.questions()[0].clone();
        let drop = PlayerAction::DropOnBlank {
            question: q.id,
            option: correct_option(&q),
            target: Some(q.id),
        };

        engine.handle(&drop);
        assert_eq!(engine.filled(), 1);

        let out = engine.handle(&drop);
        assert!(out.events.is_empty());
        assert_eq!(engine.filled(), 1);
    }

    #[test]
    fn test_timeout_pays_zero() {
        let mut engine = engine(6);
        engine.time_left = 1;
        engine.on_timer(TimerKind::Countdown);
        assert_eq!(engine.phase(), Phase::TimedOut);

        let q = engine.questions()[0].clone();
        let out = engine.handle(&PlayerAction::DropOnBlank {
            question: q.id,
            option: correct_option(&q),
            target: Some(q.id),
        });
        assert!(out.events.is_empty());

        let out = engine.handle(&PlayerAction::ConfirmTimeout);
        assert_eq!(out.events.last(), Some(&EngineEvent::Finished { score: 0 }));
    }
}
