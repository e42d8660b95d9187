//! Line-Match Engine
//!
//! Two shuffled columns — action pictures on the left, action words on the
//! right — and the player draws lines between them. A correct line scores
//! five points and sticks; a wrong line costs two, flashes red, and removes
//! itself after half a second. Connecting every item correctly completes the
//! stage. A timeout keeps whatever was scored.

use serde::Serialize;

use crate::catalog::content::ActionEntry;
use crate::catalog::level::{StageConfig, StageParams};
use crate::core::rng::DeterministicRng;
use super::action::{Endpoint, PlayerAction, Side};
use super::engine::{
    confirm_timeout, countdown_step, enter_completed, report_finish,
    MiniGame, Phase, StepOutcome, TimerKind, TimerRequest,
};
use super::events::EngineEvent;

/// Wrong lines disappear after this long.
const REMOVE_WRONG_MS: u64 = 500;
/// Success display delay before the score is reported.
const FINISH_DELAY_MS: u64 = 1_000;
/// Points for a correct connection.
const CORRECT_POINTS: u32 = 5;
/// Points lost for a wrong connection.
const WRONG_PENALTY: u32 = 2;

/// One matchable item (a picture and the word naming it).
#[derive(Clone, Debug, Serialize)]
pub struct LineItem {
    /// Item id, shared by its picture and its word.
    pub id: u32,
    /// The action word.
    pub word: String,
    /// Asset key for the picture.
    pub image: String,
}

/// A drawn line between the two columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Connection {
    /// Picture-column item id.
    pub picture: u32,
    /// Word-column item id.
    pub word: u32,
    /// Whether picture and word name the same item.
    pub correct: bool,
}

/// Line-match state machine.
#[derive(Debug, Serialize)]
pub struct LineMatchEngine {
    items: Vec<LineItem>,
    /// Display order of the picture column.
    picture_order: Vec<u32>,
    /// Display order of the word column.
    word_order: Vec<u32>,
    connections: Vec<Connection>,
    mistakes: u32,
    score: u32,
    time_left: u32,
    phase: Phase,
}

impl LineMatchEngine {
    /// Draw the stage's item count from `pool` and shuffle both columns.
    pub fn new(stage: &StageConfig, pool: &[ActionEntry], rng: &mut DeterministicRng) -> Self {
        let count = match stage.params {
            StageParams::LineMatch { items } => items,
            _ => 5,
        };

        let items: Vec<LineItem> = rng
            .sample(pool, count)
            .into_iter()
            .map(|entry| LineItem {
                id: entry.id,
                word: entry.word.to_string(),
                image: entry.image.to_string(),
            })
            .collect();

        let mut picture_order: Vec<u32> = items.iter().map(|i| i.id).collect();
        let mut word_order = picture_order.clone();
        rng.shuffle(&mut picture_order);
        rng.shuffle(&mut word_order);

        Self {
            items,
            picture_order,
            word_order,
            connections: Vec::new(),
            mistakes: 0,
            score: 0,
            time_left: stage.time_limit,
            phase: Phase::Active,
        }
    }

    /// The drawn items.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Lines currently drawn (wrong ones linger briefly).
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    fn endpoint_engaged(&self, side: Side, id: u32) -> bool {
        self.connections.iter().any(|c| match side {
            Side::Picture => c.picture == id,
            Side::Word => c.word == id,
        })
    }

    fn connect(&mut self, from: Endpoint, to: Endpoint) -> StepOutcome {
        if self.phase != Phase::Active {
            return StepOutcome::none();
        }
        // A line must bridge the two columns.
        if from.side == to.side {
            return StepOutcome::none();
        }
        let (picture, word) = match from.side {
            Side::Picture => (from.id, to.id),
            Side::Word => (to.id, from.id),
        };
        if !self.items.iter().any(|i| i.id == picture) || !self.items.iter().any(|i| i.id == word) {
            return StepOutcome::none();
        }
        // Both ends must still be free.
        if self.endpoint_engaged(Side::Picture, picture) || self.endpoint_engaged(Side::Word, word) {
            return StepOutcome::none();
        }

        let correct = picture == word;
        self.connections.push(Connection { picture, word, correct });

        let mut out = StepOutcome::none();
        if correct {
            self.score += CORRECT_POINTS;
        } else {
            self.mistakes += 1;
            self.score = self.score.saturating_sub(WRONG_PENALTY);
            out.schedule.push(TimerRequest::after(TimerKind::RemoveConnection, REMOVE_WRONG_MS));
        }
        out.events.push(EngineEvent::ConnectionMade { picture, word, correct, score: self.score });

        let correct_count = self.connections.iter().filter(|c| c.correct).count();
        if correct_count == self.items.len() {
            enter_completed(&mut self.phase, FINISH_DELAY_MS, &mut out);
        }

        out
    }
}

impl MiniGame for LineMatchEngine {
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
            PlayerAction::Connect { from, to } => self.connect(*from, *to),
            // Timeout keeps the running score
            PlayerAction::ConfirmTimeout => confirm_timeout(&mut self.phase, self.score),
            _ => StepOutcome::none(),
        }
    }

    fn on_timer(&mut self, kind: TimerKind) -> StepOutcome {
        match kind {
            TimerKind::Countdown => countdown_step(&mut self.phase, &mut self.time_left),
            TimerKind::RemoveConnection => {
                if self.phase != Phase::Active {
                    return StepOutcome::none();
                }
                let mut out = StepOutcome::none();
                // Sweep every wrong line at once; two quick mistakes share
                // one removal pulse.
                let (kept, dropped): (Vec<Connection>, Vec<Connection>) =
                    self.connections.iter().partition(|c| c.correct);
                self.connections = kept;
                for c in dropped {
                    out.events.push(EngineEvent::ConnectionRemoved {
                        picture: c.picture,
                        word: c.word,
                    });
                }
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
