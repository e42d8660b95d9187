//! Engine Mount
//!
//! The host around one mini-game instance: it builds the right engine for a
//! stage, owns the virtual scheduler, keeps at most one pending task per
//! timer kind, and forwards the engine's single `Finished` event to the
//! stage completion callback. Exactly one mount exists at a time; dropping
//! it cancels every outstanding delay.

use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::catalog::content::ContentCatalog;
use crate::catalog::level::{LevelId, SpellingVariant, StageConfig, StageKind, StageParams};
use crate::core::clock::{Scheduler, TaskId};
use crate::core::rng::DeterministicRng;
use super::action::PlayerAction;
use super::drag_blank::DragBlankEngine;
use super::engine::{MiniGame, Phase, StepOutcome, TimerKind};
use super::events::EngineEvent;
use super::find_pair::FindPairEngine;
use super::line_match::LineMatchEngine;
use super::memory::MemoryEngine;
use super::pair_match::PairMatchEngine;
use super::puzzle::PuzzleEngine;
use super::sentence::SentenceEngine;
use super::spelling::SpellingEngine;

/// Stage completion callback: receives the final stage score.
pub type CompletionHook = Box<dyn FnOnce(u32)>;

/// A mounted mini-game: engine + scheduler + completion plumbing.
pub struct EngineMount {
    engine: Box<dyn MiniGame>,
    kind: StageKind,
    scheduler: Scheduler<TimerKind>,
    pending: BTreeMap<TimerKind, TaskId>,
    finished: Option<u32>,
    on_complete: Option<CompletionHook>,
}

impl EngineMount {
    /// Build and boot the engine for `stage`, sampling content from the
    /// catalog with a stream forked off `rng`.
    pub fn new(
        level: LevelId,
        stage: &StageConfig,
        content: &ContentCatalog,
        rng: &mut DeterministicRng,
    ) -> Self {
        let mut stage_rng = rng.fork();
        let engine = build_engine(level, stage, content, &mut stage_rng);

        let mut mount = Self {
            engine,
            kind: stage.kind,
            scheduler: Scheduler::new(),
            pending: BTreeMap::new(),
            finished: None,
            on_complete: None,
        };

        debug!(kind = stage.kind.as_str(), stage = stage.id, "engine mounted");
        let boot = mount.engine.boot();
        let mut sink = Vec::new();
        mount.apply(boot, &mut sink);
        mount
    }

    /// Attach the stage completion callback. Called at most once, with a
    /// value >= 0, when the engine reports.
    pub fn with_completion(mut self, hook: impl FnOnce(u32) + 'static) -> Self {
        self.on_complete = Some(Box::new(hook));
        self
    }

    /// Which engine kind is mounted.
    pub fn kind(&self) -> StageKind {
        self.kind
    }

    /// Engine lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.engine.phase()
    }

    /// Current stage score.
    pub fn score(&self) -> u32 {
        self.engine.score()
    }

    /// Seconds left on the countdown.
    pub fn time_left(&self) -> u32 {
        self.engine.time_left()
    }

    /// Current virtual time.
    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    /// Final stage score, once reported.
    pub fn finished_score(&self) -> Option<u32> {
        self.finished
    }

    /// Renderable engine state for the UI bridge.
    pub fn view(&self) -> serde_json::Value {
        self.engine.view()
    }

    /// Deliver one player action to the engine.
    pub fn dispatch(&mut self, action: &PlayerAction) -> Vec<EngineEvent> {
        let out = self.engine.handle(action);
        let mut events = Vec::new();
        self.apply(out, &mut events);
        events
    }

    /// Advance virtual time by `ms`, firing every due timer in order.
    pub fn advance(&mut self, ms: u64) -> Vec<EngineEvent> {
        let target = self.scheduler.now_ms().saturating_add(ms);
        let mut events = Vec::new();

        while let Some((id, kind)) = self.scheduler.pop_due(target) {
            if self.pending.get(&kind) == Some(&id) {
                self.pending.remove(&kind);
            }
            let out = self.engine.on_timer(kind);
            self.apply(out, &mut events);
        }
        self.scheduler.settle(target);

        events
    }

    /// Tear the mount down, cancelling every outstanding delay.
    ///
    /// Dropping the mount has the same effect; this exists for explicit
    /// back-out flows and logs the abandonment.
    pub fn unmount(mut self) {
        self.pending.clear();
        self.scheduler.cancel_all();
        if self.finished.is_none() {
            debug!(kind = self.kind.as_str(), "engine unmounted before completion");
        }
    }

    fn apply(&mut self, out: StepOutcome, sink: &mut Vec<EngineEvent>) {
        for kind in out.cancel {
            if let Some(id) = self.pending.remove(&kind) {
                self.scheduler.cancel(id);
            }
        }

        for req in out.schedule {
            // One pending task per kind: a re-request replaces the old one
            if let Some(prev) = self.pending.remove(&req.kind) {
                self.scheduler.cancel(prev);
            }
            let id = self.scheduler.schedule(req.delay_ms, req.kind);
            self.pending.insert(req.kind, id);
        }

        for event in out.events {
            if let EngineEvent::Finished { score } = event {
                // The engine's Reported transition already guarantees a
                // single Finished; dropping the hook makes it structural.
                if self.finished.is_none() {
                    self.finished = Some(score);
                    info!(kind = self.kind.as_str(), score, "stage finished");
                    if let Some(hook) = self.on_complete.take() {
                        hook(score);
                    }
                }
                self.pending.clear();
                self.scheduler.cancel_all();
            }
            sink.push(event);
        }
    }
}

/// Pick the engine implementation for a stage and feed it the right pool.
fn build_engine(
    level: LevelId,
    stage: &StageConfig,
    content: &ContentCatalog,
    rng: &mut DeterministicRng,
) -> Box<dyn MiniGame> {
    match stage.kind {
        StageKind::PairMatch => {
            Box::new(PairMatchEngine::new(stage, content.pairs(level), rng))
        }
        StageKind::FindPair => {
            let pool = content.picture_pairs(level);
            Box::new(FindPairEngine::new(stage, &pool, rng))
        }
        StageKind::DragBlank => {
            Box::new(DragBlankEngine::new(stage, content.blanks(level), rng))
        }
        StageKind::LineMatch => {
            Box::new(LineMatchEngine::new(stage, content.actions(level), rng))
        }
        StageKind::Puzzle => Box::new(PuzzleEngine::new(stage, content.scenes(level), rng)),
        StageKind::Spelling => {
            let pool = match stage.params {
                StageParams::Spelling { variant: SpellingVariant::Color, .. } => {
                    content.color_spelling(level)
                }
                _ => content.spelling(level),
            };
            Box::new(SpellingEngine::new(stage, pool, rng))
        }
        StageKind::SentenceBuilder => {
            Box::new(SentenceEngine::new(stage, content.sentences(level), rng))
        }
        StageKind::CardMemory => {
            let pool = content.text_pairs(level);
            Box::new(MemoryEngine::new(stage, &pool, rng))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
