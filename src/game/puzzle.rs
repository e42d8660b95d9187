//! Hotspot-Puzzle Engine
//!
//! A scene picture with labeled hotspots: drag each word onto the thing it
//! names. A miss simply snaps back — there is no penalty. Completing a scene
//! banks `items x 10` plus the seconds left, then the next scene starts with
//! a fresh clock. A timeout keeps everything banked so far.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::catalog::content::PuzzleScene;
use crate::catalog::level::{SceneId, StageConfig, StageParams};
use crate::core::rng::DeterministicRng;
use super::action::PlayerAction;
use super::engine::{
    confirm_timeout, countdown_step, enter_completed, report_finish,
    MiniGame, Phase, StepOutcome, TimerKind, TimerRequest,
};
use super::events::EngineEvent;

/// Pause between a finished scene and the next one (or the final report).
const SCENE_PAUSE_MS: u64 = 1_500;
/// Points per placed item when a scene completes.
const POINTS_PER_ITEM: u32 = 10;

/// Hotspot-puzzle state machine.
#[derive(Debug, Serialize)]
pub struct PuzzleEngine {
    scenes: Vec<PuzzleScene>,
    scene_index: usize,
    placed: BTreeSet<u32>,
    score: u32,
    time_left: u32,
    /// Fresh budget each scene starts from.
    scene_time: u32,
    phase: Phase,
}

impl PuzzleEngine {
    /// Set up the scene run: one fixed scene, or every scene shuffled.
    pub fn new(stage: &StageConfig, pool: &[PuzzleScene], rng: &mut DeterministicRng) -> Self {
        let wanted = match stage.params {
            StageParams::Puzzle { scene } => scene,
            _ => None,
        };

        let scenes: Vec<PuzzleScene> = match wanted {
            Some(id) => pool.iter().filter(|s| s.id == id).cloned().collect(),
            None => {
                let mut all: Vec<PuzzleScene> = pool.to_vec();
                rng.shuffle(&mut all);
                all
            }
        };

        Self {
            scenes,
            scene_index: 0,
            placed: BTreeSet::new(),
            score: 0,
            time_left: stage.time_limit,
            scene_time: stage.time_limit,
            phase: Phase::Active,
        }
    }

    /// The scene currently on screen, if any remain.
    pub fn current_scene(&self) -> Option<&PuzzleScene> {
        self.scenes.get(self.scene_index)
    }

    /// Scene ids in play order.
    pub fn scene_ids(&self) -> Vec<SceneId> {
        self.scenes.iter().map(|s| s.id).collect()
    }

    /// Labels placed in the current scene.
    pub fn placed(&self) -> usize {
        self.placed.len()
    }

    fn place(&mut self, item: u32, x_pct: u8, y_pct: u8) -> StepOutcome {
        if self.phase != Phase::Active {
            return StepOutcome::none();
        }
        let Some(scene) = self.scenes.get(self.scene_index) else {
            return StepOutcome::none();
        };
        if self.placed.contains(&item) {
            return StepOutcome::none();
        }
        let Some(target) = scene.items.iter().find(|i| i.id == item) else {
            return StepOutcome::none();
        };
        // A drop outside the zone fails silently; the label snaps back.
        if !target.rect.contains(x_pct, y_pct) {
            return StepOutcome::none();
        }

        let total = scene.items.len();
        self.placed.insert(item);

        let mut out = StepOutcome::none();
        out.events.push(EngineEvent::LabelPlaced {
            item,
            placed: self.placed.len(),
            total,
        });

        if self.placed.len() == total {
            // Scene done: bank its points plus the time bonus
            let scene_score = total as u32 * POINTS_PER_ITEM + self.time_left;
            self.score += scene_score;
            out.events.push(EngineEvent::RoundCompleted {
                round: self.scene_index,
                score: self.score,
            });

            if self.scene_index + 1 < self.scenes.len() {
                out.cancel.push(TimerKind::Countdown);
                out.schedule.push(TimerRequest::after(TimerKind::AdvanceRound, SCENE_PAUSE_MS));
            } else {
                enter_completed(&mut self.phase, SCENE_PAUSE_MS, &mut out);
            }
        }

        out
    }
}

impl MiniGame for PuzzleEngine {
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
        if self.scenes.is_empty() {
            // Configuration gap: no scene to play, nothing to do but a
            // placeholder. The stage can still be confirmed away.
            self.phase = Phase::TimedOut;
            return out;
        }
        out.schedule.push(TimerRequest::countdown());
        out
    }

    fn handle(&mut self, action: &PlayerAction) -> StepOutcome {
        match action {
            PlayerAction::PlaceLabel { item, x_pct, y_pct } => self.place(*item, *x_pct, *y_pct),
            // Timeout keeps the banked score
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
                self.scene_index += 1;
                self.placed.clear();
                self.time_left = self.scene_time;

                let mut out = StepOutcome::none();
                out.events.push(EngineEvent::RoundStarted { round: self.scene_index });
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::content::ContentCatalog;
    use crate::catalog::level::{LevelId, StageKind};

    fn stage(scene: Option<SceneId>) -> StageConfig {
        StageConfig {
            id: 1,
            kind: StageKind::Puzzle,
            base_score: 25,
            time_limit: 90,
            params: StageParams::Puzzle { scene },
        }
    }

    fn engine(scene: Option<SceneId>, seed: u64) -> PuzzleEngine {
        let catalog = ContentCatalog::bundled();
        let mut rng = DeterministicRng::new(seed);
        PuzzleEngine::new(&stage(scene), catalog.scenes(LevelId::HighFlyers), &mut rng)
    }

    fn solve_current_scene(engine: &mut PuzzleEngine) -> StepOutcome {
        let items: Vec<(u32, u8, u8)> = engine
            .current_scene()
            .unwrap()
            .items
            .iter()
            .map(|i| {
                let (x, y) = i.rect.center();
                (i.id, x, y)
            })
            .collect();

        let mut last = StepOutcome::none();
        for (id, x, y) in items {
            last = engine.handle(&PlayerAction::PlaceLabel { item: id, x_pct: x, y_pct: y });
        }
        last
    }

    #[test]
    fn test_fixed_scene_runs_alone() {
        let engine = engine(Some(SceneId::Restaurant), 1);
        assert_eq!(engine.scene_ids(), vec![SceneId::Restaurant]);
    }

    #[test]
    fn test_unpinned_stage_plays_all_scenes() {
        let engine = engine(None, 2);
        assert_eq!(engine.scene_ids().len(), 3);
    }

    #[test]
    fn test_miss_is_silent_no_op() {
        let mut engine = engine(Some(SceneId::Bedroom), 3);
        let item = engine.current_scene().unwrap().items[0].clone();

        // (0, 0) lands outside every bedroom hotspot
        let out = engine.handle(&PlayerAction::PlaceLabel { item: item.id, x_pct: 0, y_pct: 0 });
        assert!(out.events.is_empty());
        assert_eq!(engine.placed(), 0);
        assert_eq!(engine.score(), 0);
    }

    #[test]
    fn test_single_scene_scores_items_plus_time() {
        let mut engine = engine(Some(SceneId::Bedroom), 4);
        let out = solve_current_scene(&mut engine);

        // 8 items x 10 + 90 seconds untouched
        assert_eq!(engine.score(), 170);
        assert_eq!(engine.phase(), Phase::Completed);
        assert!(out.events.iter().any(|e| matches!(
            e,
            EngineEvent::RoundCompleted { round: 0, score: 170 }
        )));

        let out = engine.on_timer(TimerKind::FinishDelay);
        assert_eq!(out.events.last(), Some(&EngineEvent::Finished { score: 170 }));
    }

    #[test]
    fn test_multi_scene_resets_clock_and_accumulates() {
        let mut engine = engine(None, 5);

        // Burn some time in scene one
        engine.on_timer(TimerKind::Countdown);
        engine.on_timer(TimerKind::Countdown);
        assert_eq!(engine.time_left(), 88);

        let out = solve_current_scene(&mut engine);
        assert_eq!(engine.score(), 168);
        assert!(out.schedule.iter().any(|r| r.kind == TimerKind::AdvanceRound));
        assert_eq!(engine.phase(), Phase::Active);

        let out = engine.on_timer(TimerKind::AdvanceRound);
        assert_eq!(engine.time_left(), 90);
        assert_eq!(engine.placed(), 0);
        assert!(out.events.contains(&EngineEvent::RoundStarted { round: 1 }));

        solve_current_scene(&mut engine);
        assert_eq!(engine.score(), 168 + 170);
    }

    #[test]
    fn test_timeout_keeps_banked_score() {
        let mut engine = engine(None, 6);
        solve_current_scene(&mut engine);
        engine.on_timer(TimerKind::AdvanceRound);
        let banked = engine.score();

        engine.time_left = 1;
        engine.on_timer(TimerKind::Countdown);
        assert_eq!(engine.phase(), Phase::TimedOut);

        let out = engine.handle(&PlayerAction::ConfirmTimeout);
        assert_eq!(out.events.last(), Some(&EngineEvent::Finished { score: banked }));
    }

    #[test]
    fn test_empty_pool_degrades_to_placeholder() {
        let mut rng = DeterministicRng::new(7);
        let mut engine = PuzzleEngine::new(&stage(None), &[], &mut rng);
        engine.boot();

        // No scenes: the stage is immediately confirmable at zero
        let out = engine.handle(&PlayerAction::ConfirmTimeout);
        assert_eq!(out.events.last(), Some(&EngineEvent::Finished { score: 0 }));
    }
}
