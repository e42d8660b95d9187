//! Session Orchestrator
//!
//! The one mutable runtime state of the shell: which level is active, the
//! concrete stage list for this run, the stage cursor and the running total
//! score. Stage lists are resolved exactly once per selection — dynamic
//! plans draw their scenes here and nowhere else — and every stage mount
//! forks its content stream off the selection's RNG.

use tracing::info;

use crate::catalog::content::ContentCatalog;
use crate::catalog::level::{LevelCatalog, LevelId, StageConfig};
use crate::core::rng::{derive_session_seed, DeterministicRng};
use crate::game::mount::EngineMount;
use super::registration::{PlayerName, RegistrationError};

/// Session errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The level does not exist in the catalog.
    #[error("unknown level")]
    UnknownLevel,

    /// The level is locked.
    #[error("level is locked")]
    LevelLocked,

    /// No level is active.
    #[error("no active level")]
    NoActiveLevel,

    /// The active level already completed; there is no current stage.
    #[error("level already complete")]
    LevelComplete,
}

/// What `complete_stage` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageAdvance {
    /// The cursor moved to the next stage.
    NextStage {
        /// New stage index.
        index: usize,
    },
    /// That was the last stage; the level is complete.
    LevelComplete {
        /// Final accumulated score.
        total_score: u32,
    },
}

/// State of one selected level run.
#[derive(Debug, Clone)]
struct ActiveLevel {
    level_id: LevelId,
    /// Resolved once at selection; stable for the whole run.
    stages: Vec<StageConfig>,
    stage_index: usize,
    total_score: u32,
    complete: bool,
    /// Content stream for this run; every mount forks from it.
    rng: DeterministicRng,
}

/// The orchestrator's volatile per-browser-session state.
///
/// Created when the shell loads, destroyed with the page. Nothing here is
/// persisted; a restart is a fresh session.
#[derive(Debug)]
pub struct Session {
    id: [u8; 16],
    player_name: Option<PlayerName>,
    /// Selections made so far; salts each selection's seed.
    selections: u64,
    active: Option<ActiveLevel>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Start a fresh session with a random identity.
    pub fn new() -> Self {
        Self::with_id(uuid::Uuid::new_v4().into_bytes())
    }

    /// Start a session with a fixed identity (deterministic replays, tests).
    pub fn with_id(id: [u8; 16]) -> Self {
        Self {
            id,
            player_name: None,
            selections: 0,
            active: None,
        }
    }

    /// Session identity bytes.
    pub fn id(&self) -> &[u8; 16] {
        &self.id
    }

    /// The registered player, if any.
    pub fn player_name(&self) -> Option<&PlayerName> {
        self.player_name.as_ref()
    }

    /// Register the player's name (validated and trimmed).
    pub fn register_player(&mut self, raw: &str) -> Result<(), RegistrationError> {
        let name = PlayerName::new(raw)?;
        info!(player = %name, "player registered");
        self.player_name = Some(name);
        Ok(())
    }

    /// The active level, if any.
    pub fn active_level(&self) -> Option<LevelId> {
        self.active.as_ref().map(|a| a.level_id)
    }

    /// The resolved stage list of the active run.
    pub fn stages(&self) -> Option<&[StageConfig]> {
        self.active.as_ref().map(|a| a.stages.as_slice())
    }

    /// Current stage cursor.
    pub fn stage_index(&self) -> Option<usize> {
        self.active.as_ref().map(|a| a.stage_index)
    }

    /// The stage the cursor points at, unless the run completed.
    pub fn current_stage(&self) -> Option<&StageConfig> {
        let active = self.active.as_ref()?;
        if active.complete {
            return None;
        }
        active.stages.get(active.stage_index)
    }

    /// Running total score of the active run.
    pub fn total_score(&self) -> u32 {
        self.active.as_ref().map(|a| a.total_score).unwrap_or(0)
    }

    /// Whether the active run finished its last stage.
    pub fn level_complete(&self) -> bool {
        self.active.as_ref().map(|a| a.complete).unwrap_or(false)
    }

    /// Select a level and resolve its stage list for this run.
    ///
    /// Locked levels are rejected with zero state change — repeating the
    /// call repeats the rejection. Dynamic plans consume randomness exactly
    /// once, here; the resolved list then stays fixed for the whole run.
    pub fn select_level(
        &mut self,
        levels: &LevelCatalog,
        id: LevelId,
    ) -> Result<(), SessionError> {
        let level = levels.get(id).ok_or(SessionError::UnknownLevel)?;
        if level.locked {
            info!(level = %id, "selection rejected: locked");
            return Err(SessionError::LevelLocked);
        }

        self.selections += 1;
        let seed = derive_session_seed(&self.id, id.as_str(), self.selections);
        let mut rng = DeterministicRng::new(seed);
        let stages = level.resolve_stages(&mut rng);

        info!(level = %id, stages = stages.len(), "level selected");
        self.active = Some(ActiveLevel {
            level_id: id,
            stages,
            stage_index: 0,
            total_score: 0,
            complete: false,
            rng,
        });
        Ok(())
    }

    /// Mount the engine for the current stage.
    ///
    /// Every call deals fresh content (the run's RNG advances), so backing
    /// out and re-entering a stage reshuffles it.
    pub fn mount_current_stage(
        &mut self,
        content: &ContentCatalog,
    ) -> Result<EngineMount, SessionError> {
        let active = self.active.as_mut().ok_or(SessionError::NoActiveLevel)?;
        if active.complete {
            return Err(SessionError::LevelComplete);
        }
        let stage = active
            .stages
            .get(active.stage_index)
            .ok_or(SessionError::LevelComplete)?
            .clone();
        Ok(EngineMount::new(active.level_id, &stage, content, &mut active.rng))
    }

    /// Fold a finished stage's score into the run and advance the cursor.
    ///
    /// The engine mount guarantees this is reached once per stage; the
    /// orchestrator only accumulates and advances. The earned score is
    /// non-negative by type, and a folded contribution never changes.
    pub fn complete_stage(&mut self, earned: u32) -> Result<StageAdvance, SessionError> {
        let active = self.active.as_mut().ok_or(SessionError::NoActiveLevel)?;
        if active.complete {
            return Err(SessionError::LevelComplete);
        }

        active.total_score += earned;

        if active.stage_index + 1 < active.stages.len() {
            active.stage_index += 1;
            info!(
                level = %active.level_id,
                stage = active.stage_index,
                total = active.total_score,
                "stage complete, advancing"
            );
            Ok(StageAdvance::NextStage { index: active.stage_index })
        } else {
            active.complete = true;
            info!(
                level = %active.level_id,
                total = active.total_score,
                "level complete"
            );
            Ok(StageAdvance::LevelComplete { total_score: active.total_score })
        }
    }

    /// Back to the selection screen. The player name survives.
    pub fn reset_to_selection(&mut self) {
        self.active = None;
    }

    /// Full logout: also forgets the player name.
    pub fn full_reset(&mut self) {
        self.active = None;
        self.player_name = None;
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    use crate::catalog::level::StageParams;

    fn session() -> (Session, LevelCatalog) {
        (Session::with_id([9u8; 16]), LevelCatalog::bundled())
    }

    #[test]
    fn test_select_resets_run_state() {
        let (mut session, levels) = session();
        session.select_level(&levels, LevelId::SmallStars).unwrap();

        assert_eq!(session.active_level(), Some(LevelId::SmallStars));
        assert_eq!(session.stage_index(), Some(0));
        assert_eq!(session.total_score(), 0);
        assert!(!session.level_complete());
        assert_eq!(session.stages().unwrap().len(), 4);
    }

    #[test]
    fn test_locked_level_rejected_without_state_change() {
        let (mut session, levels) = session();
        session.select_level(&levels, LevelId::SmallStars).unwrap();
        session.complete_stage(10).unwrap();

        // Rejection, twice, with identical state after each
        for _ in 0..2 {
            let err = session.select_level(&levels, LevelId::Frontrunner);
            assert_eq!(err, Err(SessionError::LevelLocked));
            assert_eq!(session.active_level(), Some(LevelId::SmallStars));
            assert_eq!(session.stage_index(), Some(1));
            assert_eq!(session.total_score(), 10);
        }
    }

    #[test]
    fn test_stage_advance_and_completion() {
        let (mut session, levels) = session();
        session.select_level(&levels, LevelId::Trailblazers).unwrap();

        assert_eq!(
            session.complete_stage(15),
            Ok(StageAdvance::NextStage { index: 1 })
        );
        assert_eq!(
            session.complete_stage(18),
            Ok(StageAdvance::LevelComplete { total_score: 33 })
        );
        assert!(session.level_complete());
        assert!(session.current_stage().is_none());

        // The cursor never advances past the end
        assert_eq!(session.complete_stage(5), Err(SessionError::LevelComplete));
        assert_eq!(session.total_score(), 33);
    }

    #[test]
    fn test_dynamic_stage_list_resolved_once_per_selection() {
        let (mut session, levels) = session();
        session.select_level(&levels, LevelId::HighFlyers).unwrap();

        // Reading the stage list twice yields the same concrete list
        let first: Vec<StageConfig> = session.stages().unwrap().to_vec();
        let second: Vec<StageConfig> = session.stages().unwrap().to_vec();
        assert_eq!(first, second);

        // And it stays stable across unrelated mutations
        session.complete_stage(10).unwrap();
        assert_eq!(session.stages().unwrap(), first.as_slice());
    }

    #[test]
    fn test_reselection_rolls_fresh_scenes() {
        let (mut session, levels) = session();

        let mut first_scenes = std::collections::BTreeSet::new();
        for _ in 0..12 {
            session.select_level(&levels, LevelId::HighFlyers).unwrap();
            if let StageParams::Puzzle { scene: Some(id) } =
                session.stages().unwrap()[0].params
            {
                first_scenes.insert(id);
            }
        }
        assert!(first_scenes.len() > 1, "12 selections never varied the scene");
    }

    #[test]
    fn test_identical_sessions_replay_identically() {
        let levels = LevelCatalog::bundled();
        let mut a = Session::with_id([3u8; 16]);
        let mut b = Session::with_id([3u8; 16]);

        a.select_level(&levels, LevelId::HighFlyers).unwrap();
        b.select_level(&levels, LevelId::HighFlyers).unwrap();

        assert_eq!(a.stages().unwrap(), b.stages().unwrap());
    }

    #[test]
    fn test_reset_keeps_name_full_reset_clears_it() {
        let (mut session, levels) = session();
        session.register_player(" Nora ").unwrap();
        session.select_level(&levels, LevelId::SmallStars).unwrap();

        session.reset_to_selection();
        assert!(session.active_level().is_none());
        assert_eq!(session.player_name().map(|n| n.as_str()), Some("Nora"));

        session.full_reset();
        assert!(session.player_name().is_none());
    }

    #[test]
    fn test_mount_requires_active_level() {
        let (mut session, _levels) = session();
        let content = ContentCatalog::bundled();
        assert!(matches!(
            session.mount_current_stage(&content),
            Err(SessionError::NoActiveLevel)
        ));
    }

    #[test]
    fn test_remount_redeals_content() {
        let (mut session, levels) = session();
        let content = ContentCatalog::bundled();
        session.select_level(&levels, LevelId::Trailblazers).unwrap();

        let first = session.mount_current_stage(&content).unwrap();
        let second = session.mount_current_stage(&content).unwrap();

        // Same stage, fresh deal: the card layouts differ (same run RNG,
        // advanced between mounts)
        assert_ne!(first.view()["cards"], second.view()["cards"]);
    }

    proptest! {
        #[test]
        fn prop_total_score_is_sum_of_stage_scores(
            scores in proptest::collection::vec(0u32..1_000, 1..=4)
        ) {
            let levels = LevelCatalog::bundled();
            let mut session = Session::with_id([5u8; 16]);
            // SmallStars has four stages, enough for any generated sequence
            session.select_level(&levels, LevelId::SmallStars).unwrap();

            for score in &scores {
                session.complete_stage(*score).unwrap();
            }

            prop_assert_eq!(session.total_score(), scores.iter().sum::<u32>());
        }

        #[test]
        fn prop_completion_exactly_on_last_stage(
            fill in 0u32..100
        ) {
            let levels = LevelCatalog::bundled();
            let mut session = Session::with_id([6u8; 16]);
            session.select_level(&levels, LevelId::Trailblazers).unwrap();

            prop_assert_eq!(
                session.complete_stage(fill).unwrap(),
                StageAdvance::NextStage { index: 1 }
            );
            prop_assert!(!session.level_complete());

            let advance = session.complete_stage(fill).unwrap();
            prop_assert!(matches!(advance, StageAdvance::LevelComplete { .. }), "expected LevelComplete");
            prop_assert!(session.level_complete());
        }
    }
}
