//! Shared Engine Contract
//!
//! Every mini-game variant implements one state machine shape:
//!
//! ```text
//! Briefing? -> Active -> Completed -> Reported
//!                    \-> TimedOut  -> Reported
//! ```
//!
//! `Reported` is absorbing: the `Finished` event is the transition into it,
//! which is what makes the completion callback fire at most once — there is
//! no boolean guard to forget. Engines never own real timers; they request
//! delays from the mount and react when the mount delivers them back.

use serde::{Serialize, Deserialize};

use super::action::PlayerAction;
use super::events::EngineEvent;

/// Countdown granularity: one tick per second.
pub const COUNTDOWN_MS: u64 = 1_000;

// =============================================================================
// PHASES
// =============================================================================

/// Engine lifecycle phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Pre-game instruction or start modal; countdown paused.
    Briefing,
    /// Countdown running, player actions accepted.
    Active,
    /// Win condition met; waiting out the success display delay.
    Completed,
    /// Countdown hit zero; waiting for the player to acknowledge.
    TimedOut,
    /// Final score has been emitted. Absorbing.
    Reported,
}

impl Phase {
    /// Whether no further meaningful transition can occur.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Completed | Phase::TimedOut | Phase::Reported)
    }
}

// =============================================================================
// TIMERS
// =============================================================================

/// What a requested delay means when it comes back.
///
/// The mount keeps at most one pending task per kind, so re-requesting a
/// kind replaces the previous request — this is the "at most one outstanding
/// advance callback" guarantee.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimerKind {
    /// Repeating 1-second countdown pulse.
    Countdown,
    /// Flip a wrong pair back face down / clear a stuck selection.
    ClearSelection,
    /// Remove wrong line-match connections.
    RemoveConnection,
    /// Advance to the next round or scene after a success pause.
    AdvanceRound,
    /// Reshuffle pulse during the find-the-pair shuffle phase.
    Reshuffle,
    /// End of the shuffle phase; start searching.
    BeginSearch,
    /// Clear the sentence-builder rejection highlight.
    ClearFeedback,
    /// Success display delay before the final score is reported.
    FinishDelay,
}

impl TimerKind {
    /// Every kind; used to cancel all outstanding work on a terminal
    /// transition.
    pub const ALL: [TimerKind; 8] = [
        TimerKind::Countdown,
        TimerKind::ClearSelection,
        TimerKind::RemoveConnection,
        TimerKind::AdvanceRound,
        TimerKind::Reshuffle,
        TimerKind::BeginSearch,
        TimerKind::ClearFeedback,
        TimerKind::FinishDelay,
    ];
}

/// A delay an engine asks the mount to schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerRequest {
    /// Task identity delivered back via [`MiniGame::on_timer`].
    pub kind: TimerKind,
    /// Delay from now, in milliseconds.
    pub delay_ms: u64,
}

impl TimerRequest {
    /// Request a task of `kind` after `delay_ms`.
    pub fn after(kind: TimerKind, delay_ms: u64) -> Self {
        Self { kind, delay_ms }
    }

    /// Request the next countdown pulse.
    pub fn countdown() -> Self {
        Self::after(TimerKind::Countdown, COUNTDOWN_MS)
    }
}

// =============================================================================
// STEP OUTCOME
// =============================================================================

/// Everything a single engine step wants the mount to do.
#[derive(Clone, Debug, Default)]
pub struct StepOutcome {
    /// Observable events, in occurrence order.
    pub events: Vec<EngineEvent>,
    /// Delays to schedule (replacing any pending task of the same kind).
    pub schedule: Vec<TimerRequest>,
    /// Pending tasks to cancel.
    pub cancel: Vec<TimerKind>,
}

impl StepOutcome {
    /// An outcome that does nothing — the silent no-op most invalid actions
    /// resolve to.
    pub fn none() -> Self {
        Self::default()
    }

    /// Record a phase transition event.
    pub fn phase_change(&mut self, from: Phase, to: Phase) {
        self.events.push(EngineEvent::PhaseChanged { from, to });
    }
}

// =============================================================================
// THE CONTRACT
// =============================================================================

/// One mini-game variant's state machine.
///
/// Implementations own their content sample, selection state and score;
/// they never see the orchestrator, the scheduler or wall time. The mount
/// calls `boot` once after construction, then feeds it player actions and
/// due timers until `Finished` appears in an outcome's events.
pub trait MiniGame {
    /// Current lifecycle phase.
    fn phase(&self) -> Phase;

    /// Current stage score. Never decremented below zero.
    fn score(&self) -> u32;

    /// Seconds left on the countdown.
    fn time_left(&self) -> u32;

    /// Arm initial timers. Called exactly once, right after construction.
    fn boot(&mut self) -> StepOutcome;

    /// Consume one player action.
    fn handle(&mut self, action: &PlayerAction) -> StepOutcome;

    /// Consume one due timer task.
    fn on_timer(&mut self, kind: TimerKind) -> StepOutcome;

    /// Snapshot of the engine's renderable state, for the UI bridge.
    fn view(&self) -> serde_json::Value;
}

// =============================================================================
// SHARED TRANSITIONS
// =============================================================================

/// Standard countdown pulse: decrement, tick event, time-out at zero.
///
/// Ignored outside `Active`, so a pulse that races a terminal transition is
/// harmless.
pub(crate) fn countdown_step(phase: &mut Phase, time_left: &mut u32) -> StepOutcome {
    if *phase != Phase::Active {
        return StepOutcome::none();
    }

    *time_left = time_left.saturating_sub(1);

    let mut out = StepOutcome::none();
    out.events.push(EngineEvent::TimerTick { remaining: *time_left });

    if *time_left == 0 {
        *phase = Phase::TimedOut;
        out.phase_change(Phase::Active, Phase::TimedOut);
        out.cancel.extend(TimerKind::ALL);
    } else {
        out.schedule.push(TimerRequest::countdown());
    }

    out
}

/// Enter `Completed`: cancel everything else, schedule the finish delay.
///
/// The final score must already be folded into the engine's score field —
/// time bonuses read the clock at this instant, not after the delay.
pub(crate) fn enter_completed(phase: &mut Phase, finish_delay_ms: u64, out: &mut StepOutcome) {
    let from = *phase;
    *phase = Phase::Completed;
    out.phase_change(from, Phase::Completed);
    out.cancel.extend(TimerKind::ALL);
    out.schedule.push(TimerRequest::after(TimerKind::FinishDelay, finish_delay_ms));
}

/// Finish-delay firing: emit the one `Finished` and become `Reported`.
pub(crate) fn report_finish(phase: &mut Phase, score: u32) -> StepOutcome {
    if *phase != Phase::Completed {
        return StepOutcome::none();
    }

    *phase = Phase::Reported;
    let mut out = StepOutcome::none();
    out.phase_change(Phase::Completed, Phase::Reported);
    out.events.push(EngineEvent::Finished { score });
    out
}

/// Player acknowledged the time's-up view: emit `Finished` with the
/// variant's timeout score and become `Reported`.
pub(crate) fn confirm_timeout(phase: &mut Phase, timeout_score: u32) -> StepOutcome {
    if *phase != Phase::TimedOut {
        return StepOutcome::none();
    }

    *phase = Phase::Reported;
    let mut out = StepOutcome::none();
    out.phase_change(Phase::TimedOut, Phase::Reported);
    out.events.push(EngineEvent::Finished { score: timeout_score });
    out
}

// =============================================================================
// TESTS
// =============================================================================
