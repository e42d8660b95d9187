//! Mini-Game Engines
//!
//! All gameplay state machines. 100% deterministic: seeded sampling, virtual
//! timers, no wall clock.
//!
//! ## Module Structure
//!
//! - `action`: player action vocabulary
//! - `engine`: the shared contract (phases, timers, step outcomes)
//! - `events`: observable engine events
//! - `mount`: the host that runs one engine with a scheduler
//! - `pair_match` / `find_pair` / `drag_blank` / `line_match`
//! - `puzzle` / `spelling` / `sentence` / `memory`: the eight variants

pub mod action;
pub mod drag_blank;
pub mod engine;
pub mod events;
pub mod find_pair;
pub mod line_match;
pub mod memory;
pub mod mount;
pub mod pair_match;
pub mod puzzle;
pub mod sentence;
pub mod spelling;

// Re-export key types
pub use action::{Endpoint, PlayerAction, Side};
pub use engine::{MiniGame, Phase, StepOutcome, TimerKind, TimerRequest};
pub use events::EngineEvent;
pub use mount::EngineMount;
