//! # Plaza Games
//!
//! Deterministic game-logic core for the English 1 Plaza mini-game suite.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      PLAZA GAMES CORE                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── rng.rs      - Xorshift128+ PRNG + seed derivation       │
//! │  └── clock.rs    - Virtual scheduler (cancellable timers)    │
//! │                                                              │
//! │  catalog/        - Static content (read-only input)          │
//! │  ├── level.rs    - Levels, stage configs, stage plans        │
//! │  └── content.rs  - Content pools with fallbacks              │
//! │                                                              │
//! │  game/           - Mini-game engines (deterministic)         │
//! │  ├── engine.rs   - Shared contract: phases, timers           │
//! │  ├── mount.rs    - Engine host + one-shot completion         │
//! │  └── 8 variants  - pair_match .. memory                      │
//! │                                                              │
//! │  session/        - Orchestration (volatile runtime state)    │
//! │  ├── orchestrator.rs - Level select, stage cursor, score     │
//! │  └── registration.rs - Player-name gate                      │
//! │                                                              │
//! │  submit/         - Outbound score telemetry (best-effort)    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/`, `catalog/`, `game/` and `session/` modules are **100%
//! deterministic**:
//! - No wall-clock reads; all timing flows through the virtual scheduler
//! - No ambient randomness; every draw comes from a seeded Xorshift128+
//! - BTreeMap/BTreeSet wherever iteration order matters
//!
//! Given the same session identity and the same inputs, a session replays
//! **identically**. Only `submit/` talks to the outside world.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod catalog;
pub mod core;
pub mod game;
pub mod session;
pub mod submit;

// Re-export commonly used types
pub use catalog::content::ContentCatalog;
pub use catalog::level::{LevelCatalog, LevelId, StageConfig, StageKind};
pub use core::rng::DeterministicRng;
pub use game::action::PlayerAction;
pub use game::engine::{Phase, COUNTDOWN_MS};
pub use game::events::EngineEvent;
pub use game::mount::EngineMount;
pub use session::orchestrator::{Session, SessionError, StageAdvance};
pub use session::registration::PlayerName;
pub use submit::{ScoreReport, ScoreSubmitter, SubmitStatus};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
