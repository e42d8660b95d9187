//! Session Orchestration
//!
//! The shell around the mini-games: level selection, stage sequencing,
//! score accumulation, player registration and resets. All state here is
//! volatile and lost on restart.

pub mod orchestrator;
pub mod registration;

// Re-export key types
pub use orchestrator::{Session, SessionError, StageAdvance};
pub use registration::{PlayerName, RegistrationError};
