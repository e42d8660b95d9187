//! Core deterministic primitives.
//!
//! All types in this module are designed for perfect determinism: seeded
//! randomness and virtual time only. Nothing here knows about levels or
//! mini-games.

pub mod clock;
pub mod rng;

// Re-export core types
pub use clock::{Scheduler, TaskId};
pub use rng::{derive_session_seed, DeterministicRng};
