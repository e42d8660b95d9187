//! Content Catalog
//!
//! Static tables mapping levels to stage configurations and content pools.
//! Read-only input to the rest of the system; nothing here mutates at
//! runtime.

pub mod content;
pub mod level;

// Re-export key types
pub use content::{ContentCatalog, PairEntry};
pub use level::{Level, LevelCatalog, LevelId, SceneId, StageConfig, StageKind, StageParams};
