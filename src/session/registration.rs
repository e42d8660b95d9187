//! Player Registration
//!
//! A session collects one player identifier before its first score can be
//! submitted. The only rule: the name must be non-empty after trimming. The
//! gate is the `PlayerName` type itself — a score report cannot be built
//! without one.

use serde::Serialize;

/// Registration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    /// The submitted name was empty or whitespace.
    #[error("player name must not be empty")]
    EmptyName,
}

/// A validated, trimmed player name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlayerName(String);

impl PlayerName {
    /// Validate and trim a raw name input.
    pub fn new(raw: &str) -> Result<Self, RegistrationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RegistrationError::EmptyName);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The trimmed name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlayerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_whitespace() {
        let name = PlayerName::new("  Mia  ").unwrap();
        assert_eq!(name.as_str(), "Mia");
    }

    #[test]
    fn test_rejects_empty_and_whitespace() {
        assert_eq!(PlayerName::new(""), Err(RegistrationError::EmptyName));
        assert_eq!(PlayerName::new("   "), Err(RegistrationError::EmptyName));
        assert_eq!(PlayerName::new("\t\n"), Err(RegistrationError::EmptyName));
    }
}
