//! Score Submission
//!
//! The one outbound edge of the system: after a level completes, the final
//! score is POSTed to a remote endpoint as best-effort telemetry. The game
//! never waits on it — the task is spawned and forgotten, and its outcome
//! only moves a status indicator the player can retry from. A submission
//! cannot exist without a registered [`PlayerName`]; that type is the
//! registration gate.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::catalog::level::LevelId;
use crate::session::registration::PlayerName;

/// Submission errors.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The request never got a response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("endpoint rejected submission: HTTP {0}")]
    Rejected(u16),
}

/// Where the last submission attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStatus {
    /// Nothing submitted yet.
    Idle,
    /// A submission is on the wire.
    InFlight,
    /// The endpoint accepted the last submission.
    Accepted,
    /// The last submission failed; the player may retry.
    Failed,
}

/// The payload sent to the endpoint.
#[derive(Clone, Debug, Serialize)]
pub struct ScoreReport {
    /// Registered player name.
    pub name: String,
    /// Canonical level identifier.
    pub level: String,
    /// Final accumulated level score.
    pub score: u32,
    /// When the report was built.
    pub submitted_at: DateTime<Utc>,
}

impl ScoreReport {
    /// Build a report for a completed level.
    ///
    /// Requiring a [`PlayerName`] here is what blocks submission until
    /// registration happened.
    pub fn new(name: &PlayerName, level: LevelId, score: u32) -> Self {
        Self {
            name: name.as_str().to_string(),
            level: level.as_str().to_string(),
            score,
            submitted_at: Utc::now(),
        }
    }
}

/// Fire-and-forget HTTP submitter with a watchable status.
pub struct ScoreSubmitter {
    client: reqwest::Client,
    endpoint: String,
    status_tx: watch::Sender<SubmitStatus>,
}

impl ScoreSubmitter {
    /// Build a submitter for `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        let (status_tx, _) = watch::channel(SubmitStatus::Idle);
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            status_tx,
        }
    }

    /// Subscribe to submission status changes.
    pub fn status(&self) -> watch::Receiver<SubmitStatus> {
        self.status_tx.subscribe()
    }

    /// Submit one report and update the status.
    ///
    /// Callers that must not block use [`ScoreSubmitter::submit_detached`];
    /// this method exists for retries and tests.
    pub async fn submit(&self, report: &ScoreReport) -> Result<(), SubmitError> {
        self.status_tx.send_replace(SubmitStatus::InFlight);

        let result = self.post(report).await;
        match &result {
            Ok(()) => {
                info!(level = %report.level, score = report.score, "score submitted");
                self.status_tx.send_replace(SubmitStatus::Accepted);
            }
            Err(err) => {
                // Best-effort telemetry: log and surface, never block play
                warn!(level = %report.level, error = %err, "score submission failed");
                self.status_tx.send_replace(SubmitStatus::Failed);
            }
        }
        result
    }

    /// Spawn the submission and return immediately.
    ///
    /// The game flow never awaits the outcome; it lands in the status
    /// channel.
    pub fn submit_detached(self: &Arc<Self>, report: ScoreReport) {
        let submitter = Arc::clone(self);
        tokio::spawn(async move {
            let _ = submitter.submit(&report).await;
        });
    }

    async fn post(&self, report: &ScoreReport) -> Result<(), SubmitError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(report)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SubmitError::Rejected(response.status().as_u16()));
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_payload_shape() {
        let name = PlayerName::new("Mia").unwrap();
        let report = ScoreReport::new(&name, LevelId::Trailblazers, 33);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["name"], "Mia");
        assert_eq!(json["level"], "trailblazers");
        assert_eq!(json["score"], 33);
        assert!(json["submitted_at"].is_string());
    }

    #[test]
    fn test_status_starts_idle() {
        let submitter = ScoreSubmitter::new("http://127.0.0.1:9/scores");
        assert_eq!(*submitter.status().borrow(), SubmitStatus::Idle);
    }

    #[tokio::test]
    async fn test_failed_submission_is_reported_not_fatal() {
        // Port 9 (discard) is not listening; the connect fails fast
        let submitter = ScoreSubmitter::new("http://127.0.0.1:9/scores");
        let status = submitter.status();

        let name = PlayerName::new("Mia").unwrap();
        let report = ScoreReport::new(&name, LevelId::SmallStars, 10);

        let result = submitter.submit(&report).await;
        assert!(matches!(result, Err(SubmitError::Transport(_))));
        assert_eq!(*status.borrow(), SubmitStatus::Failed);
    }
}
