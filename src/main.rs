//! Plaza Games Demo
//!
//! Plays one level end to end without a UI: mounts each stage, autoplays it
//! by reading the engine's view, folds the scores through the orchestrator
//! and (optionally) submits the result to `PLAZA_SUBMIT_URL`.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use plaza_games::{
    ContentCatalog, EngineMount, LevelCatalog, LevelId, PlayerAction, Phase,
    ScoreReport, ScoreSubmitter, Session, StageKind, VERSION,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow!("failed to set tracing subscriber: {e}"))?;

    info!("Plaza Games v{}", VERSION);

    demo_session().await
}

/// Play Trailblazers start to finish with a scripted "player".
async fn demo_session() -> Result<()> {
    let content = ContentCatalog::bundled();
    let levels = LevelCatalog::bundled();
    let mut session = Session::new();

    session.register_player("Demo Player")?;

    info!("=== Starting Demo Session ===");
    info!("Session: {}", hex::encode(session.id()));

    // Locked content stays locked
    let locked = session.select_level(&levels, LevelId::Frontrunner);
    info!("Selecting the locked track: {:?}", locked.unwrap_err());

    session.select_level(&levels, LevelId::Trailblazers)?;
    let stage_count = session.stages().map(|s| s.len()).unwrap_or(0);
    info!("Level selected: trailblazers ({} stages)", stage_count);

    while !session.level_complete() {
        let stage_index = session.stage_index().unwrap_or(0);
        let mut mount = session.mount_current_stage(&content)?;
        info!(
            "Stage {}/{}: {} ({}s budget)",
            stage_index + 1,
            stage_count,
            mount.kind().as_str(),
            mount.time_left(),
        );

        autoplay(&mut mount);

        let earned = mount
            .finished_score()
            .ok_or_else(|| anyhow!("autoplay left the stage unfinished"))?;
        info!("Stage {} earned {} points", stage_index + 1, earned);
        session.complete_stage(earned)?;
    }

    let total = session.total_score();
    info!("=== Level Complete ===");
    info!("Total Score: {}", total);

    submit_result(&session, total).await;
    Ok(())
}

/// Solve whatever stage is mounted by reading its view.
fn autoplay(mount: &mut EngineMount) {
    if mount.phase() == Phase::Briefing {
        mount.dispatch(&PlayerAction::Ready);
        // Find-the-pair shuffles itself for a moment before play starts
        mount.advance(3_000);
    }

    match mount.kind() {
        StageKind::PairMatch => autoplay_pair_match(mount),
        StageKind::DragBlank => autoplay_drag_blank(mount),
        // The demo level only uses the two kinds above; anything else just
        // waits out the clock and takes the timeout path.
        _ => {
            let budget_ms = (u64::from(mount.time_left()) + 1) * 1_000;
            mount.advance(budget_ms);
            mount.dispatch(&PlayerAction::ConfirmTimeout);
        }
    }

    // Let the finish delay run so the score gets reported
    mount.advance(2_000);
}

fn autoplay_pair_match(mount: &mut EngineMount) {
    let view = mount.view();
    let Some(cards) = view["cards"].as_array() else { return };

    // Group card uids by pair id, then click each pair open
    let mut by_pair: std::collections::BTreeMap<u64, Vec<u64>> = std::collections::BTreeMap::new();
    for card in cards {
        if let (Some(pair), Some(uid)) = (card["pair"].as_u64(), card["uid"].as_u64()) {
            by_pair.entry(pair).or_default().push(uid);
        }
    }

    for uids in by_pair.values() {
        for uid in uids {
            mount.dispatch(&PlayerAction::SelectCard { card: *uid as u32 });
        }
        // A second of "thinking" between pairs
        mount.advance(1_000);
    }
}

fn autoplay_drag_blank(mount: &mut EngineMount) {
    let view = mount.view();
    let Some(questions) = view["questions"].as_array() else { return };

    let plan: Vec<(u32, usize)> = questions
        .iter()
        .filter_map(|q| {
            let id = q["id"].as_u64()? as u32;
            let answer = q["answer"].as_str()?;
            let options = q["options"].as_array()?;
            let option = options.iter().position(|o| o.as_str() == Some(answer))?;
            Some((id, option))
        })
        .collect();

    for (question, option) in plan {
        mount.dispatch(&PlayerAction::DropOnBlank {
            question,
            option,
            target: Some(question),
        });
        mount.advance(1_000);
    }
}

/// Best-effort score submission; a missing endpoint just skips it.
async fn submit_result(session: &Session, total: u32) {
    let Some(name) = session.player_name() else {
        info!("No registered player; skipping submission");
        return;
    };
    let Ok(endpoint) = std::env::var("PLAZA_SUBMIT_URL") else {
        info!("PLAZA_SUBMIT_URL not set; skipping submission");
        return;
    };

    let submitter = Arc::new(ScoreSubmitter::new(endpoint));
    let report = ScoreReport::new(name, LevelId::Trailblazers, total);

    // Fire and forget; the game would move on regardless of the outcome
    submitter.submit_detached(report);

    // The demo is about to exit, so give the task a moment and show the
    // status a real shell would render
    tokio::time::sleep(std::time::Duration::from_secs(2)).await;
    info!("Submission status: {:?}", *submitter.status().borrow());
}
