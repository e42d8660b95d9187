//! Engine Events
//!
//! Everything an engine wants the outside world to know flows through this
//! stream: timer ticks, matches, mistakes, round changes and the single
//! `Finished` that carries the stage score back to the orchestrator.

use serde::Serialize;

use super::engine::Phase;

/// An observable engine occurrence.
///
/// The rendering layer animates from these; the mount watches for
/// [`EngineEvent::Finished`] to fire the stage completion callback.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum EngineEvent {
    /// The engine moved between lifecycle phases.
    PhaseChanged {
        /// Phase before the transition.
        from: Phase,
        /// Phase after the transition.
        to: Phase,
    },

    /// One second elapsed on the countdown.
    TimerTick {
        /// Seconds remaining after the tick.
        remaining: u32,
    },

    /// A card was revealed or flipped face up.
    CardRevealed {
        /// Card id.
        card: u32,
    },

    /// The face-down grid was reshuffled (find-the-pair shuffle phase).
    GridShuffled,

    /// Two revealed cards went back face down / selection cleared.
    SelectionCleared,

    /// A pair was matched.
    MatchFound {
        /// Matched pair id.
        pair: u32,
        /// Stage score after the match.
        score: u32,
    },

    /// A wrong attempt was made.
    Mistake {
        /// Mistakes so far this stage.
        total: u32,
        /// Stage score after any penalty.
        score: u32,
    },

    /// A blank was filled with the correct word.
    BlankFilled {
        /// Question id.
        question: u32,
        /// Blanks filled so far.
        filled: usize,
    },

    /// A line was drawn between a picture and a word.
    ConnectionMade {
        /// Picture-side item id.
        picture: u32,
        /// Word-side item id.
        word: u32,
        /// Whether the connection is correct.
        correct: bool,
        /// Stage score after the connection.
        score: u32,
    },

    /// A wrong line was auto-removed.
    ConnectionRemoved {
        /// Picture-side item id.
        picture: u32,
        /// Word-side item id.
        word: u32,
    },

    /// A label landed on its hotspot.
    LabelPlaced {
        /// Hotspot item id.
        item: u32,
        /// Labels placed so far in the scene.
        placed: usize,
        /// Labels in the scene.
        total: usize,
    },

    /// The next expected letter was found.
    LetterFound {
        /// Position of the letter in the word.
        position: usize,
    },

    /// The built sentence did not match the target.
    SentenceRejected,

    /// A round / scene within the stage was completed.
    RoundCompleted {
        /// Zero-based round index.
        round: usize,
        /// Stage score after the round's points.
        score: u32,
    },

    /// The next round / scene began.
    RoundStarted {
        /// Zero-based round index.
        round: usize,
    },

    /// The stage is done; carries the final stage score.
    ///
    /// Emitted exactly once per engine instance, on the transition into
    /// [`Phase::Reported`].
    Finished {
        /// Final stage score, always >= 0 by construction.
        score: u32,
    },
}

impl EngineEvent {
    /// Whether this is the terminal completion event.
    pub fn is_finished(&self) -> bool {
        matches!(self, EngineEvent::Finished { .. })
    }
}
