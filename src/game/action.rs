//! Player Actions
//!
//! The discrete inputs a mini-game engine consumes. The rendering layer
//! translates pointer gestures into these; engines treat anything that does
//! not apply to their current state as a silent no-op, never an error.

use serde::{Serialize, Deserialize};

/// Which column a line-match endpoint belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// The picture column.
    Picture,
    /// The word column.
    Word,
}

/// One end of a drawn connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Column the endpoint sits in.
    pub side: Side,
    /// Item id within that column.
    pub id: u32,
}

impl Endpoint {
    /// Endpoint in the picture column.
    pub fn picture(id: u32) -> Self {
        Self { side: Side::Picture, id }
    }

    /// Endpoint in the word column.
    pub fn word(id: u32) -> Self {
        Self { side: Side::Word, id }
    }
}

/// A discrete player input delivered to the mounted engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Dismiss a briefing / start modal; starts the countdown.
    Ready,
    /// Acknowledge the time's-up view; the only action a timed-out engine
    /// accepts, and the one that releases its completion callback.
    ConfirmTimeout,
    /// Click or flip a card by its unique card id.
    SelectCard {
        /// Card id within the dealt grid.
        card: u32,
    },
    /// Release a dragged word option over a blank (or nowhere).
    DropOnBlank {
        /// Question the dragged option belongs to.
        question: u32,
        /// Index of the option within that question.
        option: usize,
        /// Blank the release landed on; None means it snapped back.
        target: Option<u32>,
    },
    /// Complete a drawn line between two endpoints.
    Connect {
        /// Where the drag started.
        from: Endpoint,
        /// Where the drag released.
        to: Endpoint,
    },
    /// Release a dragged label at a point on the scene picture.
    PlaceLabel {
        /// Hotspot item the label belongs to.
        item: u32,
        /// Release point, percent of image width.
        x_pct: u8,
        /// Release point, percent of image height.
        y_pct: u8,
    },
    /// Click a letter cell in the spelling grid.
    PickLetter {
        /// Cell id within the grid.
        cell: u32,
    },
    /// Move a word token from the bank into the sentence.
    PlaceWord {
        /// Token id within the scenario.
        word: u32,
    },
    /// Move a word token from the sentence back to the bank.
    RemoveWord {
        /// Token id within the scenario.
        word: u32,
    },
    /// Submit the built sentence for checking.
    CheckSentence,
    /// Return every token to a reshuffled bank.
    ResetRound,
}
