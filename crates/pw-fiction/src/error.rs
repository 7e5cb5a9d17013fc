//! Error types for the story walker.

use thiserror::Error;

/// Result type for walker operations.
pub type FictionResult<T> = Result<T, FictionError>;

/// A problem with authored content discovered while playing. Reported to
/// the caller; never fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    /// A target, teleport or saved position names a node that does not
    /// exist.
    #[error("node '{node}' does not exist")]
    MissingNode {
        /// The missing node ID.
        node: String,
    },

    /// `remove_item` asked for more than the player holds.
    #[error("cannot remove {requested} x '{item}': only {held} held")]
    ItemUnderflow {
        /// Item name.
        item: String,
        /// Count currently held.
        held: u32,
        /// Count requested.
        requested: u32,
    },

    /// Every choice at a node is gated off.
    #[error("no choices available at node '{node}'")]
    NoChoicesAvailable {
        /// Node ID.
        node: String,
    },

    /// No branch of an ordered target passed.
    #[error("choice {choice} at node '{node}' has no passing target")]
    DeadEnd {
        /// Node ID.
        node: String,
        /// 1-based index of the choice among the authored choices.
        choice: usize,
    },

    /// Teleports kept chaining past the hop limit.
    #[error("teleport loop: gave up after {hops} hops at node '{node}'")]
    TeleportLoop {
        /// Node where the walker gave up.
        node: String,
        /// Hops followed.
        hops: usize,
    },

    /// The requested start is not declared.
    #[error("unknown start '{0}'")]
    UnknownStart(String),

    /// The requested start is locked for this profile.
    #[error("start '{0}' is locked")]
    LockedStart(String),

    /// The story declares no start at all.
    #[error("story has no starts")]
    NoStarts,
}

/// Errors returned by the walker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FictionError {
    /// Authored content is broken.
    #[error(transparent)]
    Content(#[from] ContentError),

    /// The choice index does not name a visible choice.
    #[error("invalid choice: {index} (of {available})")]
    InvalidChoice {
        /// The index given.
        index: usize,
        /// How many choices are visible.
        available: usize,
    },

    /// The walker is not waiting for a choice.
    #[error("not awaiting a choice")]
    NotAwaitingChoice,

    /// The walker is not about to enter a node.
    #[error("no node to enter")]
    NotActive,

    /// The session has ended.
    #[error("session has ended")]
    SessionEnded,
}
