//! Core types for Patchwork: the story graph and its rule vocabulary.
//!
//! A [`Story`] is an arena of [`Node`]s keyed by ID. Choices carry a
//! [`Gate`] of [`Condition`]s, a list of [`Effect`]s and a [`Target`].
//! This crate only describes stories and loads them; evaluating conditions
//! and walking the graph lives in `pw-fiction`.

/// The closed condition vocabulary and condition slots.
pub mod condition;
/// The closed effect vocabulary.
pub mod effect;
/// Schema errors raised while loading a story.
pub mod error;
/// JSON loading and module merging.
mod load;
/// Nodes, choices, targets and starts.
pub mod node;
/// The story arena and its surrounding tables.
pub mod story;
/// Scalar flag values and tag lists.
pub mod value;

/// Re-export condition types.
pub use condition::{Condition, Gate};
/// Re-export the effect type.
pub use effect::Effect;
/// Re-export error types.
pub use error::{SchemaError, StoryResult};
/// Re-export graph types.
pub use node::{ActionKind, Branch, Choice, HostileOutcome, Node, Start, Target};
/// Re-export story types.
pub use story::{Demise, Hostility, ReferenceProblem, RepBounds, Story};
/// Re-export value types.
pub use value::{FlagValue, TagList};
