//! Story walker for Patchwork.
//!
//! Holds the mutable side of a playthrough: [`PlayerState`] for one session
//! and [`Profile`] across sessions. The [`choice`] module evaluates
//! conditions, applies effects and resolves targets; the [`Walker`] strings
//! them together into the enter/choose cycle over a shared
//! [`pw_core::Story`].

/// Condition evaluation, effect application and target resolution.
pub mod choice;
/// Engine configuration.
pub mod config;
/// Error types for the walker.
pub mod error;
/// Player state management.
pub mod player;
/// The cross-session profile.
pub mod profile;
/// Tick counter arithmetic: day cycle and doom clock.
pub mod timekeeping;
/// The story walker state machine.
pub mod walker;

pub use config::{EngineConfig, TickCosts};
pub use error::{ContentError, FictionError, FictionResult};
pub use player::{PlayerState, Transition};
pub use profile::Profile;
pub use walker::{Phase, StepReport, Walker, available_starts};
