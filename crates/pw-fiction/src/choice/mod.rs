//! The rule system behind choices.
//!
//! Conditions decide which choices are shown and which branch of an ordered
//! target is taken; effects change the player state and the profile.

mod condition;
mod effect;
mod resolver;

pub use condition::{EvalContext, evaluate, gate_passes};
pub use effect::{EffectContext, EffectLog, apply, apply_all};
pub use resolver::{VisibleChoice, infer_action, resolve_choice, resolve_target, visible_choices};
