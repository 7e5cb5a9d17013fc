//! Condition evaluation.

use pw_core::{Condition, Gate, Story};

use crate::player::PlayerState;
use crate::profile::Profile;
use crate::timekeeping;

/// Everything a condition may look at. Evaluation never mutates it.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    /// The story being played.
    pub story: &'a Story,
    /// The player.
    pub player: &'a PlayerState,
    /// The cross-session profile.
    pub profile: &'a Profile,
    /// Whether the clock runs; with it stopped the doom clock never fires.
    pub clock_enabled: bool,
}

impl<'a> EvalContext<'a> {
    /// A context with the clock running.
    pub fn new(story: &'a Story, player: &'a PlayerState, profile: &'a Profile) -> Self {
        Self {
            story,
            player,
            profile,
            clock_enabled: true,
        }
    }

    /// Set whether the clock runs.
    pub fn with_clock(mut self, enabled: bool) -> Self {
        self.clock_enabled = enabled;
        self
    }

    fn holds_tag(&self, tag: &str) -> bool {
        self.player.tags.contains(self.story.canonical_tag(tag))
    }
}

/// Evaluate one condition.
pub fn evaluate(condition: &Condition, ctx: &EvalContext<'_>) -> bool {
    let player = ctx.player;
    match condition {
        Condition::HasItem { value } => player.has_item(value),
        Condition::MissingItem { value } => !player.has_item(value),
        Condition::FlagEq { flag, value } => player.flag(flag) == value.as_ref(),
        Condition::HasTag { value } => value.iter().all(|tag| ctx.holds_tag(tag)),
        Condition::HasAdvancedTag { value } => {
            let required: Vec<&str> = match value {
                Some(tags) => tags.iter().map(|t| ctx.story.canonical_tag(t)).collect(),
                None => ctx
                    .story
                    .advanced_tags
                    .iter()
                    .map(|t| ctx.story.canonical_tag(t))
                    .collect(),
            };
            !required.is_empty()
                && required
                    .iter()
                    .all(|tag| ctx.story.is_advanced_tag(tag) && player.tags.contains(*tag))
        }
        Condition::HasTrait { value } => value.iter().all(|t| player.traits.contains(t)),
        Condition::RepAtLeast { faction, value } => player.rep(faction) >= *value,
        Condition::RepAtLeastCount {
            value,
            count,
            factions,
        } => {
            let met = match factions {
                Some(list) => list.iter().filter(|f| player.rep(f) >= *value).count(),
                None => ctx
                    .story
                    .factions
                    .iter()
                    .filter(|f| player.rep(f) >= *value)
                    .count(),
            };
            met >= *count
        }
        Condition::ProfileFlagEq { flag, value } => ctx.profile.flag(flag) == value.as_ref(),
        Condition::ProfileFlagIsTrue { flag } => ctx.profile.flag_is_true(flag),
        Condition::ProfileFlagIsFalse { flag } => !ctx.profile.flag_is_true(flag),
        Condition::TickCounterAtLeast { value } => player.tick_counter >= *value,
        Condition::TickCounterAtMost { value } => player.tick_counter <= *value,
        Condition::TimeWindow { start, end } => {
            timekeeping::is_time_window(player.tick_counter, *start, *end)
        }
        Condition::DoomReached => {
            ctx.clock_enabled && timekeeping::doom_reached(player.tick_counter)
        }
        Condition::DoomNotReached => {
            !ctx.clock_enabled || !timekeeping::doom_reached(player.tick_counter)
        }
    }
}

/// Whether every condition in a gate holds. An empty gate always passes.
pub fn gate_passes(gate: &Gate, ctx: &EvalContext<'_>) -> bool {
    gate.conditions().iter().all(|c| evaluate(c, ctx))
}
