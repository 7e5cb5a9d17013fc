//! Effect application.

use pw_core::{Effect, Story};
use tracing::debug;

use crate::error::ContentError;
use crate::player::PlayerState;
use crate::profile::Profile;

/// Ending label used when `end_game` names none.
pub const UNNAMED_ENDING: &str = "Unnamed Ending";

/// The state effects may change, plus the signals they raise for the
/// walker.
#[derive(Debug)]
pub struct EffectContext<'a> {
    /// The story being played.
    pub story: &'a Story,
    /// The player.
    pub player: &'a mut PlayerState,
    /// The cross-session profile.
    pub profile: &'a mut Profile,
    /// Destination of the last teleport applied, if any.
    pub teleport: Option<String>,
    /// Whether the profile changed and should be written.
    pub profile_changed: bool,
}

impl<'a> EffectContext<'a> {
    /// A context with no signals raised.
    pub fn new(story: &'a Story, player: &'a mut PlayerState, profile: &'a mut Profile) -> Self {
        Self {
            story,
            player,
            profile,
            teleport: None,
            profile_changed: false,
        }
    }
}

/// Messages and problems collected while applying a list of effects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectLog {
    /// Player-facing messages in the order they were produced.
    pub messages: Vec<String>,
    /// Effects that could not be applied.
    pub issues: Vec<ContentError>,
}

/// Apply one effect, returning its messages.
pub fn apply(effect: &Effect, ctx: &mut EffectContext<'_>) -> Result<Vec<String>, ContentError> {
    debug!(kind = effect.kind(), "applying effect");
    let mut messages = Vec::new();
    match effect {
        Effect::AddItem { value, count } => {
            let now = ctx.player.add_item(value.as_str(), *count);
            messages.push(format!("[+] {value} x{count} (now {now})"));
        }
        Effect::RemoveItem { value, count } => {
            let now = ctx
                .player
                .remove_item(value, *count)
                .map_err(|held| ContentError::ItemUnderflow {
                    item: value.clone(),
                    held,
                    requested: *count,
                })?;
            messages.push(format!("[-] {value} x{count} (now {now})"));
        }
        Effect::SetFlag { flag, value } => {
            match value {
                Some(v) => messages.push(format!("[*] Flag {flag} set to {v}")),
                None => messages.push(format!("[*] Flag {flag} cleared")),
            }
            ctx.player.set_flag(flag.as_str(), value.clone());
        }
        Effect::AddTag { value } => {
            let tag = ctx.story.canonical_tag(value);
            if ctx.player.tags.insert(tag.to_string()) {
                messages.push(format!("[#] New Tag unlocked: {tag}"));
            }
        }
        Effect::AddTrait { value } => {
            if ctx.player.traits.insert(value.clone()) {
                messages.push(format!("[^] New Trait gained: {value}"));
            }
        }
        Effect::RepDelta { faction, value } => {
            for (name, change) in ctx.story.reputation_ripple(faction, *value) {
                let mut next = ctx.player.rep(&name).saturating_add(change);
                if let Some(bounds) = ctx.story.rep_bounds {
                    next = bounds.clamp(next);
                }
                messages.push(format!("[~] Rep {name} {change:+} -> {next}"));
                ctx.player.reputation.insert(name, next);
            }
        }
        Effect::HpDelta { value } => {
            ctx.player.hp = ctx.player.hp.saturating_add(*value);
            messages.push(format!("[=] HP {value:+} -> {}", ctx.player.hp));
        }
        Effect::Teleport { target } => {
            if !ctx.story.contains_node(target) && !ctx.story.is_ending(target) {
                return Err(ContentError::MissingNode {
                    node: target.clone(),
                });
            }
            ctx.player.current_node = target.clone();
            ctx.teleport = Some(target.clone());
            messages.push(format!("[>] You are moved to '{target}'."));
        }
        Effect::EndGame { ending } => {
            let label = match ending {
                Some(ending) => ctx.story.ending_label(ending),
                None => UNNAMED_ENDING,
            };
            ctx.player.ending = Some(label.to_string());
            if ctx.profile.record_ending(label) {
                ctx.profile_changed = true;
            }
        }
        Effect::UnlockStart { value } => {
            if ctx.profile.unlock_start(value.as_str()) {
                ctx.profile_changed = true;
                let title = ctx
                    .story
                    .start(value)
                    .map(|s| s.display_title())
                    .unwrap_or(value.as_str());
                messages.push(format!("[#] Origin unlocked: {title}"));
            }
        }
    }
    Ok(messages)
}

/// Apply effects in authored order. A failing effect is recorded and the
/// rest still apply.
pub fn apply_all(effects: &[Effect], ctx: &mut EffectContext<'_>) -> EffectLog {
    let mut log = EffectLog::default();
    for effect in effects {
        match apply(effect, ctx) {
            Ok(messages) => log.messages.extend(messages),
            Err(issue) => {
                tracing::warn!(%issue, kind = effect.kind(), "effect failed");
                log.issues.push(issue);
            }
        }
    }
    log
}
