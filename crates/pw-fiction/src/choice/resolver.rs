//! Choice filtering and target resolution.

use pw_core::{ActionKind, Choice, Node, Target};

use super::condition::{EvalContext, gate_passes};
use crate::error::ContentError;

/// A choice the player can currently pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleChoice {
    /// 0-based index among the node's authored choices.
    pub index: usize,
    /// The text shown to the player.
    pub text: String,
}

/// The node's choices whose conditions hold, in authored order.
pub fn visible_choices(node: &Node, ctx: &EvalContext<'_>) -> Vec<VisibleChoice> {
    node.choices
        .iter()
        .enumerate()
        .filter(|(_, choice)| gate_passes(&choice.condition, ctx))
        .map(|(index, choice)| VisibleChoice {
            index,
            text: choice.text.clone(),
        })
        .collect()
}

/// Resolve a target. For ordered branches the first passing branch wins.
pub fn resolve_target<'t>(target: &'t Target, ctx: &EvalContext<'_>) -> Option<&'t str> {
    match target {
        Target::Node(id) => Some(id.as_str()),
        Target::Branches(branches) => branches
            .iter()
            .find(|branch| gate_passes(&branch.condition, ctx))
            .map(|branch| branch.target.as_str()),
    }
}

/// Resolve a choice's target, reporting a dead end when no branch passes.
/// `index` is the 0-based authored index of the choice.
pub fn resolve_choice<'c>(
    node_id: &str,
    index: usize,
    choice: &'c Choice,
    ctx: &EvalContext<'_>,
) -> Result<&'c str, ContentError> {
    resolve_target(&choice.target, ctx).ok_or_else(|| ContentError::DeadEnd {
        node: node_id.to_string(),
        choice: index + 1,
    })
}

/// The action category of a choice: the authored one, else `Move` when the
/// target leads elsewhere and `Explore` otherwise.
pub fn infer_action(choice: &Choice, current_node: &str, ctx: &EvalContext<'_>) -> ActionKind {
    if let Some(action) = choice.action {
        return action;
    }
    match resolve_target(&choice.target, ctx) {
        Some(target) if target != current_node => ActionKind::Move,
        _ => ActionKind::Explore,
    }
}
