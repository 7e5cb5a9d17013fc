//! Nodes, choices, targets and starts: the authored story graph.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::condition::Gate;
use crate::effect::Effect;

/// A single narrative beat: prose plus the choices leading out of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Heading shown above the prose.
    #[serde(default)]
    pub title: String,
    /// The prose of this node.
    #[serde(default)]
    pub text: String,
    /// Effects applied every time the node is entered.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_enter: Vec<Effect>,
    /// Choices in authored order.
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Single faction controlling this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction: Option<String>,
    /// Factions controlling this node.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub factions: Vec<String>,
    /// Outcome used when a controlling faction is hostile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostile_outcome: Option<HostileOutcome>,
    /// Skip the hostility check for this node.
    #[serde(default)]
    pub ignore_hostile: bool,
}

impl Node {
    /// Create a node with a title and prose.
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    /// Add an `on_enter` effect.
    pub fn with_on_enter(mut self, effect: Effect) -> Self {
        self.on_enter.push(effect);
        self
    }

    /// Add a choice.
    pub fn with_choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }

    /// Declare a controlling faction.
    pub fn with_faction(mut self, faction: impl Into<String>) -> Self {
        self.factions.push(faction.into());
        self
    }

    /// Every controlling faction, `faction` and `factions` merged without
    /// duplicates.
    pub fn controlling_factions(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for f in self.factions.iter().chain(self.faction.iter()) {
            let f = f.trim();
            if !f.is_empty() && !out.contains(&f) {
                out.push(f);
            }
        }
        out
    }
}

/// How a hostile reception plays out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostileOutcome {
    /// The session ends.
    GameOver,
    /// The player is pushed back; the route is closed.
    ForcedRetreat,
}

/// The category of an action, which decides how much in-story time passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Travelling to another node.
    Move,
    /// Poking around the current node.
    Explore,
    /// Resting.
    Rest,
}

/// A player-selectable option within a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// The text shown to the player.
    pub text: String,
    /// Conditions that must hold for the choice to be offered.
    #[serde(default, skip_serializing_if = "Gate::is_unconditional")]
    pub condition: Gate,
    /// Effects applied when the choice is taken.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<Effect>,
    /// Where the choice leads.
    pub target: Target,
    /// Explicit action category; inferred from the target when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionKind>,
}

impl Choice {
    /// Create an unconditional choice leading to a single target.
    pub fn new(text: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            condition: Gate::open(),
            effects: Vec::new(),
            target: Target::Node(target.into()),
            action: None,
        }
    }

    /// Create an unconditional choice with ordered conditional branches.
    pub fn branching(text: impl Into<String>, branches: Vec<Branch>) -> Self {
        Self {
            text: text.into(),
            condition: Gate::open(),
            effects: Vec::new(),
            target: Target::Branches(branches),
            action: None,
        }
    }

    /// Set the gating condition.
    pub fn with_condition(mut self, condition: impl Into<Gate>) -> Self {
        self.condition = condition.into();
        self
    }

    /// Add an effect.
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Set the action category.
    pub fn with_action(mut self, action: ActionKind) -> Self {
        self.action = Some(action);
        self
    }
}

/// A choice target: one ID, or ordered `(target, condition?)` branches
/// where the first passing branch wins.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Target {
    /// A single node or ending ID.
    Node(String),
    /// Ordered conditional alternatives.
    Branches(Vec<Branch>),
}

impl Target {
    /// Every ID this target can lead to, in authored order.
    pub fn destinations(&self) -> Vec<&str> {
        match self {
            Self::Node(id) => vec![id.as_str()],
            Self::Branches(branches) => branches.iter().map(|b| b.target.as_str()).collect(),
        }
    }
}

impl<'de> Deserialize<'de> for Target {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde_json::Value;

        match Value::deserialize(deserializer)? {
            Value::String(id) if id.trim().is_empty() => {
                Err(D::Error::custom("target must be a non-empty string"))
            }
            Value::String(id) => Ok(Self::Node(id)),
            Value::Array(entries) if entries.is_empty() => {
                Err(D::Error::custom("target branch list must not be empty"))
            }
            Value::Array(entries) => entries
                .into_iter()
                .enumerate()
                .map(|(i, entry)| {
                    Branch::deserialize(entry)
                        .map_err(|e| D::Error::custom(format!("target branch {}: {e}", i + 1)))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Branches),
            other => Err(D::Error::custom(format!(
                "target must be a string or a list of branches, got {other}"
            ))),
        }
    }
}

/// One alternative in an ordered conditional target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    /// Destination node or ending ID.
    pub target: String,
    /// Condition for this branch; unconditional when empty.
    #[serde(default, skip_serializing_if = "Gate::is_unconditional")]
    pub condition: Gate,
}

impl Branch {
    /// A branch taken only when the gate passes.
    pub fn when(target: impl Into<String>, condition: impl Into<Gate>) -> Self {
        Self {
            target: target.into(),
            condition: condition.into(),
        }
    }

    /// A catch-all branch.
    pub fn otherwise(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            condition: Gate::open(),
        }
    }
}

/// An entry point into the story graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Start {
    /// Start identifier; defaults to the node ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The node this start drops the player into.
    pub node: String,
    /// Display title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Locked starts require an `unlock_start` in some earlier session.
    #[serde(default)]
    pub locked: bool,
    /// Title shown while the start is still locked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_title: Option<String>,
    /// Tags granted when a session begins here.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Short description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blurb: Option<String>,
}

impl Start {
    /// Create an unlocked start at a node.
    pub fn at(node: impl Into<String>) -> Self {
        Self {
            id: None,
            node: node.into(),
            title: None,
            locked: false,
            locked_title: None,
            tags: Vec::new(),
            blurb: None,
        }
    }

    /// The start identifier (`id`, falling back to `node`).
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.node)
    }

    /// The display title (`title`, falling back to the identifier).
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or_else(|| self.id())
    }
}
