use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::effect::Effect;
use crate::node::{HostileOutcome, Node, Start};

/// Reputation bounds a story may declare. Without them reputation is
/// unclamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepBounds {
    /// Inclusive lower bound.
    pub min: i64,
    /// Inclusive upper bound.
    pub max: i64,
}

impl RepBounds {
    /// Clamp a reputation value into the bounds.
    pub fn clamp(&self, value: i64) -> i64 {
        let (lo, hi) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        value.clamp(lo, hi)
    }
}

/// When low hit points end a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demise {
    /// Hit points at or below this value end the session.
    #[serde(default)]
    pub hp_at_most: i64,
    /// Ending label recorded on demise.
    #[serde(default = "default_demise_ending")]
    pub ending: String,
}

fn default_demise_ending() -> String {
    "A Short Tale".to_string()
}

impl Default for Demise {
    fn default() -> Self {
        Self {
            hp_at_most: 0,
            ending: default_demise_ending(),
        }
    }
}

/// How factions react to a player they dislike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hostility {
    /// Reputation at or below which a faction turns hostile.
    pub threshold: i64,
    /// Per-faction overrides of `threshold`.
    pub faction_thresholds: BTreeMap<String, i64>,
    /// Node reached for each outcome.
    pub outcomes: BTreeMap<HostileOutcome, String>,
    /// Outcome used when a node does not pick one.
    pub default_outcome: HostileOutcome,
}

/// Default node ID for the hostile game-over outcome.
pub const HOSTILE_GAME_OVER: &str = "hostile_game_over";
/// Default node ID for the hostile forced-retreat outcome.
pub const HOSTILE_FORCED_RETREAT: &str = "hostile_forced_retreat";

impl Default for Hostility {
    fn default() -> Self {
        Self {
            threshold: -5,
            faction_thresholds: BTreeMap::new(),
            outcomes: BTreeMap::from([
                (HostileOutcome::GameOver, HOSTILE_GAME_OVER.to_string()),
                (HostileOutcome::ForcedRetreat, HOSTILE_FORCED_RETREAT.to_string()),
            ]),
            default_outcome: HostileOutcome::ForcedRetreat,
        }
    }
}

impl Hostility {
    /// The hostility threshold for a faction.
    pub fn threshold_for(&self, faction: &str) -> i64 {
        self.faction_thresholds
            .get(faction)
            .copied()
            .unwrap_or(self.threshold)
    }

    /// Whether a node ID is one of the outcome nodes.
    pub fn is_outcome_node(&self, node_id: &str) -> bool {
        self.outcomes.values().any(|id| id == node_id)
    }
}

/// The authored story: an arena of nodes keyed by ID plus the tables that
/// surround it. Immutable once loaded; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Story {
    /// Story title.
    pub title: String,
    nodes: BTreeMap<String, Node>,
    /// Entry points in authored order.
    pub starts: Vec<Start>,
    /// Ending ID → label. A target naming an ending ID ends the session.
    pub endings: BTreeMap<String, String>,
    /// Declared factions.
    pub factions: Vec<String>,
    /// The late-game tag namespace.
    pub advanced_tags: Vec<String>,
    /// Alias → canonical tag.
    pub tag_aliases: BTreeMap<String, String>,
    /// Faction → related faction → relation name.
    pub faction_relationships: BTreeMap<String, BTreeMap<String, String>>,
    /// Relation name → reputation multiplier.
    pub relationship_multipliers: BTreeMap<String, i64>,
    /// Optional reputation bounds.
    pub rep_bounds: Option<RepBounds>,
    /// Hostile faction handling.
    pub hostility: Hostility,
    /// Low hit point handling.
    pub demise: Demise,
}

/// Relation multipliers used when a story does not override them.
pub fn default_relationship_multipliers() -> BTreeMap<String, i64> {
    BTreeMap::from([("ally".to_string(), 1), ("enemy".to_string(), -1)])
}

impl Story {
    /// Create an empty story.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            nodes: BTreeMap::new(),
            starts: Vec::new(),
            endings: BTreeMap::new(),
            factions: Vec::new(),
            advanced_tags: Vec::new(),
            tag_aliases: BTreeMap::new(),
            faction_relationships: BTreeMap::new(),
            relationship_multipliers: default_relationship_multipliers(),
            rep_bounds: None,
            hostility: Hostility::default(),
            demise: Demise::default(),
        }
    }

    /// Add (or replace) a node.
    pub fn with_node(mut self, id: impl Into<String>, node: Node) -> Self {
        self.nodes.insert(id.into(), node);
        self
    }

    /// Add a start.
    pub fn with_start(mut self, start: Start) -> Self {
        self.starts.push(start);
        self
    }

    /// Declare an ending.
    pub fn with_ending(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.endings.insert(id.into(), label.into());
        self
    }

    /// Declare a faction.
    pub fn with_faction(mut self, faction: impl Into<String>) -> Self {
        self.factions.push(faction.into());
        self
    }

    pub(crate) fn insert_node(&mut self, id: String, node: Node) {
        self.nodes.insert(id, node);
    }

    /// Look up a node.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Whether a node exists.
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// All nodes, ordered by ID.
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.nodes.iter().map(|(id, node)| (id.as_str(), node))
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether an ID is a declared ending.
    pub fn is_ending(&self, id: &str) -> bool {
        self.endings.contains_key(id)
    }

    /// Label for an ending ID, or the ID itself when it is not declared.
    pub fn ending_label<'a>(&'a self, id: &'a str) -> &'a str {
        self.endings.get(id).map(String::as_str).unwrap_or(id)
    }

    /// Find a start by ID.
    pub fn start(&self, id: &str) -> Option<&Start> {
        self.starts.iter().find(|s| s.id() == id)
    }

    /// The first start with a node, if any.
    pub fn default_start(&self) -> Option<&Start> {
        self.starts.iter().find(|s| !s.node.trim().is_empty())
    }

    /// The node of the first start, if any.
    pub fn default_start_node(&self) -> Option<&str> {
        self.default_start().map(|s| s.node.as_str())
    }

    /// Hex SHA-256 over the canonical JSON of the story graph (title, nodes,
    /// starts, endings, factions). Saves carry it so a resumed session can
    /// tell it was written against a different story.
    pub fn signature(&self) -> Option<String> {
        #[derive(Serialize)]
        struct Canonical<'a> {
            title: &'a str,
            nodes: &'a BTreeMap<String, Node>,
            starts: &'a [Start],
            endings: &'a BTreeMap<String, String>,
            factions: &'a [String],
        }

        let canonical = Canonical {
            title: &self.title,
            nodes: &self.nodes,
            starts: &self.starts,
            endings: &self.endings,
            factions: &self.factions,
        };
        let mut hasher = Sha256::new();
        serde_json::to_writer(&mut hasher, &canonical).ok()?;
        Some(hex::encode(hasher.finalize()))
    }

    /// Resolve a tag through the alias table.
    pub fn canonical_tag<'a>(&'a self, tag: &'a str) -> &'a str {
        self.tag_aliases.get(tag).map(String::as_str).unwrap_or(tag)
    }

    /// Whether a (canonical) tag belongs to the advanced namespace.
    pub fn is_advanced_tag(&self, tag: &str) -> bool {
        self.advanced_tags
            .iter()
            .any(|t| self.canonical_tag(t) == tag)
    }

    /// The reputation changes a delta on one faction produces, including
    /// ripples onto related factions. Zero changes are dropped.
    pub fn reputation_ripple(&self, faction: &str, delta: i64) -> Vec<(String, i64)> {
        let mut updates: Vec<(String, i64)> = vec![(faction.to_string(), delta)];
        if let Some(related) = self.faction_relationships.get(faction) {
            for (other, relation) in related {
                let Some(multiplier) = self.relationship_multipliers.get(relation) else {
                    continue;
                };
                let change = delta.saturating_mul(*multiplier);
                match updates.iter_mut().find(|(f, _)| f == other) {
                    Some((_, existing)) => *existing = existing.saturating_add(change),
                    None => updates.push((other.clone(), change)),
                }
            }
        }
        updates.retain(|(_, change)| *change != 0);
        updates
    }

    /// Every reference in the story that points at nothing: choice targets,
    /// teleports and start nodes. `end_game` values are free-form labels and
    /// are not checked.
    pub fn reference_problems(&self) -> Vec<ReferenceProblem> {
        let mut problems = Vec::new();
        let exists = |id: &str| self.contains_node(id) || self.is_ending(id);

        for (index, start) in self.starts.iter().enumerate() {
            if !self.contains_node(&start.node) {
                problems.push(ReferenceProblem {
                    context: format!("start entry {}", index + 1),
                    missing: start.node.clone(),
                });
            }
        }

        for (node_id, node) in &self.nodes {
            self.effect_problems(&node.on_enter, &mut problems, |i| {
                format!("node '{node_id}' on_enter effect {i}")
            });

            for (ci, choice) in node.choices.iter().enumerate() {
                let choice_no = ci + 1;
                self.effect_problems(&choice.effects, &mut problems, |i| {
                    format!("choice {choice_no} in node '{node_id}', effect {i}")
                });
                for dest in choice.target.destinations() {
                    if !exists(dest) {
                        problems.push(ReferenceProblem {
                            context: format!("choice {choice_no} in node '{node_id}'"),
                            missing: dest.to_string(),
                        });
                    }
                }
            }
        }
        problems
    }

    fn effect_problems(
        &self,
        effects: &[Effect],
        problems: &mut Vec<ReferenceProblem>,
        context: impl Fn(usize) -> String,
    ) {
        for (i, effect) in effects.iter().enumerate() {
            let Effect::Teleport { target } = effect else {
                continue;
            };
            if self.contains_node(target) || self.is_ending(target) {
                continue;
            }
            let missing = target;
            problems.push(ReferenceProblem {
                context: context(i + 1),
                missing: missing.clone(),
            });
        }
    }
}

/// A reference to a node or ending that does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceProblem {
    /// Where the reference was authored.
    pub context: String,
    /// The missing ID.
    pub missing: String,
}

impl fmt::Display for ReferenceProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} references unknown destination '{}'", self.context, self.missing)
    }
}
