//! Story loading: JSON parsing with positional errors and module merging.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{SchemaError, StoryResult};
use crate::node::{HostileOutcome, Node, Start};
use crate::story::{
    Demise, HOSTILE_FORCED_RETREAT, HOSTILE_GAME_OVER, Hostility, RepBounds, Story,
    default_relationship_multipliers,
};

/// The top-level document before nodes and starts are parsed.
#[derive(Debug, Deserialize)]
struct RawStory {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    nodes: Value,
    #[serde(default)]
    starts: Vec<Value>,
    #[serde(default)]
    endings: BTreeMap<String, String>,
    #[serde(default)]
    factions: Vec<String>,
    #[serde(default)]
    advanced_tags: Vec<String>,
    #[serde(default)]
    tag_aliases: BTreeMap<String, String>,
    #[serde(default)]
    faction_relationships: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default)]
    faction_relationship_multipliers: BTreeMap<String, i64>,
    #[serde(default)]
    rep_bounds: Option<RepBounds>,
    #[serde(default)]
    hostile_rep_threshold: Option<i64>,
    #[serde(default)]
    faction_hostile_thresholds: BTreeMap<String, i64>,
    #[serde(default)]
    hostile_outcomes: BTreeMap<String, String>,
    #[serde(default)]
    default_hostile_outcome: Option<HostileOutcome>,
    #[serde(default)]
    demise: Option<Demise>,
    #[serde(default)]
    modules: Vec<String>,
}

impl Story {
    /// Parse a story from JSON text. A story that declares `modules` must be
    /// loaded with [`Story::load`] so the module paths can be resolved.
    pub fn from_json_str(text: &str) -> StoryResult<Self> {
        parse_story(text, "story", None)
    }

    /// Load a story file, merging any modules it lists (paths relative to
    /// the story file).
    pub fn load(path: impl AsRef<Path>) -> StoryResult<Self> {
        let path = path.as_ref();
        let text = read_file(path)?;
        parse_story(&text, &path.display().to_string(), path.parent())
    }
}

fn read_file(path: &Path) -> StoryResult<String> {
    std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_raw(text: &str, origin: &str) -> StoryResult<RawStory> {
    let value: Value = serde_json::from_str(text).map_err(|source| SchemaError::Json {
        origin: origin.to_string(),
        source,
    })?;
    if !value.is_object() {
        return Err(SchemaError::Document {
            origin: origin.to_string(),
            message: "story data must be a JSON object".to_string(),
        });
    }
    RawStory::deserialize(value).map_err(|e| SchemaError::Document {
        origin: origin.to_string(),
        message: e.to_string(),
    })
}

fn parse_story(text: &str, origin: &str, base_dir: Option<&Path>) -> StoryResult<Story> {
    let mut raw = parse_raw(text, origin)?;
    let mut story = Story::new(raw.title.take().unwrap_or_else(|| "Untitled".to_string()));

    for (id, node) in parse_nodes(std::mem::take(&mut raw.nodes), origin)? {
        story.insert_node(id, node);
    }
    story.starts = parse_starts(std::mem::take(&mut raw.starts))?;
    story.endings = std::mem::take(&mut raw.endings);

    if !raw.modules.is_empty() {
        let Some(base_dir) = base_dir else {
            return Err(SchemaError::Document {
                origin: origin.to_string(),
                message: "modules can only be resolved when loading from a file".to_string(),
            });
        };
        for module in &raw.modules {
            merge_module(&mut story, base_dir, module)?;
        }
    }

    story.factions = raw.factions;
    story.advanced_tags = raw.advanced_tags;
    story.tag_aliases = raw.tag_aliases;
    story.faction_relationships = raw.faction_relationships;
    let mut multipliers = default_relationship_multipliers();
    multipliers.extend(raw.faction_relationship_multipliers);
    story.relationship_multipliers = multipliers;
    story.rep_bounds = raw.rep_bounds;
    story.demise = raw.demise.unwrap_or_default();
    story.hostility = build_hostility(
        origin,
        raw.hostile_rep_threshold,
        raw.faction_hostile_thresholds,
        raw.hostile_outcomes,
        raw.default_hostile_outcome,
    )?;
    inject_hostile_outcomes(&mut story);
    Ok(story)
}

fn merge_module(story: &mut Story, base_dir: &Path, module: &str) -> StoryResult<()> {
    if module.trim().is_empty() {
        return Err(SchemaError::Document {
            origin: story.title.clone(),
            message: "module entries must be non-empty strings".to_string(),
        });
    }
    let path = base_dir.join(module);
    let origin = path.display().to_string();
    let text = read_file(&path)?;
    let mut raw = parse_raw(&text, &origin)?;

    let nodes = parse_nodes(std::mem::take(&mut raw.nodes), &origin)?;
    let overlap: Vec<String> = nodes
        .iter()
        .filter(|(id, _)| story.contains_node(id))
        .map(|(id, _)| id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if !overlap.is_empty() {
        return Err(SchemaError::ModuleNodeConflict {
            module: origin,
            ids: overlap,
        });
    }

    for (ending, label) in &raw.endings {
        if story.endings.get(ending).is_some_and(|existing| existing != label) {
            return Err(SchemaError::EndingConflict {
                module: origin,
                ending: ending.clone(),
            });
        }
    }

    let starts = parse_starts(std::mem::take(&mut raw.starts))?;
    for (id, node) in nodes {
        story.insert_node(id, node);
    }
    for (ending, label) in raw.endings {
        story.endings.entry(ending).or_insert(label);
    }
    story.starts.extend(starts);
    Ok(())
}

/// Normalize the `nodes` field (object keyed by ID, or list of objects with
/// an `id`) and parse each node.
fn parse_nodes(raw: Value, origin: &str) -> StoryResult<Vec<(String, Node)>> {
    let entries: Vec<(String, Value)> = match raw {
        Value::Null => Vec::new(),
        Value::Object(map) => map.into_iter().collect(),
        Value::Array(list) => {
            let mut entries = Vec::with_capacity(list.len());
            for (i, item) in list.into_iter().enumerate() {
                let id = item
                    .get("id")
                    .and_then(Value::as_str)
                    .filter(|id| !id.trim().is_empty())
                    .map(str::to_string)
                    .ok_or_else(|| SchemaError::Document {
                        origin: origin.to_string(),
                        message: format!("node list entry {} is missing a string 'id'", i + 1),
                    })?;
                entries.push((id, item));
            }
            entries
        }
        other => {
            return Err(SchemaError::Document {
                origin: origin.to_string(),
                message: format!("'nodes' must be an object or a list, got {other}"),
            });
        }
    };

    let mut seen = BTreeSet::new();
    let duplicates: BTreeSet<String> = entries
        .iter()
        .filter(|(id, _)| !seen.insert(id.clone()))
        .map(|(id, _)| id.clone())
        .collect();
    if !duplicates.is_empty() {
        return Err(SchemaError::DuplicateNodes(duplicates.into_iter().collect()));
    }

    entries
        .into_iter()
        .map(|(id, value)| parse_node(&id, value).map(|node| (id, node)))
        .collect()
}

fn parse_node(id: &str, value: Value) -> StoryResult<Node> {
    let node_error = |message: String| SchemaError::Node {
        node: id.to_string(),
        message,
    };
    let Value::Object(mut fields) = value else {
        return Err(node_error("node data must be a JSON object".to_string()));
    };
    let on_enter = take_list(&mut fields, "on_enter").map_err(node_error)?;
    let choices = take_list(&mut fields, "choices").map_err(node_error)?;

    let mut node = Node::deserialize(Value::Object(fields)).map_err(|e| node_error(e.to_string()))?;

    for (i, effect) in on_enter.into_iter().enumerate() {
        let effect = serde_json::from_value(effect).map_err(|e| SchemaError::OnEnter {
            node: id.to_string(),
            index: i + 1,
            message: e.to_string(),
        })?;
        node.on_enter.push(effect);
    }
    for (i, choice) in choices.into_iter().enumerate() {
        let choice = serde_json::from_value(choice).map_err(|e| SchemaError::Choice {
            node: id.to_string(),
            index: i + 1,
            message: e.to_string(),
        })?;
        node.choices.push(choice);
    }
    Ok(node)
}

fn take_list(fields: &mut Map<String, Value>, key: &str) -> Result<Vec<Value>, String> {
    match fields.remove(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(format!("'{key}' must be a list, got {other}")),
    }
}

fn parse_starts(raw: Vec<Value>) -> StoryResult<Vec<Start>> {
    raw.into_iter()
        .enumerate()
        .map(|(i, value)| {
            let start: Start = serde_json::from_value(value).map_err(|e| SchemaError::Start {
                index: i + 1,
                message: e.to_string(),
            })?;
            if start.node.trim().is_empty() {
                return Err(SchemaError::Start {
                    index: i + 1,
                    message: "'node' must be a non-empty string".to_string(),
                });
            }
            Ok(start)
        })
        .collect()
}

fn build_hostility(
    origin: &str,
    threshold: Option<i64>,
    faction_thresholds: BTreeMap<String, i64>,
    outcomes: BTreeMap<String, String>,
    default_outcome: Option<HostileOutcome>,
) -> StoryResult<Hostility> {
    let mut hostility = Hostility::default();
    if let Some(threshold) = threshold {
        hostility.threshold = threshold;
    }
    hostility.faction_thresholds = faction_thresholds;
    for (key, node) in outcomes {
        let outcome = match key.as_str() {
            "game_over" => HostileOutcome::GameOver,
            "forced_retreat" => HostileOutcome::ForcedRetreat,
            other => {
                return Err(SchemaError::Document {
                    origin: origin.to_string(),
                    message: format!("unknown hostile outcome '{other}'"),
                });
            }
        };
        if !node.trim().is_empty() {
            hostility.outcomes.insert(outcome, node);
        }
    }
    if let Some(outcome) = default_outcome {
        hostility.default_outcome = outcome;
    }
    Ok(hostility)
}

/// Add the built-in outcome nodes the story did not author, and register
/// every outcome node as an ending.
fn inject_hostile_outcomes(story: &mut Story) {
    let outcomes: Vec<(HostileOutcome, String)> = story
        .hostility
        .outcomes
        .iter()
        .map(|(outcome, node)| (*outcome, node.clone()))
        .collect();

    for (outcome, node_id) in outcomes {
        if !story.contains_node(&node_id) {
            let builtin = match node_id.as_str() {
                HOSTILE_GAME_OVER => Some(Node::new(
                    "Hostile Encounter",
                    "Your reputation turns the welcome into a wall of drawn steel. \
                     The path ends here under a chorus of denied passage.",
                )),
                HOSTILE_FORCED_RETREAT => Some(Node::new(
                    "Forced Retreat",
                    "Cold stares and raised voices force you back from the threshold. \
                     You retreat to regroup, the route closed for now.",
                )),
                _ => None,
            };
            if let Some(mut node) = builtin {
                node.ignore_hostile = true;
                story.insert_node(node_id.clone(), node);
            }
        }
        let label = match outcome {
            HostileOutcome::GameOver => "Hostile Encounter",
            HostileOutcome::ForcedRetreat => "Forced Retreat",
        };
        story.endings.entry(node_id).or_insert_with(|| label.to_string());
    }
}
