//! Save schema migrations.
//!
//! - v0: the legacy flat document; state keys at the top level, optionally
//!   with a nested `player` block.
//! - v1: state wrapped in `state`, slot and timestamp in `metadata`.
//! - v2: `metadata.story_title` and `metadata.story_signature` added.

use serde_json::{Map, Value};

use crate::error::{SaveError, SaveResult};

/// The schema version this crate writes.
pub const CURRENT_VERSION: u64 = 2;

const LEGACY_STATE_KEYS: &[&str] = &[
    "current_node",
    "start_id",
    "history",
    "tick_counter",
    "player",
    "hp",
    "tags",
    "traits",
    "items",
    "flags",
    "reputation",
    "rep",
    "ending",
];

/// Bring a save document up to [`CURRENT_VERSION`].
pub fn migrate(payload: Value) -> SaveResult<Value> {
    let Value::Object(mut doc) = payload else {
        return Err(SaveError::Migration("save payload is not an object".to_string()));
    };
    let mut version = match doc.get("version") {
        None | Some(Value::Null) => 0,
        Some(v) => v
            .as_u64()
            .ok_or_else(|| SaveError::Migration(format!("invalid save version {v}")))?,
    };
    if version > CURRENT_VERSION {
        return Err(SaveError::Migration(format!(
            "save schema {version} is newer than supported {CURRENT_VERSION}"
        )));
    }
    while version < CURRENT_VERSION {
        doc = match version {
            0 => v0_to_v1(doc)?,
            1 => v1_to_v2(doc),
            other => {
                return Err(SaveError::Migration(format!(
                    "no migration from save schema {other}"
                )));
            }
        };
        version += 1;
    }
    Ok(Value::Object(doc))
}

fn v0_to_v1(mut doc: Map<String, Value>) -> SaveResult<Map<String, Value>> {
    let mut state = match doc.remove("state") {
        Some(Value::Object(state)) => state,
        _ => {
            let mut state = Map::new();
            for key in LEGACY_STATE_KEYS {
                if let Some(value) = doc.remove(*key) {
                    state.insert((*key).to_string(), value);
                }
            }
            if state.is_empty() {
                return Err(SaveError::Migration(
                    "legacy save has no state".to_string(),
                ));
            }
            state
        }
    };
    if let Some(Value::Object(player)) = state.remove("player") {
        for (key, value) in player {
            state.entry(key).or_insert(value);
        }
    }

    let old_meta = match doc.remove("metadata") {
        Some(Value::Object(meta)) => meta,
        _ => Map::new(),
    };
    let pick = |key: &str, legacy: &str| {
        old_meta
            .get(key)
            .or_else(|| old_meta.get(legacy))
            .or_else(|| doc.get(key))
            .or_else(|| doc.get(legacy))
            .cloned()
            .unwrap_or(Value::Null)
    };
    let mut metadata = Map::new();
    metadata.insert("slot".to_string(), pick("slot", "save_slot"));
    metadata.insert("saved_at".to_string(), pick("saved_at", "saved_at"));
    let title = pick("story_title", "world_title");
    if !title.is_null() {
        metadata.insert("world_title".to_string(), title);
    }
    let signature = pick("story_signature", "world_signature");
    if !signature.is_null() {
        metadata.insert("world_signature".to_string(), signature);
    }

    let mut upgraded = Map::new();
    upgraded.insert("version".to_string(), Value::from(1));
    upgraded.insert("metadata".to_string(), Value::Object(metadata));
    upgraded.insert("state".to_string(), Value::Object(state));
    Ok(upgraded)
}

fn v1_to_v2(mut doc: Map<String, Value>) -> Map<String, Value> {
    let mut metadata = match doc.remove("metadata") {
        Some(Value::Object(meta)) => meta,
        _ => Map::new(),
    };
    let title = metadata.remove("world_title").unwrap_or(Value::Null);
    metadata.entry("story_title").or_insert(title);
    let signature = metadata.remove("world_signature").unwrap_or(Value::Null);
    metadata.entry("story_signature").or_insert(signature);
    doc.insert("metadata".to_string(), Value::Object(metadata));
    doc.insert("version".to_string(), Value::from(2));
    doc
}
