//! The closed vocabulary of authored conditions.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::value::{FlagValue, TagList};

/// A predicate an author attaches to a choice or a conditional target.
///
/// The set of kinds is closed: an unknown `type` fails to deserialize, which
/// surfaces as a schema error while the story loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// The player holds at least one of the item.
    HasItem {
        /// Item name.
        value: String,
    },
    /// The player holds none of the item.
    MissingItem {
        /// Item name.
        value: String,
    },
    /// A player flag equals a value. An absent or `null` value is the
    /// unset sentinel and matches a flag that was never set.
    FlagEq {
        /// Flag key.
        flag: String,
        /// Expected value; `None` is the unset sentinel.
        #[serde(default)]
        value: Option<FlagValue>,
    },
    /// The player holds every listed tag.
    HasTag {
        /// Required tags.
        value: TagList,
    },
    /// The player holds every listed late-game tag. Without a value the
    /// story's declared advanced tags are required.
    HasAdvancedTag {
        /// Required advanced tags.
        #[serde(default)]
        value: Option<TagList>,
    },
    /// The player holds every listed trait.
    HasTrait {
        /// Required traits.
        value: TagList,
    },
    /// Reputation with a faction is at least a threshold.
    RepAtLeast {
        /// Faction name.
        faction: String,
        /// Inclusive threshold.
        value: i64,
    },
    /// At least `count` factions meet a reputation threshold.
    RepAtLeastCount {
        /// Inclusive threshold each counted faction must meet.
        value: i64,
        /// How many factions must meet it.
        #[serde(default = "default_count")]
        count: usize,
        /// Factions to consider; defaults to the story's declared factions.
        #[serde(default)]
        factions: Option<TagList>,
    },
    /// A profile flag equals a value (`None` is the unset sentinel).
    ProfileFlagEq {
        /// Flag key.
        flag: String,
        /// Expected value.
        #[serde(default)]
        value: Option<FlagValue>,
    },
    /// A profile flag is set to a truthy value.
    ProfileFlagIsTrue {
        /// Flag key.
        flag: String,
    },
    /// A profile flag is unset or falsy.
    ProfileFlagIsFalse {
        /// Flag key.
        flag: String,
    },
    /// The tick counter is at least a value.
    TickCounterAtLeast {
        /// Inclusive lower bound.
        value: u64,
    },
    /// The tick counter is at most a value.
    TickCounterAtMost {
        /// Inclusive upper bound.
        value: u64,
    },
    /// The hour of the day (`tick_counter mod 24`) lies in a cyclical range.
    TimeWindow {
        /// First hour of the window.
        #[serde(default)]
        start: i64,
        /// Last hour of the window (may be smaller than `start` to wrap).
        #[serde(default)]
        end: i64,
    },
    /// The doom clock threshold has been crossed.
    DoomReached,
    /// The doom clock threshold has not been crossed.
    DoomNotReached,
}

fn default_count() -> usize {
    1
}

impl Condition {
    /// The authored `type` name of this condition.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::HasItem { .. } => "has_item",
            Self::MissingItem { .. } => "missing_item",
            Self::FlagEq { .. } => "flag_eq",
            Self::HasTag { .. } => "has_tag",
            Self::HasAdvancedTag { .. } => "has_advanced_tag",
            Self::HasTrait { .. } => "has_trait",
            Self::RepAtLeast { .. } => "rep_at_least",
            Self::RepAtLeastCount { .. } => "rep_at_least_count",
            Self::ProfileFlagEq { .. } => "profile_flag_eq",
            Self::ProfileFlagIsTrue { .. } => "profile_flag_is_true",
            Self::ProfileFlagIsFalse { .. } => "profile_flag_is_false",
            Self::TickCounterAtLeast { .. } => "tick_counter_at_least",
            Self::TickCounterAtMost { .. } => "tick_counter_at_most",
            Self::TimeWindow { .. } => "time_window",
            Self::DoomReached => "doom_reached",
            Self::DoomNotReached => "doom_not_reached",
        }
    }
}

/// The condition slot of a choice or branch: zero or more conditions that
/// must all hold.
///
/// `null`, `{}` and an absent field all mean "unconditional". A single
/// object or a list of objects is accepted.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Gate(pub Vec<Condition>);

impl Gate {
    /// A gate that always passes.
    pub fn open() -> Self {
        Self::default()
    }

    /// A gate holding a single condition.
    pub fn single(condition: Condition) -> Self {
        Self(vec![condition])
    }

    /// Whether this gate carries no condition at all.
    pub fn is_unconditional(&self) -> bool {
        self.0.is_empty()
    }

    /// The gated conditions in authored order.
    pub fn conditions(&self) -> &[Condition] {
        &self.0
    }
}

impl From<Condition> for Gate {
    fn from(condition: Condition) -> Self {
        Self::single(condition)
    }
}

impl<'de> Deserialize<'de> for Gate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        parse_gate(raw).map_err(D::Error::custom)
    }
}

fn parse_gate(raw: serde_json::Value) -> Result<Gate, String> {
    use serde_json::Value;

    match raw {
        Value::Null => Ok(Gate::open()),
        Value::Object(ref map) if map.is_empty() => Ok(Gate::open()),
        Value::Object(_) => Condition::deserialize(raw)
            .map(Gate::single)
            .map_err(|e| e.to_string()),
        Value::Array(entries) => {
            if entries.is_empty() {
                return Err("condition list must not be empty".to_string());
            }
            entries
                .into_iter()
                .enumerate()
                .map(|(i, entry)| {
                    Condition::deserialize(entry)
                        .map_err(|e| format!("condition list entry {}: {e}", i + 1))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Gate)
        }
        other => Err(format!("condition must be an object, a list or null, got {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(json: &str) -> Result<Gate, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn parses_every_kind() {
        let src = r#"[
            {"type": "has_item", "value": "Lantern"},
            {"type": "missing_item", "value": "Lantern"},
            {"type": "flag_eq", "flag": "door", "value": "open"},
            {"type": "has_tag", "value": ["Weaver", "Emissary"]},
            {"type": "has_advanced_tag"},
            {"type": "has_trait", "value": "People-Reader"},
            {"type": "rep_at_least", "faction": "Root Court", "value": 1},
            {"type": "rep_at_least_count", "value": 2, "count": 3},
            {"type": "profile_flag_eq", "flag": "seen_intro", "value": true},
            {"type": "profile_flag_is_true", "flag": "seen_intro"},
            {"type": "profile_flag_is_false", "flag": "seen_intro"},
            {"type": "tick_counter_at_least", "value": 10},
            {"type": "tick_counter_at_most", "value": 20},
            {"type": "time_window", "start": 20, "end": 4},
            {"type": "doom_reached"},
            {"type": "doom_not_reached"}
        ]"#;
        let parsed = gate(src).unwrap();
        let kinds: Vec<_> = parsed.conditions().iter().map(Condition::kind).collect();
        assert_eq!(kinds.len(), 16);
        assert_eq!(kinds[0], "has_item");
        assert_eq!(kinds[15], "doom_not_reached");
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = gate(r#"{"type": "has_var_gte", "var": "gold", "value": 3}"#).unwrap_err();
        assert!(err.to_string().contains("has_var_gte"));
    }

    #[test]
    fn null_and_empty_object_are_unconditional() {
        assert!(gate("null").unwrap().is_unconditional());
        assert!(gate("{}").unwrap().is_unconditional());
    }

    #[test]
    fn empty_list_is_rejected() {
        assert!(gate("[]").is_err());
    }

    #[test]
    fn flag_eq_without_value_is_unset_sentinel() {
        let parsed = gate(r#"{"type": "flag_eq", "flag": "door"}"#).unwrap();
        assert_eq!(
            parsed.conditions()[0],
            Condition::FlagEq {
                flag: "door".into(),
                value: None,
            }
        );
    }

    #[test]
    fn rep_count_defaults_to_one() {
        let parsed = gate(r#"{"type": "rep_at_least_count", "value": 1}"#).unwrap();
        match &parsed.conditions()[0] {
            Condition::RepAtLeastCount { count, factions, .. } => {
                assert_eq!(*count, 1);
                assert!(factions.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
