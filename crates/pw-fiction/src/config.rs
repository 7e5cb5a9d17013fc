//! Engine configuration.

use serde::{Deserialize, Serialize};

use pw_core::ActionKind;

/// In-story hours each action category costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickCosts {
    /// Travelling to another node.
    #[serde(rename = "move")]
    pub travel: u64,
    /// Exploring the current node.
    pub explore: u64,
    /// Resting.
    pub rest: u64,
}

impl Default for TickCosts {
    fn default() -> Self {
        Self {
            travel: 4,
            explore: 1,
            rest: 8,
        }
    }
}

impl TickCosts {
    /// The cost of one action.
    pub fn cost(&self, action: ActionKind) -> u64 {
        match action {
            ActionKind::Move => self.travel,
            ActionKind::Explore => self.explore,
            ActionKind::Rest => self.rest,
        }
    }
}

/// Configuration for a story session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Hit points a fresh session starts with.
    pub starting_hp: i64,
    /// Tick cost per action category.
    pub tick_costs: TickCosts,
    /// Whether actions advance the tick counter. With the clock disabled
    /// the doom clock never fires.
    pub clock_enabled: bool,
    /// How many consecutive teleports a single step may follow.
    pub max_teleport_hops: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starting_hp: 10,
            tick_costs: TickCosts::default(),
            clock_enabled: true,
            max_teleport_hops: 32,
        }
    }
}

impl EngineConfig {
    /// Set the starting hit points.
    pub fn with_starting_hp(mut self, hp: i64) -> Self {
        self.starting_hp = hp;
        self
    }

    /// Set the tick cost of one action category.
    pub fn with_tick_cost(mut self, action: ActionKind, cost: u64) -> Self {
        match action {
            ActionKind::Move => self.tick_costs.travel = cost,
            ActionKind::Explore => self.tick_costs.explore = cost,
            ActionKind::Rest => self.tick_costs.rest = cost,
        }
        self
    }

    /// Enable or disable the clock.
    pub fn with_clock(mut self, enabled: bool) -> Self {
        self.clock_enabled = enabled;
        self
    }

    /// Set the teleport hop limit (at least 1).
    pub fn with_max_teleport_hops(mut self, hops: usize) -> Self {
        self.max_teleport_hops = hops.max(1);
        self
    }
}
