//! The story walker: a state machine over the story graph.
//!
//! A session alternates between [`Walker::enter`] (run the current node and
//! offer its choices) and [`Walker::choose`] (take one of them) until the
//! walker reaches [`Phase::Ended`]:
//!
//! ```text
//! Active(node) --enter--> AwaitingChoice(node, available) --choose--> Active(next)
//!       |                                                     |
//!       +--------------------------> Ended(ending) <----------+
//! ```

use std::sync::Arc;

use pw_core::{Node, Start, Story};
use tracing::{debug, warn};

use crate::choice::{
    EffectContext, EffectLog, EvalContext, VisibleChoice, apply_all, infer_action,
    resolve_choice, visible_choices,
};
use crate::config::EngineConfig;
use crate::error::{ContentError, FictionError, FictionResult};
use crate::player::{PlayerState, Transition};
use crate::profile::Profile;

/// Where the walker is in the enter/choose cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// About to enter a node.
    Active {
        /// Node to enter.
        node: String,
    },
    /// Waiting for the player to pick one of `available`.
    AwaitingChoice {
        /// The current node.
        node: String,
        /// Choices whose conditions hold, in authored order.
        available: Vec<VisibleChoice>,
    },
    /// The session is over.
    Ended {
        /// Ending label.
        ending: String,
    },
}

/// What one `enter` or `choose` step produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Player-facing messages in order.
    pub messages: Vec<String>,
    /// Content problems met along the way. None of them stop the session.
    pub issues: Vec<ContentError>,
    /// Whether the profile changed and should be written.
    pub profile_changed: bool,
}

impl StepReport {
    fn absorb(&mut self, log: EffectLog, profile_changed: bool) {
        self.messages.extend(log.messages);
        self.issues.extend(log.issues);
        self.profile_changed |= profile_changed;
    }
}

/// Drives one session over a shared story.
#[derive(Debug, Clone)]
pub struct Walker {
    story: Arc<Story>,
    state: PlayerState,
    profile: Profile,
    config: EngineConfig,
    phase: Phase,
    pending: Vec<String>,
}

/// The starts a profile may begin a new session from, in authored order.
pub fn available_starts<'s>(story: &'s Story, profile: &Profile) -> Vec<&'s Start> {
    story
        .starts
        .iter()
        .filter(|start| profile.is_available(start))
        .collect()
}

impl Walker {
    /// Begin a fresh session. Without a start ID the first available start
    /// is used.
    pub fn new_session(
        story: Arc<Story>,
        profile: Profile,
        start_id: Option<&str>,
        config: EngineConfig,
    ) -> FictionResult<Self> {
        let start = match start_id {
            Some(id) => {
                let start = story
                    .start(id)
                    .ok_or_else(|| ContentError::UnknownStart(id.to_string()))?;
                if !profile.is_available(start) {
                    return Err(ContentError::LockedStart(id.to_string()).into());
                }
                start
            }
            None => available_starts(&story, &profile)
                .into_iter()
                .next()
                .ok_or(ContentError::NoStarts)?,
        };

        let mut state = PlayerState::new(start.node.as_str(), config.starting_hp);
        state.start_id = Some(start.id().to_string());
        for tag in &start.tags {
            state.tags.insert(story.canonical_tag(tag).to_string());
        }
        for faction in &story.factions {
            state.reputation.insert(faction.clone(), 0);
        }
        debug!(start = start.id(), node = %start.node, "new session");

        let phase = Phase::Active {
            node: start.node.clone(),
        };
        Ok(Self {
            story,
            state,
            profile,
            config,
            phase,
            pending: Vec::new(),
        })
    }

    /// Continue a saved session.
    ///
    /// A save is taken while awaiting a choice, after the node's `on_enter`
    /// effects ran, so the walker resumes at the choice prompt without
    /// re-entering the node. A saved position that no longer exists restarts
    /// at the default start with the history cleared; without any start the
    /// save cannot be resumed.
    pub fn resume(
        story: Arc<Story>,
        profile: Profile,
        mut state: PlayerState,
        config: EngineConfig,
    ) -> FictionResult<Self> {
        for faction in &story.factions {
            state.reputation.entry(faction.clone()).or_insert(0);
        }

        let mut pending = Vec::new();
        let phase = if let Some(ending) = &state.ending {
            Phase::Ended {
                ending: ending.clone(),
            }
        } else if let Some(node) = story.node(&state.current_node) {
            let ctx = EvalContext::new(&story, &state, &profile).with_clock(config.clock_enabled);
            Phase::AwaitingChoice {
                node: state.current_node.clone(),
                available: visible_choices(node, &ctx),
            }
        } else if story.is_ending(&state.current_node) {
            Phase::Active {
                node: state.current_node.clone(),
            }
        } else {
            let Some(start) = story.default_start() else {
                warn!(node = %state.current_node, "saved node no longer exists, no start to fall back to");
                return Err(ContentError::MissingNode {
                    node: state.current_node,
                }
                .into());
            };
            warn!(
                node = %state.current_node,
                start = start.id(),
                "saved node no longer exists, restarting"
            );
            pending.push(format!(
                "[!] Saved position '{}' no longer exists; restarting at '{}'.",
                state.current_node,
                start.display_title()
            ));
            state.current_node = start.node.clone();
            state.start_id = Some(start.id().to_string());
            state.history.clear();
            Phase::Active {
                node: state.current_node.clone(),
            }
        };
        Ok(Self {
            story,
            state,
            profile,
            config,
            phase,
            pending,
        })
    }

    /// The current phase.
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Choices on offer; empty unless awaiting a choice.
    pub fn available_choices(&self) -> &[VisibleChoice] {
        match &self.phase {
            Phase::AwaitingChoice { available, .. } => available,
            _ => &[],
        }
    }

    /// Whether the session is over.
    pub fn is_ended(&self) -> bool {
        matches!(self.phase, Phase::Ended { .. })
    }

    /// The player state.
    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    /// The profile as changed by this session.
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// The story.
    pub fn story(&self) -> &Arc<Story> {
        &self.story
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The node the player is at.
    pub fn current_node(&self) -> Option<&Node> {
        self.story.node(&self.state.current_node)
    }

    /// Hand back the player state and profile.
    pub fn into_parts(self) -> (PlayerState, Profile) {
        (self.state, self.profile)
    }

    /// Enter the active node: hostility check, `on_enter` effects,
    /// teleports, endings, then choice filtering.
    pub fn enter(&mut self) -> FictionResult<StepReport> {
        let mut node_id = match &self.phase {
            Phase::Active { node } => node.clone(),
            Phase::AwaitingChoice { .. } => return Err(FictionError::NotActive),
            Phase::Ended { .. } => return Err(FictionError::SessionEnded),
        };
        let story = Arc::clone(&self.story);
        let mut report = StepReport {
            messages: std::mem::take(&mut self.pending),
            ..StepReport::default()
        };
        let mut hops = 0;

        let node = loop {
            let Some(node) = story.node(&node_id) else {
                if story.is_ending(&node_id) {
                    self.finish(story.ending_label(&node_id).to_string(), &mut report);
                    return Ok(report);
                }
                warn!(node = %node_id, "missing node");
                return Err(ContentError::MissingNode { node: node_id }.into());
            };

            if let Some(outcome_node) = self.hostile_reroute(&story, &node_id, node, &mut report) {
                node_id = self.hop(outcome_node, &mut hops)?;
                continue;
            }

            debug!(node = %node_id, "entering node");
            self.state.current_node = node_id.clone();
            let mut ctx = EffectContext::new(&story, &mut self.state, &mut self.profile);
            let log = apply_all(&node.on_enter, &mut ctx);
            let teleport = ctx.teleport.take();
            let profile_changed = ctx.profile_changed;
            report.absorb(log, profile_changed);

            if let Some(ending) = self.state.ending.clone() {
                self.finish(ending, &mut report);
                return Ok(report);
            }
            if let Some(target) = teleport {
                node_id = self.hop(target, &mut hops)?;
                continue;
            }
            if story.is_ending(&node_id) {
                self.finish(story.ending_label(&node_id).to_string(), &mut report);
                return Ok(report);
            }
            break node;
        };

        let available = visible_choices(node, &self.eval_context(&story));
        if available.is_empty() {
            warn!(node = %node_id, "no choices available");
            report.issues.push(ContentError::NoChoicesAvailable {
                node: node_id.clone(),
            });
        }
        self.phase = Phase::AwaitingChoice {
            node: node_id,
            available,
        };
        Ok(report)
    }

    /// Take the visible choice at `index` (0-based into
    /// [`Walker::available_choices`]).
    pub fn choose(&mut self, index: usize) -> FictionResult<StepReport> {
        let (node_id, authored) = match &self.phase {
            Phase::AwaitingChoice { node, available } => {
                let picked = available.get(index).ok_or(FictionError::InvalidChoice {
                    index,
                    available: available.len(),
                })?;
                (node.clone(), picked.index)
            }
            Phase::Active { .. } => return Err(FictionError::NotAwaitingChoice),
            Phase::Ended { .. } => return Err(FictionError::SessionEnded),
        };
        let story = Arc::clone(&self.story);
        let node = story
            .node(&node_id)
            .ok_or_else(|| ContentError::MissingNode {
                node: node_id.clone(),
            })?;
        let choice = node
            .choices
            .get(authored)
            .ok_or(FictionError::InvalidChoice {
                index,
                available: node.choices.len(),
            })?;
        debug!(node = %node_id, choice = %choice.text, "choice taken");

        let mut report = StepReport {
            messages: std::mem::take(&mut self.pending),
            ..StepReport::default()
        };
        let mut ctx = EffectContext::new(&story, &mut self.state, &mut self.profile);
        let log = apply_all(&choice.effects, &mut ctx);
        let teleport = ctx.teleport.take();
        let profile_changed = ctx.profile_changed;
        report.absorb(log, profile_changed);

        let action = infer_action(choice, &node_id, &self.eval_context(&story));
        if self.config.clock_enabled {
            let cost = self.config.tick_costs.cost(action);
            self.state.tick_counter = self.state.tick_counter.saturating_add(cost);
            debug!(?action, cost, tick = self.state.tick_counter, "ticks advanced");
        }

        if let Some(ending) = self.state.ending.clone() {
            self.finish(ending, &mut report);
            return Ok(report);
        }
        if self.state.hp <= story.demise.hp_at_most {
            report
                .messages
                .push(format!("[!] You have perished (HP {}).", self.state.hp));
            self.finish(story.demise.ending.clone(), &mut report);
            return Ok(report);
        }
        if let Some(target) = teleport {
            self.record(&node_id, &target, &choice.text);
            self.phase = Phase::Active { node: target };
            return Ok(report);
        }

        let resolved = resolve_choice(&node_id, authored, choice, &self.eval_context(&story))
            .map(str::to_string)
            .and_then(|target| {
                if story.contains_node(&target) || story.is_ending(&target) {
                    Ok(target)
                } else {
                    Err(ContentError::MissingNode { node: target })
                }
            });
        match resolved {
            Ok(target) => {
                self.record(&node_id, &target, &choice.text);
                if story.is_ending(&target) && !story.contains_node(&target) {
                    self.state.current_node = target.clone();
                    self.finish(story.ending_label(&target).to_string(), &mut report);
                } else {
                    self.phase = Phase::Active { node: target };
                }
            }
            Err(problem) => {
                warn!(%problem, "choice led nowhere");
                report.issues.push(problem);
                let available = visible_choices(node, &self.eval_context(&story));
                self.phase = Phase::AwaitingChoice {
                    node: node_id,
                    available,
                };
            }
        }
        Ok(report)
    }

    fn eval_context<'a>(&'a self, story: &'a Story) -> EvalContext<'a> {
        EvalContext::new(story, &self.state, &self.profile).with_clock(self.config.clock_enabled)
    }

    fn hop(&self, target: String, hops: &mut usize) -> FictionResult<String> {
        *hops += 1;
        if *hops > self.config.max_teleport_hops {
            warn!(node = %target, hops = *hops, "teleport loop");
            return Err(ContentError::TeleportLoop {
                node: target,
                hops: *hops,
            }
            .into());
        }
        Ok(target)
    }

    /// The outcome node a hostile faction sends the player to, if any.
    fn hostile_reroute(
        &self,
        story: &Story,
        node_id: &str,
        node: &Node,
        report: &mut StepReport,
    ) -> Option<String> {
        if node.ignore_hostile || story.hostility.is_outcome_node(node_id) {
            return None;
        }
        let hostile: Vec<&str> = node
            .controlling_factions()
            .into_iter()
            .filter(|f| self.state.rep(f) <= story.hostility.threshold_for(f))
            .collect();
        if hostile.is_empty() {
            return None;
        }
        let outcome = node
            .hostile_outcome
            .unwrap_or(story.hostility.default_outcome);
        let target = story.hostility.outcomes.get(&outcome)?.clone();
        debug!(node = node_id, ?outcome, "hostile reception");
        report.messages.push(format!(
            "[!] Hostile presence from {} forces a {}.",
            hostile.join(", "),
            match outcome {
                pw_core::HostileOutcome::GameOver => "game over",
                pw_core::HostileOutcome::ForcedRetreat => "forced retreat",
            }
        ));
        Some(target)
    }

    fn record(&mut self, from: &str, to: &str, choice: &str) {
        self.state.history.push(Transition {
            from: from.to_string(),
            to: to.to_string(),
            choice: choice.to_string(),
        });
    }

    fn finish(&mut self, ending: String, report: &mut StepReport) {
        debug!(%ending, "session ended");
        if self.profile.record_ending(ending.as_str()) {
            report.profile_changed = true;
        }
        self.state.ending = Some(ending.clone());
        report
            .messages
            .push(format!("*** Ending reached: {ending} ***"));
        self.phase = Phase::Ended { ending };
    }
}
