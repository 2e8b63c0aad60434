//! The bot controller: owns the plan stack and drives it once per tick.
//!
//! The controller never holds on to the world. The caller passes the world
//! by shared reference on every [`BabyBot::replan`] call, applies the
//! returned action itself, and reports that action back on the next call.

use babybot_types::{Action, Instruction, ObjectKind, WorldView};
use tracing::{debug, warn};

use crate::config::{Observability, PlannerConfig};
use crate::context::{AgentSnapshot, Planning};
use crate::error::PlannerError;
use crate::pathfinder::{BfsStats, VisibilityMask};
use crate::stack::PlanStack;
use crate::subgoal::{Reason, Subgoal, Target};

/// Stack-based planner for one agent in one world.
#[derive(Debug, Clone)]
pub struct BabyBot {
    config: PlannerConfig,
    stack: PlanStack,
    mask: VisibilityMask,
    stats: BfsStats,
    /// Agent state at the end of the previous tick.
    memory: Option<AgentSnapshot>,
}

impl BabyBot {
    /// A controller with an empty plan. Call
    /// [`provide_initial_subgoals`](Self::provide_initial_subgoals) or
    /// [`reset`](Self::reset) before the first tick.
    pub fn new<W: WorldView>(world: &W, config: PlannerConfig) -> Self {
        let visible = config.observability == Observability::Full;
        Self {
            mask: VisibilityMask::new(world.width(), world.height(), visible),
            config,
            stack: PlanStack::new(),
            stats: BfsStats::default(),
            memory: None,
        }
    }

    /// A controller seeded with `plan`, given in execution order.
    pub fn with_plan<W: WorldView>(
        world: &W,
        config: PlannerConfig,
        plan: impl IntoIterator<Item = Subgoal>,
    ) -> Self {
        let mut bot = Self::new(world, config);
        bot.stack = PlanStack::from_plan(plan);
        bot
    }

    /// Decompose `instruction` onto the stack so that its parts run in the
    /// order the instruction demands.
    pub fn provide_initial_subgoals(&mut self, instruction: &Instruction) {
        self.push_instruction(instruction);
        debug!(mission = %instruction, depth = self.stack.len(), "initial subgoals");
    }

    fn push_instruction(&mut self, instruction: &Instruction) {
        match instruction {
            Instruction::GoTo { target } => {
                self.stack.push(Subgoal::go_next_to(Target::Descriptor(*target), None));
            }
            Instruction::Open { target } => {
                self.stack.push(Subgoal::open(None));
                self.stack.push(Subgoal::go_next_to(Target::Descriptor(*target), Some(Reason::Open)));
            }
            Instruction::Pickup { target } => {
                // Put it back down afterwards so the hands are free again.
                self.stack.push(Subgoal::drop());
                self.stack.push(Subgoal::pickup());
                self.stack.push(Subgoal::go_next_to(Target::Descriptor(*target), None));
            }
            Instruction::PutNext { moving, fixed } => {
                self.stack.push(Subgoal::drop());
                self.stack.push(Subgoal::go_next_to(Target::Descriptor(*fixed), Some(Reason::PutNext)));
                self.stack.push(Subgoal::pickup());
                self.stack.push(Subgoal::go_next_to(Target::Descriptor(*moving), None));
            }
            // The stack is LIFO: push the later part first.
            Instruction::And { first, second } | Instruction::Before { first, second } => {
                self.push_instruction(second);
                self.push_instruction(first);
            }
            Instruction::After { first, second } => {
                self.push_instruction(first);
                self.push_instruction(second);
            }
        }
    }

    /// Replace the whole plan with `plan`, given in execution order. The
    /// previous plan is discarded and the push counter restarts.
    pub fn reset(&mut self, plan: impl IntoIterator<Item = Subgoal>) {
        self.stack = PlanStack::from_plan(plan);
        debug!(depth = self.stack.len(), "plan reset");
    }

    /// Plan one tick and suggest the next action.
    ///
    /// `last_action` is the action applied to `world` since the previous
    /// call, or `None` on the first call. `None` never counts as completing
    /// the top subgoal. Returns [`Action::Done`] once the plan is empty.
    ///
    /// # Errors
    ///
    /// - [`PlannerError::BoxOpened`] if `last_action` toggled a box.
    /// - [`PlannerError::NothingToExplore`] if the plan needs exploration
    ///   and no closed door is reachable.
    /// - [`PlannerError::Stuck`] if the plan does not settle on an action
    ///   within the configured number of iterations.
    pub fn replan<W: WorldView>(
        &mut self,
        world: &W,
        last_action: Option<Action>,
    ) -> Result<Action, PlannerError> {
        if self.config.observability == Observability::Partial {
            self.mask.observe(world);
        }

        if last_action == Some(Action::Toggle)
            && let Some(memory) = &self.memory
            && memory.fwd_cell.is_some_and(|cell| cell.kind == ObjectKind::Box)
        {
            warn!(position = %memory.fwd_pos, "box opened");
            return Err(PlannerError::BoxOpened {
                position: memory.fwd_pos,
            });
        }

        let agent = AgentSnapshot::capture(world);
        let memory = self.memory;
        let mut ctx = Planning {
            world,
            agent: &agent,
            memory: memory.as_ref(),
            mask: &self.mask,
            stats: &mut self.stats,
            stack: &mut self.stack,
        };

        if let Some(top) = ctx.stack.top().copied() {
            top.on_action_result(&mut ctx, last_action);
        }

        while ctx.stack.top().is_some_and(|top| top.is_exploratory()) {
            ctx.pop();
        }

        let mut iterations: u32 = 0;
        let mut suggested = None;
        while let Some(top) = ctx.stack.top().copied() {
            if iterations >= self.config.max_replan_iterations {
                warn!(iterations, depth = ctx.stack.len(), "replanning did not settle");
                return Err(PlannerError::Stuck { iterations });
            }
            iterations = iterations.saturating_add(1);
            suggested = top.plan_next_action(&mut ctx)?;
            if suggested.is_some() {
                break;
            }
        }

        let action = suggested.unwrap_or(Action::Done);
        debug!(
            action = %action,
            depth = ctx.stack.len(),
            iterations,
            pos = %agent.pos,
            "replanned"
        );
        self.memory = Some(agent);
        Ok(action)
    }

    /// Total subgoals pushed since the plan was last seeded.
    pub const fn subgoals_pushed(&self) -> u64 {
        self.stack.total_pushed()
    }

    /// Accumulated pathfinding counters.
    pub const fn bfs_stats(&self) -> BfsStats {
        self.stats
    }

    /// The current plan.
    pub const fn stack(&self) -> &PlanStack {
        &self.stack
    }

    /// Cells observed so far.
    pub const fn visibility(&self) -> &VisibilityMask {
        &self.mask
    }

    /// The configuration this controller runs with.
    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }
}
