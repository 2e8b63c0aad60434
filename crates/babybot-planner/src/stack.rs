//! The LIFO plan stack.

use tracing::trace;

use crate::subgoal::Subgoal;

/// Pending subgoals, top of the stack last.
///
/// Also counts every subgoal pushed after construction. The counter never
/// decreases and is reported as a diagnostic of how much corrective
/// planning an episode needed.
#[derive(Debug, Clone, Default)]
pub struct PlanStack {
    items: Vec<Subgoal>,
    total_pushed: u64,
}

impl PlanStack {
    /// An empty stack.
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            total_pushed: 0,
        }
    }

    /// A stack seeded with `plan`, given in execution order: the first
    /// entry ends up on top. Seeding does not count as pushing.
    pub fn from_plan(plan: impl IntoIterator<Item = Subgoal>) -> Self {
        let mut items: Vec<Subgoal> = plan.into_iter().collect();
        items.reverse();
        Self {
            items,
            total_pushed: 0,
        }
    }

    /// Push a subgoal on top.
    pub fn push(&mut self, subgoal: Subgoal) {
        trace!(subgoal = %subgoal, depth = self.items.len(), "push");
        self.total_pushed = self.total_pushed.saturating_add(1);
        self.items.push(subgoal);
    }

    /// Remove and return the top subgoal.
    pub fn pop(&mut self) -> Option<Subgoal> {
        let popped = self.items.pop();
        if let Some(subgoal) = &popped {
            trace!(subgoal = %subgoal, depth = self.items.len(), "pop");
        }
        popped
    }

    /// The active subgoal.
    pub fn top(&self) -> Option<&Subgoal> {
        self.items.last()
    }

    /// Number of pending subgoals.
    pub const fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no subgoals are pending.
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Pending subgoals from the bottom of the stack to the top.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Subgoal> {
        self.items.iter()
    }

    /// Total number of subgoals pushed since construction.
    pub const fn total_pushed(&self) -> u64 {
        self.total_pushed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_plan_runs_in_order_without_counting() {
        let mut stack = PlanStack::from_plan([Subgoal::pickup(), Subgoal::drop()]);
        assert_eq!(stack.total_pushed(), 0);
        assert_eq!(stack.pop(), Some(Subgoal::pickup()));
        stack.push(Subgoal::close());
        stack.push(Subgoal::explore());
        assert_eq!(stack.total_pushed(), 2);
        assert_eq!(stack.len(), 3);
        assert_eq!(stack.top(), Some(&Subgoal::explore()));
    }

    #[test]
    fn counter_survives_pops() {
        let mut stack = PlanStack::new();
        stack.push(Subgoal::drop());
        let _ = stack.pop();
        assert!(stack.is_empty());
        assert_eq!(stack.total_pushed(), 1);
    }
}
