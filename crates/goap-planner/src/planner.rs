//! The A* loop: expand, relax, reconstruct.

use tracing::debug;

use goap_state::State;

use crate::action::{Action, Goal};
use crate::frontier::Frontier;
use crate::PlanError;

/// Search tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlannerConfig {
    /// Cooperative bound on node expansions, checked at the top of the
    /// main loop; `None` searches until the frontier is exhausted.
    pub max_expansions: Option<usize>,
}

/// Best-first planner over a fixed action catalogue.
///
/// Catalogue order influences tie-breaking but not reachability; a
/// given planner is deterministic for identical inputs.
#[derive(Debug, Clone, Default)]
pub struct Planner {
    config: PlannerConfig,
}

impl Planner {
    pub fn new() -> Planner {
        Planner::default()
    }

    pub fn with_config(mut self, config: PlannerConfig) -> Planner {
        self.config = config;
        self
    }

    /// Finds a minimum-cost action sequence transforming `start` into a
    /// state that satisfies `goal`.
    pub fn plan<'a, A: Action>(
        &self,
        start: &State,
        goal: &State,
        actions: &'a [A],
    ) -> Result<Vec<&'a A>, PlanError> {
        debug!(actions = actions.len(), "searching for plan");

        let mut frontier = Frontier::acquire();
        let result = self.search(&mut frontier, start, goal, actions);
        frontier.release();

        match &result {
            Ok(steps) => debug!(steps = steps.len(), "plan found"),
            Err(err) => debug!(error = %err, "planning failed"),
        }
        result.map(|steps| steps.into_iter().map(|index| &actions[index]).collect())
    }

    /// Plans toward a goal's desired state.
    pub fn plan_toward<'a, A: Action, G: Goal>(
        &self,
        start: &State,
        goal: &G,
        actions: &'a [A],
    ) -> Result<Vec<&'a A>, PlanError> {
        self.plan(start, goal.desired_state(), actions)
    }

    fn search<A: Action>(
        &self,
        frontier: &mut Frontier,
        start: &State,
        goal: &State,
        actions: &[A],
    ) -> Result<Vec<usize>, PlanError> {
        let root = start.clone();
        let h = root.distance(goal);
        frontier.push(root, None, 0, 0.0, h);

        let mut expansions = 0usize;
        while let Some(current) = frontier.pop() {
            if let Some(max) = self.config.max_expansions {
                if expansions >= max {
                    return Err(PlanError::BudgetExhausted { expansions });
                }
            }
            expansions += 1;

            if frontier.node(current).state.matches(goal)? {
                return Ok(reconstruct(frontier, current));
            }

            for (index, action) in actions.iter().enumerate() {
                let (require, outcome) = action.simulate(&frontier.node(current).state);
                if !frontier.node(current).state.matches(&require)? {
                    continue;
                }

                let mut next = frontier.node(current).state.clone();
                next.apply(&outcome)?;
                let g = frontier.node(current).g + action.cost();

                match frontier.find(next.hash()) {
                    None => {
                        let h = next.distance(goal);
                        frontier.push(next, Some(current), index, g, h);
                    }
                    Some(existing) => {
                        let node = frontier.node(existing);
                        if !node.visited && g < node.g {
                            frontier.relax(existing, current, index, g);
                        }
                        // `next` drops here, returning its buffer to
                        // the state pool.
                    }
                }
            }
        }

        Err(PlanError::NoPlanFound)
    }
}

// Walk parent links back from the goal node, then reverse into
// start-to-goal order. The start node carries no action.
fn reconstruct(frontier: &Frontier, goal_node: u32) -> Vec<usize> {
    let mut steps = Vec::with_capacity(8);
    let mut cursor = Some(goal_node);
    while let Some(id) = cursor {
        let node = frontier.node(id);
        if node.parent.is_some() {
            steps.push(node.action);
        }
        cursor = node.parent;
    }
    steps.reverse();
    steps
}

/// Plans with the default configuration.
pub fn plan<'a, A: Action>(
    start: &State,
    goal: &State,
    actions: &'a [A],
) -> Result<Vec<&'a A>, PlanError> {
    Planner::new().plan(start, goal, actions)
}
