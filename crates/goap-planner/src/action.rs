use std::borrow::Cow;

use goap_state::{State, StateError};

/// A candidate step the planner may schedule.
///
/// Implementations own their precondition and outcome states (or build
/// them from the state under inspection); the planner uses both
/// read-only and expects identical results for identical state hashes.
pub trait Action {
    /// The precondition pattern and the predicted outcome for
    /// `current`.
    fn simulate(&self, current: &State) -> (Cow<'_, State>, Cow<'_, State>);

    /// Non-negative cost of performing this action.
    fn cost(&self) -> f32;

    /// Display name for debugging and tests.
    fn name(&self) -> &str;
}

/// A desired world condition with a relative importance.
pub trait Goal {
    /// The state that represents completion of the goal.
    fn desired_state(&self) -> &State;

    /// Higher values indicate more important goals.
    fn priority(&self) -> f32 {
        1.0
    }

    /// Whether `state` already satisfies the goal.
    fn is_achieved(&self, state: &State) -> Result<bool, StateError> {
        state.matches(self.desired_state())
    }
}
