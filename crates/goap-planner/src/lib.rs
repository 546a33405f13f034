//! Best-first (A*) action planning over `goap-state` rule states.
//!
//! Given a start state, a goal state and a catalogue of candidate
//! actions, [`plan`] returns a minimum-cost ordered action sequence
//! whose effects transform the start into a state that satisfies the
//! goal, or reports that no such sequence exists.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod action;
pub mod planner;

mod frontier;

pub use action::{Action, Goal};
pub use planner::{plan, Planner, PlannerConfig};

use thiserror::Error;

/// Errors surfaced by a planning run.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("no plan could be found to reach the goal")]
    NoPlanFound,

    #[error("search budget exhausted after {expansions} expansions")]
    BudgetExhausted { expansions: usize },

    #[error(transparent)]
    State(#[from] goap_state::StateError),
}
