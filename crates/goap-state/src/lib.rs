//! Rule-based world state for goal-oriented action planning.
//!
//! A [`State`] is an ordered set of packed `(fact, expression)` entries
//! with an incrementally maintained 32-bit hash. Entries are written in
//! a small textual grammar: `"hp"` (present), `"!hp"` (absent),
//! `"hp=10.5"`, `"hp+20"`, `"hp-5"`, `"hp>80"`, `"hp<50"`.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod rule;
pub mod state;

mod pool;

pub use rule::{Entry, Expr, Fact, Operator, ParseError};
pub use state::{State, StateError};
