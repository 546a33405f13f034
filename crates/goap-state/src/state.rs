//! Ordered entry container with incremental hashing and the
//! match/apply/distance semantics the planner searches over.

use std::fmt;

use thiserror::Error;

use crate::pool;
use crate::rule::{self, Entry, Expr, Fact, Operator, ParseError};

/// Entry counts at or below this use a linear scan; larger states use
/// binary search over the sorted entries.
const LINEAR_SCAN_MAX: usize = 8;

/// Errors produced while matching or applying states.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// The state being matched against carries an unresolved entry.
    #[error("cannot satisfy '{rule}', invalid state '{found}'")]
    Unresolved { rule: String, found: String },

    /// A pattern entry carries an operator other than `=`, `<`, `>`.
    #[error("cannot satisfy '{rule}', invalid operator '{op}'")]
    InvalidPattern { rule: String, op: Operator },

    /// The state being mutated carries an unresolved entry.
    #[error("cannot apply '{rule}', invalid state '{found}'")]
    UnresolvedTarget { rule: String, found: String },

    /// An effect entry carries an operator other than `=`, `+`, `-`.
    #[error("cannot apply '{rule}', invalid predict operator '{op}'")]
    InvalidEffect { rule: String, op: Operator },
}

/// An ordered set of packed entries with an incrementally maintained
/// 32-bit hash.
///
/// Invariants: at most one entry per fact; entries sorted ascending by
/// fact id so matching and distance run as linear merges; the cached
/// hash equals the XOR of all entry hashes and is updated on every
/// store and delete without a rescan.
///
/// Entry buffers come from a process-wide pool: `Clone` acquires a
/// buffer and `Drop` returns it.
pub struct State {
    entries: Vec<Entry>,
    hash: u32,
}

impl State {
    /// Creates an empty state backed by a pooled buffer.
    pub fn new() -> State {
        State {
            entries: pool::acquire(0),
            hash: 0,
        }
    }

    /// Creates a state from rule strings.
    pub fn of<'a, I>(rules: I) -> Result<State, ParseError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut state = State::new();
        for rule in rules {
            state.add(rule)?;
        }
        Ok(state)
    }

    /// Parses and stores a rule, overwriting any entry for the same fact.
    pub fn add(&mut self, rule: &str) -> Result<(), ParseError> {
        let (fact, expr) = rule::parse(rule)?;
        self.store(fact, expr);
        Ok(())
    }

    /// Parses a rule and removes its fact if present.
    pub fn del(&mut self, rule: &str) -> Result<(), ParseError> {
        let (fact, _) = rule::parse(rule)?;
        if let Ok(index) = self.find(fact) {
            self.hash ^= self.entries[index].hash();
            self.entries.remove(index);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached hash of the whole state; order independent, O(1).
    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// True when both states hash identically. Hash collisions are
    /// tolerated by design: the planner keys its frontier on this hash.
    pub fn equals(&self, other: &State) -> bool {
        self.entries.len() == other.entries.len() && self.hash == other.hash
    }

    /// Does every entry of `pattern` hold in this state?
    ///
    /// Absent facts resolve to `= 0`. Pattern entries may compare with
    /// `=`, `<` or `>`; this state must be fully resolved (`=` only).
    /// Returns on the first entry that does not hold.
    pub fn matches(&self, pattern: &State) -> Result<bool, StateError> {
        let mut cursor = 0;
        for want in &pattern.entries {
            let found = self.resolve(want.fact(), &mut cursor);
            if found.operator() != Operator::Equal {
                return Err(StateError::Unresolved {
                    rule: want.to_string(),
                    found: found.to_string(),
                });
            }

            let held = match want.expr().operator() {
                Operator::Equal => found.value() == want.expr().value(),
                Operator::Less => found.value() < want.expr().value(),
                Operator::Greater => found.value() > want.expr().value(),
                op @ (Operator::Increment | Operator::Decrement) => {
                    return Err(StateError::InvalidPattern {
                        rule: want.to_string(),
                        op,
                    })
                }
            };

            if !held {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Applies every effect entry to this state in place.
    ///
    /// `=` overwrites; `+` and `-` shift the current value, saturating
    /// into [0, 100]. Afterwards the state is still canonically ordered
    /// and its hash matches its contents.
    pub fn apply(&mut self, effects: &State) -> Result<(), StateError> {
        for effect in &effects.entries {
            let fact = effect.fact();
            let expr = effect.expr();

            let current = self.load(fact);
            if current.operator() != Operator::Equal {
                return Err(StateError::UnresolvedTarget {
                    rule: effect.to_string(),
                    found: current.to_string(),
                });
            }

            match expr.operator() {
                Operator::Equal => self.store(fact, expr),
                Operator::Increment => self.store(
                    fact,
                    Expr::from_value(Operator::Equal, current.value().saturating_add(expr.value())),
                ),
                Operator::Decrement => self.store(
                    fact,
                    Expr::from_value(Operator::Equal, current.value().saturating_sub(expr.value())),
                ),
                op @ (Operator::Less | Operator::Greater) => {
                    return Err(StateError::InvalidEffect {
                        rule: effect.to_string(),
                        op,
                    })
                }
            }
        }
        Ok(())
    }

    /// Estimated distance to `goal`, as a linear merge over both sorted
    /// entry arrays: a fact present on both sides contributes the
    /// absolute percentage difference, a fact present on exactly one
    /// side contributes a flat 100.
    ///
    /// The estimate can exceed the true remaining cost when a single
    /// action moves a value by more than one step, so the search it
    /// guides is not guaranteed optimal.
    pub fn distance(&self, goal: &State) -> f32 {
        let mut diff = 0.0;
        let (mut i, mut j) = (0, 0);
        while i < self.entries.len() && j < goal.entries.len() {
            let ours = self.entries[i];
            let theirs = goal.entries[j];
            if ours.fact() == theirs.fact() {
                diff += (ours.expr().percent() - theirs.expr().percent()).abs();
                i += 1;
                j += 1;
            } else {
                diff += 100.0;
                if ours.fact() < theirs.fact() {
                    i += 1;
                } else {
                    j += 1;
                }
            }
        }
        diff + 100.0 * (self.entries.len() - i + goal.entries.len() - j) as f32
    }

    // Find-or-insert keeping the entries sorted and the hash current.
    fn store(&mut self, fact: Fact, expr: Expr) {
        let entry = Entry::new(fact, expr);
        match self.find(fact) {
            Ok(index) => {
                self.hash ^= self.entries[index].hash();
                self.entries[index] = entry;
            }
            Err(index) => self.entries.insert(index, entry),
        }
        self.hash ^= entry.hash();
    }

    /// Index of the entry holding `fact`, or the insertion point that
    /// keeps the entries sorted.
    fn find(&self, fact: Fact) -> Result<usize, usize> {
        if self.entries.len() <= LINEAR_SCAN_MAX {
            for (index, entry) in self.entries.iter().enumerate() {
                if entry.fact() == fact {
                    return Ok(index);
                }
                if entry.fact() > fact {
                    return Err(index);
                }
            }
            return Err(self.entries.len());
        }
        self.entries.binary_search_by(|entry| entry.fact().cmp(&fact))
    }

    fn load(&self, fact: Fact) -> Expr {
        match self.find(fact) {
            Ok(index) => self.entries[index].expr(),
            Err(_) => Expr::EMPTY,
        }
    }

    // Merge-walk lookup for `matches`: pattern facts arrive ascending,
    // so the scan position only ever advances.
    fn resolve(&self, fact: Fact, cursor: &mut usize) -> Expr {
        while *cursor < self.entries.len() && self.entries[*cursor].fact() < fact {
            *cursor += 1;
        }
        match self.entries.get(*cursor) {
            Some(entry) if entry.fact() == fact => entry.expr(),
            _ => Expr::EMPTY,
        }
    }
}

impl Clone for State {
    fn clone(&self) -> State {
        let mut entries = pool::acquire(self.entries.len());
        entries.extend_from_slice(&self.entries);
        State {
            entries,
            hash: self.hash,
        }
    }
}

impl Drop for State {
    fn drop(&mut self) {
        pool::release(std::mem::take(&mut self.entries));
    }
}

impl Default for State {
    fn default() -> State {
        State::new()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rules: Vec<String> = self.entries.iter().map(Entry::to_string).collect();
        rules.sort();
        write!(f, "{{{}}}", rules.join(", "))
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::State;

    /// A state serializes as its canonical rule strings, sorted, and
    /// deserializes by re-parsing them.
    impl Serialize for State {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut rules: Vec<String> = self.entries.iter().map(ToString::to_string).collect();
            rules.sort();
            rules.serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for State {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<State, D::Error> {
            let rules = Vec::<String>::deserialize(deserializer)?;
            let mut state = State::new();
            for rule in &rules {
                state.add(rule).map_err(D::Error::custom)?;
            }
            Ok(state)
        }
    }
}
