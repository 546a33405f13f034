//! Rule lexicon: facts, operators, fixed-point expressions, and the
//! packed entries a [`State`](crate::State) is built from.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use thiserror::Error;

/// Largest encodable magnitude, in hundredths of a percent.
pub(crate) const VALUE_MAX: u32 = 10_000;

/// Errors produced while parsing a rule string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("rule is an empty string")]
    Empty,

    #[error("invalid rule '{0}'")]
    InvalidRule(String),

    #[error("invalid operator '{op}' in rule '{rule}'")]
    InvalidOperator { op: char, rule: String },

    #[error("invalid value '{value}' in rule '{rule}'")]
    InvalidValue { value: String, rule: String },
}

// ------------------------------------ Fact ------------------------------------

/// Interned world-state key.
///
/// Keys hash case-insensitively, so `hp` and `HP` are the same fact;
/// the display registry keeps the most recently interned spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fact(u32);

static DISPLAY: Lazy<RwLock<HashMap<u32, String>>> = Lazy::new(|| RwLock::new(HashMap::new()));

impl Fact {
    /// Interns a key, recording its spelling for display.
    pub fn of(key: &str) -> Fact {
        let fact = Fact(fnv1a_lower(key));
        if let Ok(mut display) = DISPLAY.write() {
            display.insert(fact.0, key.to_owned());
        }
        fact
    }

    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DISPLAY.read() {
            Ok(display) => match display.get(&self.0) {
                Some(name) => f.write_str(name),
                None => f.write_str("unknown"),
            },
            Err(_) => f.write_str("unknown"),
        }
    }
}

// FNV-1a over the ASCII-lowercased key bytes. Rule keys are restricted
// to `[a-zA-Z_]`, so per-byte lowercasing is exact.
fn fnv1a_lower(key: &str) -> u32 {
    let mut hash: u32 = 0x811C_9DC5;
    for byte in key.bytes() {
        hash ^= u32::from(byte.to_ascii_lowercase());
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

// ------------------------------------ Expression ------------------------------------

/// Rule operator, encoded in the top four bits of an [`Expr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equal,
    Increment,
    Decrement,
    Less,
    Greater,
}

impl Operator {
    fn bits(self) -> u32 {
        match self {
            Operator::Equal => 0,
            Operator::Increment => 1,
            Operator::Decrement => 2,
            Operator::Less => 3,
            Operator::Greater => 4,
        }
    }

    fn from_bits(bits: u32) -> Operator {
        match bits {
            1 => Operator::Increment,
            2 => Operator::Decrement,
            3 => Operator::Less,
            4 => Operator::Greater,
            _ => Operator::Equal,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operator::Equal => "=",
            Operator::Increment => "+",
            Operator::Decrement => "-",
            Operator::Less => "<",
            Operator::Greater => ">",
        })
    }
}

/// An operator plus a fixed-point magnitude in hundredths of a percent.
///
/// Layout: bits 28..32 hold the operator, bits 0..16 hold the value
/// (0..=10000, representing 0.00..100.00). Construction saturates
/// percentages outside [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expr(u32);

impl Expr {
    /// `= 0`: what an absent fact resolves to.
    pub const EMPTY: Expr = Expr(0);

    /// Builds an expression, saturating the percentage into [0, 100].
    pub fn new(op: Operator, percent: f32) -> Expr {
        let percent = percent.clamp(0.0, 100.0);
        Expr(op.bits() << 28 | (percent * 100.0) as u32)
    }

    pub(crate) fn from_value(op: Operator, value: u32) -> Expr {
        Expr(op.bits() << 28 | value.min(VALUE_MAX))
    }

    pub fn operator(self) -> Operator {
        Operator::from_bits(self.0 >> 28)
    }

    /// Magnitude in hundredths of a percent.
    pub fn value(self) -> u32 {
        self.0 & 0xFFFF
    }

    /// Magnitude as a percentage.
    pub fn percent(self) -> f32 {
        if self.value() >= VALUE_MAX {
            100.0
        } else {
            self.value() as f32 / 100.0
        }
    }

    pub(crate) fn bits(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:.2}", self.operator(), self.percent())
    }
}

// ------------------------------------ Packed entry ------------------------------------

/// Packed `(fact, expression)` pair: fact in the high 32 bits,
/// expression in the low 32.
///
/// [`Entry::hash`] is the entry's XOR contribution to the containing
/// state's hash; the mix keeps `(fact, expr)` distinguishable from
/// `(fact, expr')` when only the value changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry(u64);

impl Entry {
    pub fn new(fact: Fact, expr: Expr) -> Entry {
        Entry(u64::from(fact.id()) << 32 | u64::from(expr.bits()))
    }

    pub fn fact(self) -> Fact {
        Fact((self.0 >> 32) as u32)
    }

    pub fn expr(self) -> Expr {
        Expr(self.0 as u32)
    }

    pub fn hash(self) -> u32 {
        self.fact().id() ^ self.expr().bits().wrapping_mul(0x9E37_79B1).wrapping_add(0xB)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.fact(), self.expr())
    }
}

// ------------------------------------ Parser ------------------------------------

/// Parses a rule string into its interned fact and expression.
///
/// Accepted shapes are `key` (assignment to 100), `!key` (assignment
/// to 0), and `key OP value` with `OP` one of `= + - < >`. Keys match
/// `[a-zA-Z_]+`; values parse as IEEE-754 single precision and must be
/// non-negative.
pub fn parse(rule: &str) -> Result<(Fact, Expr), ParseError> {
    if rule.is_empty() {
        return Err(ParseError::Empty);
    }

    let bytes = rule.as_bytes();
    let start = usize::from(bytes[0] == b'!');
    if start == rule.len() {
        return Err(ParseError::InvalidRule(rule.to_owned()));
    }

    let mut end = start;
    while end < bytes.len() && (bytes[end].is_ascii_alphabetic() || bytes[end] == b'_') {
        end += 1;
    }
    if end == start {
        return Err(ParseError::InvalidRule(rule.to_owned()));
    }
    let key = &rule[start..end];

    if end == bytes.len() {
        let percent = if start == 1 { 0.0 } else { 100.0 };
        return Ok((Fact::of(key), Expr::new(Operator::Equal, percent)));
    }

    let op = match bytes[end] {
        b'=' => Operator::Equal,
        b'+' => Operator::Increment,
        b'-' => Operator::Decrement,
        b'<' => Operator::Less,
        b'>' => Operator::Greater,
        other => {
            return Err(ParseError::InvalidOperator {
                op: char::from(other),
                rule: rule.to_owned(),
            })
        }
    };

    let tail = &rule[end + 1..];
    let value: f32 = match tail.parse() {
        Ok(value) if (0.0..=VALUE_MAX as f32).contains(&value) => value,
        _ => {
            return Err(ParseError::InvalidValue {
                value: tail.to_owned(),
                rule: rule.to_owned(),
            })
        }
    };

    Ok((Fact::of(key), Expr::new(op, value)))
}
