//! Orderable key values and key ranges.
//!
//! Index keys and selection bounds share one scalar domain: booleans,
//! integers, floats and text. The ordering is total (floats order via
//! `f64::total_cmp`) so keys can live in a `BTreeMap` and range scans
//! behave the same on every engine.

use crate::record::RecordId;
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::ops::Bound;

/// A scalar key value extracted from a record field.
///
/// Cross-type ordering is fixed: booleans sort below numbers, numbers
/// below text. Integers and floats compare numerically; a numeric tie
/// between the two variants is broken by variant so that the order stays
/// consistent with equality.
#[derive(Debug, Clone)]
pub enum Scalar {
    /// Boolean key.
    Bool(bool),
    /// Signed integer key.
    Int(i64),
    /// Floating-point key.
    Float(f64),
    /// Text key.
    Text(String),
}

impl Scalar {
    /// Extracts a scalar from a JSON value, if it is scalar-shaped.
    ///
    /// Objects, arrays and null have no key interpretation and yield
    /// `None`; records holding such values in an indexed field are
    /// simply not indexed.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self::Int(i))
                } else {
                    n.as_f64().map(Self::Float)
                }
            }
            Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    /// Interprets this scalar as a primary key.
    ///
    /// Only non-negative integers name a primary key.
    #[must_use]
    pub fn as_record_id(&self) -> Option<RecordId> {
        match self {
            Self::Int(i) if *i >= 0 => Some(RecordId::new(*i as u64)),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Int(_) => 1,
            Self::Float(_) => 2,
            Self::Text(_) => 3,
        }
    }
}

impl Ord for Scalar {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Int(a), Self::Float(b)) => (*a as f64).total_cmp(b).then(Ordering::Less),
            (Self::Float(a), Self::Int(b)) => a.total_cmp(&(*b as f64)).then(Ordering::Greater),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Scalar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scalar {}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u64> for Scalar {
    fn from(i: u64) -> Self {
        if let Ok(v) = i64::try_from(i) {
            Self::Int(v)
        } else {
            Self::Float(i as f64)
        }
    }
}

impl From<f64> for Scalar {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<RecordId> for Scalar {
    fn from(id: RecordId) -> Self {
        Self::from(id.as_u64())
    }
}

/// A bounded or unbounded range over scalar keys.
#[derive(Debug, Clone)]
pub struct KeyRange {
    /// Lower bound.
    pub lower: Bound<Scalar>,
    /// Upper bound.
    pub upper: Bound<Scalar>,
}

impl KeyRange {
    /// The full, unbounded range.
    #[must_use]
    pub fn all() -> Self {
        Self {
            lower: Bound::Unbounded,
            upper: Bound::Unbounded,
        }
    }

    /// An exact-match range over a single key.
    #[must_use]
    pub fn only(key: Scalar) -> Self {
        Self {
            lower: Bound::Included(key.clone()),
            upper: Bound::Included(key),
        }
    }

    /// Creates a range from explicit bounds.
    #[must_use]
    pub fn new(lower: Bound<Scalar>, upper: Bound<Scalar>) -> Self {
        Self { lower, upper }
    }

    /// Whether this range can match any key at all.
    ///
    /// `BTreeMap::range` panics on inverted bounds, so scans check this
    /// first and short-circuit to an empty result.
    #[must_use]
    pub fn is_satisfiable(&self) -> bool {
        bounds_satisfiable(&self.lower, &self.upper)
    }
}

impl Default for KeyRange {
    fn default() -> Self {
        Self::all()
    }
}

/// A bounded or unbounded range over primary keys.
#[derive(Debug, Clone)]
pub struct IdRange {
    /// Lower bound.
    pub lower: Bound<RecordId>,
    /// Upper bound.
    pub upper: Bound<RecordId>,
}

impl IdRange {
    /// The full, unbounded range.
    #[must_use]
    pub fn all() -> Self {
        Self {
            lower: Bound::Unbounded,
            upper: Bound::Unbounded,
        }
    }

    /// An exact-match range over a single primary key.
    #[must_use]
    pub fn only(id: RecordId) -> Self {
        Self {
            lower: Bound::Included(id),
            upper: Bound::Included(id),
        }
    }

    /// Creates a range from explicit bounds.
    #[must_use]
    pub fn new(lower: Bound<RecordId>, upper: Bound<RecordId>) -> Self {
        Self { lower, upper }
    }

    /// Whether this range can match any key at all.
    #[must_use]
    pub fn is_satisfiable(&self) -> bool {
        bounds_satisfiable(&self.lower, &self.upper)
    }
}

impl Default for IdRange {
    fn default() -> Self {
        Self::all()
    }
}

fn bounds_satisfiable<T: Ord>(lower: &Bound<T>, upper: &Bound<T>) -> bool {
    match (lower, upper) {
        (Bound::Unbounded, _) | (_, Bound::Unbounded) => true,
        (Bound::Included(a), Bound::Included(b)) => a <= b,
        (Bound::Included(a), Bound::Excluded(b))
        | (Bound::Excluded(a), Bound::Included(b))
        | (Bound::Excluded(a), Bound::Excluded(b)) => a < b,
    }
}
