//! Selection descriptors.
//!
//! A [`Selection`] describes what to retrieve or delete from the
//! currently targeted storage: which key space (primary key or a named
//! index), an optional exact value or range, an optional result cap and
//! the traversal order. The query engine turns it into one of four
//! retrieval strategies; the descriptor itself stays engine-agnostic.

use stashdb_engine::Scalar;
use std::ops::Bound;

/// Key space a selection targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum KeySpace {
    /// The primary-key space (an absent key or the literal `"id"`).
    #[default]
    Primary,
    /// A named secondary index of the targeted storage.
    Index(String),
}

/// Traversal order of a selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Order {
    /// Ascending by targeted key; the engine's natural order.
    #[default]
    Asc,
    /// Descending by targeted key.
    Desc,
}

/// Value constraint of a selection.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueSelector {
    /// Exact match on one key.
    Exact(Scalar),
    /// Match within a bounded or unbounded range.
    Range {
        /// Lower bound.
        lower: Bound<Scalar>,
        /// Upper bound.
        upper: Bound<Scalar>,
    },
}

/// A declarative selection descriptor.
///
/// The default selects everything from the primary-key space in
/// ascending order:
///
/// ```rust
/// use stashdb_core::Selection;
///
/// let newest_three = Selection::all().count(3).desc();
/// let by_name = Selection::index("tasksName").value("laundry");
/// let one = Selection::by_id(7);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// Targeted key space.
    pub key: KeySpace,
    /// Value constraint; `None` matches every record.
    pub value: Option<ValueSelector>,
    /// Cap on the number of results.
    pub count: Option<usize>,
    /// Traversal order.
    pub order: Order,
}

impl Selection {
    /// Selects every record of the targeted storage by primary key.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Selects the single record with the given primary key.
    #[must_use]
    pub fn by_id(id: u64) -> Self {
        Self {
            value: Some(ValueSelector::Exact(Scalar::from(id))),
            ..Self::default()
        }
    }

    /// Targets a named index of the current storage.
    #[must_use]
    pub fn index(name: impl Into<String>) -> Self {
        Self {
            key: KeySpace::Index(name.into()),
            ..Self::default()
        }
    }

    /// Constrains the selection to an exact key.
    #[must_use]
    pub fn value(mut self, value: impl Into<Scalar>) -> Self {
        self.value = Some(ValueSelector::Exact(value.into()));
        self
    }

    /// Constrains the selection to a key range.
    #[must_use]
    pub fn range(mut self, lower: Bound<Scalar>, upper: Bound<Scalar>) -> Self {
        self.value = Some(ValueSelector::Range { lower, upper });
        self
    }

    /// Constrains the selection to keys at or above `lower`.
    #[must_use]
    pub fn at_least(self, lower: impl Into<Scalar>) -> Self {
        self.range(Bound::Included(lower.into()), Bound::Unbounded)
    }

    /// Constrains the selection to keys at or below `upper`.
    #[must_use]
    pub fn at_most(self, upper: impl Into<Scalar>) -> Self {
        self.range(Bound::Unbounded, Bound::Included(upper.into()))
    }

    /// Constrains the selection to keys between the bounds, inclusive.
    #[must_use]
    pub fn between(self, lower: impl Into<Scalar>, upper: impl Into<Scalar>) -> Self {
        self.range(
            Bound::Included(lower.into()),
            Bound::Included(upper.into()),
        )
    }

    /// Caps the number of results.
    #[must_use]
    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Requests descending traversal.
    #[must_use]
    pub fn desc(mut self) -> Self {
        self.order = Order::Desc;
        self
    }

    /// Requests ascending traversal (the default).
    #[must_use]
    pub fn asc(mut self) -> Self {
        self.order = Order::Asc;
        self
    }
}
