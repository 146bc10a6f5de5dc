//! Ordering constraints.
//!
//! A constraint is a plain value: a direction and a target identity. It is
//! accumulated on a notification while the owning contributor initializes
//! and is only interpreted later, by a call-graph generator.

use ordo_core::ContributorKey;
use std::fmt;

/// Direction of an ordering constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// The notification runs before every notification matching the target.
    Before,
    /// The notification runs after every notification matching the target.
    After,
}

impl ConstraintKind {
    /// Returns the lowercase name of the direction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

/// A single ordering requirement attached to a notification.
///
/// # Example
///
/// ```
/// use ordo_core::stages;
/// use ordo_pipeline::{Constraint, ConstraintKind};
///
/// let c = Constraint::after::<stages::Begin>();
/// assert_eq!(c.kind, ConstraintKind::After);
/// assert_eq!(c.to_string(), "after Begin");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Constraint {
    /// Direction of the constraint.
    pub kind: ConstraintKind,
    /// The contributor or stage marker the constraint refers to.
    pub target: ContributorKey,
}

impl Constraint {
    /// Creates a constraint from its parts.
    #[must_use]
    pub const fn new(kind: ConstraintKind, target: ContributorKey) -> Self {
        Self { kind, target }
    }

    /// Creates an "after `T`" constraint.
    #[must_use]
    pub fn after<T: ?Sized + 'static>() -> Self {
        Self::new(ConstraintKind::After, ContributorKey::of::<T>())
    }

    /// Creates a "before `T`" constraint.
    #[must_use]
    pub fn before<T: ?Sized + 'static>() -> Self {
        Self::new(ConstraintKind::Before, ContributorKey::of::<T>())
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.as_str(), self.target)
    }
}
