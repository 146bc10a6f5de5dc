//! Type identities used as ordering targets.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A stable identity token for a contributor kind or a stage marker.
///
/// Keys are derived from a Rust type. Two keys are equal exactly when they
/// were created from the same type, so a key can name a concrete contributor
/// or an abstract marker from [`stages`](crate::stages) without either side
/// knowing about the other.
///
/// # Example
///
/// ```
/// use ordo_core::{ContributorKey, stages};
///
/// let begin = ContributorKey::of::<stages::Begin>();
/// assert_eq!(begin, ContributorKey::of::<stages::Begin>());
/// assert_ne!(begin, ContributorKey::of::<stages::End>());
/// assert_eq!(begin.name(), "Begin");
/// ```
#[derive(Clone, Copy)]
pub struct ContributorKey {
    type_id: TypeId,
    type_name: &'static str,
}

impl ContributorKey {
    /// Creates the key for type `T`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Returns the fully qualified type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the short type name, without module path or generic arguments.
    #[must_use]
    pub fn name(&self) -> &'static str {
        let base = self
            .type_name
            .split_once('<')
            .map_or(self.type_name, |(head, _)| head);
        base.rsplit("::").next().unwrap_or(base)
    }

    /// Returns the underlying [`TypeId`].
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }
}

impl PartialEq for ContributorKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ContributorKey {}

impl Hash for ContributorKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ContributorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContributorKey").field(&self.type_name).finish()
    }
}

impl fmt::Display for ContributorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
