//! Subject keys for binding storage and lookup.

use std::any::TypeId;

/// Key for binding storage and lookup.
///
/// A key identifies the subject of an injectable member: the trait object or
/// concrete type the member declares. The `TypeId` provides fast lookup while
/// the captured type name serves diagnostics.
///
/// Equality and hashing use the `TypeId` only; the name is never compared.
///
/// # Examples
///
/// ```rust
/// use wirework::Key;
///
/// trait Repository: Send + Sync {}
///
/// let concrete = Key::of::<u32>();
/// assert_eq!(concrete.display_name(), "u32");
///
/// // Trait object subjects have keys too
/// let subject = Key::of::<dyn Repository>();
/// assert!(subject.display_name().contains("Repository"));
/// assert_ne!(concrete, subject);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Key {
    id: TypeId,
    name: &'static str,
}

impl Key {
    /// Builds the key for a subject type.
    ///
    /// Works for concrete types and for `dyn Trait` object types alike, since
    /// trait object types carry their own `TypeId`.
    #[inline(always)]
    pub fn of<S: ?Sized + 'static>() -> Key {
        Key {
            id: TypeId::of::<S>(),
            name: std::any::type_name::<S>(),
        }
    }

    /// Get the subject type name for display
    ///
    /// Returns the `std::any::type_name` result captured when the key was
    /// built, for error messages and observer events.
    #[inline]
    pub fn display_name(&self) -> &'static str {
        self.name
    }
}

// Hot path: TypeId comparison only (the name is display-only)
impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
