//! Session-lifetime record storage for the front end.
//!
//! Every canonical record the front end hands out (directories, files,
//! identifiers) is allocated into an [`Arena`] and named by a small, `Copy`
//! handle. Handles are dense `u32` indices, so comparing two handles is the
//! same as comparing the identity of the records they name.
//!
//! Records are never freed one at a time. They live exactly as long as the
//! arena that owns them and are dropped together when the owning component
//! is torn down.
//!
//! A [`SideTable`] attaches extra per-handle data to records owned by some
//! other arena (or to any dense key space, such as interned spellings)
//! without touching the records themselves.

mod arena;
mod side;

pub use arena::Arena;
pub use side::SideTable;

/// Trait for types that can be used as arena handles.
pub trait EntityRef: Copy + Eq {
    /// Create a new handle from a dense index.
    fn new(index: usize) -> Self;
    /// Get the dense index of the handle.
    fn index(self) -> usize;
}

/// Implements the `EntityRef` trait and utility methods for a new handle type.
///
/// Optionally, also implements `Display` and `Debug` with a custom prefix.
///
/// Generated methods include `new`, `index`, `from_u32` and `as_u32`.
#[macro_export]
macro_rules! entity_impl {
    ($entity:ident, $display_prefix:expr) => {
        $crate::entity_impl!($entity);

        impl ::core::fmt::Debug for $entity {
            fn fmt(&self, f: &mut ::core::fmt::Formatter) -> ::core::fmt::Result {
                (self as &dyn ::core::fmt::Display).fmt(f)
            }
        }

        impl ::core::fmt::Display for $entity {
            fn fmt(&self, f: &mut ::core::fmt::Formatter) -> ::core::fmt::Result {
                write!(f, concat!($display_prefix, "{}"), self.0)
            }
        }
    };

    ($entity:ident) => {
        impl $crate::EntityRef for $entity {
            #[inline]
            fn new(index: usize) -> Self {
                debug_assert!(index < (u32::MAX as usize));
                $entity(index as u32)
            }

            #[inline]
            fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl $entity {
            /// Create a handle from its raw `u32` index.
            #[inline]
            #[allow(dead_code, unreachable_pub, reason = "macro-generated code")]
            pub fn from_u32(x: u32) -> Self {
                debug_assert!(x < u32::MAX);
                $entity(x)
            }

            /// Return the raw `u32` index of this handle.
            #[inline]
            #[allow(dead_code, unreachable_pub, reason = "macro-generated code")]
            pub fn as_u32(self) -> u32 {
                self.0
            }
        }
    };
}
