//! Opaque ID newtypes for netlist entities seen by the timing engine.
//!
//! [`CellId`] and [`NetId`] are thin `u32` wrappers addressing the design
//! database's cell and net tables. Ids are dense: a context with `n` nets
//! exposes exactly `NetId::from_raw(0)..NetId::from_raw(n)`.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Creates an ID from a table index.
            ///
            /// # Panics
            ///
            /// Panics if `index` does not fit in a `u32`. Tables are limited
            /// to `u32::MAX` entries.
            pub fn from_index(index: usize) -> Self {
                match u32::try_from(index) {
                    Ok(raw) => Self(raw),
                    Err(_) => panic!(
                        "{} index {index} exceeds the u32 table limit",
                        stringify!($name)
                    ),
                }
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }

            /// Returns the index into the owning table.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Opaque, copyable ID for a cell in the design.
    CellId
);

define_id!(
    /// Opaque, copyable ID for a net in the design.
    NetId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn index_roundtrip() {
        let id = NetId::from_index(42);
        assert_eq!(id.as_raw(), 42);
        assert_eq!(id.index(), 42);
        assert_eq!(CellId::from_raw(7).index(), 7);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    #[should_panic(expected = "exceeds the u32 table limit")]
    fn from_index_rejects_oversized_index() {
        NetId::from_index(u32::MAX as usize + 1);
    }

    #[test]
    fn ordering_follows_index() {
        assert!(NetId::from_raw(1) < NetId::from_raw(2));
    }

    #[test]
    fn hash_in_set() {
        let mut set = HashSet::new();
        set.insert(CellId::from_raw(1));
        set.insert(CellId::from_raw(2));
        set.insert(CellId::from_raw(1));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", NetId::from_raw(9)), "9");
    }
}
