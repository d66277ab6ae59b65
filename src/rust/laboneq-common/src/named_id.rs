// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use string_interner::symbol::SymbolU32;
use string_interner::{DefaultBackend, StringInterner};

/// Interned name of an experiment object (signal, device, oscillator, ...).
///
/// Comparing and hashing a [`NamedId`] is as cheap as for an integer. The
/// original string can be recovered from the [`NamedIdStore`] that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NamedId {
    uid: SymbolU32,
}

/// A store for named IDs
#[derive(Default)]
pub struct NamedIdStore {
    interner: StringInterner<DefaultBackend>,
}

impl NamedIdStore {
    pub fn new() -> Self {
        NamedIdStore {
            interner: StringInterner::new(),
        }
    }

    /// Return the ID of a name that was interned before, otherwise None.
    pub fn get(&self, name: impl AsRef<str>) -> Option<NamedId> {
        self.interner.get(name).map(|uid| NamedId { uid })
    }

    /// Return the ID of a name, interning the name if necessary.
    pub fn get_or_insert(&mut self, name: impl AsRef<str>) -> NamedId {
        NamedId {
            uid: self.interner.get_or_intern(name),
        }
    }

    pub fn resolve(&self, uid: impl Into<NamedId>) -> Option<&str> {
        self.interner.resolve(uid.into().uid)
    }

    /// Name of the ID for use in messages.
    ///
    /// IDs from a foreign store are rendered with their debug representation
    /// instead of failing, since the message is usually already part of an error.
    pub fn display_name(&self, uid: impl Into<NamedId>) -> String {
        let uid = uid.into();
        match self.resolve(uid) {
            Some(name) => name.to_string(),
            None => format!("{uid:?}"),
        }
    }

    pub fn len(&self) -> usize {
        self.interner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interner.is_empty()
    }
}

impl std::fmt::Debug for NamedIdStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedIdStore")
            .field("len", &self.len())
            .finish()
    }
}

/// Declare a typed UID wrapping a [`NamedId`].
#[macro_export]
macro_rules! named_uid {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub $crate::named_id::NamedId);

        impl From<$name> for $crate::named_id::NamedId {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl From<$crate::named_id::NamedId> for $name {
            fn from(value: $crate::named_id::NamedId) -> Self {
                $name(value)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    named_uid!(TestUid);

    #[test]
    fn test_interning_is_stable() {
        let mut store = NamedIdStore::new();
        let q0 = store.get_or_insert("q0/drive");
        assert_eq!(q0, store.get_or_insert("q0/drive"));
        let q1 = store.get_or_insert("q1/drive");
        assert_ne!(q0, q1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("q1/drive"), Some(q1));
        assert_eq!(store.get("q2/drive"), None);
    }

    #[test]
    fn test_typed_uid_resolves_through_store() {
        let mut store = NamedIdStore::new();
        let uid = TestUid(store.get_or_insert("hdawg_0"));
        assert_eq!(store.resolve(uid), Some("hdawg_0"));
        assert_eq!(store.display_name(uid), "hdawg_0");

        let foreign = NamedIdStore::new();
        assert_eq!(foreign.resolve(uid), None);
        assert!(foreign.display_name(uid).starts_with("NamedId"));
    }
}
