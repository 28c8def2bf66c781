//! String interning.
//!
//! `StringRegistry` provides a bijective mapping between source text and a
//! stable 64-bit [`StringId`]. Registration is idempotent: registering the
//! same string twice returns the same id. Ids are never recycled, so a
//! `StringId` obtained from one registry remains meaningful for the whole
//! compilation.

use std::num::NonZeroU64;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// A canonical, interned reference to a registered string.
///
/// `0` is never produced by [`StringRegistry::register`] — the wrapped
/// `NonZeroU64` makes "invalid id" unrepresentable rather than a sentinel a
/// caller might forget to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringId(NonZeroU64);

impl StringId {
    #[allow(clippy::expect_used)]
    fn from_index(index: usize) -> Self {
        // index 0 maps to id 1 so that 0 stays unrepresentable.
        let raw = index as u64 + 1;
        Self(NonZeroU64::new(raw).unwrap_or_else(|| {
            // index + 1 is always >= 1; unreachable in practice, but keep the
            // type honest rather than reaching for `unwrap` on the hot path.
            NonZeroU64::new(1).expect("1 is non-zero")
        }))
    }

    fn to_index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

#[derive(Default)]
struct Tables {
    strings: Vec<Arc<str>>,
    ids: FxHashMap<Arc<str>, StringId>,
}

/// Bijective string interner. Cheap to clone (wraps an `Arc`-free `RwLock`
/// behind a reference) — callers are expected to hold one registry per
/// compilation and pass `&StringRegistry` around.
#[derive(Default)]
pub struct StringRegistry {
    tables: RwLock<Tables>,
}

impl StringRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `s`, returning its canonical id. Idempotent: a second
    /// registration of an equal string returns the same id.
    pub fn register(&self, s: &str) -> StringId {
        if let Some(id) = self.tables.read().ids.get(s) {
            return *id;
        }

        let mut tables = self.tables.write();
        // Re-check under the write lock: another writer may have beaten us
        // between the read above and acquiring the write lock.
        if let Some(id) = tables.ids.get(s) {
            return *id;
        }

        let interned: Arc<str> = Arc::from(s);
        let id = StringId::from_index(tables.strings.len());
        tables.strings.push(interned.clone());
        tables.ids.insert(interned, id);
        id
    }

    /// Register every string in `items`, preserving order. Not atomic as a
    /// whole (duplicate registrations across the batch are tolerated, per
    /// the spec), but each individual registration is.
    pub fn register_many<'a, I>(&self, items: I) -> Vec<StringId>
    where
        I: IntoIterator<Item = &'a str>,
    {
        items.into_iter().map(|s| self.register(s)).collect()
    }

    /// Resolve an id back to its string. Total for any id this registry
    /// produced.
    #[allow(clippy::expect_used)]
    pub fn at(&self, id: StringId) -> Arc<str> {
        let tables = self.tables.read();
        tables
            .strings
            .get(id.to_index())
            .cloned()
            .expect("StringId must have been produced by this registry")
    }

    pub fn len(&self) -> usize {
        self.tables.read().strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_is_idempotent() {
        let reg = StringRegistry::new();
        let a = reg.register("foo");
        let b = reg.register("foo");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_strings_get_distinct_ids() {
        let reg = StringRegistry::new();
        let a = reg.register("foo");
        let b = reg.register("bar");
        assert_ne!(a, b);
    }

    #[test]
    fn at_round_trips() {
        let reg = StringRegistry::new();
        let id = reg.register("hello");
        assert_eq!(&*reg.at(id), "hello");
    }

    #[test]
    fn register_many_preserves_order() {
        let reg = StringRegistry::new();
        let ids = reg.register_many(["a", "b", "a", "c"]);
        assert_eq!(ids[0], ids[2]);
        assert_ne!(ids[0], ids[1]);
        assert_eq!(&*reg.at(ids[3]), "c");
    }
}
