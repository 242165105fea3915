//! Property-name interning.
//!
//! Documents with many objects of the same shape repeat the same property
//! names. A [`NameTable`] lets the reader hand out one shared `Arc<str>` per
//! distinct name instead of allocating a fresh one for every occurrence.

use alloc::sync::Arc;
use std::collections::HashSet;

/// Lookup of previously interned property names.
///
/// Returning `None` makes the reader allocate a fresh name.
pub trait NameTable: Send + Sync {
    fn get(&self, key: &str) -> Option<Arc<str>>;
}

/// A [`NameTable`] filled up front with the names a consumer expects.
#[derive(Debug, Default, Clone)]
pub struct DefaultNameTable {
    entries: HashSet<Arc<str>>,
}

impl DefaultNameTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `key`, returning the shared instance.
    pub fn add(&mut self, key: &str) -> Arc<str> {
        if let Some(existing) = self.entries.get(key) {
            return existing.clone();
        }
        let name: Arc<str> = Arc::from(key);
        self.entries.insert(name.clone());
        name
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl NameTable for DefaultNameTable {
    fn get(&self, key: &str) -> Option<Arc<str>> {
        self.entries.get(key).cloned()
    }
}

impl<'a> FromIterator<&'a str> for DefaultNameTable {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        let mut table = Self::new();
        for key in iter {
            table.add(key);
        }
        table
    }
}
