use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

use listview::SavedScroll;

/// Keys that identify a screen in a [`ScrollMemory`].
///
/// With `std` the memory is a hash map; without it a B-tree, so keys only need ordering.
#[cfg(feature = "std")]
pub trait MemoryKey: core::hash::Hash + Eq {}
#[cfg(feature = "std")]
impl<T: core::hash::Hash + Eq> MemoryKey for T {}

#[cfg(not(feature = "std"))]
pub trait MemoryKey: Ord {}
#[cfg(not(feature = "std"))]
impl<T: Ord> MemoryKey for T {}

#[cfg(feature = "std")]
type EntryMap<K> = HashMap<K, Entry>;
#[cfg(not(feature = "std"))]
type EntryMap<K> = BTreeMap<K, Entry>;

#[derive(Clone, Copy, Debug)]
struct Entry {
    scroll: SavedScroll,
    version: u64,
    persisted: bool,
}

/// Scroll positions that outlive the list views they came from.
///
/// A screen records its anchor on every scroll change and reads it back through
/// [`ScrollMemory::restore`] when it is recreated, typically to feed
/// `ListViewOptions::initial_scroll`. Recording the same anchor twice is a no-op.
///
/// Whoever owns the memory can write it to durable storage with
/// [`ScrollMemory::take_unpersisted`], which hands out every entry that changed since it was
/// last taken, exactly once.
#[derive(Debug)]
pub struct ScrollMemory<K> {
    entries: EntryMap<K>,
    version: u64,
}

impl<K: MemoryKey> Default for ScrollMemory<K> {
    fn default() -> Self {
        Self {
            entries: EntryMap::new(),
            version: 0,
        }
    }
}

impl<K: MemoryKey> ScrollMemory<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from positions loaded from durable storage. They count as persisted.
    pub fn from_persisted(entries: impl IntoIterator<Item = (K, SavedScroll)>) -> Self {
        let mut memory = Self::new();
        for (key, scroll) in entries {
            memory.entries.insert(
                key,
                Entry {
                    scroll,
                    version: 0,
                    persisted: true,
                },
            );
        }
        memory
    }

    pub fn restore(&self, key: &K) -> Option<SavedScroll> {
        self.entries.get(key).map(|entry| entry.scroll)
    }

    /// Stores `scroll` for `key`. Returns `false` if it was already stored.
    pub fn record(&mut self, key: K, scroll: SavedScroll) -> bool {
        if self.restore(&key) == Some(scroll) {
            return false;
        }
        self.version += 1;
        atrace!(
            version = self.version,
            index = scroll.index,
            offset_y = scroll.offset_y,
            "ScrollMemory::record"
        );
        self.entries.insert(
            key,
            Entry {
                scroll,
                version: self.version,
                persisted: false,
            },
        );
        true
    }

    pub fn forget(&mut self, key: &K) -> Option<SavedScroll> {
        self.entries.remove(key).map(|entry| entry.scroll)
    }

    /// Bumped by every [`ScrollMemory::record`] that changed something.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether some entry changed since it was last handed out by
    /// [`ScrollMemory::take_unpersisted`].
    pub fn has_unpersisted(&self) -> bool {
        self.entries.values().any(|entry| !entry.persisted)
    }

    /// Entries changed since the last call, oldest change first. Each change is returned once.
    pub fn take_unpersisted(&mut self) -> Vec<(K, SavedScroll)>
    where
        K: Clone,
    {
        let mut pending: Vec<(u64, K, SavedScroll)> = Vec::new();
        for (key, entry) in self.entries.iter_mut() {
            if !entry.persisted {
                entry.persisted = true;
                pending.push((entry.version, key.clone(), entry.scroll));
            }
        }
        pending.sort_by_key(|(version, ..)| *version);
        adebug!(entries = pending.len(), "ScrollMemory::take_unpersisted");
        pending
            .into_iter()
            .map(|(_, key, scroll)| (key, scroll))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
