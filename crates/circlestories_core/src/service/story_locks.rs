//! Per-story mutual exclusion for writers.
//!
//! # Invariants
//! - At most one closure runs under `with_story_lock` per story at a time.
//! - The slot table lock is only held while looking up or pruning a slot,
//!   never while the protected closure runs.
//! - A slot is pruned once no caller holds or waits on it.

use crate::model::story::StoryId;
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashMap;
use std::sync::Arc;

type Slot = Arc<Mutex<()>>;

#[derive(Debug, Default)]
pub struct StoryLocks {
    slots: Mutex<HashMap<StoryId, Slot>>,
}

impl StoryLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` while holding the lock for `story_id`.
    ///
    /// Waiters are not queued fairly; whichever thread wins the mutex runs
    /// next.
    pub fn with_story_lock<T>(&self, story_id: StoryId, f: impl FnOnce() -> T) -> T {
        let slot = {
            let mut slots = self.table();
            Arc::clone(slots.entry(story_id).or_default())
        };

        let result = {
            let _guard = slot.lock();
            f()
        };

        self.release(story_id, slot);
        result
    }

    /// Number of stories that currently have a live slot.
    pub fn active_slots(&self) -> usize {
        self.table().len()
    }

    /// Drops the caller's handle under the table lock so clone counts seen
    /// here are exact.
    fn release(&self, story_id: StoryId, slot: Slot) {
        let mut slots = self.table();
        let unused = slots
            .get(&story_id)
            .is_some_and(|current| Arc::ptr_eq(current, &slot) && Arc::strong_count(&slot) == 2);
        drop(slot);
        if unused {
            slots.remove(&story_id);
        }
    }

    fn table(&self) -> MutexGuard<'_, HashMap<StoryId, Slot>> {
        self.slots.lock()
    }
}
