//! The single current snapshot.
//!
//! Readers hold a cloneable [`SnapshotStore`]; exactly one [`SnapshotWriter`]
//! exists and it belongs to the action dispatcher. Replacement is whole-value
//! and last-write-wins: there is no merge and no request ordering.

use std::cell::RefCell;
use std::rc::Rc;

use crate::snapshot::Snapshot;

#[derive(Debug, Default)]
struct Slot {
    current: Option<Rc<Snapshot>>,
    version: u64,
}

/// Read handle on the current snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    slot: Rc<RefCell<Slot>>,
}

/// The only way to change the current snapshot. Not `Clone`.
#[derive(Debug)]
pub struct SnapshotWriter {
    slot: Rc<RefCell<Slot>>,
}

/// Create an empty store and its writer.
pub fn snapshot_store() -> (SnapshotStore, SnapshotWriter) {
    let slot = Rc::new(RefCell::new(Slot::default()));
    (
        SnapshotStore { slot: Rc::clone(&slot) },
        SnapshotWriter { slot },
    )
}

impl SnapshotStore {
    /// The last snapshot received, or `None` before the first response.
    pub fn get(&self) -> Option<Rc<Snapshot>> {
        self.slot.borrow().current.clone()
    }

    /// Number of replacements so far; `0` means uninitialized.
    pub fn version(&self) -> u64 {
        self.slot.borrow().version
    }
}

impl SnapshotWriter {
    /// Swap in a new snapshot and return the new version.
    pub fn replace(&self, snapshot: Snapshot) -> u64 {
        let mut slot = self.slot.borrow_mut();
        slot.current = Some(Rc::new(snapshot));
        slot.version += 1;
        slot.version
    }

    pub fn reader(&self) -> SnapshotStore {
        SnapshotStore { slot: Rc::clone(&self.slot) }
    }
}
