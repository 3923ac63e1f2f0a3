use crate::error::QuestError;
use crate::model::QuestSnapshot;
use std::cell::{Cell, RefCell};

pub mod json_store;

pub use json_store::JsonFileStore;

/// Where the quest set lives between sessions.
pub trait PersistenceAdapter {
    /// Returns `None` when nothing has been persisted yet.
    fn load(&self) -> Result<Option<Vec<QuestSnapshot>>, QuestError>;

    fn save(&self, snapshots: &[QuestSnapshot]) -> Result<(), QuestError>;
}

/// Keeps snapshots in memory. Useful for hosts that never persist.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshots: RefCell<Option<Vec<QuestSnapshot>>>,
    fail_saves: Cell<bool>,
}

impl MemoryStore {
    pub fn with_snapshots(snapshots: Vec<QuestSnapshot>) -> Self {
        Self {
            snapshots: RefCell::new(Some(snapshots)),
            fail_saves: Cell::new(false),
        }
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }

    pub fn snapshots(&self) -> Option<Vec<QuestSnapshot>> {
        self.snapshots.borrow().clone()
    }
}

impl PersistenceAdapter for MemoryStore {
    fn load(&self) -> Result<Option<Vec<QuestSnapshot>>, QuestError> {
        Ok(self.snapshots.borrow().clone())
    }

    fn save(&self, snapshots: &[QuestSnapshot]) -> Result<(), QuestError> {
        if self.fail_saves.get() {
            return Err(QuestError::io("storage is unavailable"));
        }
        *self.snapshots.borrow_mut() = Some(snapshots.to_vec());
        Ok(())
    }
}
