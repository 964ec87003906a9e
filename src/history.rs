use crate::display::DisplayDocument;
use crate::network::NetworkDocument;

/// Everything needed to put the editor back where it was.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub display: DisplayDocument,
    pub network: NetworkDocument,
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    action: &'static str,
    snapshot: Snapshot,
}

/// Undo/redo stacks of editor snapshots.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo: Vec<Entry>,
    redo: Vec<Entry>,
}

impl History {
    /// Record the state from before `action`. Clears the redo stack.
    pub fn record(&mut self, action: &'static str, before: Snapshot) {
        self.undo.push(Entry {
            action,
            snapshot: before,
        });
        self.redo.clear();
    }

    /// Step back: returns the state to restore and keeps `current` for redo.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let entry = self.undo.pop()?;
        self.redo.push(Entry {
            action: entry.action,
            snapshot: current,
        });
        Some(entry.snapshot)
    }

    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let entry = self.redo.pop()?;
        self.undo.push(Entry {
            action: entry.action,
            snapshot: current,
        });
        Some(entry.snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Action the next undo would revert.
    pub fn next_undo(&self) -> Option<&'static str> {
        self.undo.last().map(|e| e.action)
    }

    pub fn next_redo(&self) -> Option<&'static str> {
        self.redo.last().map(|e| e.action)
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
