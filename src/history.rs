use std::collections::VecDeque;
use std::sync::Arc;

use crate::element::Object;

/// A committed point in time: the encoded raster plus the objects above it
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    sequence: u64,
    raster: Arc<[u8]>,
    size: [u32; 2],
    objects: Vec<Object>,
}

impl HistoryEntry {
    /// Position of this entry in the order commits happened, stable across eviction
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// PNG bytes of the raster
    pub fn raster(&self) -> &Arc<[u8]> {
        &self.raster
    }

    /// Surface size the raster was captured at
    pub fn size(&self) -> [u32; 2] {
        self.size
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }
}

/// Bounded linear undo/redo log.
///
/// Invariant: `index < entries.len()` whenever the log is non-empty.
#[derive(Debug, Clone)]
pub struct HistoryList {
    entries: VecDeque<HistoryEntry>,
    index: Option<usize>,
    capacity: usize,
    next_sequence: u64,
}

impl HistoryList {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(64)),
            index: None,
            capacity: capacity.max(1),
            next_sequence: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the current entry, `None` when empty
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.index.and_then(|index| self.entries.get(index))
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Append a snapshot after the current entry, dropping any redo tail and
    /// evicting the oldest entry past capacity
    pub fn commit(&mut self, raster: Arc<[u8]>, size: [u32; 2], objects: Vec<Object>) -> &HistoryEntry {
        let keep = self.index.map_or(0, |index| index + 1);
        self.entries.truncate(keep);

        let entry = HistoryEntry {
            sequence: self.next_sequence,
            raster,
            size,
            objects,
        };
        self.next_sequence += 1;
        self.entries.push_back(entry);

        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        let index = self.entries.len() - 1;
        self.index = Some(index);
        log::debug!(
            "History commit #{} ({} of {})",
            self.entries[index].sequence,
            index + 1,
            self.entries.len()
        );
        &self.entries[index]
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.index, Some(index) if index > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.index, Some(index) if index + 1 < self.entries.len())
    }

    /// Step back. At the oldest entry this is a no-op.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        if !self.can_undo() {
            return None;
        }
        let index = self.index? - 1;
        self.index = Some(index);
        self.entries.get(index)
    }

    /// Step forward. At the newest entry this is a no-op.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        if !self.can_redo() {
            return None;
        }
        let index = self.index? + 1;
        self.index = Some(index);
        self.entries.get(index)
    }

    /// Make the entry with `sequence` current, if it is still in the log
    pub fn seek(&mut self, sequence: u64) -> Option<&HistoryEntry> {
        let index = self.entries.iter().position(|entry| entry.sequence == sequence)?;
        self.index = Some(index);
        self.entries.get(index)
    }

    /// Empty the log. The caller pushes a fresh baseline straight after.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = None;
    }
}
