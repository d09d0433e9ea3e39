//! Print history log and draft text persistence

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{DRAFT_KEY, HISTORY_KEY, MAX_HISTORY};
use crate::error::{BridgeError, BridgeResult};
use crate::job::PrinterTarget;
use crate::storage::LocalStorage;

const PREVIEW_CHARS: usize = 100;

/// Outcome recorded for a print attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryStatus {
    /// Printed through the standalone fallback
    Success,
    Error,
    /// Delivered to the embedded host's native channel
    Webview,
}

impl fmt::Display for HistoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Webview => "webview",
        };
        f.pad(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Creation time in epoch milliseconds
    pub id: i64,
    pub text: String,
    pub status: HistoryStatus,
    #[serde(default)]
    pub printers: Vec<PrinterTarget>,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Text shortened for listings
    pub fn preview(&self) -> String {
        let mut chars = self.text.chars();
        let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
        if chars.next().is_some() {
            format!("{}...", head)
        } else {
            head
        }
    }

    pub fn printers_summary(&self) -> String {
        self.printers
            .iter()
            .map(|p| format!("{} ({})", p.address, p.copies))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Bounded log, newest first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl PrintHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Add an entry at the front, evicting the oldest past capacity
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    /// Build and push an entry stamped with the current time
    pub fn record(
        &mut self,
        text: impl Into<String>,
        status: HistoryStatus,
        printers: Vec<PrinterTarget>,
    ) -> &HistoryEntry {
        let timestamp = Utc::now();
        let mut id = timestamp.timestamp_millis();
        if let Some(newest) = self.entries.front()
            && newest.id >= id
        {
            id = newest.id + 1;
        }

        self.push(HistoryEntry {
            id,
            text: text.into(),
            status,
            printers,
            timestamp,
        });
        &self.entries[0]
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn newest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn to_json(&self) -> BridgeResult<String> {
        Ok(serde_json::to_string(&self.entries)?)
    }

    /// Parse a serialized log; anything past capacity is dropped from the old end
    pub fn from_json(json: &str, capacity: usize) -> BridgeResult<Self> {
        let entries: Vec<HistoryEntry> =
            serde_json::from_str(json).map_err(BridgeError::HistoryDeserialization)?;
        let mut history = Self::new(capacity);
        history.entries = entries.into();
        history.entries.truncate(history.capacity);
        Ok(history)
    }
}

impl Default for PrintHistory {
    fn default() -> Self {
        Self::new(MAX_HISTORY)
    }
}

/// History persisted under the `printHistory` key
pub struct HistoryStore<S: LocalStorage> {
    storage: S,
    history: PrintHistory,
}

impl<S: LocalStorage> HistoryStore<S> {
    /// Load the persisted log; unreadable or corrupt data starts an empty one
    pub fn load(storage: S, capacity: usize) -> Self {
        let history = match storage.get_item(HISTORY_KEY) {
            Ok(Some(json)) => PrintHistory::from_json(&json, capacity).unwrap_or_else(|e| {
                warn!(error = %e, "Discarding unreadable print history");
                PrintHistory::new(capacity)
            }),
            Ok(None) => PrintHistory::new(capacity),
            Err(e) => {
                warn!(error = %e, "Print history unavailable");
                PrintHistory::new(capacity)
            }
        };
        debug!(entries = history.len(), "Print history loaded");
        Self { storage, history }
    }

    pub fn history(&self) -> &PrintHistory {
        &self.history
    }

    /// Record an attempt and persist the whole log
    pub fn record(
        &mut self,
        text: impl Into<String>,
        status: HistoryStatus,
        printers: Vec<PrinterTarget>,
    ) -> BridgeResult<HistoryEntry> {
        let entry = self.history.record(text, status, printers).clone();
        self.storage.set_item(HISTORY_KEY, &self.history.to_json()?)?;
        Ok(entry)
    }

    pub fn clear(&mut self) -> BridgeResult<()> {
        self.history.clear();
        self.storage.remove_item(HISTORY_KEY)
    }
}

/// Draft text persisted under the `savedText` key
pub struct DraftStore<S: LocalStorage> {
    storage: S,
}

impl<S: LocalStorage> DraftStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn load(&self) -> BridgeResult<Option<String>> {
        self.storage.get_item(DRAFT_KEY)
    }

    pub fn save(&self, text: &str) -> BridgeResult<()> {
        self.storage.set_item(DRAFT_KEY, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::sync::Arc;

    #[test]
    fn test_capacity_keeps_newest_first() {
        let mut history = PrintHistory::new(20);
        for i in 1..=21 {
            history.record(format!("job {}", i), HistoryStatus::Success, vec![]);
            assert!(history.len() <= 20);
        }

        assert_eq!(history.len(), 20);
        let texts: Vec<_> = history.entries().map(|e| e.text.clone()).collect();
        let expected: Vec<_> = (2..=21).rev().map(|i| format!("job {}", i)).collect();
        assert_eq!(texts, expected);
    }

    #[test]
    fn test_ids_strictly_increase() {
        let mut history = PrintHistory::default();
        let first = history.record("a", HistoryStatus::Success, vec![]).id;
        let second = history.record("b", HistoryStatus::Success, vec![]).id;
        assert!(second > first);
    }

    #[test]
    fn test_json_round_trip() {
        let mut history = PrintHistory::default();
        history.record("INV-1", HistoryStatus::Webview, vec![PrinterTarget::new("10.0.0.5", 2)]);
        history.record("INV-2", HistoryStatus::Error, vec![]);
        history.record("INV-3", HistoryStatus::Success, vec![PrinterTarget::new("10.0.0.6", 1)]);

        let restored = PrintHistory::from_json(&history.to_json().unwrap(), 20).unwrap();
        assert_eq!(restored, history);
    }

    #[test]
    fn test_reads_page_written_log() {
        let json = r#"[{"id":1718000000000,"text":"hola","status":"webview",
            "printers":[{"ip":"192.168.0.10","copies":2}],
            "timestamp":"2024-06-10T06:13:20.000Z"}]"#;
        let history = PrintHistory::from_json(json, 20).unwrap();
        let entry = history.newest().unwrap();
        assert_eq!(entry.status, HistoryStatus::Webview);
        assert_eq!(entry.printers_summary(), "192.168.0.10 (2)");
    }

    #[test]
    fn test_oversized_log_is_cut() {
        let mut big = PrintHistory::new(30);
        for i in 0..30 {
            big.record(format!("{}", i), HistoryStatus::Success, vec![]);
        }
        let history = PrintHistory::from_json(&big.to_json().unwrap(), 20).unwrap();
        assert_eq!(history.len(), 20);
        assert_eq!(history.newest().unwrap().text, "29");
    }

    #[test]
    fn test_preview() {
        let mut history = PrintHistory::default();
        let long = "x".repeat(150);
        let entry = history.record(long, HistoryStatus::Success, vec![]).clone();
        assert_eq!(entry.preview(), format!("{}...", "x".repeat(100)));

        let short = history.record("ñandú", HistoryStatus::Success, vec![]).clone();
        assert_eq!(short.preview(), "ñandú");
    }

    #[test]
    fn test_corrupt_storage_loads_empty() {
        let storage = MemoryStorage::new();
        storage.set_item(HISTORY_KEY, "{not json").unwrap();

        let store = HistoryStore::load(storage, MAX_HISTORY);
        assert!(store.history().is_empty());
    }

    #[test]
    fn test_store_persists_and_clears() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = HistoryStore::load(storage.clone(), MAX_HISTORY);
        store
            .record("INV-9", HistoryStatus::Success, vec![])
            .unwrap();

        let reloaded = HistoryStore::load(storage.clone(), MAX_HISTORY);
        assert_eq!(reloaded.history().newest().unwrap().text, "INV-9");

        store.clear().unwrap();
        assert!(store.history().is_empty());
        assert_eq!(storage.get_item(HISTORY_KEY).unwrap(), None);
    }

    #[test]
    fn test_draft_store() {
        let drafts = DraftStore::new(MemoryStorage::new());
        assert_eq!(drafts.load().unwrap(), None);
        drafts.save("Factura 001").unwrap();
        assert_eq!(drafts.load().unwrap().as_deref(), Some("Factura 001"));
    }
}
