// ⚖️ Comparison Selection Set - hospitals marked for side-by-side viewing
//
// Bounded (MAX_COMPARE), insertion-ordered, persisted after every mutation
// as a JSON array of id strings under a single fixed key.
//
// Per id:  Unselected --add--> Selected --remove--> Unselected
//          Selected --add--> Selected (no change)
//          add while full → stays Unselected, caller gets AtCapacity

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;

/// Maximum number of hospitals in one comparison
pub const MAX_COMPARE: usize = 3;

/// Storage key for the persisted selection
pub const SELECTION_KEY: &str = "gw_compare_ids";

// ============================================================================
// STORE
// ============================================================================

/// Durable key/value slot the selection is written to
pub trait SelectionStore: Send {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Store that lives only as long as the process
#[derive(Debug, Default, Clone)]
pub struct MemorySelectionStore {
    values: HashMap<String, String>,
}

impl MemorySelectionStore {
    pub fn new() -> Self {
        MemorySelectionStore::default()
    }

    /// Store pre-seeded with a raw value (used to simulate a previous session)
    pub fn with_value(key: &str, value: &str) -> Self {
        let mut store = MemorySelectionStore::new();
        store.values.insert(key.to_string(), value.to_string());
        store
    }
}

impl SelectionStore for MemorySelectionStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ============================================================================
// SELECTION SET
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AddOutcome {
    Added,
    AlreadySelected,
    AtCapacity,
    /// Blank id, nothing to select
    Invalid,
}

impl AddOutcome {
    pub fn is_selected(&self) -> bool {
        matches!(self, AddOutcome::Added | AddOutcome::AlreadySelected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    Added,
    Removed,
    AtCapacity,
    Invalid,
}

pub struct CompareSelection {
    ids: Vec<String>,
    store: Box<dyn SelectionStore>,
}

impl CompareSelection {
    /// Restore from the store; anything unreadable starts empty
    pub fn load(store: Box<dyn SelectionStore>) -> Self {
        let ids = match store.read(SELECTION_KEY) {
            Ok(Some(raw)) => parse_ids(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read saved comparison selection");
                Vec::new()
            }
        };

        CompareSelection { ids, store }
    }

    /// Empty selection backed by memory only
    pub fn in_memory() -> Self {
        CompareSelection::load(Box::new(MemorySelectionStore::new()))
    }

    pub fn add(&mut self, id: &str) -> AddOutcome {
        let id = id.trim();
        if id.is_empty() {
            return AddOutcome::Invalid;
        }
        if self.contains(id) {
            return AddOutcome::AlreadySelected;
        }
        if self.ids.len() >= MAX_COMPARE {
            return AddOutcome::AtCapacity;
        }

        self.ids.push(id.to_string());
        self.persist();
        AddOutcome::Added
    }

    /// Returns true if the id was selected
    pub fn remove(&mut self, id: &str) -> bool {
        let id = id.trim();
        let before = self.ids.len();
        self.ids.retain(|existing| existing != id);

        let removed = self.ids.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    /// Add if absent, remove if present
    pub fn toggle(&mut self, id: &str) -> ToggleOutcome {
        if self.remove(id) {
            return ToggleOutcome::Removed;
        }
        match self.add(id) {
            AddOutcome::Added | AddOutcome::AlreadySelected => ToggleOutcome::Added,
            AddOutcome::AtCapacity => ToggleOutcome::AtCapacity,
            AddOutcome::Invalid => ToggleOutcome::Invalid,
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.persist();
    }

    pub fn contains(&self, id: &str) -> bool {
        let id = id.trim();
        self.ids.iter().any(|existing| existing == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.ids.len() >= MAX_COMPARE
    }

    /// Ids in the order they were added
    pub fn to_ordered_list(&self) -> Vec<String> {
        self.ids.clone()
    }

    /// Write the whole set; a failed write is logged, the in-memory set stays
    fn persist(&mut self) {
        let encoded = match serde_json::to_string(&self.ids) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!(error = %e, "Could not encode comparison selection");
                return;
            }
        };

        if let Err(e) = self.store.write(SELECTION_KEY, &encoded) {
            tracing::warn!(error = %e, "Could not save comparison selection");
        }
    }
}

/// Decode a persisted selection: JSON array of string or numeric ids,
/// deduplicated and capped
fn parse_ids(raw: &str) -> Vec<String> {
    let parsed: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(ids) => ids,
        Err(e) => {
            tracing::warn!(error = %e, "Saved comparison selection is malformed, starting empty");
            return Vec::new();
        }
    };

    let mut ids: Vec<String> = Vec::new();
    for value in parsed {
        let id = match value {
            serde_json::Value::String(s) => s.trim().to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            other => {
                tracing::warn!(value = %other, "Skipping saved comparison id that is not a string or number");
                continue;
            }
        };
        if !id.is_empty() && !ids.contains(&id) && ids.len() < MAX_COMPARE {
            ids.push(id);
        }
    }
    ids
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::{Arc, Mutex};

    /// Memory store whose contents stay visible after the selection takes it
    #[derive(Clone, Default)]
    struct SharedStore(Arc<Mutex<HashMap<String, String>>>);

    impl SelectionStore for SharedStore {
        fn read(&self, key: &str) -> Result<Option<String>> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }

        fn write(&mut self, key: &str, value: &str) -> Result<()> {
            self.0.lock().unwrap().insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    struct FailingStore;

    impl SelectionStore for FailingStore {
        fn read(&self, _key: &str) -> Result<Option<String>> {
            Err(anyhow!("disk unavailable"))
        }

        fn write(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(anyhow!("disk unavailable"))
        }
    }

    #[test]
    fn test_cap_rejects_last_add() {
        let mut selection = CompareSelection::in_memory();

        for i in 0..MAX_COMPARE {
            assert_eq!(selection.add(&format!("h{}", i)), AddOutcome::Added);
        }
        assert_eq!(selection.add("overflow"), AddOutcome::AtCapacity);

        assert_eq!(selection.len(), MAX_COMPARE);
        assert!(!selection.contains("overflow"));
        // Earlier members are all still there
        for i in 0..MAX_COMPARE {
            assert!(selection.contains(&format!("h{}", i)));
        }
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut selection = CompareSelection::in_memory();
        assert_eq!(selection.add("7"), AddOutcome::Added);
        assert_eq!(selection.add(" 7 "), AddOutcome::AlreadySelected);
        assert_eq!(selection.len(), 1);
        assert_eq!(selection.add("  "), AddOutcome::Invalid);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut selection = CompareSelection::in_memory();
        selection.add("a");
        selection.add("b");
        selection.add("c");

        assert!(selection.remove("b"));
        assert!(!selection.remove("b"));
        assert_eq!(selection.to_ordered_list(), vec!["a", "c"]);

        selection.clear();
        assert!(selection.is_empty());
    }

    #[test]
    fn test_toggle() {
        let mut selection = CompareSelection::in_memory();
        assert_eq!(selection.toggle("x"), ToggleOutcome::Added);
        assert_eq!(selection.toggle("x"), ToggleOutcome::Removed);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_every_mutation_persists() {
        let store = SharedStore::default();
        let mut selection = CompareSelection::load(Box::new(store.clone()));

        let saved = || store.0.lock().unwrap().get(SELECTION_KEY).cloned();

        selection.add("1");
        assert_eq!(saved().as_deref(), Some(r#"["1"]"#));
        selection.add("2");
        assert_eq!(saved().as_deref(), Some(r#"["1","2"]"#));
        selection.remove("1");
        assert_eq!(saved().as_deref(), Some(r#"["2"]"#));
        selection.clear();
        assert_eq!(saved().as_deref(), Some("[]"));
    }

    #[test]
    fn test_reload_round_trip() {
        let store = SharedStore::default();
        let mut selection = CompareSelection::load(Box::new(store.clone()));
        selection.add("42");
        selection.add("17");
        drop(selection);

        let reloaded = CompareSelection::load(Box::new(store));
        assert_eq!(reloaded.to_ordered_list(), vec!["42", "17"]);

        println!("✅ Selection round-trip test PASSED");
    }

    #[test]
    fn test_malformed_persisted_value_starts_empty() {
        for raw in ["not json", r#"{"a": 1}"#, "\"42\"", "17"] {
            let store = MemorySelectionStore::with_value(SELECTION_KEY, raw);
            let selection = CompareSelection::load(Box::new(store));
            assert!(selection.is_empty(), "{} should load empty", raw);
        }
    }

    #[test]
    fn test_numeric_persisted_ids_load_as_strings() {
        let store = MemorySelectionStore::with_value(SELECTION_KEY, "[1, 2]");
        let selection = CompareSelection::load(Box::new(store));
        assert_eq!(selection.to_ordered_list(), vec!["1", "2"]);

        // Mixed ids compare as strings; other element kinds are skipped
        let store = MemorySelectionStore::with_value(SELECTION_KEY, r#"[101, "101", null, {"id": 3}, "102"]"#);
        let selection = CompareSelection::load(Box::new(store));
        assert_eq!(selection.to_ordered_list(), vec!["101", "102"]);
        assert!(selection.contains("101"));

        println!("✅ Numeric saved ids test PASSED");
    }

    #[test]
    fn test_persisted_value_is_deduplicated_and_capped() {
        let store = MemorySelectionStore::with_value(SELECTION_KEY, r#"["1", "1", " ", "2", "3", "4"]"#);
        let selection = CompareSelection::load(Box::new(store));
        assert_eq!(selection.to_ordered_list(), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_store_failures_do_not_block() {
        let mut selection = CompareSelection::load(Box::new(FailingStore));
        assert!(selection.is_empty());
        assert_eq!(selection.add("1"), AddOutcome::Added);
        assert!(selection.contains("1"));
    }
}
