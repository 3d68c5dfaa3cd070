//! Persisted history of past diary analyses.
//!
//! The whole list lives in one JSON file named after the storage key and is
//! rewritten on every change. Most recent first, capped at [`HISTORY_LIMIT`];
//! eviction is by insertion order only.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Locale, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::model::DiaryAnalysis;

pub const STORAGE_KEY: &str = "latelier_history_v1";
pub const HISTORY_LIMIT: usize = 20;

/// One past submission with its analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub original_text: String,
    pub analysis: DiaryAnalysis,
}

impl HistoryItem {
    pub fn new(original_text: impl Into<String>, analysis: DiaryAnalysis) -> Self {
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            timestamp: Utc::now().timestamp_millis(),
            original_text: original_text.into(),
            analysis,
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Local>> {
        Local.timestamp_millis_opt(self.timestamp).single()
    }

    /// Card label in French, e.g. "16 oct. 14:05".
    pub fn date_label(&self) -> String {
        match self.created_at() {
            Some(at) => at.format_localized("%-d %b %H:%M", Locale::fr_FR).to_string(),
            None => "—".to_string(),
        }
    }

    /// First `max_chars` characters of the original text.
    pub fn preview(&self, max_chars: usize) -> String {
        let text = self.original_text.trim();
        if text.chars().count() <= max_chars {
            text.to_string()
        } else {
            let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
            format!("{cut}…")
        }
    }
}

#[derive(Debug, Error)]
enum StoreError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

/// Default history file: `<data_dir>/latelier/latelier_history_v1.json`.
pub fn default_path() -> PathBuf {
    dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".local/share")))
        .unwrap_or_else(std::env::temp_dir)
        .join("latelier")
        .join(format!("{STORAGE_KEY}.json"))
}

#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    items: Vec<HistoryItem>,
}

impl HistoryStore {
    /// Read the history file once. Missing or malformed data gives an empty list.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut items = match read_items(&path) {
            Ok(Some(items)) => {
                info!("Loaded {} history items from {}", items.len(), path.display());
                items
            }
            Ok(None) => {
                debug!("No history at {}", path.display());
                Vec::new()
            }
            Err(e) => {
                warn!("Discarding unreadable history {}: {e}", path.display());
                Vec::new()
            }
        };
        items.truncate(HISTORY_LIMIT);

        Self { path, items }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Most recent first.
    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&HistoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Prepend, dropping the oldest entries beyond the limit.
    pub fn append(&mut self, item: HistoryItem) {
        self.items.insert(0, item);
        self.items.truncate(HISTORY_LIMIT);
        self.persist();
    }

    /// Returns whether an item was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        let removed = self.items.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }

    /// Rewrite the whole file. Failures are logged; memory stays authoritative.
    fn persist(&self) {
        match write_items(&self.path, &self.items) {
            Ok(()) => debug!("Saved {} history items to {}", self.items.len(), self.path.display()),
            Err(e) => error!("Failed to save history to {}: {e}", self.path.display()),
        }
    }
}

fn read_items(path: &Path) -> Result<Option<Vec<HistoryItem>>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(&contents)?))
}

fn write_items(path: &Path, items: &[HistoryItem]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string(items)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::cafe_analysis;

    fn store_in(dir: &tempfile::TempDir) -> HistoryStore {
        HistoryStore::load(dir.path().join("nested").join(format!("{STORAGE_KEY}.json")))
    }

    fn item(text: &str) -> HistoryItem {
        HistoryItem::new(text, cafe_analysis())
    }

    #[test]
    fn keeps_twenty_most_recent_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);

        for i in 0..25 {
            store.append(item(&format!("entry {i}")));
        }

        assert_eq!(store.len(), HISTORY_LIMIT);
        let texts: Vec<&str> = store.items().iter().map(|i| i.original_text.as_str()).collect();
        assert_eq!(texts.first(), Some(&"entry 24"));
        assert_eq!(texts.last(), Some(&"entry 5"));
    }

    #[test]
    fn every_mutation_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);

        let first = item("premier");
        let first_id = first.id.clone();
        store.append(first);
        store.append(item("deuxième"));

        let reloaded = HistoryStore::load(store.path());
        assert_eq!(reloaded.items(), store.items());

        assert!(store.remove(&first_id));
        assert!(!store.remove(&first_id));
        let reloaded = HistoryStore::load(store.path());
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.items()[0].original_text, "deuxième");

        store.clear();
        assert!(HistoryStore::load(store.path()).is_empty());
    }

    #[test]
    fn malformed_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        fs::write(&path, "{ not json").unwrap();
        assert!(HistoryStore::load(&path).is_empty());

        fs::write(&path, r#"{"items": []}"#).unwrap();
        assert!(HistoryStore::load(&path).is_empty());

        fs::write(&path, r#"[{"id": "x", "timestamp": 1}]"#).unwrap();
        assert!(HistoryStore::load(&path).is_empty());
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn oversized_file_is_truncated_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let items: Vec<HistoryItem> = (0..30).map(|i| item(&format!("{i}"))).collect();
        fs::write(&path, serde_json::to_string(&items).unwrap()).unwrap();

        let store = HistoryStore::load(&path);
        assert_eq!(store.len(), HISTORY_LIMIT);
        assert_eq!(store.items()[0].original_text, "0");
    }

    #[test]
    fn storage_format_uses_original_field_names() {
        let json = serde_json::to_value(item("我今天去咖啡店看书。")).unwrap();
        assert!(json["originalText"].is_string());
        assert!(json["timestamp"].is_i64());
        assert!(json["analysis"]["translatedText"].is_string());
        assert!(json["analysis"]["segmentedText"][0]["meaning_cn"].is_string());
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(item("a").id, item("a").id);
    }

    #[test]
    fn preview_truncates_on_characters() {
        let entry = item("我今天去咖啡店看书。");
        assert_eq!(entry.preview(100), "我今天去咖啡店看书。");
        assert_eq!(entry.preview(4), "我今天…");
    }

    #[test]
    fn date_label_uses_french_month() {
        let mut entry = item("x");
        entry.timestamp = Local
            .with_ymd_and_hms(2026, 10, 16, 14, 5, 0)
            .single()
            .unwrap()
            .timestamp_millis();
        assert_eq!(entry.date_label(), "16 oct. 14:05");

        entry.timestamp = Local
            .with_ymd_and_hms(2026, 2, 3, 9, 30, 0)
            .single()
            .unwrap()
            .timestamp_millis();
        assert_eq!(entry.date_label(), "3 févr. 09:30");
    }
}
