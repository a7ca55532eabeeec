//! JSON file link store.
//!
//! The file is an array of link objects. Only `icon` is ever written; every
//! other key of a record is kept as found, in its original order.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde_json::Value;

use super::{LinkStore, StoreError};
use crate::core::LinkRecord;

pub struct JsonLinkStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles.
    lock: Mutex<()>,
}

impl JsonLinkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty store.
    fn read(&self) -> Result<Vec<Value>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(self.path.clone(), e)),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Write through a sibling temp file so readers never see a torn file.
    fn write(&self, records: &[Value]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| StoreError::Io(tmp.clone(), e))?;
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::Io(self.path.clone(), e))
    }
}

fn has_id(record: &Value, id: &str) -> bool {
    record.get("id").and_then(Value::as_str) == Some(id)
}

impl LinkStore for JsonLinkStore {
    fn get(&self, id: &str) -> Result<Option<LinkRecord>, StoreError> {
        let _guard = self.lock.lock();
        let records = self.read()?;
        records
            .into_iter()
            .find(|r| has_id(r, id))
            .map(serde_json::from_value)
            .transpose()
            .map_err(StoreError::from)
    }

    fn set_icon(&self, id: &str, icon: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        let mut records = self.read()?;
        let record = records
            .iter_mut()
            .find(|r| has_id(r, id))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        record.insert("icon".into(), Value::String(icon.to_string()));
        self.write(&records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const LINKS: &str = r#"[
  {"id": "nas", "title": "NAS", "url": "http://nas.local:5000", "externalUrl": "https://nas.example.com", "isInternalOnly": false, "categoryId": "home"},
  {"id": "gh", "title": "GitHub", "url": "https://github.com", "icon": "data:image/png;base64,iVBORw0KGgo="}
]"#;

    fn store() -> (TempDir, JsonLinkStore) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("links.json");
        fs::write(&path, LINKS).unwrap();
        (dir, JsonLinkStore::new(path))
    }

    #[test]
    fn test_get() {
        let (_dir, store) = store();
        let nas = store.get("nas").unwrap().unwrap();
        assert_eq!(nas.external_url.as_deref(), Some("https://nas.example.com"));
        assert!(nas.icon.is_none());

        let gh = store.get("gh").unwrap().unwrap();
        assert_eq!(gh.stored_icon(), Some("data:image/png;base64,iVBORw0KGgo="));

        assert!(store.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_set_icon_keeps_other_fields() {
        let (_dir, store) = store();
        store.set_icon("nas", "/icons/network-icon.svg").unwrap();

        let nas = store.get("nas").unwrap().unwrap();
        assert_eq!(nas.icon.as_deref(), Some("/icons/network-icon.svg"));

        let raw: Vec<Value> = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw[0]["categoryId"], "home");
        assert_eq!(raw.len(), 2);
    }

    #[test]
    fn test_set_icon_unknown_link() {
        let (_dir, store) = store();
        let err = store.set_icon("nope", "/x.svg").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "nope"));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonLinkStore::new(dir.path().join("absent.json"));
        assert!(store.get("nas").unwrap().is_none());
        assert!(matches!(
            store.set_icon("nas", "/x.svg"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("links.json");
        fs::write(&path, "{not json").unwrap();
        let store = JsonLinkStore::new(path);
        assert!(matches!(store.get("nas"), Err(StoreError::Json(_))));
    }
}
