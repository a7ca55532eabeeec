//! `[store]` section configuration.
//!
//! ```toml
//! [store]
//! path = "links.json"    # relative to the config file, `~` expanded
//! ```

use std::path::{Path, PathBuf};

use macros::Config;
use serde::{Deserialize, Serialize};

/// Link store settings.
#[derive(Debug, Clone, Serialize, Deserialize, Config)]
#[serde(default)]
#[config(section = "store")]
pub struct StoreConfig {
    /// JSON file holding link records.
    #[config(default = "links.json", inline_doc)]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("links.json"),
        }
    }
}

impl StoreConfig {
    /// Resolve `path` against `root` with tilde expansion.
    pub fn normalize(&mut self, root: &Path) {
        let raw = self.path.to_string_lossy();
        let expanded = PathBuf::from(shellexpand::tilde(&raw).into_owned());
        self.path = if expanded.is_relative() {
            root.join(expanded)
        } else {
            expanded
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_relative() {
        let mut store = StoreConfig::default();
        store.normalize(Path::new("/srv/links"));
        assert_eq!(store.path, PathBuf::from("/srv/links/links.json"));
    }

    #[test]
    fn test_normalize_absolute_kept() {
        let mut store = StoreConfig {
            path: PathBuf::from("/var/lib/linkicon/links.json"),
        };
        store.normalize(Path::new("/srv"));
        assert_eq!(store.path, PathBuf::from("/var/lib/linkicon/links.json"));
    }
}
