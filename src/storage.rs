use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;

/// Fixed storage keys; each maps to one whole-document JSON file.
pub mod keys {
    pub const BOARDS: &str = "boards";
    pub const TIMER: &str = "sprint_timer";
    pub const HISTORY: &str = "sprint_history";
    pub const EDITOR: &str = "editor";
    pub const PROGRESS: &str = "progress";
    pub const CHARACTERS: &str = "characters";
    pub const SCENES: &str = "scenes";
}

/// Whole-document key-value persistence. Loads never fail hard: a missing or
/// unparseable document yields the type's default.
pub trait Store {
    fn load_raw(&self, key: &str) -> Option<String>;
    fn save_raw(&self, key: &str, data: &str) -> io::Result<()>;

    fn load_json<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.load_raw(key)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    fn save_json<T: Serialize>(&self, key: &str, value: &T) -> io::Result<()> {
        let data = serde_json::to_string_pretty(value).unwrap_or_default();
        self.save_raw(key, &data)
    }
}

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let dir = AppDirs::data_dir().unwrap_or_else(|| PathBuf::from("scrib_data"));
        Self { dir }
    }

    pub fn with_dir<P: AsRef<Path>>(p: P) -> Self {
        Self {
            dir: p.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for FileStore {
    fn load_raw(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn save_raw(&self, key: &str, data: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), data)
    }
}
