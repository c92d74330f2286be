use log::warn;

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::error::{ClockError, Result};

/// Ordered list of zone names persisted between sessions.
pub trait ZoneStore {
    /// The stored list; unreadable contents count as an empty list.
    fn get_list(&self) -> Vec<String>;

    fn set_list(&mut self, zones: &[String]) -> Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    zones: Vec<String>,
}

impl MemoryStore {
    pub fn new(zones: Vec<String>) -> Self {
        Self { zones }
    }
}

impl ZoneStore for MemoryStore {
    fn get_list(&self) -> Vec<String> {
        self.zones.clone()
    }

    fn set_list(&mut self, zones: &[String]) -> Result<()> {
        self.zones = zones.to_vec();
        Ok(())
    }
}

/// Stores the list as a JSON array of strings.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<String>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(ClockError::StorageRead(err.to_string())),
        };
        // a stored `null` is an empty list
        let zones: Option<Vec<String>> = serde_json::from_str(&contents)
            .map_err(|err| ClockError::StorageRead(err.to_string()))?;
        Ok(zones.unwrap_or_default())
    }
}

impl ZoneStore for JsonFileStore {
    fn get_list(&self) -> Vec<String> {
        self.read().unwrap_or_else(|err| {
            warn!("{}: {err}, starting with an empty list", self.path.display());
            Vec::new()
        })
    }

    fn set_list(&mut self, zones: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string(zones)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zones(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn missing_file_is_an_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("zones.json"));
        assert!(store.get_list().is_empty());
    }

    #[test]
    fn writes_and_reads_back_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("nested/zones.json"));
        let list = zones(&["Europe/Dublin", "Asia/Tokyo", "America/New_York"]);
        store.set_list(&list).unwrap();
        assert_eq!(store.get_list(), list);
        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            r#"["Europe/Dublin","Asia/Tokyo","America/New_York"]"#
        );
    }

    #[test]
    fn set_of_get_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("zones.json"));
        store.set_list(&zones(&["Asia/Tokyo", "UTC"])).unwrap();
        let before = store.get_list();
        store.set_list(&store.get_list()).unwrap();
        assert_eq!(store.get_list(), before);
    }

    #[test]
    fn corrupt_or_null_contents_recover_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zones.json");
        let store = JsonFileStore::new(&path);

        fs::write(&path, "{not json").unwrap();
        assert!(store.get_list().is_empty());
        assert!(matches!(store.read(), Err(ClockError::StorageRead(_))));

        fs::write(&path, "null").unwrap();
        assert!(store.get_list().is_empty());

        fs::write(&path, "[1, 2]").unwrap();
        assert!(store.get_list().is_empty());
    }

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStore::default();
        store.set_list(&zones(&["UTC"])).unwrap();
        assert_eq!(store.get_list(), zones(&["UTC"]));
    }
}
