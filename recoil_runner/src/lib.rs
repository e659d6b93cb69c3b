//! Host-side glue: loading weapon tables from disk and a file-backed
//! settings store.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use recoil_core::settings::{KeyValueStore, StorageError};
use recoil_core::weapon::WeaponTable;
use recoil_schema::WeaponRecord;
use tracing::debug;

pub fn load_weapon_records_from_path(path: impl AsRef<Path>) -> anyhow::Result<Vec<WeaponRecord>> {
    let path = path.as_ref();
    let bytes =
        fs::read(path).with_context(|| format!("failed to read weapon table: {}", path.display()))?;
    let records: Vec<WeaponRecord> = serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse weapon table json: {}", path.display()))?;
    Ok(records)
}

pub fn load_weapon_table_from_path(path: impl AsRef<Path>) -> anyhow::Result<WeaponTable> {
    let path = path.as_ref();
    let records = load_weapon_records_from_path(path)?;
    let table = WeaponTable::from_records(&records)
        .with_context(|| format!("invalid weapon table: {}", path.display()))?;
    Ok(table)
}

pub fn load_weapon_table_from_str(json: &str) -> anyhow::Result<WeaponTable> {
    let table = WeaponTable::from_json_str(json).context("invalid weapon table")?;
    Ok(table)
}

/// Settings persisted as one flat JSON object. Every `set` rewrites the file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens `path`; a missing file starts empty and is created on first write.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read settings: {}", path.display()))
            }
        };
        debug!(path = %path.display(), "settings store opened");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        let io = |source| StorageError::Io {
            path: self.path.display().to_string(),
            source,
        };
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).map_err(io)?;
        fs::rename(&tmp, &self.path).map_err(io)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}
