//! `ConfigStore` auf einem Dateisystem (nur mit Feature `std`)
//!
//! Eine Datei `<dir>/<key>.json` pro Schlüssel. Geschrieben wird in
//! `<key>.json.tmp`, danach per `rename` ersetzt.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::storage::RECORD_BUFFER_SIZE;
use crate::traits::{ConfigStore, StoreError};

/// Datensatz-Speicher in einem Verzeichnis
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Das Verzeichnis muss beim Zugriff existieren, sonst `StorageUnavailable`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Pfad der Datei zu `key`
    pub fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(std::format!("{key}.json"))
    }

    fn check_dir(&self) -> Result<(), StoreError> {
        if self.dir.is_dir() {
            Ok(())
        } else {
            Err(StoreError::StorageUnavailable)
        }
    }
}

impl ConfigStore for FileStore {
    fn read(&mut self, key: &str, buf: &mut [u8]) -> Result<usize, StoreError> {
        self.check_dir()?;

        let data = match fs::read(self.record_path(key)) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(StoreError::Missing),
            Err(_) => return Err(StoreError::StorageUnavailable),
        };

        if data.is_empty() || data.len() > RECORD_BUFFER_SIZE {
            return Err(StoreError::CorruptRecord);
        }

        let target = buf.get_mut(..data.len()).ok_or(StoreError::CorruptRecord)?;
        target.copy_from_slice(&data);
        Ok(data.len())
    }

    fn write(&mut self, key: &str, data: &[u8]) -> Result<(), StoreError> {
        self.check_dir()?;

        let path = self.record_path(key);
        if fs::read(&path).is_ok_and(|current| current == data) {
            debug!("FileStore: {} unchanged", key);
            return Ok(());
        }

        let tmp = self.dir.join(std::format!("{key}.json.tmp"));
        let mut file = File::create(&tmp).map_err(|_| StoreError::StorageUnavailable)?;
        let written = file.write_all(data).and_then(|()| file.sync_all());
        drop(file);

        if written.and_then(|()| fs::rename(&tmp, &path)).is_err() {
            warn!("FileStore: writing {} failed", key);
            // Alte Datei bleibt, die halbe tmp-Datei nicht
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::PartialWrite);
        }
        Ok(())
    }
}
