// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Document storage addressed by root-relative paths such as `public/Helium.html`.

use async_trait::async_trait;
use log::warn;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::RwLock;
use uuid::Uuid;

#[derive(Debug)]
pub enum StorageError {
    NotFound(String),
    InvalidPath(String),
    Io(io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NotFound(path) => write!(f, "{} not found", path),
            StorageError::InvalidPath(path) => write!(f, "invalid storage path '{}'", path),
            StorageError::Io(err) => write!(f, "storage I/O failed: {}", err),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        StorageError::Io(err)
    }
}

#[async_trait]
pub trait Storage: Send + Sync {
    async fn read(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    async fn write(&self, path: &str, contents: &[u8]) -> Result<(), StorageError>;

    /// True only for an existing regular file; lookup failures count as absent.
    async fn exists(&self, path: &str) -> bool;

    async fn delete(&self, path: &str) -> Result<(), StorageError>;

    async fn read_to_string(&self, path: &str) -> Result<String, StorageError> {
        let bytes = self.read(path).await?;
        String::from_utf8(bytes).map_err(|err| {
            StorageError::Io(io::Error::new(io::ErrorKind::InvalidData, err))
        })
    }
}

/// Storage rooted at a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = normalize_relative(path)?;
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl Storage for FsStorage {
    async fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let full_path = self.resolve(path)?;
        tokio::fs::read(&full_path)
            .await
            .map_err(|err| map_not_found(err, path))
    }

    async fn write(&self, path: &str, contents: &[u8]) -> Result<(), StorageError> {
        let full_path = self.resolve(path)?;
        let parent = full_path.parent().ok_or_else(|| {
            StorageError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "storage path has no parent",
            ))
        })?;
        tokio::fs::create_dir_all(parent).await?;

        // Writers of the same path each get their own temp file; the rename is the commit.
        let mut temp_path = full_path.clone();
        let temp_name = match full_path.file_name() {
            Some(name) => format!(".{}.{}.tmp", name.to_string_lossy(), Uuid::new_v4()),
            None => format!(".{}.tmp", Uuid::new_v4()),
        };
        temp_path.set_file_name(temp_name);

        if let Err(err) = tokio::fs::write(&temp_path, contents).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StorageError::Io(err));
        }
        if let Err(err) = tokio::fs::rename(&temp_path, &full_path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StorageError::Io(err));
        }
        Ok(())
    }

    async fn exists(&self, path: &str) -> bool {
        let Ok(full_path) = self.resolve(path) else {
            return false;
        };
        match tokio::fs::metadata(&full_path).await {
            Ok(metadata) => metadata.is_file(),
            Err(_) => false,
        }
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let full_path = self.resolve(path)?;
        tokio::fs::remove_file(&full_path)
            .await
            .map_err(|err| map_not_found(err, path))
    }
}

fn map_not_found(err: io::Error, path: &str) -> StorageError {
    if err.kind() == io::ErrorKind::NotFound {
        StorageError::NotFound(path.to_string())
    } else {
        StorageError::Io(err)
    }
}

/// In-process storage used by tests and embedders that do not want disk access.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: RwLock<HashMap<String, Vec<u8>>>,
    read_only: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files<I, K, V>(files: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        let storage = Self::new();
        if let Ok(mut guard) = storage.files.write() {
            for (path, contents) in files {
                guard.insert(path.into(), contents.into());
            }
        }
        storage
    }

    /// Rejects every write and delete with a permission error.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn get_string(&self, path: &str) -> Option<String> {
        let key = normalize_key(path).ok()?;
        match self.files.read() {
            Ok(guard) => guard
                .get(&key)
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned()),
            Err(_) => {
                warn!("Memory storage lock poisoned; lookup skipped");
                None
            }
        }
    }

    fn deny_if_read_only(&self, path: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} is read-only", path),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let key = normalize_key(path)?;
        let guard = self
            .files
            .read()
            .map_err(|_| StorageError::Io(io::Error::other("memory storage lock poisoned")))?;
        guard
            .get(&key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    async fn write(&self, path: &str, contents: &[u8]) -> Result<(), StorageError> {
        let key = normalize_key(path)?;
        self.deny_if_read_only(path)?;
        let mut guard = self
            .files
            .write()
            .map_err(|_| StorageError::Io(io::Error::other("memory storage lock poisoned")))?;
        guard.insert(key, contents.to_vec());
        Ok(())
    }

    async fn exists(&self, path: &str) -> bool {
        let Ok(key) = normalize_key(path) else {
            return false;
        };
        match self.files.read() {
            Ok(guard) => guard.contains_key(&key),
            Err(_) => false,
        }
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let key = normalize_key(path)?;
        self.deny_if_read_only(path)?;
        let mut guard = self
            .files
            .write()
            .map_err(|_| StorageError::Io(io::Error::other("memory storage lock poisoned")))?;
        guard
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }
}

fn normalize_relative(path: &str) -> Result<PathBuf, StorageError> {
    if path.is_empty() || path.contains('\\') || path.chars().any(|ch| ch.is_control()) {
        return Err(StorageError::InvalidPath(path.to_string()));
    }

    let mut normalized = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            _ => return Err(StorageError::InvalidPath(path.to_string())),
        }
    }

    if normalized.as_os_str().is_empty() {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    Ok(normalized)
}

fn normalize_key(path: &str) -> Result<String, StorageError> {
    let normalized = normalize_relative(path)?;
    let parts: Vec<String> = normalized
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_fixtures::TestFixtureRoot;

    #[test]
    fn normalize_relative_rejects_escapes() {
        assert!(normalize_relative("public/Helium.html").is_ok());
        assert!(normalize_relative("./public/Helium.html").is_ok());
        assert!(matches!(
            normalize_relative("../secret"),
            Err(StorageError::InvalidPath(_))
        ));
        assert!(matches!(
            normalize_relative("/etc/passwd"),
            Err(StorageError::InvalidPath(_))
        ));
        assert!(matches!(
            normalize_relative("public\\x.html"),
            Err(StorageError::InvalidPath(_))
        ));
        assert!(matches!(normalize_relative(""), Err(StorageError::InvalidPath(_))));
        assert!(matches!(normalize_relative("."), Err(StorageError::InvalidPath(_))));
    }

    #[tokio::test]
    async fn fs_storage_write_read_delete() {
        let fixture = TestFixtureRoot::new_unique("storage-fs").unwrap();
        let storage = FsStorage::new(fixture.path());

        assert!(!storage.exists("public/Neon.html").await);
        storage
            .write("public/Neon.html", b"<h1>Neon</h1>")
            .await
            .unwrap();
        assert!(storage.exists("public/Neon.html").await);
        assert_eq!(
            storage.read_to_string("public/Neon.html").await.unwrap(),
            "<h1>Neon</h1>"
        );

        storage.write("public/Neon.html", b"replaced").await.unwrap();
        assert_eq!(
            storage.read_to_string("public/Neon.html").await.unwrap(),
            "replaced"
        );

        storage.delete("public/Neon.html").await.unwrap();
        assert!(!storage.exists("public/Neon.html").await);
        assert!(matches!(
            storage.delete("public/Neon.html").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn fs_storage_leaves_no_temp_files() {
        let fixture = TestFixtureRoot::new_unique("storage-fs-temp").unwrap();
        let storage = FsStorage::new(fixture.path());
        storage.write("public/Argon.html", b"Ar").await.unwrap();

        let names: Vec<String> = std::fs::read_dir(fixture.path().join("public"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["Argon.html".to_string()]);
    }

    #[tokio::test]
    async fn fs_storage_directories_do_not_exist_as_files() {
        let fixture = TestFixtureRoot::new_unique("storage-fs-dir").unwrap();
        std::fs::create_dir_all(fixture.path().join("public")).unwrap();
        let storage = FsStorage::new(fixture.path());
        assert!(!storage.exists("public").await);
        assert!(!storage.exists("../public").await);
    }

    #[tokio::test]
    async fn memory_storage_normalizes_keys() {
        let storage = MemoryStorage::with_files([("public/index.html", "<ol></ol>")]);
        assert!(storage.exists("./public/index.html").await);
        assert_eq!(
            storage.read_to_string("public/index.html").await.unwrap(),
            "<ol></ol>"
        );
        assert!(matches!(
            storage.read("public/missing.html").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn read_only_memory_storage_rejects_mutation() {
        let storage = MemoryStorage::with_files([("public/Boron.html", "B")]).read_only();
        assert!(matches!(
            storage.write("public/Boron.html", b"x").await,
            Err(StorageError::Io(_))
        ));
        assert!(matches!(
            storage.delete("public/Boron.html").await,
            Err(StorageError::Io(_))
        ));
        assert_eq!(storage.get_string("public/Boron.html").unwrap(), "B");
    }
}
