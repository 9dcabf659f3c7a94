// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::markup::{self, MarkupError, html_escape};
use super::storage::{Storage, StorageError};
use log::{debug, info};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const CONTAINER_ID: &str = "elements";
pub const TOTAL_ID: &str = "elTotal";

#[derive(Debug)]
pub enum IndexError {
    Storage(StorageError),
    Markup(MarkupError),
    MissingContainer,
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexError::Storage(err) => write!(f, "Index storage error: {}", err),
            IndexError::Markup(err) => write!(f, "Index markup error: {}", err),
            IndexError::MissingContainer => {
                write!(f, "Index has no element with id '{}'", CONTAINER_ID)
            }
        }
    }
}

impl std::error::Error for IndexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IndexError::Storage(err) => Some(err),
            IndexError::Markup(err) => Some(err),
            IndexError::MissingContainer => None,
        }
    }
}

impl From<StorageError> for IndexError {
    fn from(err: StorageError) -> Self {
        IndexError::Storage(err)
    }
}

impl From<MarkupError> for IndexError {
    fn from(err: MarkupError) -> Self {
        IndexError::Markup(err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendedEntry {
    pub document: String,
    pub total: usize,
}

/// True when any element in the index carries `id="<name>"`.
pub fn has_entry(document: &str, name: &str) -> Result<bool, MarkupError> {
    Ok(!markup::find_by_id(document, name)?.is_empty())
}

/// Appends the entry for `name` to the container and refreshes the total.
///
/// Returns `Ok(None)` when the entry is already present.
pub fn append_entry(document: &str, name: &str) -> Result<Option<AppendedEntry>, IndexError> {
    if has_entry(document, name)? {
        return Ok(None);
    }

    let container = markup::find_by_id(document, CONTAINER_ID)?
        .into_iter()
        .next()
        .and_then(|span| span.content)
        .ok_or(IndexError::MissingContainer)?;

    let escaped = html_escape(name);
    let entry = format!(
        "<li><a href=\"{}.html\" id=\"{}\">{}</a></li>\n",
        escaped, escaped, escaped
    );
    let mut updated = document.to_string();
    updated.insert_str(container.end, &entry);

    let content = container.start..container.end + entry.len();
    let total = markup::element_children(&updated, content)?;
    let updated = markup::set_text(&updated, TOTAL_ID, &total.to_string())?;

    Ok(Some(AppendedEntry {
        document: updated,
        total,
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexUpdate {
    Added { total: usize },
    AlreadyPresent,
}

/// Owns the index document and serializes its read-check-write cycle.
pub struct IndexMaintainer {
    storage: Arc<dyn Storage>,
    index_path: String,
    lock: Mutex<()>,
}

impl IndexMaintainer {
    pub fn new(storage: Arc<dyn Storage>, index_path: impl Into<String>) -> Self {
        Self {
            storage,
            index_path: index_path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn index_path(&self) -> &str {
        &self.index_path
    }

    pub async fn ensure_entry(&self, name: &str) -> Result<IndexUpdate, IndexError> {
        let _guard = self.lock.lock().await;

        let document = self.storage.read_to_string(&self.index_path).await?;
        match append_entry(&document, name)? {
            Some(appended) => {
                self.storage
                    .write(&self.index_path, appended.document.as_bytes())
                    .await?;
                info!(
                    "Added '{}' to {} ({} entries)",
                    name, self.index_path, appended.total
                );
                Ok(IndexUpdate::Added {
                    total: appended.total,
                })
            }
            None => {
                debug!("'{}' already listed in {}", name, self.index_path);
                Ok(IndexUpdate::AlreadyPresent)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::storage::MemoryStorage;

    const INDEX: &str = "<p><span id=\"elTotal\">0</span></p>\n<ol id=\"elements\">\n</ol>";

    #[test]
    fn appends_entry_and_updates_total() {
        let appended = append_entry(INDEX, "Helium").unwrap().unwrap();
        assert_eq!(appended.total, 1);
        assert_eq!(
            appended.document,
            "<p><span id=\"elTotal\">1</span></p>\n<ol id=\"elements\">\n<li><a href=\"Helium.html\" id=\"Helium\">Helium</a></li>\n</ol>"
        );
    }

    #[test]
    fn existing_entry_is_left_alone() {
        let once = append_entry(INDEX, "Helium").unwrap().unwrap();
        assert!(append_entry(&once.document, "Helium").unwrap().is_none());
    }

    #[test]
    fn total_counts_every_child() {
        let first = append_entry(INDEX, "Hydrogen").unwrap().unwrap();
        let second = append_entry(&first.document, "Helium").unwrap().unwrap();
        assert_eq!(second.total, 2);
        assert!(has_entry(&second.document, "Hydrogen").unwrap());
        assert!(has_entry(&second.document, "Helium").unwrap());
        let hydrogen = second.document.find("Hydrogen").unwrap();
        let helium = second.document.find("id=\"Helium\"").unwrap();
        assert!(hydrogen < helium);
    }

    #[test]
    fn id_anywhere_in_document_counts_as_present() {
        let doc = "<h1 id=\"Neon\">x</h1><ol id=\"elements\"></ol>";
        assert!(append_entry(doc, "Neon").unwrap().is_none());
    }

    #[test]
    fn missing_container_is_an_error() {
        let result = append_entry("<p>no list</p>", "Helium");
        assert!(matches!(result, Err(IndexError::MissingContainer)));
    }

    #[test]
    fn commented_entries_are_not_counted() {
        let doc = "<span id=\"elTotal\">0</span>\n<ol id=\"elements\">\n<!-- <li>placeholder</li> -->\n</ol>";
        let appended = append_entry(doc, "Helium").unwrap().unwrap();
        assert_eq!(appended.total, 1);
        assert!(appended.document.contains("<!-- <li>placeholder</li> -->"));
        assert!(appended.document.contains("<span id=\"elTotal\">1</span>"));
    }

    #[test]
    fn commented_id_does_not_count_as_present() {
        let doc = format!("<!-- <a id=\"Helium\">old</a> -->\n{}", INDEX);
        let appended = append_entry(&doc, "Helium").unwrap().unwrap();
        assert_eq!(appended.total, 1);
        assert!(appended.document.contains("<li><a href=\"Helium.html\" id=\"Helium\">Helium</a></li>"));
    }

    #[tokio::test]
    async fn maintainer_writes_back_once() {
        let storage = Arc::new(MemoryStorage::with_files([("public/index.html", INDEX)]));
        let maintainer = IndexMaintainer::new(storage.clone(), "public/index.html");

        assert_eq!(
            maintainer.ensure_entry("Helium").await.unwrap(),
            IndexUpdate::Added { total: 1 }
        );
        assert_eq!(
            maintainer.ensure_entry("Helium").await.unwrap(),
            IndexUpdate::AlreadyPresent
        );
        let index = storage.get_string("public/index.html").unwrap();
        assert_eq!(index.matches("id=\"Helium\"").count(), 1);
    }

    #[tokio::test]
    async fn concurrent_updates_are_not_lost() {
        let storage = Arc::new(MemoryStorage::with_files([("public/index.html", INDEX)]));
        let maintainer = Arc::new(IndexMaintainer::new(storage.clone(), "public/index.html"));

        let names = ["Hydrogen", "Helium", "Lithium", "Beryllium", "Boron", "Helium"];
        let mut handles = Vec::new();
        for name in names {
            let maintainer = maintainer.clone();
            handles.push(tokio::spawn(async move {
                maintainer.ensure_entry(name).await.unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let index = storage.get_string("public/index.html").unwrap();
        assert!(index.contains("<span id=\"elTotal\">5</span>"));
        assert_eq!(index.matches("id=\"Helium\"").count(), 1);
    }

    #[tokio::test]
    async fn missing_index_file_is_a_storage_error() {
        let storage = Arc::new(MemoryStorage::new());
        let maintainer = IndexMaintainer::new(storage, "public/index.html");
        assert!(matches!(
            maintainer.ensure_entry("Helium").await,
            Err(IndexError::Storage(StorageError::NotFound(_)))
        ));
    }
}
