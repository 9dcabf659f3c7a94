// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::element::{Element, page_path};
use super::index::IndexMaintainer;
use super::pending::PendingWrites;
use super::render::{RenderError, render_element};
use super::storage::{Storage, StorageError};
use crate::config::ValidatedConfig;
use log::{error, info};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertMode {
    /// POST: the page must not exist yet and is rendered from the template.
    Create,
    /// PUT: the page must exist and is re-rendered in place.
    Update,
}

impl UpsertMode {
    pub fn from_method(method: &str) -> Option<Self> {
        match method {
            "POST" => Some(UpsertMode::Create),
            "PUT" => Some(UpsertMode::Update),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum UpsertError {
    Read(StorageError),
    Render(RenderError),
}

impl fmt::Display for UpsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpsertError::Read(err) => write!(f, "Failed to read source document: {}", err),
            UpsertError::Render(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for UpsertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UpsertError::Read(err) => Some(err),
            UpsertError::Render(err) => Some(err),
        }
    }
}

/// Element page lifecycle on top of a [`Storage`].
pub struct ElementService {
    storage: Arc<dyn Storage>,
    index: Arc<IndexMaintainer>,
    pending: PendingWrites,
    public_dir: String,
    template_path: String,
    reference_url: String,
}

impl ElementService {
    pub fn new(storage: Arc<dyn Storage>, config: &ValidatedConfig) -> Self {
        let index = IndexMaintainer::new(storage.clone(), config.content.index_file.clone());
        Self {
            storage,
            index: Arc::new(index),
            pending: PendingWrites::new(),
            public_dir: config.content.public_dir.clone(),
            template_path: config.content.template_file.clone(),
            reference_url: config.content.reference_url.clone(),
        }
    }

    pub fn page_path(&self, name: &str) -> String {
        page_path(&self.public_dir, name)
    }

    pub async fn exists(&self, path: &str) -> bool {
        self.storage.exists(path).await
    }

    /// Renders the page for `element` and returns it. The page write and the index
    /// update are scheduled in the background and can be awaited with [`Self::settle`].
    pub async fn upsert(&self, element: Element, mode: UpsertMode) -> Result<String, UpsertError> {
        let target = self.page_path(&element.name);
        let source = match mode {
            UpsertMode::Create => self.template_path.clone(),
            UpsertMode::Update => target.clone(),
        };

        let template = self.storage.read_to_string(&source).await.map_err(|err| {
            error!("Failed to read {}: {}", source, err);
            UpsertError::Read(err)
        })?;
        let document = render_element(&template, &element, &self.reference_url).map_err(|err| {
            error!("Failed to render {} from {}: {}", target, source, err);
            UpsertError::Render(err)
        })?;

        let storage = self.storage.clone();
        let contents = document.clone();
        let write_target = target.clone();
        self.pending.track(async move {
            match storage.write(&write_target, contents.as_bytes()).await {
                Ok(()) => info!("Wrote {}", write_target),
                Err(err) => error!("Error writing {}: {}", write_target, err),
            }
        });

        let index = self.index.clone();
        let name = element.name;
        self.pending.track(async move {
            if let Err(err) = index.ensure_entry(&name).await {
                error!("Failed to update {} for '{}': {}", index.index_path(), name, err);
            }
        });

        Ok(document)
    }

    /// Removes the page for `name`. The index entry is kept.
    pub async fn delete(&self, name: &str) -> Result<(), StorageError> {
        let target = self.page_path(name);
        self.storage.delete(&target).await?;
        info!("Deleted {}", target);
        Ok(())
    }

    pub fn pending(&self) -> &PendingWrites {
        &self.pending
    }

    pub async fn settle(&self) {
        self.pending.settle().await;
    }
}
