// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::sync::Arc;

use crate::config::ValidatedConfig;
use crate::content::{ElementService, FsStorage, Storage};
use crate::public::error::ErrorRenderer;
use crate::runtime_paths::RuntimePaths;

pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub elements: ElementService,
    pub error_renderer: ErrorRenderer,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, config: &ValidatedConfig) -> Self {
        Self {
            elements: ElementService::new(storage.clone(), config),
            error_renderer: ErrorRenderer::new(
                storage.clone(),
                config.content.not_found_file.clone(),
                config.app.name.clone(),
            ),
            storage,
        }
    }

    /// State backed by the filesystem under the runtime root.
    pub fn from_runtime(runtime_paths: &RuntimePaths, config: &ValidatedConfig) -> Self {
        Self::new(Arc::new(FsStorage::new(runtime_paths.root.clone())), config)
    }
}
