// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::{CONFIG_FILE_NAME, ConfigError, ValidatedConfig};
use std::fs;
use std::path::{Path, PathBuf};

/// Absolute locations of everything the service reads or writes.
#[derive(Debug, Clone)]
pub struct RuntimePaths {
    pub root: PathBuf,
    pub config_file: PathBuf,
    pub public_dir: PathBuf,
    pub index_file: PathBuf,
    pub template_file: PathBuf,
    pub not_found_file: PathBuf,
    pub stylesheet_file: PathBuf,
}

impl RuntimePaths {
    pub fn from_root(root: &Path, config: &ValidatedConfig) -> Result<Self, ConfigError> {
        let root_path = if root.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            root.to_path_buf()
        };

        if !root_path.exists() {
            fs::create_dir_all(&root_path).map_err(|e| {
                ConfigError::ValidationError(format!(
                    "Failed to create runtime root '{}': {}",
                    root_path.display(),
                    e
                ))
            })?;
        }

        let root_canonical = root_path.canonicalize().map_err(|e| {
            ConfigError::ValidationError(format!(
                "Failed to canonicalize runtime root '{}': {}",
                root_path.display(),
                e
            ))
        })?;

        let public_dir = root_canonical.join(&config.content.public_dir);
        ensure_dir_exists(&public_dir)?;

        let stylesheet_file = root_canonical.join(&config.content.stylesheet_file);
        if let Some(parent) = stylesheet_file.parent() {
            ensure_dir_exists(parent)?;
        }

        Ok(Self {
            config_file: root_canonical.join(CONFIG_FILE_NAME),
            public_dir,
            index_file: root_canonical.join(&config.content.index_file),
            template_file: root_canonical.join(&config.content.template_file),
            not_found_file: root_canonical.join(&config.content.not_found_file),
            stylesheet_file,
            root: root_canonical,
        })
    }
}

fn ensure_dir_exists(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        if path.is_dir() {
            return Ok(());
        }
        return Err(ConfigError::ValidationError(format!(
            "Expected directory but found file: {}",
            path.display()
        )));
    }

    fs::create_dir_all(path).map_err(|e| {
        ConfigError::ValidationError(format!(
            "Failed to create directory '{}': {}",
            path.display(),
            e
        ))
    })
}
