// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::{BootstrapError, log_action};
use crate::runtime_paths::RuntimePaths;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const TEMPLATE_HTML: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/src/bootstrap/pages/template.html"
));
pub const INDEX_HTML: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/src/bootstrap/pages/index.html"
));
pub const NOT_FOUND_HTML: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/src/bootstrap/pages/404.html"
));
pub const STYLES_CSS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/src/bootstrap/pages/styles.css"
));

/// Seeds the template, index, not-found page and stylesheet when they are missing.
/// Returns the files that were created.
pub fn ensure_pages(runtime_paths: &RuntimePaths) -> Result<Vec<PathBuf>, BootstrapError> {
    let seeds = [
        (&runtime_paths.template_file, TEMPLATE_HTML),
        (&runtime_paths.index_file, INDEX_HTML),
        (&runtime_paths.not_found_file, NOT_FOUND_HTML),
        (&runtime_paths.stylesheet_file, STYLES_CSS),
    ];

    let mut created = Vec::new();
    for (path, contents) in seeds {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        if write_new_file(path, contents)? {
            log_action(format!("created {}", path.display()));
            created.push(path.clone());
        }
    }
    Ok(created)
}

fn write_new_file(path: &Path, contents: &str) -> Result<bool, BootstrapError> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(err) => return Err(BootstrapError::Io(err)),
    };

    file.write_all(contents.as_bytes())?;
    file.sync_all()?;
    Ok(true)
}
