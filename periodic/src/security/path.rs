// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::ContentConfig;
use log::warn;

/// True for a root-relative path that cannot leave the runtime root.
pub fn is_safe_relative_path(path: &str) -> bool {
    if path.starts_with('/') || path.contains('\\') || path.chars().any(|ch| ch.is_control()) {
        return false;
    }
    !path.split('/').any(|segment| segment == "..")
}

/// Maps a GET request path to the root-relative file it names.
///
/// The listing path maps to the index file. Any other path is percent-decoded and
/// has its leading slash removed. Only files below the public directory are
/// served; `None` means the path must never reach storage.
pub fn resolve_get_path(request_path: &str, content: &ContentConfig) -> Option<String> {
    if request_path == content.listing_path {
        return Some(content.index_file.clone());
    }

    let decoded = match urlencoding::decode(request_path) {
        Ok(decoded) => decoded,
        Err(_) => {
            warn!("Rejected undecodable request path: {}", request_path);
            return None;
        }
    };
    let relative = decoded.strip_prefix('/').unwrap_or(&decoded);
    if !is_safe_relative_path(relative) {
        warn!("🚨 SECURITY: Path traversal attempt - path: {}", request_path);
        return None;
    }
    let public_prefix = format!("{}/", content.public_dir.trim_end_matches('/'));
    if !relative.starts_with(&public_prefix) {
        return None;
    }
    Some(relative.to_string())
}
