// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub const TEXT_HTML: &str = "text/html";
pub const TEXT_CSS: &str = "text/css";

/// Only the configured stylesheet is served as CSS; every other public file is HTML.
pub fn content_type_for(path: &str, stylesheet_path: &str) -> &'static str {
    if path == stylesheet_path {
        TEXT_CSS
    } else {
        TEXT_HTML
    }
}
