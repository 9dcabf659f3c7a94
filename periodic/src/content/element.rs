// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use log::debug;

pub const FIELD_NAME: &str = "elName";
pub const FIELD_SYMBOL: &str = "elSymbol";
pub const FIELD_NUMBER: &str = "elANum";
pub const FIELD_STATE: &str = "elState";
pub const FIELD_GROUP: &str = "elGroup";
pub const FIELD_LINK: &str = "elLink";

/// Raw form submission. A field that is absent or empty is treated as not provided.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementForm {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub atomic_number: Option<String>,
    pub state: Option<String>,
    pub group: Option<String>,
    pub link: Option<String>,
}

impl ElementForm {
    /// Parses an `application/x-www-form-urlencoded` body. The first occurrence of a
    /// repeated key wins; unknown keys are ignored and an unparsable body yields an
    /// empty form.
    pub fn from_body(body: &[u8]) -> Self {
        let pairs: Vec<(String, String)> = match serde_urlencoded::from_bytes(body) {
            Ok(pairs) => pairs,
            Err(err) => {
                debug!("Ignoring unparsable form body: {}", err);
                return Self::default();
            }
        };

        let mut form = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                FIELD_NAME => &mut form.name,
                FIELD_SYMBOL => &mut form.symbol,
                FIELD_NUMBER => &mut form.atomic_number,
                FIELD_STATE => &mut form.state,
                FIELD_GROUP => &mut form.group,
                FIELD_LINK => &mut form.link,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        form
    }

    pub fn name(&self) -> Option<&str> {
        provided(&self.name)
    }

    pub fn symbol(&self) -> Option<&str> {
        provided(&self.symbol)
    }

    pub fn atomic_number(&self) -> Option<&str> {
        provided(&self.atomic_number)
    }

    pub fn state(&self) -> Option<&str> {
        provided(&self.state)
    }

    pub fn group(&self) -> Option<&str> {
        provided(&self.group)
    }

    pub fn link(&self) -> Option<&str> {
        provided(&self.link)
    }
}

fn provided(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

/// A fully specified element. The link field is required on submission but the
/// rendered link is always derived from `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub symbol: String,
    pub atomic_number: String,
    pub state: String,
    pub group: String,
}

impl Element {
    pub fn reference_url(&self, base: &str) -> String {
        format!("{}{}", base, urlencoding::encode(&self.name))
    }
}

/// Root-relative path of the page for `name`, e.g. `public/Helium.html`.
pub fn page_path(public_dir: &str, name: &str) -> String {
    format!("{}/{}.html", public_dir.trim_end_matches('/'), name)
}
