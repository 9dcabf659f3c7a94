// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::element::Element;
use super::markup::{self, MarkupError};
use std::fmt;

pub const TITLE_ID: &str = "elTitle";
pub const NAME_ID: &str = "elName";
pub const SYMBOL_ID: &str = "elSymbol";
pub const NUMBER_ID: &str = "elANum";
pub const STATE_ID: &str = "elState";
pub const GROUP_ID: &str = "elGroup";
pub const LINK_ID: &str = "elLink";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    Markup(MarkupError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Markup(err) => write!(f, "Failed to render element page: {}", err),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Markup(err) => Some(err),
        }
    }
}

impl From<MarkupError> for RenderError {
    fn from(err: MarkupError) -> Self {
        RenderError::Markup(err)
    }
}

/// Fills the template's id-addressed elements with the element's fields.
///
/// Ids missing from the template are skipped. All other markup is returned unchanged.
pub fn render_element(
    template: &str,
    element: &Element,
    reference_base: &str,
) -> Result<String, RenderError> {
    let fields = [
        (TITLE_ID, element.name.as_str()),
        (NAME_ID, element.name.as_str()),
        (SYMBOL_ID, element.symbol.as_str()),
        (NUMBER_ID, element.atomic_number.as_str()),
        (STATE_ID, element.state.as_str()),
        (GROUP_ID, element.group.as_str()),
        (LINK_ID, element.name.as_str()),
    ];

    let mut document = template.to_string();
    for (id, text) in fields {
        document = markup::set_text(&document, id, text)?;
    }
    document = markup::set_attribute(
        &document,
        LINK_ID,
        "href",
        &element.reference_url(reference_base),
    )?;
    Ok(document)
}
