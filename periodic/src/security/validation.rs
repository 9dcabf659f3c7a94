// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::ContentConfig;
use crate::content::{Element, ElementForm, UpsertMode};
use std::fmt;

/// Required form fields in the order they are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementField {
    Name,
    Symbol,
    Number,
    State,
    Group,
    Link,
}

impl ElementField {
    pub fn label(self) -> &'static str {
        match self {
            ElementField::Name => "Name",
            ElementField::Symbol => "Symbol",
            ElementField::Number => "Number",
            ElementField::State => "State",
            ElementField::Group => "Group",
            ElementField::Link => "Link",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Missing(ElementField),
    InvalidName,
    AlreadyExists(String),
    DoesNotExist(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Missing(field) => {
                write!(f, "Element {} must be provided.", field.label())
            }
            ValidationError::InvalidName => write!(f, "Element Name is invalid."),
            ValidationError::AlreadyExists(path) => write!(f, "{} already exists.", path),
            ValidationError::DoesNotExist(path) => write!(f, "{} does not exist.", path),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Names become a file stem and an index anchor id, so they must stay inside `public/`.
pub fn validate_element_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.chars().any(|ch| ch.is_control())
    {
        return Err(ValidationError::InvalidName);
    }
    Ok(())
}

/// Checks that every field is present, first missing field wins, then the name.
pub fn validate_fields(form: &ElementForm) -> Result<Element, ValidationError> {
    let name = required(form.name(), ElementField::Name)?;
    let symbol = required(form.symbol(), ElementField::Symbol)?;
    let atomic_number = required(form.atomic_number(), ElementField::Number)?;
    let state = required(form.state(), ElementField::State)?;
    let group = required(form.group(), ElementField::Group)?;
    required(form.link(), ElementField::Link)?;
    validate_element_name(name)?;

    Ok(Element {
        name: name.to_string(),
        symbol: symbol.to_string(),
        atomic_number: atomic_number.to_string(),
        state: state.to_string(),
        group: group.to_string(),
    })
}

fn required(value: Option<&str>, field: ElementField) -> Result<&str, ValidationError> {
    value.ok_or(ValidationError::Missing(field))
}

/// The listing and the not-found page share `public/` with element pages but are
/// never element pages themselves.
pub fn check_reserved_page(target: &str, content: &ContentConfig) -> Result<(), ValidationError> {
    if target == content.index_file || target == content.not_found_file {
        return Err(ValidationError::InvalidName);
    }
    Ok(())
}

/// Create needs the target absent, update needs it present.
pub fn check_precondition(
    mode: UpsertMode,
    target: &str,
    exists: bool,
) -> Result<(), ValidationError> {
    match (mode, exists) {
        (UpsertMode::Create, true) => Err(ValidationError::AlreadyExists(target.to_string())),
        (UpsertMode::Update, false) => Err(ValidationError::DoesNotExist(target.to_string())),
        _ => Ok(()),
    }
}
