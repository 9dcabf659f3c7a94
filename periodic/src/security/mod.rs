// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod path;
mod validation;

pub use path::{is_safe_relative_path, resolve_get_path};
pub use validation::{
    ElementField, ValidationError, check_precondition, check_reserved_page, validate_element_name,
    validate_fields,
};
