// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::web;

pub mod error;
pub mod handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/{path:.*}", web::route().to(handlers::dispatch));
}
