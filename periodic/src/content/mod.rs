// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub mod element;
pub mod index;
pub mod markup;
pub mod pending;
pub mod render;
pub mod service;
pub mod storage;

pub use element::{Element, ElementForm};
pub use service::{ElementService, UpsertError, UpsertMode};
pub use storage::{FsStorage, MemoryStorage, Storage, StorageError};
