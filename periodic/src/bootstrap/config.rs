// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::{BootstrapError, log_action};
use crate::config::CONFIG_FILE_NAME;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_WORKERS: u16 = 1;

pub fn ensure_config(root: &Path) -> Result<bool, BootstrapError> {
    let config_path = root.join(CONFIG_FILE_NAME);

    if config_path.exists() {
        return Ok(false);
    }

    let contents = default_config_yaml();

    let mut file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&config_path)
    {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(err) => return Err(BootstrapError::Io(err)),
    };

    file.write_all(contents.as_bytes())?;
    file.sync_all()?;

    log_action(format!(
        "created {} (http {}, default credentials)",
        CONFIG_FILE_NAME, DEFAULT_PORT
    ));

    Ok(true)
}

fn default_config_yaml() -> String {
    format!(
        "server:\n  host: \"0.0.0.0\"\n  port: {port}\n  workers: {workers}\n\nauth:\n  username: \"tester\"\n  password: \"testing\"\n  realm: \"Secure Area\"\n\ncontent:\n  public_dir: \"public\"\n  index_file: \"public/index.html\"\n  template_file: \"template.html\"\n  not_found_file: \"public/404.html\"\n  stylesheet_file: \"public/css/styles.css\"\n  listing_path: \"/public/\"\n  mutation_path: \"/elements\"\n  reference_url: \"http://en.wikipedia.org/wiki/\"\n\nlogging:\n  level: \"info\"\n\napp:\n  name: \"Periodic\"\n",
        port = DEFAULT_PORT,
        workers = DEFAULT_WORKERS,
    )
}
