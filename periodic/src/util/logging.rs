// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use log::{LevelFilter, SetLoggerError};
use std::io::Write;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f UTC";

/// Builds the process logger: stdout, `RUST_LOG` overrides, then the configured level.
pub fn build_logger(level: LevelFilter) -> env_logger::Logger {
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .target(env_logger::Target::Stdout)
        .format(|buf, record| {
            writeln!(
                buf,
                "{}",
                format_line(
                    &chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string(),
                    record.level(),
                    record.target(),
                    record.args(),
                )
            )
        })
        .build()
}

pub fn init_logger(level: LevelFilter) -> Result<(), SetLoggerError> {
    let logger = build_logger(level);
    let max_level = logger.filter();
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(max_level);
    Ok(())
}

fn format_line(
    timestamp: &str,
    level: log::Level,
    target: &str,
    args: &std::fmt::Arguments<'_>,
) -> String {
    format!("{} [{}] {}: {}", timestamp, level, target, args)
}
