// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use log::{LevelFilter, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path};

pub const CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Debug)]
pub enum ConfigError {
    LoadError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::LoadError(msg) => write!(f, "Configuration load error: {}", msg),
            ConfigError::ValidationError(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_workers() -> usize {
    1
}

/// The single credential pair accepted for create, update and delete requests.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
    #[serde(default = "default_realm")]
    pub realm: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            password: default_password(),
            realm: default_realm(),
        }
    }
}

fn default_username() -> String {
    "tester".to_string()
}

fn default_password() -> String {
    "testing".to_string()
}

fn default_realm() -> String {
    "Secure Area".to_string()
}

/// Locations of the persisted documents, relative to the runtime root, plus the
/// public routes that address them.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ContentConfig {
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
    #[serde(default = "default_index_file")]
    pub index_file: String,
    #[serde(default = "default_template_file")]
    pub template_file: String,
    #[serde(default = "default_not_found_file")]
    pub not_found_file: String,
    #[serde(default = "default_stylesheet_file")]
    pub stylesheet_file: String,
    #[serde(default = "default_listing_path")]
    pub listing_path: String,
    #[serde(default = "default_mutation_path")]
    pub mutation_path: String,
    #[serde(default = "default_reference_url")]
    pub reference_url: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            public_dir: default_public_dir(),
            index_file: default_index_file(),
            template_file: default_template_file(),
            not_found_file: default_not_found_file(),
            stylesheet_file: default_stylesheet_file(),
            listing_path: default_listing_path(),
            mutation_path: default_mutation_path(),
            reference_url: default_reference_url(),
        }
    }
}

fn default_public_dir() -> String {
    "public".to_string()
}

fn default_index_file() -> String {
    "public/index.html".to_string()
}

fn default_template_file() -> String {
    "template.html".to_string()
}

fn default_not_found_file() -> String {
    "public/404.html".to_string()
}

fn default_stylesheet_file() -> String {
    "public/css/styles.css".to_string()
}

fn default_listing_path() -> String {
    "/public/".to_string()
}

fn default_mutation_path() -> String {
    "/elements".to_string()
}

fn default_reference_url() -> String {
    "http://en.wikipedia.org/wiki/".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
        }
    }
}

fn default_app_name() -> String {
    "Periodic".to_string()
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub app: AppConfig,
}

#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub content: ContentConfig,
    pub logging: LoggingConfig,
    pub app: AppConfig,
}

impl ValidatedConfig {
    pub fn log_level_filter(&self) -> LevelFilter {
        parse_level(&self.logging.level).unwrap_or(LevelFilter::Info)
    }
}

fn parse_level(level: &str) -> Option<LevelFilter> {
    match level.to_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "trace" => Some(LevelFilter::Trace),
        "debug" => Some(LevelFilter::Debug),
        "info" => Some(LevelFilter::Info),
        "warn" => Some(LevelFilter::Warn),
        "error" => Some(LevelFilter::Error),
        _ => None,
    }
}

impl Config {
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let config_path = root.join(CONFIG_FILE_NAME);
        let config_content = fs::read_to_string(&config_path).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        Self::parse(&config_content).map_err(|e| match e {
            ConfigError::LoadError(msg) => ConfigError::LoadError(format!(
                "Failed to parse config file '{}': {}",
                config_path.display(),
                msg
            )),
            other => other,
        })
    }

    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        // An empty file deserializes to unit, not to a mapping.
        if raw.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(raw).map_err(|e| ConfigError::LoadError(e.to_string()))
    }

    /// Loads and validates configuration at startup. If validation fails, the application should not start.
    pub fn load_and_validate(root: &Path) -> Result<ValidatedConfig, ConfigError> {
        Self::load(root)?.validate()
    }

    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        Self::validate_server(&self.server)?;
        Self::validate_auth(&self.auth)?;
        Self::validate_content(&self.content)?;
        Self::validate_logging(&self.logging)?;

        Ok(ValidatedConfig {
            server: self.server,
            auth: self.auth,
            content: self.content,
            logging: self.logging,
            app: self.app,
        })
    }

    fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
        if server.host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "server.host cannot be empty".to_string(),
            ));
        }
        if server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be greater than 0".to_string(),
            ));
        }
        if server.workers == 0 {
            return Err(ConfigError::ValidationError(
                "server.workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_auth(auth: &AuthConfig) -> Result<(), ConfigError> {
        if auth.username.is_empty() {
            return Err(ConfigError::ValidationError(
                "auth.username cannot be empty".to_string(),
            ));
        }
        // Basic credentials are split on the first colon.
        if auth.username.contains(':') {
            return Err(ConfigError::ValidationError(
                "auth.username cannot contain ':'".to_string(),
            ));
        }
        if auth.realm.contains('"') {
            return Err(ConfigError::ValidationError(
                "auth.realm cannot contain '\"'".to_string(),
            ));
        }
        if auth.username == default_username() && auth.password == default_password() {
            warn!("auth uses the built-in default credentials; change them in config.yaml");
        }
        Ok(())
    }

    fn validate_content(content: &ContentConfig) -> Result<(), ConfigError> {
        let files = [
            ("content.public_dir", &content.public_dir),
            ("content.index_file", &content.index_file),
            ("content.template_file", &content.template_file),
            ("content.not_found_file", &content.not_found_file),
            ("content.stylesheet_file", &content.stylesheet_file),
        ];
        for (key, value) in files {
            if !is_plain_relative(value) {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be a relative path without '..' segments, got: '{}'",
                    key, value
                )));
            }
        }

        for (key, value) in [
            ("content.listing_path", &content.listing_path),
            ("content.mutation_path", &content.mutation_path),
        ] {
            if !value.starts_with('/') {
                return Err(ConfigError::ValidationError(format!(
                    "{} must start with '/', got: '{}'",
                    key, value
                )));
            }
        }

        let url = &content.reference_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::ValidationError(
                "content.reference_url must start with http:// or https://".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        if parse_level(&logging.level).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of off, error, warn, info, debug, trace, got: {}",
                logging.level
            )));
        }
        Ok(())
    }
}

fn is_plain_relative(value: &str) -> bool {
    let path = Path::new(value);
    !value.trim().is_empty()
        && !value.contains('\\')
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}
