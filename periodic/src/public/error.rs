// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::content::Storage;
use crate::security::ValidationError;
use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use std::fmt;
use std::sync::Arc;

/// Serves the not-found page from storage, falling back to built-in markup.
#[derive(Clone)]
pub struct ErrorRenderer {
    storage: Arc<dyn Storage>,
    not_found_path: String,
    app_name: String,
}

impl ErrorRenderer {
    pub fn new(storage: Arc<dyn Storage>, not_found_path: String, app_name: String) -> Self {
        Self {
            storage,
            not_found_path,
            app_name,
        }
    }

    pub async fn not_found(&self) -> HttpResponse {
        let html = match self.storage.read_to_string(&self.not_found_path).await {
            Ok(html) => html,
            Err(e) => {
                log::error!("Failed to read {}: {}", self.not_found_path, e);
                fallback_404_html(&self.app_name)
            }
        };

        HttpResponse::NotFound()
            .content_type("text/html")
            .insert_header(("Cache-Control", "no-cache, no-store, must-revalidate"))
            .insert_header(("Pragma", "no-cache"))
            .insert_header(("Expires", "0"))
            .body(html)
    }
}

fn fallback_404_html(app_name: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><head><title>404 - File Not Found | {}</title></head>
<body><h1>404 - Page Not Found</h1></body></html>"#,
        crate::content::markup::html_escape(app_name)
    )
}

/// Failures answered with a short message instead of a page.
#[derive(Debug)]
pub enum RequestError {
    Validation(ValidationError),
    MissingResource,
    MethodNotAllowed(String),
    ReadFailure,
    WriteFailure,
}

impl RequestError {
    pub fn status(&self) -> StatusCode {
        match self {
            RequestError::Validation(_) | RequestError::MissingResource => StatusCode::BAD_REQUEST,
            RequestError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            RequestError::ReadFailure | RequestError::WriteFailure => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn content_type(&self) -> &'static str {
        match self {
            RequestError::ReadFailure => "text/html",
            _ => "text/plain",
        }
    }

    pub fn into_response(self) -> HttpResponse {
        HttpResponse::build(self.status())
            .content_type(self.content_type())
            .body(self.to_string())
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::Validation(err) => write!(f, "{}", err),
            RequestError::MissingResource => write!(f, "The requested resource does not exist."),
            RequestError::MethodNotAllowed(method) => {
                write!(f, "{} request method is not supported.", method)
            }
            RequestError::ReadFailure => write!(f, "A read error on the server occurred."),
            RequestError::WriteFailure => write!(f, "A write error on the server occurred."),
        }
    }
}

impl std::error::Error for RequestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RequestError::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RequestError {
    fn from(err: ValidationError) -> Self {
        RequestError::Validation(err)
    }
}
