// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! HTTP Basic authentication against the single configured credential pair.

use crate::config::AuthConfig;
use actix_web::HttpResponse;
use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, WWW_AUTHENTICATE};
use base64::{Engine as _, engine::general_purpose};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    Missing,
    Invalid,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Missing => write!(f, "Not Authorized: enter your username and password."),
            AuthError::Invalid => write!(
                f,
                "Not Authorized: your username and/or password are incorrect."
            ),
        }
    }
}

impl std::error::Error for AuthError {}

/// Decodes a `Basic <base64>` header value into `(username, password)`.
///
/// The password is everything after the first colon, so it may contain colons itself.
pub fn decode_credentials(header_value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = general_purpose::STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Checks the `Authorization` header. An absent or empty header counts as missing;
/// anything that does not decode to the configured pair counts as invalid.
pub fn authorize(headers: &HeaderMap, auth: &AuthConfig) -> Result<(), AuthError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Err(AuthError::Missing);
    };
    if value.is_empty() {
        return Err(AuthError::Missing);
    }
    let value = value.to_str().map_err(|_| AuthError::Invalid)?;

    match decode_credentials(value) {
        Some((username, password)) if username == auth.username && password == auth.password => {
            Ok(())
        }
        _ => Err(AuthError::Invalid),
    }
}

pub fn challenge_response(error: AuthError, realm: &str) -> HttpResponse {
    HttpResponse::Unauthorized()
        .insert_header((WWW_AUTHENTICATE, format!("Basic realm=\"{}\"", realm)))
        .insert_header((CONTENT_TYPE, "text/plain"))
        .body(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn basic(credentials: &str) -> String {
        format!("Basic {}", general_purpose::STANDARD.encode(credentials))
    }

    #[test]
    fn decodes_on_first_colon() {
        assert_eq!(
            decode_credentials(&basic("tester:tes:ting")),
            Some(("tester".to_string(), "tes:ting".to_string()))
        );
        assert_eq!(decode_credentials(&basic("nocolon")), None);
        assert_eq!(decode_credentials("Basic !!!"), None);
        assert_eq!(decode_credentials("Bearer abc"), None);
    }

    #[test]
    fn accepts_configured_pair_only() {
        let auth = AuthConfig::default();
        assert_eq!(authorize(&headers_with(&basic("tester:testing")), &auth), Ok(()));
        assert_eq!(
            authorize(&headers_with(&basic("tester:wrong")), &auth),
            Err(AuthError::Invalid)
        );
        assert_eq!(
            authorize(&headers_with(&basic("Tester:testing")), &auth),
            Err(AuthError::Invalid)
        );
        assert_eq!(
            authorize(&headers_with("Basic ###"), &auth),
            Err(AuthError::Invalid)
        );
    }

    #[test]
    fn absent_or_empty_header_is_missing() {
        let auth = AuthConfig::default();
        assert_eq!(authorize(&HeaderMap::new(), &auth), Err(AuthError::Missing));
        assert_eq!(authorize(&headers_with(""), &auth), Err(AuthError::Missing));
    }

    #[test]
    fn challenge_carries_realm() {
        let response = challenge_response(AuthError::Missing, "Secure Area");
        assert_eq!(response.status(), actix_web::http::StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(WWW_AUTHENTICATE).unwrap(),
            "Basic realm=\"Secure Area\""
        );
    }
}
