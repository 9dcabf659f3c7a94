// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::error::RequestError;
use crate::app_state::AppState;
use crate::config::ValidatedConfig;
use crate::content::{ElementForm, StorageError, UpsertError, UpsertMode};
use crate::security;
use crate::util::content_type_for;
use actix_web::http::Method;
use actix_web::http::header::LOCATION;
use actix_web::{HttpRequest, HttpResponse, Result, web};
use log::{debug, error, info};

/// Single entry point for every method and path. Credentials have already been
/// checked for anything but GET.
pub async fn dispatch(
    req: HttpRequest,
    body: web::Bytes,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let method = req.method().clone();
    if method == Method::GET {
        return Ok(serve_get(req.path(), &config, &app_state).await);
    }

    let form = ElementForm::from_body(&body);
    if method == Method::DELETE {
        return Ok(delete_element(&form, &config, &app_state).await);
    }

    let Some(mode) = UpsertMode::from_method(method.as_str()) else {
        return Ok(RequestError::MethodNotAllowed(method.to_string()).into_response());
    };
    if req.path() != config.content.mutation_path {
        debug!("{} to unknown path {}", method, req.path());
        return Ok(app_state.error_renderer.not_found().await);
    }

    Ok(upsert_element(&form, mode, &config, &app_state).await)
}

async fn serve_get(path: &str, config: &ValidatedConfig, app_state: &AppState) -> HttpResponse {
    let resolved = security::resolve_get_path(path, &config.content);
    let target = match resolved {
        Some(target) if app_state.storage.exists(&target).await => target,
        _ => {
            if path == "/" {
                return HttpResponse::MovedPermanently()
                    .insert_header((LOCATION, config.content.listing_path.as_str()))
                    .finish();
            }
            return app_state.error_renderer.not_found().await;
        }
    };

    match app_state.storage.read(&target).await {
        Ok(bytes) => HttpResponse::Ok()
            .content_type(content_type_for(&target, &config.content.stylesheet_file))
            .body(bytes),
        Err(StorageError::NotFound(_)) => app_state.error_renderer.not_found().await,
        Err(e) => {
            error!("Failed to read {}: {}", target, e);
            RequestError::ReadFailure.into_response()
        }
    }
}

async fn delete_element(
    form: &ElementForm,
    config: &ValidatedConfig,
    app_state: &AppState,
) -> HttpResponse {
    let Some(name) = form
        .name()
        .filter(|name| security::validate_element_name(name).is_ok())
    else {
        return RequestError::MissingResource.into_response();
    };

    let target = app_state.elements.page_path(name);
    if security::check_reserved_page(&target, &config.content).is_err()
        || !app_state.elements.exists(&target).await
    {
        return RequestError::MissingResource.into_response();
    }

    match app_state.elements.delete(name).await {
        Ok(()) => HttpResponse::build(actix_web::http::StatusCode::RESET_CONTENT)
            .content_type("text/plain")
            .body("File deletion succeeded."),
        Err(e) => {
            error!("Failed to delete {}: {}", target, e);
            RequestError::WriteFailure.into_response()
        }
    }
}

async fn upsert_element(
    form: &ElementForm,
    mode: UpsertMode,
    config: &ValidatedConfig,
    app_state: &AppState,
) -> HttpResponse {
    let element = match security::validate_fields(form) {
        Ok(element) => element,
        Err(e) => return RequestError::from(e).into_response(),
    };

    let target = app_state.elements.page_path(&element.name);
    if let Err(e) = security::check_reserved_page(&target, &config.content) {
        return RequestError::from(e).into_response();
    }
    let exists = app_state.elements.exists(&target).await;
    if let Err(e) = security::check_precondition(mode, &target, exists) {
        return RequestError::from(e).into_response();
    }

    match app_state.elements.upsert(element, mode).await {
        Ok(document) => {
            info!("{:?} {}", mode, target);
            HttpResponse::Created()
                .content_type("text/html")
                .body(document)
        }
        Err(UpsertError::Read(_) | UpsertError::Render(_)) => {
            RequestError::ReadFailure.into_response()
        }
    }
}
