// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use actix_web::body::{BoxBody, EitherBody};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::Method;
use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE};
use actix_web::{App, test, web};
use base64::{Engine as _, engine::general_purpose};
use periodic::app_state::AppState;
use periodic::bootstrap::bootstrap_runtime;
use periodic::config::ValidatedConfig;
use periodic::iam::BasicAuthMiddleware;
use periodic::public;
use periodic::runtime_paths::RuntimePaths;
use periodic::util::test_fixtures::TestFixtureRoot;
use std::sync::Arc;

pub const USERNAME: &str = "tester";
pub const PASSWORD: &str = "testing";

pub const HELIUM: [(&str, &str); 6] = [
    ("elName", "Helium"),
    ("elSymbol", "He"),
    ("elANum", "2"),
    ("elState", "Gas"),
    ("elGroup", "Noble Gas"),
    ("elLink", "Helium"),
];

pub struct TestHarness {
    pub fixture: TestFixtureRoot,
    pub config: Arc<ValidatedConfig>,
    pub runtime_paths: RuntimePaths,
    pub app_state: Arc<AppState>,
}

impl TestHarness {
    pub fn new() -> Self {
        let fixture = TestFixtureRoot::new_unique("periodic-test-suite").expect("fixture root");
        let bootstrap = bootstrap_runtime(fixture.path()).expect("bootstrap");
        let app_state = Arc::new(AppState::from_runtime(
            &bootstrap.runtime_paths,
            &bootstrap.validated_config,
        ));

        Self {
            fixture,
            config: Arc::new(bootstrap.validated_config),
            runtime_paths: bootstrap.runtime_paths,
            app_state,
        }
    }

    /// Waits for background page and index writes.
    pub async fn settle(&self) {
        self.app_state.elements.settle().await;
    }

    pub fn read(&self, relative: &str) -> String {
        self.fixture.read(relative).expect("read fixture file")
    }

    pub fn page_exists(&self, name: &str) -> bool {
        self.fixture.page(name).is_file()
    }

    pub fn index(&self) -> String {
        self.read("public/index.html")
    }
}

pub fn build_test_app(
    harness: &TestHarness,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<EitherBody<BoxBody>>,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    build_app(harness.config.clone(), harness.app_state.clone())
}

/// App over an arbitrary state, e.g. one backed by memory storage.
pub fn build_app(
    config: Arc<ValidatedConfig>,
    app_state: Arc<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<EitherBody<BoxBody>>,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    let auth = Arc::new(config.auth.clone());
    App::new()
        .app_data(web::Data::from(config))
        .app_data(web::Data::from(app_state))
        .wrap(BasicAuthMiddleware::new(auth))
        .configure(public::configure)
}

pub fn basic_auth(username: &str, password: &str) -> String {
    let encoded = general_purpose::STANDARD.encode(format!("{}:{}", username, password));
    format!("Basic {}", encoded)
}

pub fn form_body(fields: &[(&str, &str)]) -> String {
    serde_urlencoded::to_string(fields).expect("form body")
}

/// Form with `field` replaced by `value`, or dropped when `value` is `None`.
pub fn helium_with(field: &str, value: Option<&str>) -> String {
    let fields: Vec<(&str, &str)> = HELIUM
        .iter()
        .filter_map(|&(key, current)| {
            if key == field {
                value.map(|value| (key, value))
            } else {
                Some((key, current))
            }
        })
        .collect();
    form_body(&fields)
}

/// Authenticated form request.
pub fn mutation(method: Method, uri: &str, body: String) -> test::TestRequest {
    test::TestRequest::default()
        .method(method)
        .uri(uri)
        .insert_header((AUTHORIZATION, basic_auth(USERNAME, PASSWORD)))
        .insert_header((CONTENT_TYPE, "application/x-www-form-urlencoded"))
        .set_payload(body)
}
