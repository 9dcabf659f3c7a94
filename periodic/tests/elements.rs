// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod common;

use actix_web::http::header::CONTENT_TYPE;
use actix_web::http::{Method, StatusCode};
use actix_web::test;
use common::{HELIUM, form_body, helium_with, mutation};

#[actix_web::test]
async fn post_creates_helium_page_and_index_entry() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(&harness)).await;

    let req = mutation(Method::POST, "/elements", form_body(&HELIUM)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(resp.headers().get(CONTENT_TYPE).unwrap(), "text/html");
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains(r#"<title id="elTitle">Helium</title>"#));
    assert!(body.contains(r#"<h2 id="elSymbol">He</h2>"#));
    assert!(body.contains(r#"<span id="elANum">2</span>"#));
    assert!(body.contains(r#"<span id="elGroup">Noble Gas</span>"#));
    assert!(body.contains(r#"href="http://en.wikipedia.org/wiki/Helium""#));

    harness.settle().await;
    assert!(harness.page_exists("Helium"));
    assert_eq!(harness.read("public/Helium.html"), body);

    let index = harness.index();
    assert_eq!(index.matches(r#"id="Helium""#).count(), 1);
    assert!(index.contains(r#"<li><a href="Helium.html" id="Helium">Helium</a></li>"#));
    assert!(index.contains(r#"<span id="elTotal">1</span>"#));
}

#[actix_web::test]
async fn post_for_existing_page_is_rejected() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(&harness)).await;

    let req = mutation(Method::POST, "/elements", form_body(&HELIUM)).to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CREATED
    );
    harness.settle().await;

    let req = mutation(Method::POST, "/elements", form_body(&HELIUM)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = test::read_body(resp).await;
    assert_eq!(body, "public/Helium.html already exists.");
}

#[actix_web::test]
async fn put_requires_existing_page() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(&harness)).await;

    let req = mutation(Method::PUT, "/elements", form_body(&HELIUM)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = test::read_body(resp).await;
    assert_eq!(body, "public/Helium.html does not exist.");

    harness.settle().await;
    assert!(!harness.page_exists("Helium"));
    assert!(!harness.index().contains(r#"id="Helium""#));
}

#[actix_web::test]
async fn put_rewrites_fields_and_keeps_custom_markup() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(&harness)).await;

    let req = mutation(Method::POST, "/elements", form_body(&HELIUM)).to_request();
    test::call_service(&app, req).await;
    harness.settle().await;

    let page = harness.read("public/Helium.html");
    let customized = page.replace("</body>", "<footer id=\"note\">hand edited</footer>\n</body>");
    harness
        .fixture
        .write("public/Helium.html", &customized)
        .unwrap();

    let req = mutation(
        Method::PUT,
        "/elements",
        helium_with("elState", Some("Liquid")),
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains(r#"<span id="elState">Liquid</span>"#));
    assert!(body.contains(r#"<footer id="note">hand edited</footer>"#));

    harness.settle().await;
    assert_eq!(harness.read("public/Helium.html"), body);
    assert_eq!(customized.replace(">Gas<", ">Liquid<"), body);

    let index = harness.index();
    assert_eq!(index.matches(r#"id="Helium""#).count(), 1);
    assert!(index.contains(r#"<span id="elTotal">1</span>"#));
}

#[actix_web::test]
async fn index_total_tracks_every_new_element() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(&harness)).await;

    for name in ["Hydrogen", "Helium", "Lithium"] {
        let req = mutation(Method::POST, "/elements", helium_with("elName", Some(name)))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::CREATED
        );
    }
    harness.settle().await;

    let index = harness.index();
    assert!(index.contains(r#"<span id="elTotal">3</span>"#));
    let hydrogen = index.find(r#"id="Hydrogen""#).unwrap();
    let helium = index.find(r#"id="Helium""#).unwrap();
    let lithium = index.find(r#"id="Lithium""#).unwrap();
    assert!(hydrogen < helium && helium < lithium);
}

#[actix_web::test]
async fn missing_fields_are_reported_in_order() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(&harness)).await;

    let cases = [
        ("elName", "Element Name must be provided."),
        ("elSymbol", "Element Symbol must be provided."),
        ("elANum", "Element Number must be provided."),
        ("elState", "Element State must be provided."),
        ("elGroup", "Element Group must be provided."),
        ("elLink", "Element Link must be provided."),
    ];
    for (field, expected) in cases {
        for value in [None, Some("")] {
            let req = mutation(Method::POST, "/elements", helium_with(field, value)).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body = test::read_body(resp).await;
            assert_eq!(body, expected);
        }
    }

    let req = mutation(Method::PUT, "/elements", String::new()).to_request();
    let body = test::read_body(test::call_service(&app, req).await).await;
    assert_eq!(body, "Element Name must be provided.");

    harness.settle().await;
    assert!(!harness.page_exists("Helium"));
}

#[actix_web::test]
async fn unsafe_name_never_reaches_storage() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(&harness)).await;

    for name in ["../template", "a/b", ".."] {
        let req = mutation(Method::POST, "/elements", helium_with("elName", Some(name)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = test::read_body(resp).await;
        assert_eq!(body, "Element Name is invalid.");
    }

    harness.settle().await;
    assert_eq!(
        harness.read("template.html"),
        periodic::bootstrap::pages::TEMPLATE_HTML
    );
}

#[actix_web::test]
async fn missing_template_is_a_read_error() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(&harness)).await;
    std::fs::remove_file(&harness.runtime_paths.template_file).unwrap();

    let req = mutation(Method::POST, "/elements", form_body(&HELIUM)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.headers().get(CONTENT_TYPE).unwrap(), "text/html");
    let body = test::read_body(resp).await;
    assert_eq!(body, "A read error on the server occurred.");

    harness.settle().await;
    assert!(!harness.page_exists("Helium"));
    assert!(!harness.index().contains(r#"id="Helium""#));
}

#[actix_web::test]
async fn unsupported_method_is_rejected_after_auth() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(&harness)).await;

    let req = mutation(Method::PATCH, "/elements", form_body(&HELIUM)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body = test::read_body(resp).await;
    assert_eq!(body, "PATCH request method is not supported.");
}

#[actix_web::test]
async fn mutation_on_other_path_serves_not_found_page() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(&harness)).await;

    let req = mutation(Method::POST, "/other", form_body(&HELIUM)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert_eq!(body, harness.read("public/404.html"));

    harness.settle().await;
    assert!(!harness.page_exists("Helium"));
}

#[actix_web::test]
async fn listing_and_not_found_pages_are_not_element_names() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(&harness)).await;
    let index_before = harness.index();

    for method in [Method::POST, Method::PUT] {
        for name in ["index", "404"] {
            let req = mutation(method.clone(), "/elements", helium_with("elName", Some(name)))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body = test::read_body(resp).await;
            assert_eq!(body, "Element Name is invalid.");
        }
    }

    harness.settle().await;
    assert_eq!(harness.index(), index_before);
    assert_eq!(
        harness.read("public/404.html"),
        periodic::bootstrap::pages::NOT_FOUND_HTML
    );
}
