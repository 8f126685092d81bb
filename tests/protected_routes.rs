// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token enforcement on the protected routes.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use relational_auth_server::auth::SessionTokenService;

use common::*;

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

#[tokio::test]
async fn valid_token_reaches_handler() {
    let idp = MockIdp::start().await;
    let app = app(&idp);
    let token = session_service().mint(USER_EMAIL).unwrap();

    let response = get(&app, "/protected/hello", &[("authorization", &bearer(&token))]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Hello, welcome!");
}

#[tokio::test]
async fn missing_header_is_unauthorized() {
    let idp = MockIdp::start().await;
    let app = app(&idp);

    let response = get(&app, "/protected/hello", &[]).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "access token is not found");
}

#[tokio::test]
async fn tampered_token_is_unauthorized() {
    let idp = MockIdp::start().await;
    let app = app(&idp);
    let token = session_service().mint(USER_EMAIL).unwrap();

    let (signed, signature) = token.rsplit_once('.').unwrap();
    let first = if signature.starts_with('A') { 'B' } else { 'A' };
    let tampered = format!("{signed}.{first}{}", &signature[1..]);

    let response = get(&app, "/protected/me", &[("authorization", &bearer(&tampered))]).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_signed_with_other_secret_is_unauthorized() {
    let idp = MockIdp::start().await;
    let app = app(&idp);
    let other = SessionTokenService::new(b"a-completely-different-secret-value!!", SESSION_ISSUER);
    let token = other.mint(USER_EMAIL).unwrap();

    let response = get(&app, "/protected/me", &[("authorization", &bearer(&token))]).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let idp = MockIdp::start().await;
    let app = app(&idp);
    let token = session_service()
        .mint_at(USER_EMAIL, Utc::now() - Duration::hours(25))
        .unwrap();

    let response = get(&app, "/protected/me", &[("authorization", &bearer(&token))]).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_authorization_header_is_unauthorized() {
    let idp = MockIdp::start().await;
    let app = app(&idp);
    let token = session_service().mint(USER_EMAIL).unwrap();

    for header in [token.clone(), format!("Basic {token}"), "Bearer".to_string(), format!("Bearer  {token}")] {
        let response = get(&app, "/protected/me", &[("authorization", &header)]).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "header: {header}");
    }
}

#[tokio::test]
async fn public_hello_ignores_tokens() {
    let idp = MockIdp::start().await;
    let app = app(&idp);

    let response = get(&app, "/hello", &[("authorization", "Bearer garbage")]).await;
    assert_eq!(response.status(), StatusCode::OK);
}
