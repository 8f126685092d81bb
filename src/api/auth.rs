// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login endpoints: redirect to the provider and handle its callback.

use axum::{
    extract::{Path, Query, State},
    http::{
        header::{LOCATION, SET_COOKIE},
        HeaderMap, StatusCode,
    },
    response::{AppendHeaders, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::csrf::{csrf_cookie, expired_csrf_cookie, read_cookie, NONCE_COOKIE, STATE_COOKIE};
use crate::auth::{AuthError, CallbackCookies, CallbackParams};
use crate::state::AppState;

/// Token type reported to clients.
const TOKEN_TYPE: &str = "bearer";

/// Response for a completed login.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    /// Signed session token to send as `Authorization: Bearer <token>`
    pub access_token: String,
    /// Always `bearer`
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: i64,
}

/// Start a login with the given provider.
///
/// Sets `state` and `nonce` cookies and redirects to the provider's
/// authorization endpoint.
#[utoipa::path(
    get,
    path = "/auth/{provider}",
    tag = "Auth",
    params(("provider" = String, Path, description = "Configured provider key, e.g. `google`")),
    responses(
        (status = 302, description = "Redirect to the identity provider"),
        (status = 400, description = "Provider not configured"),
        (status = 500, description = "Provider metadata unavailable"),
    )
)]
pub async fn start_login(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<Response, AuthError> {
    let start = state.flow.start(&provider).await?;
    let cookies = state.cookies;

    Ok((
        StatusCode::FOUND,
        AppendHeaders([
            (LOCATION, start.redirect_url.to_string()),
            (
                SET_COOKIE,
                csrf_cookie(STATE_COOKIE, &start.csrf.state, cookies.max_age, cookies.secure),
            ),
            (
                SET_COOKIE,
                csrf_cookie(NONCE_COOKIE, &start.csrf.nonce, cookies.max_age, cookies.secure),
            ),
        ]),
    )
        .into_response())
}

/// Complete a login after the provider redirects back.
///
/// Both CSRF cookies are expired in the response whatever the outcome.
#[utoipa::path(
    get,
    path = "/auth/{provider}/callback",
    tag = "Auth",
    params(
        ("provider" = String, Path, description = "Configured provider key"),
        ("code" = Option<String>, Query, description = "Authorization code"),
        ("state" = Option<String>, Query, description = "State echoed by the provider"),
        ("error" = Option<String>, Query, description = "Provider error code"),
    ),
    responses(
        (status = 200, description = "Session token issued", body = AccessTokenResponse),
        (status = 400, description = "Missing or mismatched CSRF values"),
        (status = 401, description = "Code exchange or identity token rejected"),
        (status = 500, description = "Provider failure"),
    )
)]
pub async fn login_callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(params): Query<CallbackParams>,
    headers: HeaderMap,
) -> Response {
    let cookies = CallbackCookies {
        state: read_cookie(&headers, STATE_COOKIE),
        nonce: read_cookie(&headers, NONCE_COOKIE),
    };
    let secure = state.cookies.secure;
    let clear = AppendHeaders([
        (SET_COOKIE, expired_csrf_cookie(STATE_COOKIE, secure)),
        (SET_COOKIE, expired_csrf_cookie(NONCE_COOKIE, secure)),
    ]);

    match state.flow.complete(&provider, &params, &cookies).await {
        Ok(done) => (
            clear,
            Json(AccessTokenResponse {
                access_token: done.access_token,
                token_type: TOKEN_TYPE.to_string(),
                expires_in: done.expires_in,
            }),
        )
            .into_response(),
        Err(e) => (clear, e).into_response(),
    }
}
