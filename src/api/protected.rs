// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Greeting endpoints and the current-session endpoint.

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{Auth, AuthenticatedIdentity};

/// Simple message response.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Response for GET /protected/me
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    /// Session subject (e-mail address)
    pub subject: String,
    /// Session expiry (Unix timestamp)
    pub expires_at: i64,
}

impl From<AuthenticatedIdentity> for SessionResponse {
    fn from(identity: AuthenticatedIdentity) -> Self {
        Self {
            subject: identity.subject,
            expires_at: identity.expires_at,
        }
    }
}

/// Public greeting.
#[utoipa::path(
    get,
    path = "/hello",
    tag = "Greeting",
    responses((status = 200, description = "Greeting", body = MessageResponse))
)]
pub async fn hello() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Hello, welcome!".to_string(),
    })
}

/// Greeting that requires a session token.
#[utoipa::path(
    get,
    path = "/protected/hello",
    tag = "Greeting",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Greeting", body = MessageResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn protected_hello(Auth(identity): Auth) -> Json<MessageResponse> {
    tracing::debug!(subject = %identity.subject, "protected hello");
    Json(MessageResponse {
        message: "Hello, welcome!".to_string(),
    })
}

/// The session behind the presented token.
#[utoipa::path(
    get,
    path = "/protected/me",
    tag = "Greeting",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current session", body = SessionResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn current_session(Auth(identity): Auth) -> Json<SessionResponse> {
    Json(identity.into())
}
