// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.
//!
//! Every variant is a per-request rejection. The `Display` text is what the
//! client sees, so it never carries provider response bodies or secrets; the
//! `String` payloads exist for logging only.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Requested provider key is not configured
    #[error("identity provider is not configured")]
    ProviderNotConfigured(String),

    /// Discovery document or JWKS could not be fetched or parsed
    #[error("identity provider metadata is unavailable")]
    DiscoveryError(String),

    /// `state` or `nonce` cookie absent on callback
    #[error("{0} cookie not found")]
    MissingCsrfCookie(&'static str),

    /// `state` query parameter does not match the cookie
    #[error("state did not match")]
    StateMismatch,

    /// Provider redirected back with an `error` parameter
    #[error("identity provider rejected the authorization request")]
    AuthorizationDenied(String),

    /// Callback without a `code` parameter
    #[error("authorization code not found")]
    MissingAuthorizationCode,

    /// Token endpoint call failed (transport or provider error)
    #[error("authorization code exchange failed")]
    CodeExchangeFailed(String),

    /// Token endpoint response had no `id_token`
    #[error("identity token not found in token response")]
    MissingIdentityToken,

    /// Identity token failed signature, issuer, audience or expiry checks
    #[error("identity token is invalid")]
    InvalidIdentityToken(String),

    /// Identity token nonce does not match the cookie
    #[error("nonce did not match")]
    NonceMismatch,

    /// Identity token lacks the claim used as session subject
    #[error("identity token is missing the '{0}' claim")]
    MissingClaim(&'static str),

    /// Session token has expired
    #[error("access token has expired")]
    TokenExpired,

    /// Session token is malformed, forged, or uses the wrong algorithm
    #[error("access token is invalid")]
    TokenInvalid,

    /// Session token has no string `sub` claim
    #[error("access token subject not found")]
    ClaimMissing,

    /// No usable `Authorization: Bearer <token>` header
    #[error("access token is not found")]
    MissingCredential,

    /// Randomness or signing failure
    #[error("internal authentication error")]
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
}

impl AuthError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::ProviderNotConfigured(_)
            | AuthError::MissingCsrfCookie(_)
            | AuthError::StateMismatch
            | AuthError::MissingAuthorizationCode => StatusCode::BAD_REQUEST,
            AuthError::AuthorizationDenied(_)
            | AuthError::CodeExchangeFailed(_)
            | AuthError::InvalidIdentityToken(_)
            | AuthError::NonceMismatch
            | AuthError::MissingClaim(_)
            | AuthError::TokenExpired
            | AuthError::TokenInvalid
            | AuthError::ClaimMissing
            | AuthError::MissingCredential => StatusCode::UNAUTHORIZED,
            AuthError::DiscoveryError(_)
            | AuthError::MissingIdentityToken
            | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = ?self, "authentication failed");
        } else {
            tracing::warn!(error = ?self, "authentication rejected");
        }
        let body = Json(AuthErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
