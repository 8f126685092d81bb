// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Guards a router subtree: every request must carry a session token minted
//! by this service. On success the [`AuthenticatedIdentity`] is inserted into
//! request extensions for the [`Auth`](super::Auth) extractor; on failure the
//! request is answered with 401 and the inner handler never runs.
//!
//! ```rust,ignore
//! let protected = Router::new()
//!     .route("/hello", get(hello))
//!     .layer(axum::middleware::from_fn_with_state(
//!         state.sessions.clone(),
//!         auth_middleware,
//!     ));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{AuthError, AuthenticatedIdentity, SessionTokenService};

/// Authentication middleware function.
pub async fn auth_middleware(
    State(sessions): State<Arc<SessionTokenService>>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = match authenticate(request.headers(), &sessions) {
        Ok(identity) => identity,
        Err(e) => return e.into_response(),
    };

    tracing::debug!(subject = %identity.subject, "request authenticated");
    request.extensions_mut().insert(identity);
    next.run(request).await
}

/// Validate the bearer token in `headers`.
pub fn authenticate(
    headers: &HeaderMap,
    sessions: &SessionTokenService,
) -> Result<AuthenticatedIdentity, AuthError> {
    let token = bearer_token(headers)?;
    let claims = sessions.parse(token)?;
    Ok(AuthenticatedIdentity::from_claims(claims))
}

/// Extract `<token>` from `Authorization: Bearer <token>`.
///
/// The header must split on a single space into exactly two non-empty parts.
/// The scheme is case-insensitive (RFC 7235 §2.1).
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingCredential)?
        .to_str()
        .map_err(|_| AuthError::MissingCredential)?;

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None)
            if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() =>
        {
            Ok(token)
        }
        _ => Err(AuthError::MissingCredential),
    }
}
