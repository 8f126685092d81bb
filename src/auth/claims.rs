// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims and the authenticated identity handed to handlers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Identity-token claim used as the session subject.
///
/// The provider's `sub` is opaque and provider-specific; the e-mail address
/// is what downstream authorization keys on.
pub const SUBJECT_CLAIM: &str = "email";

/// Claims carried by a session token issued by this service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (canonical user identifier)
    pub sub: String,
    /// Issuer label of this service
    pub iss: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
}

/// A verified identity token from an external provider.
///
/// Only produced by [`IdentityTokenVerifier`](super::IdentityTokenVerifier),
/// so holding one means signature, issuer, audience and expiry all passed.
#[derive(Debug, Clone)]
pub struct IdentityAssertion {
    /// Nonce echoed by the provider
    pub nonce: Option<String>,
    /// All claims as decoded
    pub claims: Map<String, Value>,
}

impl IdentityAssertion {
    pub fn from_claims(claims: Map<String, Value>) -> Self {
        let nonce = claims.get("nonce").and_then(Value::as_str).map(str::to_string);
        Self { nonce, claims }
    }

    /// Non-empty string claim by name.
    pub fn string_claim(&self, name: &str) -> Option<&str> {
        self.claims
            .get(name)
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// Identity attached to a request after session token validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedIdentity {
    /// Session subject (e-mail address)
    pub subject: String,

    /// Token expiration (Unix timestamp)
    pub expires_at: i64,
}

impl AuthenticatedIdentity {
    pub fn from_claims(claims: SessionClaims) -> Self {
        Self {
            subject: claims.sub,
            expires_at: claims.exp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn assertion_extracts_nonce_and_email() {
        let assertion = IdentityAssertion::from_claims(claims(json!({
            "sub": "117730572023847612345",
            "nonce": "n-1",
            "email": "user@example.com",
        })));
        assert_eq!(assertion.nonce.as_deref(), Some("n-1"));
        assert_eq!(assertion.string_claim(SUBJECT_CLAIM), Some("user@example.com"));
    }

    #[test]
    fn non_string_claims_are_ignored() {
        let assertion = IdentityAssertion::from_claims(claims(json!({
            "nonce": 42,
            "email": "",
        })));
        assert!(assertion.nonce.is_none());
        assert!(assertion.string_claim(SUBJECT_CLAIM).is_none());
    }

    #[test]
    fn identity_from_session_claims() {
        let identity = AuthenticatedIdentity::from_claims(SessionClaims {
            sub: "user@example.com".to_string(),
            iss: "relational-auth".to_string(),
            iat: 1_700_000_000,
            exp: 1_700_086_400,
        });
        assert_eq!(identity.subject, "user@example.com");
        assert_eq!(identity.expires_at, 1_700_086_400);
    }
}
