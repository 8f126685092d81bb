// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session tokens issued by this service.
//!
//! Tokens are compact JWS signed with a server-held HMAC secret. Parsing only
//! accepts the HMAC family, so a token re-signed with an asymmetric or `none`
//! algorithm header is rejected before its claims are looked at.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Deserialize;
use serde_json::Value;

use super::{AuthError, SessionClaims};

/// Default session lifetime (24 hours).
pub const DEFAULT_SESSION_TTL: Duration = Duration::hours(24);

/// Default issuer label.
pub const DEFAULT_SESSION_ISSUER: &str = "relational-auth";

/// Algorithm used for minting.
const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Algorithms accepted when parsing.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Claims as they come off the wire, before `sub` is checked.
#[derive(Debug, Deserialize)]
struct RawSessionClaims {
    #[serde(default)]
    sub: Option<Value>,
    iss: String,
    #[serde(default)]
    iat: i64,
    exp: i64,
}

/// Mints and parses session tokens.
#[derive(Clone)]
pub struct SessionTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl: Duration,
}

impl fmt::Debug for SessionTokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokenService")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionTokenService {
    pub fn new(secret: &[u8], issuer: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: issuer.into(),
            ttl: DEFAULT_SESSION_TTL,
        }
    }

    /// Override the session lifetime.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a token for `subject`, valid from now for the configured lifetime.
    pub fn mint(&self, subject: &str) -> Result<String, AuthError> {
        self.mint_at(subject, Utc::now())
    }

    /// Mint a token as if the clock read `issued_at`.
    pub fn mint_at(&self, subject: &str, issued_at: DateTime<Utc>) -> Result<String, AuthError> {
        if subject.is_empty() {
            return Err(AuthError::ClaimMissing);
        }

        let claims = SessionClaims {
            sub: subject.to_string(),
            iss: self.issuer.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("failed to sign session token: {e}")))
    }

    /// Verify a token and return its claims.
    pub fn parse(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        let data = decode::<RawSessionClaims>(token, &self.decoding_key, &validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid,
            },
        )?;

        let raw = data.claims;
        let sub = raw
            .sub
            .as_ref()
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or(AuthError::ClaimMissing)?;

        Ok(SessionClaims {
            sub: sub.to_string(),
            iss: raw.iss,
            iat: raw.iat,
            exp: raw.exp,
        })
    }
}
