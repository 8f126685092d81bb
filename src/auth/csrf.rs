// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! CSRF `state`/`nonce` generation and the cookies that carry them.
//!
//! Both values live only in the browser between the start and callback
//! steps. Nothing is stored server-side, so either step can be served by
//! any replica.

use axum::http::{header::COOKIE, HeaderMap};
use base64ct::{Base64UrlUnpadded, Encoding};
use ring::rand::{SecureRandom, SystemRandom};
use subtle::ConstantTimeEq;

use super::AuthError;

/// Cookie carrying the `state` value.
pub const STATE_COOKIE: &str = "state";

/// Cookie carrying the `nonce` value.
pub const NONCE_COOKIE: &str = "nonce";

/// Path the CSRF cookies are scoped to.
pub const CSRF_COOKIE_PATH: &str = "/auth";

/// Default random bytes per value (22 base64url characters).
pub const DEFAULT_CSRF_BYTES: usize = 16;

/// Default cookie lifetime in seconds (1 hour).
pub const DEFAULT_CSRF_MAX_AGE: i64 = 3600;

/// A `state`/`nonce` pair for one in-flight authorization flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfPair {
    pub state: String,
    pub nonce: String,
}

/// Generates opaque random strings from the OS CSPRNG.
#[derive(Clone)]
pub struct CsrfGenerator {
    rng: SystemRandom,
    byte_len: usize,
}

impl Default for CsrfGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CSRF_BYTES)
    }
}

impl CsrfGenerator {
    pub fn new(byte_len: usize) -> Self {
        Self {
            rng: SystemRandom::new(),
            byte_len,
        }
    }

    /// Random base64url (unpadded) string of the configured byte length.
    pub fn random_string(&self) -> Result<String, AuthError> {
        let mut buf = vec![0u8; self.byte_len];
        self.rng
            .fill(&mut buf)
            .map_err(|_| AuthError::Internal("system random source failed".to_string()))?;
        Ok(Base64UrlUnpadded::encode_string(&buf))
    }

    /// Fresh pair for a new flow.
    pub fn pair(&self) -> Result<CsrfPair, AuthError> {
        Ok(CsrfPair {
            state: self.random_string()?,
            nonce: self.random_string()?,
        })
    }
}

/// Byte-equality that does not short-circuit on the first differing byte.
///
/// Length mismatch is rejected outright; lengths of these values are public.
pub fn values_match(expected: &str, actual: &str) -> bool {
    expected.as_bytes().ct_eq(actual.as_bytes()).into()
}

/// `Set-Cookie` value for a CSRF cookie.
pub fn csrf_cookie(name: &str, value: &str, max_age: i64, secure: bool) -> String {
    let secure_flag = if secure { "; Secure" } else { "" };
    format!(
        "{name}={value}; Path={CSRF_COOKIE_PATH}; Max-Age={max_age}; HttpOnly{secure_flag}; SameSite=Lax"
    )
}

/// `Set-Cookie` value that expires a CSRF cookie immediately.
pub fn expired_csrf_cookie(name: &str, secure: bool) -> String {
    csrf_cookie(name, "", 0, secure)
}

/// Read a cookie value from every `Cookie` header on the request.
///
/// A present but empty cookie yields `Some("")`.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
}
