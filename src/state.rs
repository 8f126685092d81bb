// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::csrf::DEFAULT_CSRF_MAX_AGE;
use crate::auth::{AuthError, AuthorizationFlow, CsrfGenerator, ProviderRegistry, SessionTokenService};
use crate::config::AppConfig;

/// Cookie settings for the `state`/`nonce` cookies.
#[derive(Debug, Clone, Copy)]
pub struct CookieSettings {
    /// `Max-Age` in seconds
    pub max_age: i64,
    /// Add the `Secure` attribute
    pub secure: bool,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            max_age: DEFAULT_CSRF_MAX_AGE,
            secure: false,
        }
    }
}

/// Shared, read-only application state.
#[derive(Clone)]
pub struct AppState {
    pub flow: AuthorizationFlow,
    pub registry: Arc<ProviderRegistry>,
    pub sessions: Arc<SessionTokenService>,
    pub cookies: CookieSettings,
}

impl AppState {
    pub fn new(
        registry: ProviderRegistry,
        sessions: SessionTokenService,
        csrf: CsrfGenerator,
        cookies: CookieSettings,
    ) -> Self {
        let registry = Arc::new(registry);
        let sessions = Arc::new(sessions);
        Self {
            flow: AuthorizationFlow::new(registry.clone(), sessions.clone(), csrf),
            registry,
            sessions,
            cookies,
        }
    }

    /// Build every component from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, AuthError> {
        let registry = ProviderRegistry::new(config.providers.clone(), config.idp_http_timeout)?;
        let ttl = chrono::Duration::from_std(config.session_ttl)
            .map_err(|e| AuthError::Internal(format!("session ttl out of range: {e}")))?;
        let sessions =
            SessionTokenService::new(&config.session_secret, config.session_issuer.clone()).with_ttl(ttl);

        Ok(Self::new(
            registry,
            sessions,
            CsrfGenerator::new(config.csrf_bytes),
            CookieSettings {
                max_age: config.csrf_cookie_max_age,
                secure: config.secure_cookies(),
            },
        ))
    }
}
