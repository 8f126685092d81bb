// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization code flow controller.
//!
//! A flow moves `Idle → AwaitingCallback → Completed`. [`FlowStart`] is the
//! `AwaitingCallback` state as the browser carries it (redirect URL plus the
//! CSRF pair to set as cookies); [`FlowCompletion`] is `Completed`. Any error
//! ends the flow and the browser has to start again.
//!
//! `state` and `nonce` are checked separately: `state` ties the callback to
//! the redirect this browser started, `nonce` ties the identity token to that
//! same flow.

use std::sync::Arc;

use serde::Deserialize;
use url::Url;

use super::claims::SUBJECT_CLAIM;
use super::csrf::{values_match, CsrfGenerator, CsrfPair};
use super::{AuthError, ProviderRegistry, SessionTokenService};

/// Output of the start step.
#[derive(Debug, Clone)]
pub struct FlowStart {
    pub redirect_url: Url,
    pub csrf: CsrfPair,
}

/// Query parameters the provider appends to the callback URL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// CSRF values read back from the browser's cookies.
#[derive(Debug, Clone, Default)]
pub struct CallbackCookies {
    pub state: Option<String>,
    pub nonce: Option<String>,
}

/// Output of a successful callback.
#[derive(Debug, Clone)]
pub struct FlowCompletion {
    pub subject: String,
    pub access_token: String,
    pub expires_in: i64,
}

/// Runs both steps of the flow.
#[derive(Clone)]
pub struct AuthorizationFlow {
    registry: Arc<ProviderRegistry>,
    sessions: Arc<SessionTokenService>,
    csrf: CsrfGenerator,
}

impl AuthorizationFlow {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        sessions: Arc<SessionTokenService>,
        csrf: CsrfGenerator,
    ) -> Self {
        Self {
            registry,
            sessions,
            csrf,
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Start step: pick fresh CSRF values and build the provider redirect.
    pub async fn start(&self, provider: &str) -> Result<FlowStart, AuthError> {
        let client = self.registry.client_descriptor(provider).await?;
        let csrf = self.csrf.pair()?;
        let redirect_url = client.authorization_url(&csrf.state, &csrf.nonce);

        tracing::debug!(provider, "authorization flow started");
        Ok(FlowStart { redirect_url, csrf })
    }

    /// Callback step: validate CSRF, exchange the code, verify the identity
    /// token and mint a session token.
    pub async fn complete(
        &self,
        provider: &str,
        params: &CallbackParams,
        cookies: &CallbackCookies,
    ) -> Result<FlowCompletion, AuthError> {
        let state_cookie = cookies
            .state
            .as_deref()
            .ok_or(AuthError::MissingCsrfCookie("state"))?;
        let nonce_cookie = cookies
            .nonce
            .as_deref()
            .ok_or(AuthError::MissingCsrfCookie("nonce"))?;

        // An empty cookie never matches, not even an empty query value.
        let returned_state = params.state.as_deref().unwrap_or_default();
        if state_cookie.is_empty() || !values_match(state_cookie, returned_state) {
            return Err(AuthError::StateMismatch);
        }

        if let Some(error) = &params.error {
            if let Some(description) = &params.error_description {
                tracing::info!(provider, error = %error, description = %description, "provider returned an error");
            }
            return Err(AuthError::AuthorizationDenied(error.clone()));
        }

        let code = params
            .code
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or(AuthError::MissingAuthorizationCode)?;

        let client = self.registry.client_descriptor(provider).await?;
        let tokens = client.exchange_code(code).await?;
        let raw_id_token = tokens
            .id_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingIdentityToken)?;

        let verifier = self.registry.verifier(provider).await?;
        let assertion = verifier.verify(raw_id_token).await?;

        let nonce_ok = assertion
            .nonce
            .as_deref()
            .is_some_and(|nonce| !nonce_cookie.is_empty() && values_match(nonce_cookie, nonce));
        if !nonce_ok {
            return Err(AuthError::NonceMismatch);
        }

        let subject = assertion
            .string_claim(SUBJECT_CLAIM)
            .ok_or(AuthError::MissingClaim(SUBJECT_CLAIM))?
            .to_string();

        let access_token = self.sessions.mint(&subject)?;
        tracing::info!(provider, "authorization flow completed");

        Ok(FlowCompletion {
            subject,
            access_token,
            expires_in: self.sessions.ttl().num_seconds(),
        })
    }
}
