// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity provider registry.
//!
//! The registry is built once at startup from configuration and shared via
//! `AppState`. Provider configuration never changes after construction.
//! Discovery results are cached behind an `RwLock`; every lookup goes through
//! that lock, and the cache is warmed before the server accepts traffic.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{decode, decode_header, Validation};
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use url::Url;

use super::discovery::ProviderMetadata;
use super::jwks::JwksManager;
use super::{AuthError, IdentityAssertion};

/// Clock skew tolerance for identity tokens (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Scope every OpenID Connect request must carry.
pub const OPENID_SCOPE: &str = "openid";

/// Static configuration for one identity provider.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Registry key, e.g. `google`
    pub key: String,
    pub client_id: String,
    pub client_secret: String,
    pub issuer: String,
    pub redirect_url: String,
    /// Requested scopes, `openid` first
    pub scopes: Vec<String>,
}

impl ProviderConfig {
    /// Build a config, prepending `openid` when the scope list lacks it.
    pub fn new(
        key: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        issuer: impl Into<String>,
        redirect_url: impl Into<String>,
        scopes: Vec<String>,
    ) -> Self {
        let mut scopes: Vec<String> = scopes
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        scopes.dedup();
        if !scopes.iter().any(|s| s == OPENID_SCOPE) {
            scopes.insert(0, OPENID_SCOPE.to_string());
        }

        Self {
            key: key.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            issuer: issuer.into(),
            redirect_url: redirect_url.into(),
            scopes,
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("key", &self.key)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("redirect_url", &self.redirect_url)
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// Discovery result for one provider.
struct DiscoveredProvider {
    metadata: Arc<ProviderMetadata>,
    jwks: Arc<JwksManager>,
}

/// Registry of configured identity providers.
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<ProviderConfig>>,
    discovered: RwLock<HashMap<String, DiscoveredProvider>>,
    http: reqwest::Client,
}

impl ProviderRegistry {
    /// Build the registry.
    ///
    /// `http_timeout` bounds every discovery, JWKS and token endpoint call.
    pub fn new(
        providers: impl IntoIterator<Item = ProviderConfig>,
        http_timeout: Duration,
    ) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(http_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AuthError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            providers: providers
                .into_iter()
                .map(|p| (p.key.clone(), Arc::new(p)))
                .collect(),
            discovered: RwLock::new(HashMap::new()),
            http,
        })
    }

    /// Configured provider keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Exact key lookup.
    pub fn resolve(&self, key: &str) -> Result<Arc<ProviderConfig>, AuthError> {
        self.providers
            .get(key)
            .cloned()
            .ok_or_else(|| AuthError::ProviderNotConfigured(key.to_string()))
    }

    /// OAuth2 client for `key`, discovering the issuer on first use.
    pub async fn client_descriptor(&self, key: &str) -> Result<OAuth2ClientDescriptor, AuthError> {
        let config = self.resolve(key)?;
        let (metadata, _) = self.discovered(key, &config).await?;
        Ok(OAuth2ClientDescriptor {
            config,
            metadata,
            http: self.http.clone(),
        })
    }

    /// Identity token verifier bound to `key`'s issuer and client ID.
    pub async fn verifier(&self, key: &str) -> Result<IdentityTokenVerifier, AuthError> {
        let config = self.resolve(key)?;
        let (metadata, jwks) = self.discovered(key, &config).await?;
        Ok(IdentityTokenVerifier::new(
            metadata.issuer.clone(),
            config.client_id.clone(),
            jwks,
        ))
    }

    /// Discover every configured provider not yet discovered and load its
    /// JWKS. Failures are logged and retried lazily on first request.
    pub async fn warm_up(&self) {
        for key in self.keys() {
            if self.is_discovered(key).await {
                continue;
            }
            match self.check(key).await {
                Ok(_) => tracing::info!(provider = key, "identity provider discovered"),
                Err(e) => tracing::warn!(provider = key, error = ?e, "identity provider discovery failed"),
            }
        }
    }

    /// Whether discovery has completed for `key`.
    pub async fn is_discovered(&self, key: &str) -> bool {
        self.discovered.read().await.contains_key(key)
    }

    /// Readiness of `key`: metadata discovered and signing keys loaded.
    ///
    /// Discovers and fetches the JWKS when either is missing.
    pub async fn check(&self, key: &str) -> Result<(), AuthError> {
        let config = self.resolve(key)?;
        let (_, jwks) = self.discovered(key, &config).await?;
        if !jwks.is_cached().await {
            jwks.refresh().await?;
        }
        Ok(())
    }

    async fn discovered(
        &self,
        key: &str,
        config: &ProviderConfig,
    ) -> Result<(Arc<ProviderMetadata>, Arc<JwksManager>), AuthError> {
        if let Some(entry) = self.discovered.read().await.get(key) {
            return Ok((entry.metadata.clone(), entry.jwks.clone()));
        }

        let metadata = ProviderMetadata::discover(&self.http, &config.issuer).await?;

        // Concurrent first requests may both discover; the first insert wins so
        // every caller shares one JWKS cache.
        let mut discovered = self.discovered.write().await;
        let entry = discovered
            .entry(key.to_string())
            .or_insert_with(|| DiscoveredProvider {
                jwks: Arc::new(JwksManager::new(metadata.jwks_uri.as_str(), self.http.clone())),
                metadata: Arc::new(metadata),
            });
        Ok((entry.metadata.clone(), entry.jwks.clone()))
    }
}

/// Token endpoint response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub id_token: Option<String>,
}

/// OAuth2 error body (RFC 6749 §5.2).
#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Provider configuration joined with its discovered endpoints.
#[derive(Clone)]
pub struct OAuth2ClientDescriptor {
    config: Arc<ProviderConfig>,
    metadata: Arc<ProviderMetadata>,
    http: reqwest::Client,
}

impl fmt::Debug for OAuth2ClientDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2ClientDescriptor")
            .field("config", &self.config)
            .field("authorization_endpoint", &self.metadata.authorization_endpoint.as_str())
            .field("token_endpoint", &self.metadata.token_endpoint.as_str())
            .finish()
    }
}

impl OAuth2ClientDescriptor {
    /// Authorization endpoint URL for the browser redirect.
    pub fn authorization_url(&self, state: &str, nonce: &str) -> Url {
        let mut url = self.metadata.authorization_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_url)
            .append_pair("scope", &self.config.scopes.join(" "))
            .append_pair("state", state)
            .append_pair("nonce", nonce);
        url
    }

    /// Exchange an authorization code at the token endpoint.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AuthError> {
        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_url.as_str()),
        ];

        let mut request = self
            .http
            .post(self.metadata.token_endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json");

        if self.metadata.requires_basic_auth() {
            request = request.basic_auth(&self.config.client_id, Some(&self.config.client_secret));
        } else {
            form.push(("client_id", self.config.client_id.as_str()));
            form.push(("client_secret", self.config.client_secret.as_str()));
        }

        let response = request
            .form(&form)
            .send()
            .await
            .map_err(|e| AuthError::CodeExchangeFailed(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = match serde_json::from_str::<OAuthErrorBody>(&body) {
                Ok(err) => match err.error_description {
                    Some(desc) => format!("{}: {desc}", err.error),
                    None => err.error,
                },
                Err(_) => format!("HTTP {status}"),
            };
            return Err(AuthError::CodeExchangeFailed(format!(
                "token endpoint returned {status}: {reason}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::CodeExchangeFailed(format!("invalid token response: {e}")))
    }
}

/// Verifies identity tokens for one provider.
#[derive(Clone)]
pub struct IdentityTokenVerifier {
    issuer: String,
    client_id: String,
    jwks: Arc<JwksManager>,
}

impl IdentityTokenVerifier {
    pub fn new(issuer: impl Into<String>, client_id: impl Into<String>, jwks: Arc<JwksManager>) -> Self {
        Self {
            issuer: issuer.into(),
            client_id: client_id.into(),
            jwks,
        }
    }

    /// Check signature, issuer, audience and expiry of `raw`.
    pub async fn verify(&self, raw: &str) -> Result<IdentityAssertion, AuthError> {
        let header = decode_header(raw)
            .map_err(|e| AuthError::InvalidIdentityToken(format!("malformed header: {e}")))?;

        let (decoding_key, algorithm) = match &header.kid {
            Some(kid) => self.jwks.get_decoding_key(kid).await?,
            None => self.jwks.get_sole_decoding_key().await?,
        };

        let mut validation = Validation::new(algorithm);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.client_id]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        let data = decode::<Map<String, Value>>(raw, &decoding_key, &validation)
            .map_err(|e| AuthError::InvalidIdentityToken(format!("validation failed: {e}")))?;

        Ok(IdentityAssertion::from_claims(data.claims))
    }
}
