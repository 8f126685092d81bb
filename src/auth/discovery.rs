// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! OpenID Connect discovery (`/.well-known/openid-configuration`).

use serde::Deserialize;
use url::Url;

use super::AuthError;

const WELL_KNOWN_PATH: &str = "/.well-known/openid-configuration";

/// Subset of the provider metadata document this service relies on.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderMetadata {
    pub issuer: String,
    pub authorization_endpoint: Url,
    pub token_endpoint: Url,
    pub jwks_uri: Url,
    #[serde(default)]
    pub token_endpoint_auth_methods_supported: Option<Vec<String>>,
}

impl ProviderMetadata {
    /// Fetch and validate the metadata document for `issuer`.
    ///
    /// The document's `issuer` must name the same issuer that was configured,
    /// ignoring a trailing slash.
    pub async fn discover(http: &reqwest::Client, issuer: &str) -> Result<Self, AuthError> {
        let url = discovery_url(issuer);

        let response = http
            .get(&url)
            .send()
            .await
            .map_err(|e| AuthError::DiscoveryError(format!("GET {url} failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AuthError::DiscoveryError(format!(
                "HTTP {} from {url}",
                response.status()
            )));
        }

        let metadata: ProviderMetadata = response
            .json()
            .await
            .map_err(|e| AuthError::DiscoveryError(format!("invalid metadata from {url}: {e}")))?;

        if normalize(&metadata.issuer) != normalize(issuer) {
            return Err(AuthError::DiscoveryError(format!(
                "issuer mismatch: configured {issuer}, discovered {}",
                metadata.issuer
            )));
        }

        Ok(metadata)
    }

    /// Whether the token endpoint only accepts HTTP Basic client credentials.
    pub fn requires_basic_auth(&self) -> bool {
        match &self.token_endpoint_auth_methods_supported {
            Some(methods) => {
                methods.iter().any(|m| m == "client_secret_basic")
                    && !methods.iter().any(|m| m == "client_secret_post")
            }
            None => false,
        }
    }
}

/// Discovery document URL for an issuer.
pub fn discovery_url(issuer: &str) -> String {
    format!("{}{WELL_KNOWN_PATH}", normalize(issuer))
}

fn normalize(issuer: &str) -> &str {
    issuer.trim_end_matches('/')
}
