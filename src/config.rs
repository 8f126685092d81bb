// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `AUTH_PROVIDERS` | Comma-separated provider keys | `google` |
//! | `{KEY}_CLIENT_ID` | OAuth2 client ID | Required |
//! | `{KEY}_CLIENT_SECRET` | OAuth2 client secret | Required |
//! | `{KEY}_ISSUER` | OIDC issuer URL | Required |
//! | `{KEY}_REDIRECT_URL` | Callback URL registered with the provider | Required |
//! | `{KEY}_SCOPES` | Comma-separated scopes | `openid,email,profile` |
//! | `SESSION_SECRET` | HMAC secret for session tokens (>= 32 bytes) | Required |
//! | `SESSION_ISSUER` | `iss` claim of session tokens | `relational-auth` |
//! | `SESSION_TTL_SECS` | Session token lifetime | `86400` |
//! | `CSRF_BYTES` | Random bytes per `state`/`nonce` | `16` |
//! | `CSRF_COOKIE_MAX_AGE_SECS` | `state`/`nonce` cookie lifetime | `3600` |
//! | `IDP_HTTP_TIMEOUT_SECS` | Timeout for every identity provider call | `10` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files; both set enables HTTPS | Unset |
//! | `COOKIE_SECURE` | Force `Secure` cookies (TLS terminated upstream) | `false` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//!
//! `{KEY}` is the upper-cased provider key, e.g. `GOOGLE_CLIENT_ID`.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::auth::csrf::{DEFAULT_CSRF_BYTES, DEFAULT_CSRF_MAX_AGE};
use crate::auth::session::DEFAULT_SESSION_ISSUER;
use crate::auth::ProviderConfig;

/// Minimum accepted length of `SESSION_SECRET` in bytes.
pub const MIN_SESSION_SECRET_LEN: usize = 32;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_PROVIDERS: &str = "google";
const DEFAULT_SCOPES: &str = "openid,email,profile";
const DEFAULT_SESSION_TTL_SECS: u64 = 86_400;
const DEFAULT_IDP_TIMEOUT_SECS: u64 = 10;

/// Configuration errors. Any of these aborts startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is missing")]
    Missing(String),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: String, reason: String },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// TLS certificate and key locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Fully resolved service configuration.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub providers: Vec<ProviderConfig>,
    pub session_secret: Vec<u8>,
    pub session_issuer: String,
    pub session_ttl: Duration,
    pub csrf_bytes: usize,
    pub csrf_cookie_max_age: i64,
    pub idp_http_timeout: Duration,
    pub tls: Option<TlsPaths>,
    pub cookie_secure: bool,
    pub log_format: LogFormat,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("providers", &self.providers)
            .field("session_secret", &"<redacted>")
            .field("session_issuer", &self.session_issuer)
            .field("session_ttl", &self.session_ttl)
            .field("csrf_bytes", &self.csrf_bytes)
            .field("csrf_cookie_max_age", &self.csrf_cookie_max_age)
            .field("idp_http_timeout", &self.idp_http_timeout)
            .field("tls", &self.tls)
            .field("cookie_secure", &self.cookie_secure)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` to resolve variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let providers = env
            .or_default("AUTH_PROVIDERS", DEFAULT_PROVIDERS)
            .split(',')
            .map(|key| key.trim().to_ascii_lowercase())
            .filter(|key| !key.is_empty())
            .map(|key| load_provider(&env, &key))
            .collect::<Result<Vec<_>, _>>()?;
        if providers.is_empty() {
            return Err(ConfigError::Invalid {
                name: "AUTH_PROVIDERS".to_string(),
                reason: "no providers listed".to_string(),
            });
        }

        let session_secret = env.required("SESSION_SECRET")?.into_bytes();
        if session_secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(ConfigError::Invalid {
                name: "SESSION_SECRET".to_string(),
                reason: format!("must be at least {MIN_SESSION_SECRET_LEN} bytes"),
            });
        }

        let csrf_bytes: usize = env.parsed("CSRF_BYTES", DEFAULT_CSRF_BYTES)?;
        if csrf_bytes < DEFAULT_CSRF_BYTES {
            return Err(ConfigError::Invalid {
                name: "CSRF_BYTES".to_string(),
                reason: format!("must be at least {DEFAULT_CSRF_BYTES}"),
            });
        }

        let tls = match (env.optional("TLS_CERT_PATH"), env.optional("TLS_KEY_PATH")) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::Invalid {
                    name: "TLS_CERT_PATH/TLS_KEY_PATH".to_string(),
                    reason: "both or neither must be set".to_string(),
                })
            }
        };

        let log_format = match env.or_default("LOG_FORMAT", "pretty").to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            other => {
                return Err(ConfigError::Invalid {
                    name: "LOG_FORMAT".to_string(),
                    reason: format!("unknown format '{other}'"),
                })
            }
        };

        Ok(Self {
            host: env.or_default("HOST", DEFAULT_HOST),
            port: env.parsed("PORT", DEFAULT_PORT)?,
            providers,
            session_secret,
            session_issuer: env.or_default("SESSION_ISSUER", DEFAULT_SESSION_ISSUER),
            session_ttl: Duration::from_secs(env.parsed("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?),
            csrf_bytes,
            csrf_cookie_max_age: env.parsed("CSRF_COOKIE_MAX_AGE_SECS", DEFAULT_CSRF_MAX_AGE)?,
            idp_http_timeout: Duration::from_secs(
                env.parsed("IDP_HTTP_TIMEOUT_SECS", DEFAULT_IDP_TIMEOUT_SECS)?,
            ),
            tls,
            cookie_secure: env.parsed("COOKIE_SECURE", false)?,
            log_format,
        })
    }

    /// `host:port` bind address.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether CSRF cookies get the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.tls.is_some() || self.cookie_secure
    }
}

fn load_provider<F>(env: &Env<F>, key: &str) -> Result<ProviderConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let prefix = key.to_ascii_uppercase();
    let var = |suffix: &str| format!("{prefix}_{suffix}");

    let scopes = env
        .or_default(&var("SCOPES"), DEFAULT_SCOPES)
        .split(',')
        .map(str::to_string)
        .collect();

    Ok(ProviderConfig::new(
        key,
        env.required(&var("CLIENT_ID"))?,
        env.required(&var("CLIENT_SECRET"))?,
        env.required(&var("ISSUER"))?,
        env.required(&var("REDIRECT_URL"))?,
        scopes,
    ))
}

/// Trimmed, non-empty variable access over a lookup function.
struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, name: &str) -> Result<String, ConfigError> {
        self.optional(name)
            .ok_or_else(|| ConfigError::Missing(name.to_string()))
    }

    fn or_default(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&self, name: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        match self.optional(name) {
            Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
                name: name.to_string(),
                reason: e.to_string(),
            }),
            None => Ok(default),
        }
    }
}
