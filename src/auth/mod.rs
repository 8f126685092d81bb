// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Delegated OpenID Connect login plus the session tokens that follow it.
//!
//! ## Auth Flow
//!
//! 1. Browser hits `GET /auth/{provider}`; the server sets `state` and
//!    `nonce` cookies and redirects to the provider
//! 2. Provider redirects back to `GET /auth/{provider}/callback?code&state`
//! 3. Server:
//!    - Checks `state` against its cookie
//!    - Exchanges `code` at the provider's token endpoint
//!    - Verifies the identity token against the provider JWKS
//!      (signature, issuer, audience, expiry)
//!    - Checks the token `nonce` against its cookie
//!    - Mints its own HS256 session token for the `email` claim
//! 4. Client sends `Authorization: Bearer <session token>` on protected routes
//!
//! ## Security
//!
//! - No server-side flow state; CSRF values travel in `HttpOnly` cookies
//! - Identity token algorithms come from the JWK, session tokens accept HMAC only
//! - Provider discovery and JWKS are cached behind `RwLock`s
//! - Every provider call is bounded by the configured HTTP timeout

pub mod claims;
pub mod csrf;
pub mod discovery;
pub mod error;
pub mod extractor;
pub mod flow;
pub mod jwks;
pub mod middleware;
pub mod provider;
pub mod session;

pub use claims::{AuthenticatedIdentity, IdentityAssertion, SessionClaims};
pub use csrf::{CsrfGenerator, CsrfPair};
pub use error::AuthError;
pub use extractor::Auth;
pub use flow::{AuthorizationFlow, CallbackCookies, CallbackParams, FlowCompletion, FlowStart};
pub use jwks::JwksManager;
pub use provider::{
    IdentityTokenVerifier, OAuth2ClientDescriptor, ProviderConfig, ProviderRegistry, TokenResponse,
};
pub use session::SessionTokenService;
