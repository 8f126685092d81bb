// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational Auth - Delegated OpenID Connect Login Gateway
//!
//! This crate redirects browsers to an external OpenID Connect provider,
//! verifies the identity token it returns, and issues HMAC-signed session
//! tokens that guard the protected routes.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Login flow, identity token verification and session tokens
//! - `config` - Environment configuration
//! - `state` - Shared application state

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod state;
