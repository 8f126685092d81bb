// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{middleware, routing::get, Router};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{auth::middleware::auth_middleware, auth::AuthenticatedIdentity, error::ApiError, state::AppState};

pub mod auth;
pub mod health;
pub mod protected;

pub fn router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/hello", get(protected::protected_hello))
        .route("/me", get(protected::current_session))
        .route_layer(middleware::from_fn_with_state(
            state.sessions.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/hello", get(protected::hello))
        .route("/auth/{provider}", get(auth::start_login))
        .route("/auth/{provider}/callback", get(auth::login_callback))
        .nest("/protected", protected_routes)
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .fallback(not_found)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

async fn not_found() -> ApiError {
    ApiError::not_found("route not found")
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        protected::hello,
        protected::protected_hello,
        protected::current_session,
        auth::start_login,
        auth::login_callback,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            auth::AccessTokenResponse,
            protected::MessageResponse,
            protected::SessionResponse,
            AuthenticatedIdentity,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Auth", description = "Delegated login with an OpenID Connect provider"),
        (name = "Greeting", description = "Public and session-guarded greetings"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
