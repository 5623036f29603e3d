//! Route configuration and setup

use crate::auth::middleware::{
    auth_middleware, require_admin, require_creator, require_creator_or_admin, AuthState,
};
use crate::handlers;
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use melodex_core::constants::API_PREFIX;
use melodex_core::Config;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = Arc::new(AuthState {
        jwt: state.jwt.clone(),
        users: state.users.clone(),
    });

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            &format!("{}/auth/register", API_PREFIX),
            post(handlers::auth::register),
        )
        .route(
            &format!("{}/auth/login", API_PREFIX),
            post(handlers::auth::login),
        )
        .route(
            &format!("{}/music/all", API_PREFIX),
            get(handlers::tracks::list_tracks),
        )
        .route(
            &format!("{}/music/{{id}}", API_PREFIX),
            get(handlers::tracks::get_track),
        );

    // Routes for any authenticated account
    let user_routes = Router::new()
        .route(
            &format!("{}/music/download/{{id}}", API_PREFIX),
            post(handlers::download::download_track),
        )
        .route(
            &format!("{}/user/profile", API_PREFIX),
            get(handlers::users::get_profile).put(handlers::users::update_profile),
        )
        .route(
            &format!("{}/user/wishlist", API_PREFIX),
            get(handlers::users::get_wishlist),
        )
        .route(
            &format!("{}/user/wishlist/{{id}}", API_PREFIX),
            post(handlers::users::wishlist_add).delete(handlers::users::wishlist_remove),
        );

    // Upload, edit, and delete: creators and admins
    let publish_routes = Router::new()
        .route(
            &format!("{}/music/upload", API_PREFIX),
            post(handlers::tracks::upload_track),
        )
        .route(
            &format!("{}/music/edit/{{id}}", API_PREFIX),
            put(handlers::tracks::update_track),
        )
        .route(
            &format!("{}/music/delete/{{id}}", API_PREFIX),
            delete(handlers::tracks::delete_track),
        )
        .layer(axum::middleware::from_fn(require_creator_or_admin));

    // Creator dashboard
    let creator_routes = Router::new()
        .route(
            &format!("{}/music/my-uploads", API_PREFIX),
            get(handlers::tracks::my_uploads),
        )
        .route(
            &format!("{}/creator/stats", API_PREFIX),
            get(handlers::creator::creator_stats),
        )
        .layer(axum::middleware::from_fn(require_creator));

    // Admin dashboard and moderation
    let admin_routes = Router::new()
        .route(
            &format!("{}/admin/users", API_PREFIX),
            get(handlers::admin::list_users),
        )
        .route(
            &format!("{}/admin/users/{{id}}", API_PREFIX),
            get(handlers::admin::get_user_details).delete(handlers::admin::delete_user),
        )
        .route(
            &format!("{}/admin/users/{{id}}/toggle-creator", API_PREFIX),
            patch(handlers::admin::toggle_creator),
        )
        .route(
            &format!("{}/admin/music", API_PREFIX),
            get(handlers::admin::list_all_tracks),
        )
        .route(
            &format!("{}/admin/music/{{id}}", API_PREFIX),
            delete(handlers::admin::delete_track),
        )
        .route(
            &format!("{}/admin/stats", API_PREFIX),
            get(handlers::admin::stats),
        )
        .layer(axum::middleware::from_fn(require_admin));

    // Protected routes all pass through the bearer-token middleware first
    let protected_routes = user_routes
        .merge(publish_routes)
        .merge(creator_routes)
        .merge(admin_routes)
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ));

    // Up to four files per upload request, plus form-field overhead
    let body_limit = config.max_upload_size_bytes * 4 + 1024 * 1024;

    let app = public_routes
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins.contains(&"*".to_string()) {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers(Any)
    } else {
        let origins: Result<Vec<HeaderValue>, _> =
            config.cors_origins.iter().map(|o| o.parse()).collect();

        CorsLayer::new()
            .allow_origin(origins.unwrap_or_default())
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers(Any)
    };
    Ok(cors)
}
