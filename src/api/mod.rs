//! API handlers for the LocalLibrary REST endpoints

pub mod auth;
pub mod catalog;
pub mod health;
pub mod index;
pub mod loans;
pub mod openapi;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::AppError,
    models::{user::UserClaims, Author, Book, BookInstance, Genre},
    AppState,
};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Home page
        .route("/", get(index::index))
        // Authentication
        .route("/auth/login", post(auth::login))
        // Books
        .route("/books", get(catalog::list::<Book>).post(catalog::create::<Book>))
        .route(
            "/books/:id",
            get(catalog::book_detail)
                .put(catalog::update::<Book>)
                .delete(catalog::delete::<Book>),
        )
        // Authors
        .route("/authors", get(catalog::list::<Author>).post(catalog::create::<Author>))
        .route(
            "/authors/:id",
            get(catalog::author_detail)
                .put(catalog::update::<Author>)
                .delete(catalog::delete::<Author>),
        )
        // Genres
        .route("/genres", get(catalog::list::<Genre>).post(catalog::create::<Genre>))
        .route(
            "/genres/:id",
            get(catalog::get_one::<Genre>)
                .put(catalog::update::<Genre>)
                .delete(catalog::delete::<Genre>),
        )
        // Book instances and loans
        .route(
            "/instances",
            get(catalog::list::<BookInstance>).post(catalog::create::<BookInstance>),
        )
        .route("/instances/borrowed", get(loans::all_borrowed))
        .route("/instances/mine", get(loans::my_borrowed))
        .route(
            "/instances/:id",
            get(catalog::get_one::<BookInstance>)
                .put(catalog::update::<BookInstance>)
                .delete(catalog::delete::<BookInstance>),
        )
        .route(
            "/instances/:id/renew",
            get(loans::renewal_form).post(loans::renew),
        )
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
