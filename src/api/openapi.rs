//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, catalog, health, index, loans};

/// Registers the JWT bearer scheme referenced by protected paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LocalLibrary API",
        version = "1.0.0",
        description = "Library catalogue and loan renewal REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        // Catalog
        index::index,
        catalog::book_detail,
        catalog::author_detail,
        // Loans
        loans::all_borrowed,
        loans::my_borrowed,
        loans::renewal_form,
        loans::renew,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            crate::models::user::User,
            crate::models::user::AccountTypeSlug,
            // Catalog
            crate::models::author::Author,
            crate::models::author::AuthorForm,
            crate::models::author::AuthorDetail,
            crate::models::book::Book,
            crate::models::book::BookForm,
            crate::models::book::BookDetail,
            crate::models::genre::Genre,
            crate::models::genre::GenreForm,
            crate::models::instance::BookInstance,
            crate::models::instance::InstanceForm,
            crate::models::instance::LoanStatus,
            crate::models::summary::CatalogSummary,
            // Loans
            crate::models::loan::LoanDetails,
            crate::models::loan::RenewalRequest,
            crate::models::loan::RenewalPrefill,
            crate::models::loan::RenewalResponse,
            crate::renewal::RejectionReason,
            catalog::LoanPage,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "catalog", description = "Books, authors, genres and copies"),
        (name = "loans", description = "Borrowed copies and renewals")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
