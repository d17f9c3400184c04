//! Catalogue endpoints: books, authors, genres and book instances
//!
//! Listing and reading are public. Writes need catalogue write rights and go
//! through the same generic handlers for every entity.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::AuthorDetail,
        book::BookDetail,
        loan::LoanDetails,
        page::{Page, PageQuery},
    },
    repository::entity::CatalogEntity,
    services::catalog::{CatalogService, StoreFor},
    AppState,
};

use super::AuthenticatedUser;

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
#[aliases(LoanPage = PaginatedResponse<LoanDetails>)]
pub struct PaginatedResponse<T> {
    /// Entries of the current page
    pub items: Vec<T>,
    /// Total number of entries
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Entries per page
    pub per_page: i64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: i64, page: Page) -> Self {
        Self {
            items,
            total,
            page: page.number,
            per_page: page.size,
        }
    }
}

pub(crate) fn page_of(state: &AppState, query: &PageQuery) -> Page {
    Page::new(query, state.config.loans.page_size)
}

/// List entities, one page at a time
pub async fn list<E>(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<E>>>
where
    E: CatalogEntity,
    CatalogService: StoreFor<E>,
{
    let page = page_of(&state, &query);
    let (items, total) = state.services.catalog.list::<E>(page).await?;
    Ok(Json(PaginatedResponse::new(items, total, page)))
}

/// Get one entity by id
pub async fn get_one<E>(
    State(state): State<AppState>,
    Path(id): Path<E::Id>,
) -> AppResult<Json<E>>
where
    E: CatalogEntity,
    CatalogService: StoreFor<E>,
{
    let entity = state.services.catalog.get::<E>(id).await?;
    Ok(Json(entity))
}

/// Create an entity
pub async fn create<E>(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    WithRejection(Json(form), _): WithRejection<Json<E::Form>, AppError>,
) -> AppResult<(StatusCode, Json<E>)>
where
    E: CatalogEntity,
    CatalogService: StoreFor<E>,
{
    claims.require_write_catalog()?;

    let created = state.services.catalog.create::<E>(&form).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace every field of an entity
pub async fn update<E>(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<E::Id>,
    WithRejection(Json(form), _): WithRejection<Json<E::Form>, AppError>,
) -> AppResult<Json<E>>
where
    E: CatalogEntity,
    CatalogService: StoreFor<E>,
{
    claims.require_write_catalog()?;

    let updated = state.services.catalog.update::<E>(id, &form).await?;
    Ok(Json(updated))
}

/// Delete an entity
pub async fn delete<E>(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<E::Id>,
) -> AppResult<StatusCode>
where
    E: CatalogEntity,
    CatalogService: StoreFor<E>,
{
    claims.require_write_catalog()?;

    state.services.catalog.delete::<E>(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get book details with its copies
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "catalog",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookDetail),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_detail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDetail>> {
    let book = state.services.catalog.book_detail(id).await?;
    Ok(Json(book))
}

/// Get author details with their books
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "catalog",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author details", body = AuthorDetail),
        (status = 404, description = "Author not found")
    )
)]
pub async fn author_detail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<AuthorDetail>> {
    let author = state.services.catalog.author_detail(id).await?;
    Ok(Json(author))
}
