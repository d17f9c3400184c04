//! Loan endpoints: borrowed copies and renewals

use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::extract::WithRejection;
use chrono::{Local, NaiveDate};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::{RenewalPrefill, RenewalRequest, RenewalResponse},
        page::PageQuery,
    },
    AppState,
};

use super::{
    catalog::{page_of, LoanPage, PaginatedResponse},
    AuthenticatedUser,
};

/// Where a librarian lands after a successful renewal
pub const ALL_BORROWED_PATH: &str = "/api/v1/instances/borrowed";

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// List every copy on loan, soonest due first
#[utoipa::path(
    get,
    path = "/instances/borrowed",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Copies on loan", body = LoanPage),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Missing the manage-loans right")
    )
)]
pub async fn all_borrowed(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<LoanPage>> {
    claims.require_manage_loans()?;

    let page = page_of(&state, &query);
    let (loans, total) = state.services.loans.all_on_loan(page, today()).await?;
    Ok(Json(PaginatedResponse::new(loans, total, page)))
}

/// List the copies borrowed by the current user
#[utoipa::path(
    get,
    path = "/instances/mine",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Copies on loan to the current user", body = LoanPage),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_borrowed(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<LoanPage>> {
    let page = page_of(&state, &query);
    let (loans, total) = state
        .services
        .loans
        .on_loan_to(claims.user_id, page, today())
        .await?;
    Ok(Json(PaginatedResponse::new(loans, total, page)))
}

/// Get the renewal form of a copy, pre-filled with the suggested date
#[utoipa::path(
    get,
    path = "/instances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Pre-filled renewal", body = RenewalPrefill),
        (status = 403, description = "Missing the manage-loans right"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renewal_form(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RenewalPrefill>> {
    claims.require_manage_loans()?;

    let prefill = state.services.loans.renewal_prefill(id, today()).await?;
    Ok(Json(prefill))
}

/// Renew the loan of a copy
#[utoipa::path(
    post,
    path = "/instances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    request_body = RenewalRequest,
    responses(
        (status = 200, description = "Loan renewed", body = RenewalResponse),
        (status = 400, description = "Malformed body or renewal date"),
        (status = 403, description = "Missing the manage-loans right"),
        (status = 404, description = "Book instance not found"),
        (status = 422, description = "Date rejected (PAST_DATE, TOO_FAR_FUTURE) or copy not on loan")
    )
)]
pub async fn renew(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    WithRejection(Json(request), _): WithRejection<Json<RenewalRequest>, AppError>,
) -> AppResult<Json<RenewalResponse>> {
    claims.require_manage_loans()?;

    let instance = state.services.loans.renew(id, &request, today()).await?;
    Ok(Json(RenewalResponse {
        instance,
        next: ALL_BORROWED_PATH.to_string(),
    }))
}
