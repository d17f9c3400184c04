//! Pagination

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Query parameters of paginated list endpoints
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number, starting at 1
    pub page: Option<i64>,
}

/// A resolved page: 1-based number and fixed size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: i64,
    pub size: i64,
}

impl Page {
    pub fn new(query: &PageQuery, size: i64) -> Self {
        Self {
            number: query.page.unwrap_or(1).max(1),
            size: size.max(1),
        }
    }

    pub fn limit(&self) -> i64 {
        self.size
    }

    /// Saturates for page numbers past the end of any table
    pub fn offset(&self) -> i64 {
        (self.number - 1).saturating_mul(self.size)
    }
}
