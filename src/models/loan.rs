//! Loan views and renewal request types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::instance::{BookInstance, LoanStatus};

/// Database row of a copy currently on loan, joined with its book and borrower
#[derive(Debug, Clone, FromRow)]
pub struct LoanRow {
    pub id: Uuid,
    pub book_id: i32,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    pub borrower_id: Option<i32>,
    pub title: String,
    pub borrower_login: Option<String>,
}

/// Loan with details for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    #[serde(flatten)]
    pub instance: BookInstance,
    /// Title of the borrowed book
    pub title: String,
    pub borrower_login: Option<String>,
    pub is_overdue: bool,
}

impl LoanDetails {
    pub fn from_row(row: LoanRow, today: NaiveDate) -> Self {
        let instance = BookInstance {
            id: row.id,
            book_id: row.book_id,
            imprint: row.imprint,
            due_back: row.due_back,
            status: row.status,
            borrower_id: row.borrower_id,
        };
        let is_overdue = instance.is_overdue(today);
        Self {
            instance,
            title: row.title,
            borrower_login: row.borrower_login,
            is_overdue,
        }
    }
}

/// Renewal request as submitted by a librarian
#[derive(Debug, Deserialize, ToSchema)]
pub struct RenewalRequest {
    /// Proposed due-back date (YYYY-MM-DD)
    pub renewal_date: String,
}

impl RenewalRequest {
    /// Parse the proposed date; the renewal policy only ever sees valid dates
    pub fn parse_date(&self) -> Result<NaiveDate, chrono::ParseError> {
        NaiveDate::parse_from_str(self.renewal_date.trim(), "%Y-%m-%d")
    }
}

/// Renewal form pre-filled for a copy
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RenewalPrefill {
    pub instance: BookInstance,
    /// Suggested due-back date
    pub renewal_date: NaiveDate,
    /// Latest date a renewal may ask for
    pub latest_date: NaiveDate,
}

/// Successful renewal
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RenewalResponse {
    pub instance: BookInstance,
    /// Where to continue: the listing of all borrowed copies
    pub next: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iso_date() {
        let req = RenewalRequest {
            renewal_date: " 2024-01-31 ".into(),
        };
        assert_eq!(req.parse_date().unwrap(), NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", "31/01/2024", "2024-02-30", "tomorrow"] {
            let req = RenewalRequest {
                renewal_date: input.into(),
            };
            assert!(req.parse_date().is_err(), "{}", input);
        }
    }
}
