//! Book instance (physical copy) model
//!
//! A copy carries its own loan record: the borrower and the due-back date.
//! The due-back date is set exactly when the copy is on loan.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::repository::entity::{CatalogEntity, EntityForm, PgQueryAs};

/// Circulation status of a copy, stored as a single character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum LoanStatus {
    #[serde(rename = "a")]
    Available,
    #[serde(rename = "o")]
    OnLoan,
    #[serde(rename = "m")]
    Maintenance,
    #[serde(rename = "r")]
    Reserved,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Available => "a",
            LoanStatus::OnLoan => "o",
            LoanStatus::Maintenance => "m",
            LoanStatus::Reserved => "r",
        }
    }
}

impl Default for LoanStatus {
    fn default() -> Self {
        LoanStatus::Maintenance
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "a" => Ok(LoanStatus::Available),
            "o" => Ok(LoanStatus::OnLoan),
            "m" => Ok(LoanStatus::Maintenance),
            "r" => Ok(LoanStatus::Reserved),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: &str = Decode::<Postgres>::decode(value)?;
        s.trim().parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// A copy of a book that can be borrowed
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstance {
    pub id: Uuid,
    pub book_id: i32,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    pub borrower_id: Option<i32>,
}

impl BookInstance {
    pub fn is_on_loan(&self) -> bool {
        self.status == LoanStatus::OnLoan
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_back.map(|d| d < today).unwrap_or(false)
    }
}

impl CatalogEntity for BookInstance {
    type Id = Uuid;
    type Form = InstanceForm;

    const LABEL: &'static str = "Book instance";
    const TABLE: &'static str = "book_instances";
    const ORDER_BY: &'static str = "due_back NULLS LAST, id";
}

/// Create/update book instance request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_loan_state"))]
pub struct InstanceForm {
    pub book_id: i32,
    #[validate(length(max = 200, message = "Imprint is limited to 200 characters"))]
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    #[serde(default)]
    pub status: LoanStatus,
    pub borrower_id: Option<i32>,
}

/// A due-back date is required on loan and forbidden otherwise
fn validate_loan_state(form: &InstanceForm) -> Result<(), ValidationError> {
    let on_loan = form.status == LoanStatus::OnLoan;
    if on_loan == form.due_back.is_some() {
        return Ok(());
    }

    let mut err = ValidationError::new("loan_state");
    err.message = Some(if on_loan {
        "A copy on loan needs a due-back date".into()
    } else {
        "Only a copy on loan may have a due-back date".into()
    });
    Err(err)
}

impl EntityForm for InstanceForm {
    const COLUMNS: &'static [&'static str] = &["book_id", "imprint", "due_back", "status", "borrower_id"];

    fn bind_columns<'q, O>(&'q self, query: PgQueryAs<'q, O>) -> PgQueryAs<'q, O> {
        query
            .bind(self.book_id)
            .bind(&self.imprint)
            .bind(self.due_back)
            .bind(self.status)
            .bind(self.borrower_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(status: LoanStatus, due_back: Option<NaiveDate>) -> InstanceForm {
        InstanceForm {
            book_id: 1,
            imprint: "Parnassus, 1968".into(),
            due_back,
            status,
            borrower_id: None,
        }
    }

    #[test]
    fn test_on_loan_requires_due_back() {
        assert!(form(LoanStatus::OnLoan, None).validate().is_err());
        assert!(form(LoanStatus::OnLoan, NaiveDate::from_ymd_opt(2024, 1, 31)).validate().is_ok());
    }

    #[test]
    fn test_due_back_only_when_on_loan() {
        let due = NaiveDate::from_ymd_opt(2024, 1, 31);
        for status in [LoanStatus::Available, LoanStatus::Maintenance, LoanStatus::Reserved] {
            assert!(form(status, due).validate().is_err());
            assert!(form(status, None).validate().is_ok());
        }
    }

    #[test]
    fn test_status_codes_roundtrip() {
        assert_eq!("o".parse::<LoanStatus>().unwrap(), LoanStatus::OnLoan);
        assert_eq!(LoanStatus::Reserved.to_string(), "r");
        assert!("x".parse::<LoanStatus>().is_err());
        assert_eq!(serde_json::to_string(&LoanStatus::Available).unwrap(), "\"a\"");
    }

    #[test]
    fn test_default_status_is_maintenance() {
        assert_eq!(LoanStatus::default(), LoanStatus::Maintenance);
    }

    #[test]
    fn test_overdue() {
        let instance = BookInstance {
            id: Uuid::new_v4(),
            book_id: 1,
            imprint: String::new(),
            due_back: NaiveDate::from_ymd_opt(2024, 1, 9),
            status: LoanStatus::OnLoan,
            borrower_id: Some(3),
        };
        assert!(instance.is_overdue(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()));
        assert!(!instance.is_overdue(NaiveDate::from_ymd_opt(2024, 1, 9).unwrap()));
    }
}
