//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::book::Book;
use crate::repository::entity::{CatalogEntity, EntityForm, PgQueryAs};

/// Author model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl CatalogEntity for Author {
    type Id = i32;
    type Form = AuthorForm;

    const LABEL: &'static str = "Author";
    const TABLE: &'static str = "authors";
    const ORDER_BY: &'static str = "last_name, first_name, id";
}

/// Create/update author request.
///
/// No date of death is assumed when none is given.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_lifespan"))]
pub struct AuthorForm {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

fn validate_lifespan(form: &AuthorForm) -> Result<(), ValidationError> {
    match (form.date_of_birth, form.date_of_death) {
        (Some(birth), Some(death)) if death < birth => {
            let mut err = ValidationError::new("lifespan");
            err.message = Some("Date of death precedes date of birth".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

impl EntityForm for AuthorForm {
    const COLUMNS: &'static [&'static str] =
        &["first_name", "last_name", "date_of_birth", "date_of_death"];

    fn bind_columns<'q, O>(&'q self, query: PgQueryAs<'q, O>) -> PgQueryAs<'q, O> {
        query
            .bind(&self.first_name)
            .bind(&self.last_name)
            .bind(self.date_of_birth)
            .bind(self.date_of_death)
    }
}

/// Author with the books attributed to them
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorDetail {
    #[serde(flatten)]
    pub author: Author,
    pub books: Vec<Book>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(birth: Option<NaiveDate>, death: Option<NaiveDate>) -> AuthorForm {
        AuthorForm {
            first_name: "Ursula".into(),
            last_name: "Le Guin".into(),
            date_of_birth: birth,
            date_of_death: death,
        }
    }

    #[test]
    fn test_living_author_is_valid() {
        assert!(form(NaiveDate::from_ymd_opt(1929, 10, 21), None).validate().is_ok());
    }

    #[test]
    fn test_death_before_birth_is_invalid() {
        let f = form(NaiveDate::from_ymd_opt(1929, 10, 21), NaiveDate::from_ymd_opt(1900, 1, 1));
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_empty_last_name_is_invalid() {
        let mut f = form(None, None);
        f.last_name = String::new();
        assert!(f.validate().is_err());
    }
}
