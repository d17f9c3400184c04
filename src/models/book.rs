//! Book (catalogue title) model and related types

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::instance::BookInstance;
use crate::repository::entity::{CatalogEntity, EntityForm, PgQueryAs};

static ISBN13: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{13}$").expect("valid ISBN pattern"));

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    pub summary: String,
    /// 13 digit ISBN
    pub isbn: String,
    pub genre_ids: Vec<i32>,
}

impl CatalogEntity for Book {
    type Id = i32;
    type Form = BookForm;

    const LABEL: &'static str = "Book";
    const TABLE: &'static str = "books";
    const ORDER_BY: &'static str = "title, id";
}

/// Create/update book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BookForm {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    pub author_id: Option<i32>,
    #[validate(length(max = 1000, message = "Summary is limited to 1000 characters"))]
    pub summary: String,
    #[validate(custom(function = "validate_isbn"))]
    pub isbn: String,
    /// Existing genre ids; checked against the genres table on write
    #[serde(default)]
    #[validate(custom(function = "validate_genre_ids"))]
    pub genre_ids: Vec<i32>,
}

fn validate_genre_ids(ids: &[i32]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    if ids.iter().all(|id| *id > 0 && seen.insert(*id)) {
        Ok(())
    } else {
        let mut err = ValidationError::new("genre_ids");
        err.message = Some("Genre ids must be distinct positive ids".into());
        Err(err)
    }
}

fn validate_isbn(isbn: &str) -> Result<(), ValidationError> {
    if ISBN13.is_match(isbn) {
        Ok(())
    } else {
        let mut err = ValidationError::new("isbn");
        err.message = Some("ISBN must be 13 digits".into());
        Err(err)
    }
}

impl EntityForm for BookForm {
    const COLUMNS: &'static [&'static str] = &["title", "author_id", "summary", "isbn", "genre_ids"];

    fn bind_columns<'q, O>(&'q self, query: PgQueryAs<'q, O>) -> PgQueryAs<'q, O> {
        query
            .bind(&self.title)
            .bind(self.author_id)
            .bind(&self.summary)
            .bind(&self.isbn)
            .bind(&self.genre_ids)
    }
}

/// Book with its copies
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetail {
    #[serde(flatten)]
    pub book: Book,
    pub instances: Vec<BookInstance>,
}
