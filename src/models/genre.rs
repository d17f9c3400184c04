//! Genre model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::repository::entity::{CatalogEntity, EntityForm, PgQueryAs};

/// Book genre (e.g. Science Fiction, French Poetry)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

impl CatalogEntity for Genre {
    type Id = i32;
    type Form = GenreForm;

    const LABEL: &'static str = "Genre";
    const TABLE: &'static str = "genres";
    const ORDER_BY: &'static str = "name";
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct GenreForm {
    #[validate(length(min = 1, max = 200, message = "Genre name must be 1-200 characters"))]
    pub name: String,
}

impl EntityForm for GenreForm {
    const COLUMNS: &'static [&'static str] = &["name"];

    fn bind_columns<'q, O>(&'q self, query: PgQueryAs<'q, O>) -> PgQueryAs<'q, O> {
        query.bind(&self.name)
    }
}
