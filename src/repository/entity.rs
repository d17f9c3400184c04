//! Generic create/read/update/delete storage for catalogue entities
//!
//! Every catalogue table (authors, books, genres, book instances) is served by
//! the same [`PgEntityStore`]; an entity only declares its table, ordering
//! and the columns its form writes.

use std::{fmt::Display, marker::PhantomData};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::{
    postgres::{PgArguments, PgRow},
    query::QueryAs,
    Encode, FromRow, Pool, Postgres, Type,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::page::Page,
};

/// Query with a row type, as built by [`sqlx::query_as`]
pub type PgQueryAs<'q, O> = QueryAs<'q, Postgres, O, PgArguments>;

/// Payload accepted by create and update operations
pub trait EntityForm: Validate + Send + Sync {
    /// Columns written by the form, in binding order
    const COLUMNS: &'static [&'static str];

    /// Bind one value per entry of [`Self::COLUMNS`], in the same order
    fn bind_columns<'q, O>(&'q self, query: PgQueryAs<'q, O>) -> PgQueryAs<'q, O>;
}

/// A row type stored in its own table with a single `id` primary key
pub trait CatalogEntity:
    for<'r> FromRow<'r, PgRow> + Serialize + Send + Sync + Unpin + 'static
{
    type Id: for<'q> Encode<'q, Postgres>
        + Type<Postgres>
        + DeserializeOwned
        + Display
        + Copy
        + Send
        + Sync
        + 'static;
    type Form: EntityForm + DeserializeOwned;

    /// Name used in log lines and error messages
    const LABEL: &'static str;
    const TABLE: &'static str;
    /// `ORDER BY` clause of list queries
    const ORDER_BY: &'static str;
}

/// Storage interface shared by every catalogue entity
#[async_trait]
pub trait EntityStore<E: CatalogEntity>: Send + Sync {
    /// One page of entities plus the total count
    async fn list(&self, page: Page) -> AppResult<(Vec<E>, i64)>;
    async fn get(&self, id: E::Id) -> AppResult<E>;
    async fn create(&self, form: &E::Form) -> AppResult<E>;
    async fn update(&self, id: E::Id, form: &E::Form) -> AppResult<E>;
    async fn delete(&self, id: E::Id) -> AppResult<()>;
    async fn count(&self) -> AppResult<i64>;
}

/// PostgreSQL implementation of [`EntityStore`]
pub struct PgEntityStore<E> {
    pool: Pool<Postgres>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for PgEntityStore<E> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: CatalogEntity> PgEntityStore<E> {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    fn not_found(id: E::Id) -> AppError {
        AppError::NotFound(format!("{} with id {} not found", E::LABEL, id))
    }
}

fn insert_sql(table: &str, columns: &[&str]) -> String {
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
        table,
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// The id is bound last, after every column value
fn update_sql(table: &str, columns: &[&str]) -> String {
    let assignments: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{} = ${}", column, i + 1))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE id = ${} RETURNING *",
        table,
        assignments.join(", "),
        columns.len() + 1
    )
}

#[async_trait]
impl<E: CatalogEntity> EntityStore<E> for PgEntityStore<E> {
    async fn list(&self, page: Page) -> AppResult<(Vec<E>, i64)> {
        let query = format!(
            "SELECT * FROM {} ORDER BY {} LIMIT $1 OFFSET $2",
            E::TABLE,
            E::ORDER_BY
        );
        let rows = sqlx::query_as::<_, E>(&query)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let total = self.count().await?;
        Ok((rows, total))
    }

    async fn get(&self, id: E::Id) -> AppResult<E> {
        let query = format!("SELECT * FROM {} WHERE id = $1", E::TABLE);
        sqlx::query_as::<_, E>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    async fn create(&self, form: &E::Form) -> AppResult<E> {
        let query = insert_sql(E::TABLE, <E::Form as EntityForm>::COLUMNS);
        let created = form
            .bind_columns(sqlx::query_as::<_, E>(&query))
            .fetch_one(&self.pool)
            .await?;

        tracing::info!("{} created", E::LABEL);
        Ok(created)
    }

    async fn update(&self, id: E::Id, form: &E::Form) -> AppResult<E> {
        let query = update_sql(E::TABLE, <E::Form as EntityForm>::COLUMNS);
        let updated = form
            .bind_columns(sqlx::query_as::<_, E>(&query))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Self::not_found(id))?;

        tracing::info!("{} {} updated", E::LABEL, id);
        Ok(updated)
    }

    async fn delete(&self, id: E::Id) -> AppResult<()> {
        let query = format!("DELETE FROM {} WHERE id = $1", E::TABLE);
        let result = sqlx::query(&query).bind(id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(Self::not_found(id));
        }
        tracing::info!("{} {} deleted", E::LABEL, id);
        Ok(())
    }

    async fn count(&self) -> AppResult<i64> {
        let query = format!("SELECT COUNT(*) FROM {}", E::TABLE);
        let count: i64 = sqlx::query_scalar(&query).fetch_one(&self.pool).await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_sql() {
        assert_eq!(
            insert_sql("authors", &["first_name", "last_name"]),
            "INSERT INTO authors (first_name, last_name) VALUES ($1, $2) RETURNING *"
        );
    }

    #[test]
    fn test_update_sql_binds_id_last() {
        assert_eq!(
            update_sql("genres", &["name"]),
            "UPDATE genres SET name = $1 WHERE id = $2 RETURNING *"
        );
    }
}
