//! Repository layer for database operations

pub mod catalog;
pub mod entity;
pub mod loans;
pub mod users;

use sqlx::{Pool, Postgres};

use crate::models::{Author, Book, BookInstance, Genre};
use entity::PgEntityStore;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub authors: PgEntityStore<Author>,
    pub books: PgEntityStore<Book>,
    pub genres: PgEntityStore<Genre>,
    pub instances: PgEntityStore<BookInstance>,
    pub catalog: catalog::CatalogRepository,
    pub loans: loans::LoansRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            authors: PgEntityStore::new(pool.clone()),
            books: PgEntityStore::new(pool.clone()),
            genres: PgEntityStore::new(pool.clone()),
            instances: PgEntityStore::new(pool.clone()),
            catalog: catalog::CatalogRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }

    /// Check the database answers
    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
