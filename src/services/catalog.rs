//! Catalog service: generic CRUD plus detail and summary views

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        author::AuthorDetail,
        book::BookDetail,
        page::Page,
        summary::CatalogSummary,
        Author, Book, BookInstance, Genre, LoanStatus,
    },
    repository::{
        entity::{CatalogEntity, EntityStore},
        Repository,
    },
};

/// Gives access to the store of one entity type
pub trait StoreFor<E: CatalogEntity> {
    fn store(&self) -> &dyn EntityStore<E>;
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    authors: Arc<dyn EntityStore<Author>>,
    books: Arc<dyn EntityStore<Book>>,
    genres: Arc<dyn EntityStore<Genre>>,
    instances: Arc<dyn EntityStore<BookInstance>>,
}

impl StoreFor<Author> for CatalogService {
    fn store(&self) -> &dyn EntityStore<Author> {
        self.authors.as_ref()
    }
}

impl StoreFor<Book> for CatalogService {
    fn store(&self) -> &dyn EntityStore<Book> {
        self.books.as_ref()
    }
}

impl StoreFor<Genre> for CatalogService {
    fn store(&self) -> &dyn EntityStore<Genre> {
        self.genres.as_ref()
    }
}

impl StoreFor<BookInstance> for CatalogService {
    fn store(&self) -> &dyn EntityStore<BookInstance> {
        self.instances.as_ref()
    }
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self {
            authors: Arc::new(repository.authors.clone()),
            books: Arc::new(repository.books.clone()),
            genres: Arc::new(repository.genres.clone()),
            instances: Arc::new(repository.instances.clone()),
            repository,
        }
    }

    pub async fn list<E>(&self, page: Page) -> AppResult<(Vec<E>, i64)>
    where
        E: CatalogEntity,
        Self: StoreFor<E>,
    {
        StoreFor::<E>::store(self).list(page).await
    }

    pub async fn get<E>(&self, id: E::Id) -> AppResult<E>
    where
        E: CatalogEntity,
        Self: StoreFor<E>,
    {
        StoreFor::<E>::store(self).get(id).await
    }

    /// Validate the form, then insert
    pub async fn create<E>(&self, form: &E::Form) -> AppResult<E>
    where
        E: CatalogEntity,
        Self: StoreFor<E>,
    {
        form.validate()?;
        StoreFor::<E>::store(self).create(form).await
    }

    /// Validate the form, then overwrite every column of the entity
    pub async fn update<E>(&self, id: E::Id, form: &E::Form) -> AppResult<E>
    where
        E: CatalogEntity,
        Self: StoreFor<E>,
    {
        form.validate()?;
        StoreFor::<E>::store(self).update(id, form).await
    }

    pub async fn delete<E>(&self, id: E::Id) -> AppResult<()>
    where
        E: CatalogEntity,
        Self: StoreFor<E>,
    {
        StoreFor::<E>::store(self).delete(id).await
    }

    /// Book with its copies
    pub async fn book_detail(&self, id: i32) -> AppResult<BookDetail> {
        let book = self.books.get(id).await?;
        let instances = self.repository.catalog.instances_of_book(id).await?;
        Ok(BookDetail { book, instances })
    }

    /// Author with their books
    pub async fn author_detail(&self, id: i32) -> AppResult<AuthorDetail> {
        let author = self.authors.get(id).await?;
        let books = self.repository.catalog.books_by_author(id).await?;
        Ok(AuthorDetail { author, books })
    }

    /// Home page counts; `num_visits` is filled in by the caller
    pub async fn summary(&self) -> AppResult<CatalogSummary> {
        Ok(CatalogSummary {
            num_books: self.books.count().await?,
            num_instances: self.instances.count().await?,
            num_instances_available: self
                .repository
                .loans
                .count_with_status(LoanStatus::Available)
                .await?,
            num_authors: self.authors.count().await?,
            num_genres: self.genres.count().await?,
            num_visits: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::AppError, models::genre::GenreForm};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-memory genre store recording writes
    #[derive(Default)]
    struct MemoryGenres {
        rows: Mutex<Vec<Genre>>,
    }

    #[async_trait]
    impl EntityStore<Genre> for MemoryGenres {
        async fn list(&self, page: Page) -> AppResult<(Vec<Genre>, i64)> {
            let rows = self.rows.lock().unwrap();
            let items = rows
                .iter()
                .skip(page.offset() as usize)
                .take(page.limit() as usize)
                .cloned()
                .collect();
            Ok((items, rows.len() as i64))
        }

        async fn get(&self, id: i32) -> AppResult<Genre> {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|g| g.id == id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("Genre with id {} not found", id)))
        }

        async fn create(&self, form: &GenreForm) -> AppResult<Genre> {
            let mut rows = self.rows.lock().unwrap();
            let genre = Genre {
                id: rows.len() as i32 + 1,
                name: form.name.clone(),
            };
            rows.push(genre.clone());
            Ok(genre)
        }

        async fn update(&self, id: i32, form: &GenreForm) -> AppResult<Genre> {
            let mut rows = self.rows.lock().unwrap();
            let genre = rows
                .iter_mut()
                .find(|g| g.id == id)
                .ok_or_else(|| AppError::NotFound(format!("Genre with id {} not found", id)))?;
            genre.name = form.name.clone();
            Ok(genre.clone())
        }

        async fn delete(&self, id: i32) -> AppResult<()> {
            self.rows.lock().unwrap().retain(|g| g.id != id);
            Ok(())
        }

        async fn count(&self) -> AppResult<i64> {
            Ok(self.rows.lock().unwrap().len() as i64)
        }
    }

    fn service_with_genres(genres: Arc<MemoryGenres>) -> CatalogService {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        let mut service = CatalogService::new(Repository::new(pool));
        service.genres = genres;
        service
    }

    #[tokio::test]
    async fn test_invalid_form_is_not_stored() {
        let genres = Arc::new(MemoryGenres::default());
        let service = service_with_genres(genres.clone());

        let err = service
            .create::<Genre>(&GenreForm { name: String::new() })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(genres.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_generic_crud_cycle() {
        let service = service_with_genres(Arc::new(MemoryGenres::default()));

        let created = service
            .create::<Genre>(&GenreForm { name: "Fantasy".into() })
            .await
            .unwrap();
        let updated = service
            .update::<Genre>(created.id, &GenreForm { name: "Science Fiction".into() })
            .await
            .unwrap();
        assert_eq!(updated.name, "Science Fiction");

        let (listed, total) = service.list::<Genre>(Page { number: 1, size: 10 }).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(listed[0].name, "Science Fiction");

        service.delete::<Genre>(created.id).await.unwrap();
        assert!(matches!(
            service.get::<Genre>(created.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
