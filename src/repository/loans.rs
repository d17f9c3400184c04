//! Loans repository: copies on loan and their due-back dates

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        instance::{BookInstance, LoanStatus},
        loan::LoanRow,
        page::Page,
    },
};

/// Storage operations needed by the loan workflows
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoanStore: Send + Sync {
    /// Fetch a copy by id
    async fn get_instance(&self, id: Uuid) -> AppResult<BookInstance>;

    /// Set the due-back date of a copy that is on loan
    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<BookInstance>;

    /// Copies on loan ordered by due-back date, optionally for one borrower
    async fn list_on_loan(&self, borrower_id: Option<i32>, page: Page) -> AppResult<(Vec<LoanRow>, i64)>;
}

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Count copies in a given status
    pub async fn count_with_status(&self, status: LoanStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl LoanStore for LoansRepository {
    async fn get_instance(&self, id: Uuid) -> AppResult<BookInstance> {
        sqlx::query_as::<_, BookInstance>("SELECT * FROM book_instances WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book instance with id {} not found", id)))
    }

    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<BookInstance> {
        // The status guard keeps a due-back date off copies that are not on loan
        sqlx::query_as::<_, BookInstance>(
            "UPDATE book_instances SET due_back = $1 WHERE id = $2 AND status = $3 RETURNING *",
        )
        .bind(due_back)
        .bind(id)
        .bind(LoanStatus::OnLoan)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::BusinessRule(format!("Book instance {} is not on loan", id)))
    }

    async fn list_on_loan(&self, borrower_id: Option<i32>, page: Page) -> AppResult<(Vec<LoanRow>, i64)> {
        let rows = sqlx::query_as::<_, LoanRow>(
            r#"
            SELECT bi.*, b.title, u.login AS borrower_login
            FROM book_instances bi
            JOIN books b ON bi.book_id = b.id
            LEFT JOIN users u ON bi.borrower_id = u.id
            WHERE bi.status = $1
              AND ($2::int IS NULL OR bi.borrower_id = $2)
            ORDER BY bi.due_back, bi.id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(LoanStatus::OnLoan)
        .bind(borrower_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_instances WHERE status = $1 AND ($2::int IS NULL OR borrower_id = $2)",
        )
        .bind(LoanStatus::OnLoan)
        .bind(borrower_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows, total))
    }
}
