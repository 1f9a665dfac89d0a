//! Loan history queries across all users

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::LoanHistoryStore;
use crate::{error::AppResult, models::UserLoanStatus};

#[derive(Clone)]
pub struct LoanHistoriesRepository {
    pool: Pool<Postgres>,
}

impl LoanHistoriesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanHistoryStore for LoanHistoriesRepository {
    async fn exists_by_book_name_and_status(
        &self,
        book_name: &str,
        status: UserLoanStatus,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM user_loan_history WHERE book_name = $1 AND status = $2)",
        )
        .bind(book_name)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn count_by_status(&self, status: UserLoanStatus) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM user_loan_history WHERE status = $1")
                .bind(status)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
