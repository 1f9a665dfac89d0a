//! Repository layer for database operations
//!
//! Each store trait is the seam between the services and PostgreSQL; the
//! sqlx-backed implementations live in the submodules.

pub mod books;
pub mod loan_histories;
pub mod users;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{Book, BookStatResponse, NewBook, NewUser, User, UserLoanStatus},
};

/// Persistence for the user aggregate (user row + loan histories)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: &NewUser) -> AppResult<User>;

    /// All user rows ordered by id, without their loan histories
    async fn list(&self) -> AppResult<Vec<User>>;

    /// All users with their loan histories, ordered by id
    async fn list_with_histories(&self) -> AppResult<Vec<User>>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;

    /// First user (lowest id) with exactly this name
    async fn find_by_name(&self, name: &str) -> AppResult<Option<User>>;

    /// Change the name on the user row only
    async fn update_name(&self, id: i64, name: &str) -> AppResult<()>;

    /// Write the user's loan histories in one transaction, holding a lock on
    /// the user row. Histories without an id are inserted. Stored histories
    /// only move from `Loaned` to `Returned`, never back.
    async fn save_loan_histories(&self, user: &User) -> AppResult<()>;

    /// Delete a user; loan histories go with it
    async fn delete(&self, id: i64) -> AppResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn create(&self, book: &NewBook) -> AppResult<Book>;

    async fn list(&self) -> AppResult<Vec<Book>>;

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Book>>;

    /// Number of books per category; categories without books are absent
    async fn count_by_type(&self) -> AppResult<Vec<BookStatResponse>>;
}

/// Queries over the loan histories of every user
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoanHistoryStore: Send + Sync {
    async fn exists_by_book_name_and_status(
        &self,
        book_name: &str,
        status: UserLoanStatus,
    ) -> AppResult<bool>;

    async fn count_by_status(&self, status: UserLoanStatus) -> AppResult<i64>;
}

/// Database connectivity check used by the readiness endpoint
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthStore: Send + Sync {
    async fn ping(&self) -> AppResult<()>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub books: books::BooksRepository,
    pub loan_histories: loan_histories::LoanHistoriesRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            loan_histories: loan_histories::LoanHistoriesRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl HealthStore for Repository {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
