//! Books repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::BookStore;
use crate::{
    error::AppResult,
    models::{Book, BookStatResponse, NewBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn create(&self, book: &NewBook) -> AppResult<Book> {
        let row = sqlx::query_as::<_, Book>(
            "INSERT INTO book (name, book_type) VALUES ($1, $2) RETURNING id, name, book_type",
        )
        .bind(&book.name)
        .bind(book.book_type)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list(&self) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>("SELECT id, name, book_type FROM book ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, Book>(
            "SELECT id, name, book_type FROM book WHERE name = $1 ORDER BY id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn count_by_type(&self) -> AppResult<Vec<BookStatResponse>> {
        let rows = sqlx::query_as::<_, BookStatResponse>(
            r#"
            SELECT book_type, COUNT(*) AS count
            FROM book
            GROUP BY book_type
            ORDER BY book_type
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
