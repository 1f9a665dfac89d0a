//! Users repository for database operations

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::UserStore;
use crate::{
    error::{is_unique_violation, AppError, AppResult},
    models::{NewUser, User, UserLoanHistory, UserLoanStatus},
};

/// A single row write needed to persist a user's loan histories
#[derive(Debug, PartialEq)]
enum HistoryWrite<'a> {
    Insert(&'a UserLoanHistory),
    MarkReturned(i64),
}

/// Stored entries only ever move forward, so a loaned entry that already has
/// an id needs no write.
fn history_writes(user: &User) -> Vec<HistoryWrite<'_>> {
    user.loan_histories
        .iter()
        .filter_map(|history| match (history.id, history.status) {
            (None, _) => Some(HistoryWrite::Insert(history)),
            (Some(id), UserLoanStatus::Returned) => Some(HistoryWrite::MarkReturned(id)),
            (Some(_), UserLoanStatus::Loaned) => None,
        })
        .collect()
}

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn with_histories(&self, user: Option<User>) -> AppResult<Option<User>> {
        let Some(mut user) = user else {
            return Ok(None);
        };

        user.loan_histories = sqlx::query_as::<_, UserLoanHistory>(
            r#"
            SELECT id, user_id, book_name, status
            FROM user_loan_history
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(user))
    }
}

#[async_trait]
impl UserStore for UsersRepository {
    async fn create(&self, user: &NewUser) -> AppResult<User> {
        let row = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, age) VALUES ($1, $2) RETURNING id, name, age",
        )
        .bind(&user.name)
        .bind(user.age)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT id, name, age FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn list_with_histories(&self) -> AppResult<Vec<User>> {
        let mut users = self.list().await?;

        let histories = sqlx::query_as::<_, UserLoanHistory>(
            "SELECT id, user_id, book_name, status FROM user_loan_history ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_user: HashMap<i64, Vec<UserLoanHistory>> = HashMap::new();
        for history in histories {
            by_user.entry(history.user_id).or_default().push(history);
        }

        for user in &mut users {
            user.loan_histories = by_user.remove(&user.id).unwrap_or_default();
        }

        Ok(users)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT id, name, age FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        self.with_histories(user).await
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, age FROM users WHERE name = $1 ORDER BY id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        self.with_histories(user).await
    }

    async fn update_name(&self, id: i64, name: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET name = $1 WHERE id = $2")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }
        Ok(())
    }

    async fn save_loan_histories(&self, user: &User) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        // Serializes concurrent loan writes for the same user
        let locked: Option<i64> =
            sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
                .bind(user.id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(AppError::NotFound(format!(
                "User with id {} not found",
                user.id
            )));
        }

        for write in history_writes(user) {
            match write {
                HistoryWrite::Insert(history) => {
                    sqlx::query(
                        r#"
                        INSERT INTO user_loan_history (user_id, book_name, status)
                        VALUES ($1, $2, $3)
                        "#,
                    )
                    .bind(user.id)
                    .bind(&history.book_name)
                    .bind(history.status)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| {
                        if is_unique_violation(&e) {
                            AppError::Conflict(format!(
                                "Book '{}' is already on loan",
                                history.book_name
                            ))
                        } else {
                            AppError::Database(e)
                        }
                    })?;
                }
                HistoryWrite::MarkReturned(id) => {
                    sqlx::query(
                        r#"
                        UPDATE user_loan_history
                        SET status = $1
                        WHERE id = $2 AND user_id = $3 AND status = $4
                        "#,
                    )
                    .bind(UserLoanStatus::Returned)
                    .bind(id)
                    .bind(user.id)
                    .bind(UserLoanStatus::Loaned)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }
        Ok(())
    }
}
