//! User model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{book::Book, loan_history::UserLoanHistory};
use crate::error::{AppError, AppResult};

fn check_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("User name must not be blank".to_string()));
    }
    Ok(())
}

/// User aggregate: the user row plus every loan the user has made, oldest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub age: Option<i32>,
    #[sqlx(skip)]
    #[serde(default)]
    pub loan_histories: Vec<UserLoanHistory>,
}

impl User {
    pub fn update_name(&mut self, name: impl Into<String>) -> AppResult<()> {
        let name = name.into();
        check_name(&name)?;
        self.name = name;
        Ok(())
    }

    /// Whether this user currently holds `book_name`
    pub fn has_loaned(&self, book_name: &str) -> bool {
        self.loan_histories
            .iter()
            .any(|h| h.book_name == book_name && h.is_loaned())
    }

    /// Append a `Loaned` history entry for `book`
    pub fn loan_book(&mut self, book: &Book) -> AppResult<()> {
        if self.has_loaned(&book.name) {
            return Err(AppError::Conflict(format!(
                "Book '{}' is already on loan",
                book.name
            )));
        }
        self.loan_histories
            .push(UserLoanHistory::new(self.id, book.name.clone()));
        Ok(())
    }

    /// Mark the first outstanding loan of `book_name` as returned
    pub fn return_book(&mut self, book_name: &str) -> AppResult<()> {
        self.loan_histories
            .iter_mut()
            .find(|h| h.book_name == book_name && h.is_loaned())
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "User '{}' has no outstanding loan for book '{}'",
                    self.name, book_name
                ))
            })?
            .do_return()
    }
}

/// A user that passed validation and is ready to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub age: Option<i32>,
}

impl NewUser {
    pub fn new(name: impl Into<String>, age: Option<i32>) -> AppResult<Self> {
        let name = name.into();
        check_name(&name)?;
        Ok(Self { name, age })
    }
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(max = 255, message = "User name must be at most 255 characters"))]
    pub name: String,
    #[validate(range(min = 0, message = "Age must not be negative"))]
    pub age: Option<i32>,
}

/// Rename user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserName {
    pub id: i64,
    #[validate(length(max = 255, message = "User name must be at most 255 characters"))]
    pub name: String,
}

/// Query for `DELETE /user`
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteUserQuery {
    /// Name of the user to delete
    pub name: String,
}

/// User summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub age: Option<i32>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            age: user.age,
        }
    }
}

/// One borrowed book in a user's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookHistoryResponse {
    pub name: String,
    pub is_return: bool,
}

/// A user together with the books they borrowed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserLoanHistoryResponse {
    pub name: String,
    pub books: Vec<BookHistoryResponse>,
}

impl From<User> for UserLoanHistoryResponse {
    fn from(user: User) -> Self {
        Self {
            name: user.name,
            books: user
                .loan_histories
                .into_iter()
                .map(|h| BookHistoryResponse {
                    is_return: h.is_returned(),
                    name: h.book_name,
                })
                .collect(),
        }
    }
}
