//! User loan history model

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Loan status. `Loaned` is the initial state, `Returned` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserLoanStatus {
    Loaned,
    Returned,
}

impl UserLoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserLoanStatus::Loaned => "LOANED",
            UserLoanStatus::Returned => "RETURNED",
        }
    }
}

impl std::fmt::Display for UserLoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for UserLoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LOANED" => Ok(UserLoanStatus::Loaned),
            "RETURNED" => Ok(UserLoanStatus::Returned),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for UserLoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for UserLoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for UserLoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// One user borrowing one named book.
///
/// `id` is `None` until the entry has been written by the users repository.
/// `book_name` is copied from the book at loan time, it is not a foreign key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserLoanHistory {
    pub id: Option<i64>,
    pub user_id: i64,
    pub book_name: String,
    pub status: UserLoanStatus,
}

impl UserLoanHistory {
    /// New entry in the `Loaned` state
    pub fn new(user_id: i64, book_name: impl Into<String>) -> Self {
        Self {
            id: None,
            user_id,
            book_name: book_name.into(),
            status: UserLoanStatus::Loaned,
        }
    }

    pub fn is_loaned(&self) -> bool {
        self.status == UserLoanStatus::Loaned
    }

    pub fn is_returned(&self) -> bool {
        self.status == UserLoanStatus::Returned
    }

    /// Transition `Loaned` -> `Returned`
    pub fn do_return(&mut self) -> AppResult<()> {
        if self.is_returned() {
            return Err(AppError::Conflict(format!(
                "Book '{}' has already been returned",
                self.book_name
            )));
        }
        self.status = UserLoanStatus::Returned;
        Ok(())
    }
}
