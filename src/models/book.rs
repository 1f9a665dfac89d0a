//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Book category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookType {
    Computer,
    Economy,
    Society,
    Language,
    Science,
}

impl BookType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookType::Computer => "COMPUTER",
            BookType::Economy => "ECONOMY",
            BookType::Society => "SOCIETY",
            BookType::Language => "LANGUAGE",
            BookType::Science => "SCIENCE",
        }
    }
}

impl std::fmt::Display for BookType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "COMPUTER" => Ok(BookType::Computer),
            "ECONOMY" => Ok(BookType::Economy),
            "SOCIETY" => Ok(BookType::Society),
            "LANGUAGE" => Ok(BookType::Language),
            "SCIENCE" => Ok(BookType::Science),
            _ => Err(format!("Invalid book type: {}", s)),
        }
    }
}

// Stored as its upper-case name in a VARCHAR column
impl sqlx::Type<Postgres> for BookType {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for BookType {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BookType {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Book record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub book_type: BookType,
}

/// A book that passed validation and is ready to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub name: String,
    pub book_type: BookType,
}

impl NewBook {
    pub fn new(name: impl Into<String>, book_type: BookType) -> AppResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AppError::Validation("Book name must not be blank".to_string()));
        }
        Ok(Self { name, book_type })
    }
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 255, message = "Book name must be 1 to 255 characters"))]
    pub name: String,
    #[serde(rename = "type")]
    pub book_type: BookType,
}

/// Loan book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoanBook {
    #[validate(length(min = 1, message = "User name is required"))]
    pub user_name: String,
    #[validate(length(min = 1, message = "Book name is required"))]
    pub book_name: String,
}

/// Return book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReturnBook {
    #[validate(length(min = 1, message = "User name is required"))]
    pub user_name: String,
    #[validate(length(min = 1, message = "Book name is required"))]
    pub book_name: String,
}

/// Number of books registered in one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookStatResponse {
    #[serde(rename = "type")]
    pub book_type: BookType,
    pub count: i64,
}
