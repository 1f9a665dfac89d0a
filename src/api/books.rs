//! Book and loan endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::book::{Book, BookStatResponse, CreateBook, LoanBook, ReturnBook},
    AppState,
};

/// Register a new book
#[utoipa::path(
    post,
    path = "/book",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Blank name", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    Json(data): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = state.services.books.create_book(data).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// List books
#[utoipa::path(
    get,
    path = "/book",
    tag = "books",
    responses(
        (status = 200, description = "List of books", body = Vec<Book>)
    )
)]
pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.list_books().await?;
    Ok(Json(books))
}

/// Loan a book to a user
#[utoipa::path(
    post,
    path = "/book/loan",
    tag = "books",
    request_body = LoanBook,
    responses(
        (status = 204, description = "Book loaned"),
        (status = 404, description = "User or book not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Book already on loan", body = crate::error::ErrorResponse)
    )
)]
pub async fn loan_book(
    State(state): State<AppState>,
    Json(data): Json<LoanBook>,
) -> AppResult<StatusCode> {
    state.services.books.loan_book(data).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Return a loaned book
#[utoipa::path(
    put,
    path = "/book/return",
    tag = "books",
    request_body = ReturnBook,
    responses(
        (status = 204, description = "Book returned"),
        (status = 404, description = "User or outstanding loan not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    Json(data): Json<ReturnBook>,
) -> AppResult<StatusCode> {
    state.services.books.return_book(data).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Number of books currently on loan
#[utoipa::path(
    get,
    path = "/book/loan",
    tag = "books",
    responses(
        (status = 200, description = "Loaned book count", body = i64)
    )
)]
pub async fn count_loaned_books(State(state): State<AppState>) -> AppResult<Json<i64>> {
    let count = state.services.books.count_loaned_books().await?;
    Ok(Json(count))
}

/// Book count per category
#[utoipa::path(
    get,
    path = "/book/stat",
    tag = "books",
    responses(
        (status = 200, description = "Count of books per category", body = Vec<BookStatResponse>)
    )
)]
pub async fn get_book_statistics(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<BookStatResponse>>> {
    let stats = state.services.books.get_book_statistics().await?;
    Ok(Json(stats))
}
