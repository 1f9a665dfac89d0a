//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library App API",
        version = "0.1.0",
        description = "User, book and loan management REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Users
        users::create_user,
        users::list_users,
        users::update_user_name,
        users::delete_user,
        users::list_user_loan_histories,
        // Books
        books::create_book,
        books::list_books,
        books::loan_book,
        books::return_book,
        books::count_loaned_books,
        books::get_book_statistics,
    ),
    components(
        schemas(
            // Users
            crate::models::user::CreateUser,
            crate::models::user::UpdateUserName,
            crate::models::user::UserResponse,
            crate::models::user::UserLoanHistoryResponse,
            crate::models::user::BookHistoryResponse,
            // Books
            crate::models::book::Book,
            crate::models::book::BookType,
            crate::models::book::CreateBook,
            crate::models::book::LoanBook,
            crate::models::book::ReturnBook,
            crate::models::book::BookStatResponse,
            crate::models::loan_history::UserLoanStatus,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "User management"),
        (name = "books", description = "Books, loans and statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
