//! User management endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::user::{
        CreateUser, DeleteUserQuery, UpdateUserName, UserLoanHistoryResponse, UserResponse,
    },
    AppState,
};

/// Create a new user
#[utoipa::path(
    post,
    path = "/user",
    tag = "users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Blank name or invalid age", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(data): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state.services.users.create_user(data).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// List users
#[utoipa::path(
    get,
    path = "/user",
    tag = "users",
    responses(
        (status = 200, description = "List of users", body = Vec<UserResponse>)
    )
)]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state.services.users.list_users().await?;
    Ok(Json(users))
}

/// Rename a user
#[utoipa::path(
    put,
    path = "/user",
    tag = "users",
    request_body = UpdateUserName,
    responses(
        (status = 204, description = "User renamed"),
        (status = 400, description = "Blank name", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_user_name(
    State(state): State<AppState>,
    Json(data): Json<UpdateUserName>,
) -> AppResult<StatusCode> {
    state.services.users.update_user_name(data).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a user by name, including their loan history
#[utoipa::path(
    delete,
    path = "/user",
    tag = "users",
    params(DeleteUserQuery),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Query(query): Query<DeleteUserQuery>,
) -> AppResult<StatusCode> {
    state.services.users.delete_user(&query.name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Users with the books they borrowed
#[utoipa::path(
    get,
    path = "/user/loan",
    tag = "users",
    responses(
        (status = 200, description = "Loan histories grouped by user", body = Vec<UserLoanHistoryResponse>)
    )
)]
pub async fn list_user_loan_histories(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<UserLoanHistoryResponse>>> {
    let histories = state.services.users.list_user_loan_histories().await?;
    Ok(Json(histories))
}
