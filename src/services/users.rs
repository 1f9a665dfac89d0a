//! User management service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{
        CreateUser, NewUser, UpdateUserName, User, UserLoanHistoryResponse, UserResponse,
    },
    repository::UserStore,
};

#[derive(Clone)]
pub struct UsersService {
    users: Arc<dyn UserStore>,
}

impl UsersService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Register a new user
    pub async fn create_user(&self, data: CreateUser) -> AppResult<User> {
        data.validate()?;
        let new_user = NewUser::new(data.name, data.age)?;

        let user = self.users.create(&new_user).await?;
        tracing::info!("Created user {} ({})", user.id, user.name);
        Ok(user)
    }

    /// Every user row, without loan histories
    pub async fn list_users(&self) -> AppResult<Vec<UserResponse>> {
        let users = self.users.list().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    /// Rename the user with the given id
    pub async fn update_user_name(&self, data: UpdateUserName) -> AppResult<()> {
        data.validate()?;

        let mut user = self
            .users
            .find_by_id(data.id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("User with id {} not found", data.id))
            })?;

        user.update_name(data.name)?;
        self.users.update_name(user.id, &user.name).await?;
        tracing::info!("Renamed user {} to {}", user.id, user.name);
        Ok(())
    }

    /// Delete the first user with this name, together with their loan histories
    pub async fn delete_user(&self, name: &str) -> AppResult<()> {
        let user = self
            .users
            .find_by_name(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", name)))?;

        self.users.delete(user.id).await?;
        tracing::info!(
            "Deleted user {} ({} loan histories)",
            user.id,
            user.loan_histories.len()
        );
        Ok(())
    }

    /// Every user with the books they have borrowed
    pub async fn list_user_loan_histories(&self) -> AppResult<Vec<UserLoanHistoryResponse>> {
        let users = self.users.list_with_histories().await?;
        Ok(users.into_iter().map(UserLoanHistoryResponse::from).collect())
    }
}
