//! Business logic services

pub mod books;
pub mod users;

use std::sync::Arc;

use crate::repository::{BookStore, HealthStore, LoanHistoryStore, Repository, UserStore};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub books: books::BooksService,
    pub health: Arc<dyn HealthStore>,
}

impl Services {
    /// Create all services backed by the PostgreSQL repository
    pub fn new(repository: Repository) -> Self {
        let health = Arc::new(repository.clone());
        Self::from_stores(
            Arc::new(repository.users),
            Arc::new(repository.books),
            Arc::new(repository.loan_histories),
            health,
        )
    }

    /// Create all services over arbitrary store implementations
    pub fn from_stores(
        users: Arc<dyn UserStore>,
        books: Arc<dyn BookStore>,
        loan_histories: Arc<dyn LoanHistoryStore>,
        health: Arc<dyn HealthStore>,
    ) -> Self {
        Self {
            users: users::UsersService::new(users.clone()),
            books: books::BooksService::new(books, users, loan_histories),
            health,
        }
    }
}
