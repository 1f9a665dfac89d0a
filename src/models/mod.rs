//! Data models for the library

pub mod book;
pub mod loan_history;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookStatResponse, BookType, NewBook};
pub use loan_history::{UserLoanHistory, UserLoanStatus};
pub use user::{NewUser, User};
