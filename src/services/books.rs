//! Book catalog and loan service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{CreateBook, LoanBook, ReturnBook},
        Book, BookStatResponse, NewBook, UserLoanStatus,
    },
    repository::{BookStore, LoanHistoryStore, UserStore},
};

#[derive(Clone)]
pub struct BooksService {
    books: Arc<dyn BookStore>,
    users: Arc<dyn UserStore>,
    loan_histories: Arc<dyn LoanHistoryStore>,
}

impl BooksService {
    pub fn new(
        books: Arc<dyn BookStore>,
        users: Arc<dyn UserStore>,
        loan_histories: Arc<dyn LoanHistoryStore>,
    ) -> Self {
        Self {
            books,
            users,
            loan_histories,
        }
    }

    /// Register a new book
    pub async fn create_book(&self, data: CreateBook) -> AppResult<Book> {
        data.validate()?;
        let new_book = NewBook::new(data.name, data.book_type)?;

        let book = self.books.create(&new_book).await?;
        tracing::info!("Created book {} ({}, {})", book.id, book.name, book.book_type);
        Ok(book)
    }

    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.books.list().await
    }

    /// Lend a book to a user.
    ///
    /// The on-loan check looks at every user's history by book name, so a
    /// book name can only be out once across the whole library.
    pub async fn loan_book(&self, data: LoanBook) -> AppResult<()> {
        data.validate()?;

        let mut user = self
            .users
            .find_by_name(&data.user_name)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("User '{}' not found", data.user_name))
            })?;

        let book = self
            .books
            .find_by_name(&data.book_name)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Book '{}' not found", data.book_name))
            })?;

        if self
            .loan_histories
            .exists_by_book_name_and_status(&book.name, UserLoanStatus::Loaned)
            .await?
        {
            return Err(AppError::Conflict(format!(
                "Book '{}' is already on loan",
                book.name
            )));
        }

        user.loan_book(&book)?;
        self.users.save_loan_histories(&user).await?;
        tracing::info!("User {} borrowed '{}'", user.name, book.name);
        Ok(())
    }

    /// Take back a book the user currently holds
    pub async fn return_book(&self, data: ReturnBook) -> AppResult<()> {
        data.validate()?;

        let mut user = self
            .users
            .find_by_name(&data.user_name)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("User '{}' not found", data.user_name))
            })?;

        user.return_book(&data.book_name)?;
        self.users.save_loan_histories(&user).await?;
        tracing::info!("User {} returned '{}'", user.name, data.book_name);
        Ok(())
    }

    /// Number of books currently out, across all users
    pub async fn count_loaned_books(&self) -> AppResult<i64> {
        self.loan_histories
            .count_by_status(UserLoanStatus::Loaned)
            .await
    }

    /// Book count per category
    pub async fn get_book_statistics(&self) -> AppResult<Vec<BookStatResponse>> {
        self.books.count_by_type().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{
        models::{BookType, User, UserLoanHistory},
        repository::{MockBookStore, MockLoanHistoryStore, MockUserStore},
    };

    fn user(name: &str) -> User {
        User {
            id: 1,
            name: name.to_string(),
            age: None,
            loan_histories: Vec::new(),
        }
    }

    fn book(name: &str, book_type: BookType) -> Book {
        Book {
            id: 1,
            name: name.to_string(),
            book_type,
        }
    }

    fn service(
        books: MockBookStore,
        users: MockUserStore,
        loan_histories: MockLoanHistoryStore,
    ) -> BooksService {
        BooksService::new(Arc::new(books), Arc::new(users), Arc::new(loan_histories))
    }

    fn loan(user_name: &str, book_name: &str) -> LoanBook {
        LoanBook {
            user_name: user_name.into(),
            book_name: book_name.into(),
        }
    }

    fn give_back(user_name: &str, book_name: &str) -> ReturnBook {
        ReturnBook {
            user_name: user_name.into(),
            book_name: book_name.into(),
        }
    }

    fn history(id: i64, book_name: &str, status: UserLoanStatus) -> UserLoanHistory {
        UserLoanHistory {
            id: Some(id),
            user_id: 1,
            book_name: book_name.into(),
            status,
        }
    }

    #[tokio::test]
    async fn test_create_book() {
        let mut books = MockBookStore::new();
        books
            .expect_create()
            .withf(|b| b.name == "A" && b.book_type == BookType::Computer)
            .times(1)
            .returning(|b| Ok(book(&b.name, b.book_type)));

        let svc = service(books, MockUserStore::new(), MockLoanHistoryStore::new());
        let created = svc
            .create_book(CreateBook {
                name: "A".into(),
                book_type: BookType::Computer,
            })
            .await
            .unwrap();

        assert_eq!(created.name, "A");
        assert_eq!(created.book_type, BookType::Computer);
    }

    #[tokio::test]
    async fn test_create_book_with_blank_name_fails() {
        let svc = service(
            MockBookStore::new(),
            MockUserStore::new(),
            MockLoanHistoryStore::new(),
        );
        let err = svc
            .create_book(CreateBook {
                name: "  ".into(),
                book_type: BookType::Science,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_loan_book() {
        let mut books = MockBookStore::new();
        books
            .expect_find_by_name()
            .returning(|name| Ok(Some(book(name, BookType::Computer))));

        let mut histories = MockLoanHistoryStore::new();
        histories
            .expect_exists_by_book_name_and_status()
            .withf(|name, status| name == "A" && *status == UserLoanStatus::Loaned)
            .returning(|_, _| Ok(false));

        let mut users = MockUserStore::new();
        users
            .expect_find_by_name()
            .returning(|name| Ok(Some(user(name))));
        users
            .expect_save_loan_histories()
            .withf(|u| {
                u.loan_histories.len() == 1
                    && u.loan_histories[0].book_name == "A"
                    && u.loan_histories[0].user_id == 1
                    && u.loan_histories[0].status == UserLoanStatus::Loaned
            })
            .times(1)
            .returning(|_| Ok(()));

        let svc = service(books, users, histories);
        svc.loan_book(loan("userA", "A")).await.unwrap();
    }

    #[tokio::test]
    async fn test_loan_book_already_loaned_conflicts() {
        let mut books = MockBookStore::new();
        books
            .expect_find_by_name()
            .returning(|name| Ok(Some(book(name, BookType::Computer))));

        let mut histories = MockLoanHistoryStore::new();
        histories
            .expect_exists_by_book_name_and_status()
            .returning(|_, _| Ok(true));

        let mut users = MockUserStore::new();
        users
            .expect_find_by_name()
            .returning(|name| Ok(Some(user(name))));
        users.expect_save_loan_histories().never();

        let svc = service(books, users, histories);
        let err = svc.loan_book(loan("userA", "A")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_loan_book_unknown_user_or_book_is_not_found() {
        let mut users = MockUserStore::new();
        users.expect_find_by_name().returning(|_| Ok(None));
        let svc = service(MockBookStore::new(), users, MockLoanHistoryStore::new());
        let err = svc.loan_book(loan("ghost", "A")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let mut users = MockUserStore::new();
        users
            .expect_find_by_name()
            .returning(|name| Ok(Some(user(name))));
        users.expect_save_loan_histories().never();
        let mut books = MockBookStore::new();
        books.expect_find_by_name().returning(|_| Ok(None));
        let svc = service(books, users, MockLoanHistoryStore::new());
        let err = svc.loan_book(loan("userA", "missing")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_return_book() {
        let mut users = MockUserStore::new();
        users.expect_find_by_name().returning(|name| {
            let mut u = user(name);
            u.loan_histories = vec![history(5, "A", UserLoanStatus::Loaned)];
            Ok(Some(u))
        });
        users
            .expect_save_loan_histories()
            .withf(|u| {
                u.loan_histories.len() == 1
                    && u.loan_histories[0].id == Some(5)
                    && u.loan_histories[0].status == UserLoanStatus::Returned
            })
            .times(1)
            .returning(|_| Ok(()));

        let svc = service(MockBookStore::new(), users, MockLoanHistoryStore::new());
        svc.return_book(give_back("userA", "A")).await.unwrap();
    }

    #[tokio::test]
    async fn test_return_book_without_loan_is_not_found() {
        let mut users = MockUserStore::new();
        users
            .expect_find_by_name()
            .returning(|name| Ok(Some(user(name))));
        users.expect_save_loan_histories().never();

        let svc = service(MockBookStore::new(), users, MockLoanHistoryStore::new());
        let err = svc.return_book(give_back("userA", "A")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_count_loaned_books() {
        // 1 loaned + 2 returned
        let stored = vec![
            history(1, "A", UserLoanStatus::Loaned),
            history(2, "B", UserLoanStatus::Returned),
            history(3, "C", UserLoanStatus::Returned),
        ];

        let mut histories = MockLoanHistoryStore::new();
        histories.expect_count_by_status().returning(move |status| {
            Ok(stored.iter().filter(|h| h.status == status).count() as i64)
        });

        let svc = service(MockBookStore::new(), MockUserStore::new(), histories);
        assert_eq!(svc.count_loaned_books().await.unwrap(), 1);
    }

    /// Loan then return against a shared in-test history table
    #[tokio::test]
    async fn test_loan_then_return_changes_loaned_count_by_one() {
        let table: Arc<Mutex<Vec<UserLoanHistory>>> = Arc::new(Mutex::new(Vec::new()));

        let mut books = MockBookStore::new();
        books
            .expect_find_by_name()
            .returning(|name| Ok(Some(book(name, BookType::Science))));

        let mut histories = MockLoanHistoryStore::new();
        let t = table.clone();
        histories
            .expect_exists_by_book_name_and_status()
            .returning(move |name, status| {
                Ok(t
                    .lock()
                    .unwrap()
                    .iter()
                    .any(|h| h.book_name == name && h.status == status))
            });
        let t = table.clone();
        histories.expect_count_by_status().returning(move |status| {
            let rows = t.lock().unwrap();
            Ok(rows.iter().filter(|h| h.status == status).count() as i64)
        });

        let mut users = MockUserStore::new();
        let t = table.clone();
        users.expect_find_by_name().returning(move |name| {
            let mut u = user(name);
            u.loan_histories = t.lock().unwrap().clone();
            Ok(Some(u))
        });
        let t = table.clone();
        users.expect_save_loan_histories().returning(move |u| {
            let mut rows = t.lock().unwrap();
            *rows = u
                .loan_histories
                .iter()
                .enumerate()
                .map(|(i, h)| UserLoanHistory {
                    id: Some(i as i64 + 1),
                    ..h.clone()
                })
                .collect();
            Ok(())
        });

        let svc = service(books, users, histories);

        let before = svc.count_loaned_books().await.unwrap();
        svc.loan_book(loan("userA", "A")).await.unwrap();
        let loaned = svc.count_loaned_books().await.unwrap();
        assert_eq!(loaned, before + 1);

        // Second loan of the same name is refused and adds nothing
        let err = svc.loan_book(loan("userA", "A")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(table.lock().unwrap().len(), 1);

        svc.return_book(give_back("userA", "A")).await.unwrap();
        let after = svc.count_loaned_books().await.unwrap();
        assert_eq!(loaned - after, 1);

        let rows = table.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, UserLoanStatus::Returned);
    }

    #[tokio::test]
    async fn test_create_book_increments_its_category() {
        let table: Arc<Mutex<Vec<Book>>> = Arc::new(Mutex::new(vec![
            book("A", BookType::Computer),
            book("B", BookType::Science),
        ]));

        let mut books = MockBookStore::new();
        let t = table.clone();
        books.expect_create().returning(move |b| {
            let mut rows = t.lock().unwrap();
            let created = Book {
                id: rows.len() as i64 + 1,
                name: b.name.clone(),
                book_type: b.book_type,
            };
            rows.push(created.clone());
            Ok(created)
        });
        let t = table.clone();
        books.expect_count_by_type().returning(move || {
            let rows = t.lock().unwrap();
            let mut stats: Vec<BookStatResponse> = Vec::new();
            for row in rows.iter() {
                match stats.iter_mut().find(|s| s.book_type == row.book_type) {
                    Some(stat) => stat.count += 1,
                    None => stats.push(BookStatResponse {
                        book_type: row.book_type,
                        count: 1,
                    }),
                }
            }
            Ok(stats)
        });

        let svc = service(books, MockUserStore::new(), MockLoanHistoryStore::new());
        let count = |stats: &[BookStatResponse], t: BookType| {
            stats
                .iter()
                .find(|s| s.book_type == t)
                .map(|s| s.count)
                .unwrap_or(0)
        };

        let before = svc.get_book_statistics().await.unwrap();
        svc.create_book(CreateBook {
            name: "C".into(),
            book_type: BookType::Computer,
        })
        .await
        .unwrap();
        let after = svc.get_book_statistics().await.unwrap();

        assert_eq!(
            count(&after, BookType::Computer),
            count(&before, BookType::Computer) + 1
        );
        assert_eq!(
            count(&after, BookType::Science),
            count(&before, BookType::Science)
        );
    }

    #[tokio::test]
    async fn test_get_book_statistics() {
        let mut books = MockBookStore::new();
        books.expect_count_by_type().returning(|| {
            Ok(vec![
                BookStatResponse {
                    book_type: BookType::Computer,
                    count: 2,
                },
                BookStatResponse {
                    book_type: BookType::Science,
                    count: 1,
                },
            ])
        });

        let svc = service(books, MockUserStore::new(), MockLoanHistoryStore::new());
        let results = svc.get_book_statistics().await.unwrap();

        assert_eq!(results.len(), 2);
        let count = |t: BookType| {
            results
                .iter()
                .find(|r| r.book_type == t)
                .map(|r| r.count)
        };
        assert_eq!(count(BookType::Computer), Some(2));
        assert_eq!(count(BookType::Science), Some(1));
        assert_eq!(count(BookType::Society), None);
    }
}
