//! Repository layer for database operations

pub mod books;
#[cfg(test)]
pub mod memory;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        book::{Book, BookFilter, CreateBook},
        user::{CreateUser, User, UserFilter},
    },
};

/// Storage operations for books
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Book>>;

    async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>>;

    /// All books satisfying the filter, ordered by id
    async fn find_all(&self, filter: &BookFilter) -> AppResult<Vec<Book>>;

    async fn create(&self, book: &CreateBook) -> AppResult<Book>;

    async fn update(&self, book: &Book) -> AppResult<Book>;

    async fn delete(&self, id: i32) -> AppResult<()>;

    /// Round trip to the backing store
    async fn ping(&self) -> AppResult<()>;
}

/// Storage operations for users
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// All users satisfying the filter, ordered by id
    async fn find_all(&self, filter: &UserFilter) -> AppResult<Vec<User>>;

    async fn create(&self, user: &CreateUser, password_hash: &str) -> AppResult<User>;

    /// Replace the stored user with the given one, owned books included
    async fn save(&self, user: &User) -> AppResult<User>;

    async fn delete(&self, id: i32) -> AppResult<()>;
}

/// Handle bundling the concrete repositories
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repository {
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::PgBookRepository::new(pool.clone())),
            users: Arc::new(users::PgUserRepository::new(pool)),
        }
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self {
            books: Arc::new(memory::InMemoryBookRepository::new()),
            users: Arc::new(memory::InMemoryUserRepository::new()),
        }
    }

    /// Cheap store round trip backing the readiness endpoint
    pub async fn ping(&self) -> AppResult<()> {
        self.books.ping().await
    }
}
