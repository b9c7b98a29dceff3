//! User management service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        user::{CreateUser, UpdateUser, User, UserDetail, UserFilter},
    },
    repository::Repository,
    services::auth::PasswordEncoder,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    encoder: Arc<dyn PasswordEncoder>,
}

impl UsersService {
    pub fn new(repository: Repository, encoder: Arc<dyn PasswordEncoder>) -> Self {
        Self {
            repository,
            encoder,
        }
    }

    pub async fn list(&self) -> AppResult<Vec<UserDetail>> {
        self.search(&UserFilter::default()).await
    }

    pub async fn search(&self, filter: &UserFilter) -> AppResult<Vec<UserDetail>> {
        let users = self.repository.users.find_all(filter).await?;

        let mut details = Vec::with_capacity(users.len());
        for user in users {
            details.push(self.resolve_books(user).await?);
        }

        Ok(details)
    }

    pub async fn get_detail(&self, id: i32) -> AppResult<UserDetail> {
        let user = self.get_by_id(id).await?;
        self.resolve_books(user).await
    }

    pub async fn create(&self, user: CreateUser) -> AppResult<UserDetail> {
        user.validate()?;

        // Rejected before any hashing happens
        let password = user
            .password
            .as_deref()
            .ok_or_else(|| AppError::Conflict("Password must not be null".to_string()))?;
        let hash = self.encoder.encode(password)?;

        let created = self.repository.users.create(&user, &hash).await?;
        self.resolve_books(created).await
    }

    pub async fn update(&self, id: i32, user: UpdateUser) -> AppResult<UserDetail> {
        if user.id != id {
            return Err(AppError::IdMismatch(format!(
                "User id {} does not match payload id {}",
                id, user.id
            )));
        }
        user.validate()?;

        // Password and owned books are kept from the stored user
        let mut stored = self.get_by_id(id).await?;
        stored.username = user.username;
        stored.name = user.name;
        stored.birthdate = user.birthdate;

        let saved = self.repository.users.save(&stored).await?;
        self.resolve_books(saved).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.get_by_id(id).await?;
        self.repository.users.delete(id).await
    }

    pub async fn add_book(&self, user_id: i32, book_id: i32) -> AppResult<UserDetail> {
        let mut user = self.get_by_id(user_id).await?;
        let book = self.get_book(book_id).await?;

        user.add_book(&book)?;

        let saved = self.repository.users.save(&user).await?;
        self.resolve_books(saved).await
    }

    /// Remove a book from the user's collection. Removing one the user
    /// does not own leaves the collection unchanged.
    pub async fn remove_book(&self, user_id: i32, book_id: i32) -> AppResult<UserDetail> {
        let mut user = self.get_by_id(user_id).await?;
        let book = self.get_book(book_id).await?;

        user.remove_book(&book);

        let saved = self.repository.users.save(&user).await?;
        self.resolve_books(saved).await
    }

    async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository
            .books
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Resolve owned book ids to full records. Identifiers that no
    /// longer resolve are skipped.
    async fn resolve_books(&self, user: User) -> AppResult<UserDetail> {
        let mut books = Vec::with_capacity(user.books().len());
        for book_id in user.books() {
            if let Some(book) = self.repository.books.find_by_id(*book_id).await? {
                books.push(book);
            }
        }

        Ok(UserDetail {
            id: user.id,
            username: user.username,
            name: user.name,
            birthdate: user.birthdate,
            books,
        })
    }
}
