//! In-memory repositories for unit tests

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookFilter, CreateBook},
        user::{CreateUser, User, UserFilter},
    },
    repository::{BookRepository, UserRepository},
};

#[derive(Default)]
struct BookStore {
    books: BTreeMap<i32, Book>,
    next_id: i32,
}

#[derive(Default)]
pub struct InMemoryBookRepository {
    inner: Mutex<BookStore>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Book>> {
        let store = self.inner.lock().expect("book store poisoned");
        Ok(store.books.get(&id).cloned())
    }

    async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>> {
        let store = self.inner.lock().expect("book store poisoned");
        Ok(store.books.values().find(|book| book.isbn == isbn).cloned())
    }

    async fn find_all(&self, filter: &BookFilter) -> AppResult<Vec<Book>> {
        let store = self.inner.lock().expect("book store poisoned");
        Ok(store
            .books
            .values()
            .filter(|book| filter.matches(book))
            .cloned()
            .collect())
    }

    async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let mut store = self.inner.lock().expect("book store poisoned");
        store.next_id += 1;
        let created = Book {
            id: store.next_id,
            genre: book.genre.clone(),
            author: book.author.clone(),
            image: book.image.clone(),
            title: book.title.clone(),
            subtitle: book.subtitle.clone(),
            publisher: book.publisher.clone(),
            year: book.year.clone(),
            pages: book.pages,
            isbn: book.isbn.clone(),
        };
        store.books.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, book: &Book) -> AppResult<Book> {
        let mut store = self.inner.lock().expect("book store poisoned");
        if !store.books.contains_key(&book.id) {
            return Err(AppError::NotFound(format!(
                "Book with id {} not found",
                book.id
            )));
        }
        store.books.insert(book.id, book.clone());
        Ok(book.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut store = self.inner.lock().expect("book store poisoned");
        store.books.remove(&id);
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
struct UserStore {
    users: BTreeMap<i32, User>,
    next_id: i32,
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    inner: Mutex<UserStore>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        let store = self.inner.lock().expect("user store poisoned");
        Ok(store.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let store = self.inner.lock().expect("user store poisoned");
        Ok(store
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_all(&self, filter: &UserFilter) -> AppResult<Vec<User>> {
        let store = self.inner.lock().expect("user store poisoned");
        Ok(store
            .users
            .values()
            .filter(|user| filter.matches(user))
            .cloned()
            .collect())
    }

    async fn create(&self, user: &CreateUser, password_hash: &str) -> AppResult<User> {
        let mut store = self.inner.lock().expect("user store poisoned");
        store.next_id += 1;
        let created = User::new(
            store.next_id,
            user.username.clone(),
            user.name.clone(),
            user.birthdate,
            password_hash.to_string(),
        );
        store.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn save(&self, user: &User) -> AppResult<User> {
        let mut store = self.inner.lock().expect("user store poisoned");
        if !store.users.contains_key(&user.id) {
            return Err(AppError::NotFound(format!(
                "User with id {} not found",
                user.id
            )));
        }
        store.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut store = self.inner.lock().expect("user store poisoned");
        store.users.remove(&id);
        Ok(())
    }
}
