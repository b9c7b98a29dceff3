//! User model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::Book,
};

/// Raw database row for a user, without the owned books
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub birthdate: NaiveDate,
    pub password: String,
}

/// A registered user. The owned book collection is private so every
/// mutation goes through [`User::add_book`] and [`User::remove_book`],
/// which keep it free of duplicates.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub birthdate: NaiveDate,
    /// Stored hash, never serialized
    #[serde(skip_serializing)]
    pub password: String,
    books: Vec<i32>,
}

impl User {
    pub fn new(id: i32, username: String, name: String, birthdate: NaiveDate, password: String) -> Self {
        User {
            id,
            username,
            name,
            birthdate,
            password,
            books: Vec::new(),
        }
    }

    /// Rebuild a user from storage. Duplicate book identifiers keep
    /// their first occurrence.
    pub fn from_stored(
        id: i32,
        username: String,
        name: String,
        birthdate: NaiveDate,
        password: String,
        books: Vec<i32>,
    ) -> Self {
        let mut deduped: Vec<i32> = Vec::with_capacity(books.len());
        for book_id in books {
            if !deduped.contains(&book_id) {
                deduped.push(book_id);
            }
        }
        User {
            id,
            username,
            name,
            birthdate,
            password,
            books: deduped,
        }
    }

    /// Owned book identifiers in insertion order
    pub fn books(&self) -> &[i32] {
        &self.books
    }

    pub fn owns(&self, book_id: i32) -> bool {
        self.books.contains(&book_id)
    }

    /// Append a book to the collection. Owning it already is an error
    /// and leaves the collection unchanged.
    pub fn add_book(&mut self, book: &Book) -> AppResult<()> {
        if self.owns(book.id) {
            return Err(AppError::AlreadyOwned(format!(
                "Book '{}' is already assigned to user {}",
                book.title, self.id
            )));
        }
        self.books.push(book.id);
        Ok(())
    }

    /// Drop a book from the collection. Removing a book the user does
    /// not own is a silent no-op.
    pub fn remove_book(&mut self, book: &Book) {
        if let Some(index) = self.books.iter().position(|id| *id == book.id) {
            self.books.remove(index);
        }
    }

    /// Drop the book at the given position, ignoring out-of-range
    /// indexes
    pub fn remove_book_at(&mut self, index: usize) {
        if index < self.books.len() {
            self.books.remove(index);
        }
    }
}

/// Constraints for user search. Date bounds are inclusive; the name
/// fragment matches case-insensitively anywhere in the name.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub birthdate_from: Option<NaiveDate>,
    pub birthdate_to: Option<NaiveDate>,
    pub name_contains: Option<String>,
}

impl UserFilter {
    pub fn is_empty(&self) -> bool {
        self.birthdate_from.is_none()
            && self.birthdate_to.is_none()
            && self.name_contains.as_deref().map_or(true, str::is_empty)
    }

    pub fn matches(&self, user: &User) -> bool {
        let after_from = self
            .birthdate_from
            .map_or(true, |from| user.birthdate >= from);
        let before_to = self.birthdate_to.map_or(true, |to| user.birthdate <= to);
        let name_hit = self.name_contains.as_deref().map_or(true, |fragment| {
            fragment.is_empty() || user.name.to_lowercase().contains(&fragment.to_lowercase())
        });
        after_from && before_to && name_hit
    }
}

/// Query parameters for the user search
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct UserQuery {
    /// Earliest birthdate, inclusive
    pub begin: Option<NaiveDate>,
    /// Latest birthdate, inclusive
    pub end: Option<NaiveDate>,
    /// Fragment to look for in the name, ignoring case
    pub sequence: Option<String>,
}

impl From<UserQuery> for UserFilter {
    fn from(query: UserQuery) -> Self {
        UserFilter {
            birthdate_from: query.begin,
            birthdate_to: query.end,
            name_contains: query.sequence,
        }
    }
}

/// Create user request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 1, message = "Username must not be empty"))]
    pub username: String,
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    pub birthdate: NaiveDate,
    /// Plain password, absent in payloads coming from legacy importers
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: Option<String>,
}

/// Update user request. Password and owned books are immutable through
/// this payload.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    pub id: i32,
    #[validate(length(min = 1, message = "Username must not be empty"))]
    pub username: String,
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    pub birthdate: NaiveDate,
}

/// User with the owned books resolved to full records
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserDetail {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub birthdate: NaiveDate,
    pub books: Vec<Book>,
}

/// The authenticated caller, as exposed by the session endpoint
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Principal {
    pub username: String,
}
