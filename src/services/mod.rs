//! Business logic services

pub mod auth;
pub mod books;
pub mod open_library;
pub mod users;

use std::sync::Arc;

use crate::{config::OpenLibraryConfig, error::AppResult, repository::Repository};

/// Handle bundling all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
    pub users: users::UsersService,
    pub auth: auth::AuthService,
}

impl Services {
    pub fn new(repository: Repository, openlibrary: OpenLibraryConfig) -> AppResult<Self> {
        let lookup = Arc::new(open_library::OpenLibraryClient::new(&openlibrary)?);
        let encoder: Arc<dyn auth::PasswordEncoder> = Arc::new(auth::Argon2PasswordEncoder::new());

        Ok(Self {
            books: books::BooksService::new(repository.clone(), lookup),
            users: users::UsersService::new(repository.clone(), encoder.clone()),
            auth: auth::AuthService::new(repository, encoder),
        })
    }
}
