//! Book catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::book::{Book, BookDto, BookFilter, BookQuery, BookSearchQuery, CreateBook, UpdateBook},
    services::books::Resolved,
};

use super::AuthenticatedUser;

/// List books, optionally filtered field by field
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("basic_auth" = [])),
    params(BookQuery),
    responses(
        (status = 200, description = "Matching books", body = Vec<Book>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_principal): AuthenticatedUser,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state
        .services
        .books
        .search(&BookFilter::from(query))
        .await?;
    Ok(Json(books))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    Json(book): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let created = state.services.books.create(book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Search books by publisher, genre and year
#[utoipa::path(
    get,
    path = "/books/search",
    tag = "books",
    security(("basic_auth" = [])),
    params(
        ("publisher" = Option<String>, Query, description = "Exact publisher"),
        ("genre" = Option<String>, Query, description = "Exact genre"),
        ("year" = Option<String>, Query, description = "Exact publication year")
    ),
    responses(
        (status = 200, description = "Matching books", body = Vec<Book>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn search_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_principal): AuthenticatedUser,
    Query(query): Query<BookSearchQuery>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state
        .services
        .books
        .search(&BookFilter::from(query))
        .await?;
    Ok(Json(books))
}

/// Resolve a book by ISBN, fetching it from Open Library when the
/// catalog misses
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("basic_auth" = [])),
    params(
        ("id" = String, Path, description = "ISBN of the book to resolve")
    ),
    responses(
        (status = 200, description = "Book already in the catalog", body = BookDto),
        (status = 201, description = "Book fetched and persisted", body = BookDto),
        (status = 404, description = "ISBN unknown to catalog and Open Library"),
        (status = 502, description = "Open Library unreachable or malformed")
    )
)]
pub async fn resolve_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_principal): AuthenticatedUser,
    Path(isbn): Path<String>,
) -> AppResult<(StatusCode, Json<BookDto>)> {
    match state.services.books.resolve_by_isbn(&isbn).await? {
        Resolved::Existing(dto) => Ok((StatusCode::OK, Json(dto))),
        Resolved::Created(dto) => Ok((StatusCode::CREATED, Json(dto))),
    }
}

/// Update a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("basic_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Id mismatch or invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_principal): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(book): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    let updated = state.services.books.update(id, book).await?;
    Ok(Json(updated))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("basic_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book deleted"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_principal): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.books.delete(id).await?;
    Ok(StatusCode::OK)
}
