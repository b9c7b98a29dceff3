//! User management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::user::{CreateUser, Principal, UpdateUser, UserDetail, UserFilter, UserQuery},
};

use super::AuthenticatedUser;

/// List users with their owned books
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("basic_auth" = [])),
    responses(
        (status = 200, description = "All users", body = Vec<UserDetail>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_principal): AuthenticatedUser,
) -> AppResult<Json<Vec<UserDetail>>> {
    let users = state.services.users.list().await?;
    Ok(Json(users))
}

/// Search users by birthdate range and name fragment
#[utoipa::path(
    get,
    path = "/users/search",
    tag = "users",
    security(("basic_auth" = [])),
    params(
        ("begin" = Option<String>, Query, description = "Earliest birthdate, inclusive (YYYY-MM-DD)"),
        ("end" = Option<String>, Query, description = "Latest birthdate, inclusive (YYYY-MM-DD)"),
        ("sequence" = Option<String>, Query, description = "Name fragment, case-insensitive")
    ),
    responses(
        (status = 200, description = "Matching users", body = Vec<UserDetail>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn search_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_principal): AuthenticatedUser,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<Vec<UserDetail>>> {
    let users = state
        .services
        .users
        .search(&UserFilter::from(query))
        .await?;
    Ok(Json(users))
}

/// Identify the authenticated caller
#[utoipa::path(
    get,
    path = "/users/session",
    tag = "users",
    security(("basic_auth" = [])),
    responses(
        (status = 200, description = "The caller's identity", body = Principal),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn session(AuthenticatedUser(principal): AuthenticatedUser) -> Json<Principal> {
    Json(principal)
}

/// Register a user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserDetail),
        (status = 400, description = "Invalid input or missing password", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<crate::AppState>,
    Json(user): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<UserDetail>)> {
    let created = state.services.users.create(user).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a user's profile
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    security(("basic_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = UserDetail),
        (status = 400, description = "Id mismatch or invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_principal): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(user): Json<UpdateUser>,
) -> AppResult<Json<UserDetail>> {
    let updated = state.services.users.update(id, user).await?;
    Ok(Json(updated))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    security(("basic_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_principal): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.users.delete(id).await?;
    Ok(StatusCode::OK)
}

/// Assign a book to a user's collection
#[utoipa::path(
    patch,
    path = "/users/{id}/books/{book_id}/add",
    tag = "users",
    security(("basic_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID"),
        ("book_id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book assigned", body = UserDetail),
        (status = 400, description = "Book already owned", body = crate::error::ErrorResponse),
        (status = 404, description = "User or book not found")
    )
)]
pub async fn add_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_principal): AuthenticatedUser,
    Path((user_id, book_id)): Path<(i32, i32)>,
) -> AppResult<Json<UserDetail>> {
    let detail = state.services.users.add_book(user_id, book_id).await?;
    Ok(Json(detail))
}

/// Withdraw a book from a user's collection
#[utoipa::path(
    patch,
    path = "/users/{id}/books/{book_id}/remove",
    tag = "users",
    security(("basic_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID"),
        ("book_id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book withdrawn, or was not owned", body = UserDetail),
        (status = 404, description = "User or book not found")
    )
)]
pub async fn remove_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_principal): AuthenticatedUser,
    Path((user_id, book_id)): Path<(i32, i32)>,
) -> AppResult<Json<UserDetail>> {
    let detail = state.services.users.remove_book(user_id, book_id).await?;
    Ok(Json(detail))
}
