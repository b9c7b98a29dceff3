//! API handlers for Libris REST endpoints

pub mod books;
pub mod health;
pub mod openapi;
pub mod users;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Basic, Authorization},
    typed_header::TypedHeaderRejection,
    TypedHeader,
};

use crate::{error::AppError, models::Principal, AppState};

/// Extractor requiring valid Basic credentials on the request
pub struct AuthenticatedUser(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(basic)) =
            TypedHeader::<Authorization<Basic>>::from_request_parts(parts, state)
                .await
                .map_err(|_: TypedHeaderRejection| {
                    AppError::Authentication("Missing credentials".to_string())
                })?;

        let principal = match state
            .services
            .auth
            .verify(basic.username(), basic.password())
            .await
        {
            Ok(Some(principal)) => principal,
            // An unknown user and a wrong password look the same from
            // the outside
            Ok(None) | Err(AppError::PrincipalNotFound(_)) => {
                return Err(AppError::Authentication(
                    "Invalid username or password".to_string(),
                ))
            }
            Err(err) => return Err(err),
        };

        Ok(AuthenticatedUser(principal))
    }
}
