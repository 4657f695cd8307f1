//! Authentication extractors.
//!
//! Handlers take the resolved identity as an explicit argument instead of
//! reading any request-global state: `RequireAuth` rejects anonymous
//! callers up front, `OptionalAuth` leaves the decision to the handler.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};

/// Read the identity bound to this request's session, if any.
///
/// A missing session layer, a fresh session, and a deserialization failure
/// all resolve to anonymous.
async fn identity_from(parts: &Parts) -> Option<CurrentUser> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Rejection for [`RequireAuth`]: plain 401, no redirect dance.
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, "You must be logged in").into_response()
    }
}

/// Extractor for handlers that only make sense for a logged-in user.
///
/// ```rust,ignore
/// async fn cart_page(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("{}'s cart", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        identity_from(parts).await.map(Self).ok_or(AuthRejection)
    }
}

/// Extractor that hands the handler `Some(user)` or `None`, never rejecting.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(identity_from(parts).await))
    }
}

/// Bind a freshly logged-in user to the session.
///
/// # Errors
///
/// Returns the session store's error if the write fails.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}
