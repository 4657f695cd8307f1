//! Response-level error handling.
//!
//! Every handler returns `Result<T, AppError>`. The `IntoResponse` impl is
//! the single place errors become HTTP: server-side faults are captured to
//! Sentry there, and the client-facing message is chosen variant by variant
//! so storage and gateway internals never leak.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::{AuthError, RegisterError};
use crate::services::cart::CartError;
use crate::services::catalog::CatalogError;
use crate::services::checkout::CheckoutError;
use crate::services::images::ImageError;

/// Top-level error for route handlers; one variant per service taxonomy.
#[derive(Debug, Error)]
pub enum AppError {
    /// Repository failure outside any service flow.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Login rejected or failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Registration rejected or failed.
    #[error("Register error: {0}")]
    Register(#[from] RegisterError),

    /// Cart mutation or read failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Offer listing, lookup, or creation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Checkout submission failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Image store rejected the name or hit the filesystem.
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    /// No such resource.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The caller's role does not permit this operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The request itself was malformed.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Anything else; details stay server-side.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Whether this error is a server-side fault worth reporting.
fn is_server_error(err: &AppError) -> bool {
    match err {
        AppError::Database(_) | AppError::Internal(_) => true,
        AppError::Auth(AuthError::Repository(_)) => true,
        AppError::Register(RegisterError::Repository(_) | RegisterError::PasswordHash) => true,
        AppError::Cart(CartError::Repository(_)) => true,
        AppError::Catalog(CatalogError::Repository(_) | CatalogError::Image(ImageError::Io(_))) => {
            true
        }
        AppError::Checkout(
            CheckoutError::Repository(_) | CheckoutError::PaymentGateway(_),
        ) => true,
        AppError::Image(ImageError::Io(_)) => true,
        _ => false,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if is_server_error(&self) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(error = %self, sentry_event_id = %event_id, "request failed server-side");
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Register(err) => match err {
                RegisterError::MissingField(_)
                | RegisterError::InvalidUsername(_)
                | RegisterError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                RegisterError::DuplicateIdentity => StatusCode::CONFLICT,
                RegisterError::PasswordHash | RegisterError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Cart(err) => match err {
                CartError::Unauthorized => StatusCode::UNAUTHORIZED,
                CartError::UserNotFound => StatusCode::NOT_FOUND,
                CartError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Catalog(err) => match err {
                CatalogError::MissingTitle | CatalogError::InvalidPrice(_) => {
                    StatusCode::BAD_REQUEST
                }
                CatalogError::Image(image) => image_status(image),
                CatalogError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Checkout(err) => match err {
                CheckoutError::EmptyCart | CheckoutError::InvalidPrice(_) => {
                    StatusCode::BAD_REQUEST
                }
                CheckoutError::CartChanged => StatusCode::CONFLICT,
                CheckoutError::PaymentGateway(_) => StatusCode::BAD_GATEWAY,
                CheckoutError::UserNotFound => StatusCode::NOT_FOUND,
                CheckoutError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Image(err) => image_status(err),
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // The client-visible text; internal variants collapse to a stock phrase
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::Repository(_) => "Internal server error".to_string(),
            },
            Self::Register(err) => match err {
                RegisterError::MissingField(_)
                | RegisterError::InvalidUsername(_)
                | RegisterError::InvalidEmail(_) => err.to_string(),
                RegisterError::DuplicateIdentity => {
                    "Username or email already registered".to_string()
                }
                RegisterError::PasswordHash | RegisterError::Repository(_) => {
                    "Internal server error".to_string()
                }
            },
            Self::Cart(err) => match err {
                CartError::Unauthorized => "You must be logged in to use the cart".to_string(),
                CartError::UserNotFound => "User not found".to_string(),
                CartError::Repository(_) => "Internal server error".to_string(),
            },
            Self::Catalog(err) => match err {
                CatalogError::MissingTitle | CatalogError::InvalidPrice(_) => err.to_string(),
                CatalogError::Image(image) => image_message(image),
                CatalogError::Repository(_) => "Internal server error".to_string(),
            },
            Self::Checkout(err) => match err {
                CheckoutError::EmptyCart => "Your cart is empty".to_string(),
                CheckoutError::InvalidPrice(_) => "A cart item has an invalid price".to_string(),
                CheckoutError::CartChanged => {
                    "Your cart changed during checkout, please try again".to_string()
                }
                CheckoutError::PaymentGateway(_) => "Payment service error".to_string(),
                CheckoutError::UserNotFound => "User not found".to_string(),
                CheckoutError::Repository(_) => "Internal server error".to_string(),
            },
            Self::Image(err) => image_message(err),
            Self::NotFound(_) | Self::Forbidden(_) | Self::BadRequest(_) => self.to_string(),
        };

        (status, message).into_response()
    }
}

fn image_status(err: &ImageError) -> StatusCode {
    match err {
        ImageError::InvalidFilename | ImageError::UnsupportedExtension => StatusCode::BAD_REQUEST,
        ImageError::NotFound => StatusCode::NOT_FOUND,
        ImageError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn image_message(err: &ImageError) -> String {
    match err {
        ImageError::InvalidFilename | ImageError::UnsupportedExtension => err.to_string(),
        ImageError::NotFound => "Image not found".to_string(),
        ImageError::Io(_) => "Internal server error".to_string(),
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payments::PaymentError;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("offer 123".to_string());
        assert_eq!(err.to_string(), "Not found: offer 123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_auth_status_codes() {
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Register(RegisterError::DuplicateIdentity)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Register(RegisterError::MissingField("email"))),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_cart_and_checkout_status_codes() {
        assert_eq!(
            get_status(AppError::Cart(CartError::Unauthorized)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::EmptyCart)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::CartChanged)),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_gateway_failure_is_bad_gateway_with_generic_message() {
        let err = AppError::Checkout(CheckoutError::PaymentGateway(PaymentError::Timeout));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_not_found_status() {
        assert_eq!(
            get_status(AppError::NotFound("x".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Image(ImageError::NotFound)),
            StatusCode::NOT_FOUND
        );
    }
}
