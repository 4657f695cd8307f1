//! Registration, login, and logout handlers.
//!
//! Login binds the resolved user to the session; logout flushes the whole
//! session and is idempotent.

use axum::{
    Form, Json,
    extract::State,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use tradepost_core::{Role, UserId};

use crate::error::{AppError, Result};
use crate::middleware::set_current_user;
use crate::models::CurrentUser;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Fields of the registration form.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    /// `"buyer"` or `"seller"`.
    pub role: String,
}

/// Fields of the login form.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Body returned for a freshly created account.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: UserId,
}

/// Create an account from the registration form.
#[instrument(skip(state, form))]
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let role: Role = form
        .role
        .parse()
        .map_err(|_| AppError::BadRequest("role must be \"buyer\" or \"seller\"".to_string()))?;

    let auth = AuthService::new(state.pool());
    let id = auth
        .register(&form.username, &form.email, &form.password, role)
        .await?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { id })))
}

/// Check credentials and bind the user to the session.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<StatusCode> {
    let auth = AuthService::new(state.pool());
    let user = auth.login(&form.email, &form.password).await?;

    let current_user = CurrentUser {
        id: user.id,
        username: user.username,
        role: user.role,
    };

    set_current_user(&session, &current_user)
        .await
        .map_err(|e| AppError::Internal(format!("failed to set session: {e}")))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Destroy the whole session. Logging out twice is a no-op.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> StatusCode {
    if let Err(e) = session.flush().await {
        tracing::error!("failed to flush session on logout: {e}");
    }

    StatusCode::NO_CONTENT
}
