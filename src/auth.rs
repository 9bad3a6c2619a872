//! Admin console gate.
//!
//! The admin password is a plain shared secret kept in `admin_config`; it is
//! compared verbatim, there is no hashing and no per-user identity.

use axum::{Json, extract::State, http::StatusCode};
use tower_sessions::Session;

use crate::constants::*;
use crate::database::Db;
use crate::models::LoginPayload;
use crate::settings::get_config_value;
use crate::utils::backend_error;

pub async fn check_admin_password(db: &Db, password: &str) -> Result<bool, (StatusCode, String)> {
    let stored = get_config_value(db, CONFIG_KEY_PASSWORD)
        .await
        .map_err(backend_error)?
        .unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string());

    Ok(password == stored)
}

/// POST /admin/login
pub async fn login(
    State(db): State<Db>,
    session: Session,
    Json(payload): Json<LoginPayload>,
) -> Result<StatusCode, (StatusCode, String)> {
    if payload.password.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Password cannot be empty".to_string(),
        ));
    }

    if !check_admin_password(&db, &payload.password).await? {
        tracing::warn!("rejected admin login");
        return Err((
            StatusCode::UNAUTHORIZED,
            ERR_INVALID_CREDENTIALS.to_string(),
        ));
    }

    session
        .insert(SESSION_ADMIN_KEY, true)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    tracing::info!("admin session opened");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn require_admin(session: &Session) -> Result<(), (StatusCode, String)> {
    let is_admin: Option<bool> = session
        .get(SESSION_ADMIN_KEY)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    match is_admin {
        Some(true) => Ok(()),
        _ => Err((StatusCode::UNAUTHORIZED, ERR_UNAUTHORIZED.to_string())),
    }
}

/// POST /admin/logout
pub async fn logout(session: Session) -> Result<StatusCode, (StatusCode, String)> {
    session.clear().await;

    Ok(StatusCode::NO_CONTENT)
}
