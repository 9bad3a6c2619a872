use axum::{Json, extract::State, http::StatusCode};
use tower_sessions::Session;

use crate::auth::require_admin;
use crate::backend::BackendError;
use crate::constants::*;
use crate::database::Db;
use crate::models::ServerName;
use crate::utils::{backend_error, validate_string_length};

pub async fn get_config_value(db: &Db, key: &str) -> Result<Option<String>, BackendError> {
    let conn = db.read().await;
    let mut rows = conn
        .query("SELECT value FROM admin_config WHERE key = ?", [key])
        .await?;

    match rows.next().await? {
        Some(row) => Ok(Some(row.get::<String>(0)?)),
        None => Ok(None),
    }
}

pub async fn set_config_value(db: &Db, key: &str, value: &str) -> Result<(), BackendError> {
    validate_string_length(value, "Config value", MAX_CONFIG_VALUE_LENGTH)?;
    let conn = db.write().await;
    conn.execute(
        "INSERT INTO admin_config (key, value) VALUES (?, ?) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        (key, value),
    )
    .await?;
    Ok(())
}

/// GET /config/server-name
pub async fn server_name(
    State(db): State<Db>,
) -> Result<(StatusCode, Json<ServerName>), (StatusCode, String)> {
    let name = get_config_value(&db, CONFIG_KEY_SERVER_NAME)
        .await
        .map_err(backend_error)?
        .unwrap_or_else(|| DEFAULT_SERVER_NAME.to_string());

    Ok((StatusCode::OK, Json(ServerName { name })))
}

/// PUT /admin/config/server-name
pub async fn update_server_name(
    State(db): State<Db>,
    session: Session,
    Json(payload): Json<ServerName>,
) -> Result<(StatusCode, Json<ServerName>), (StatusCode, String)> {
    require_admin(&session).await?;
    let name = payload.name.trim().to_string();
    set_config_value(&db, CONFIG_KEY_SERVER_NAME, &name)
        .await
        .map_err(backend_error)?;

    tracing::info!(server_name = %name, "server name updated");
    Ok((StatusCode::OK, Json(ServerName { name })))
}
