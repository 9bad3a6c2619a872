use axum::http::StatusCode;

use crate::backend::BackendError;
use crate::constants::*;

pub fn db_error() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ERR_DATABASE_OPERATION.to_string(),
    )
}

pub fn db_error_with_context(context: &str) -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Database error: {}", context),
    )
}

/// Maps a backend failure onto the handler error convention.
pub fn backend_error(err: BackendError) -> (StatusCode, String) {
    match err {
        BackendError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        BackendError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        BackendError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
        BackendError::Bulk { .. } => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        BackendError::Database(e) => {
            tracing::error!(error = %e, "database failure");
            db_error()
        }
        BackendError::Json(e) => {
            tracing::error!(error = %e, "stored document is malformed");
            db_error_with_context("malformed document")
        }
        BackendError::Http(_) | BackendError::Status { .. } => {
            tracing::error!(error = %err, "upstream failure");
            (StatusCode::BAD_GATEWAY, err.to_string())
        }
    }
}

pub fn validate_string_length(
    value: &str,
    field_name: &str,
    max_length: usize,
) -> Result<(), BackendError> {
    if value.trim().is_empty() {
        return Err(BackendError::Validation(format!(
            "{} cannot be empty",
            field_name
        )));
    }
    if value.len() > max_length {
        return Err(BackendError::Validation(format!(
            "{} must be less than {} characters",
            field_name, max_length
        )));
    }
    Ok(())
}

pub fn validate_category_key(key: &str) -> Result<(), BackendError> {
    validate_string_length(key, "Category key", MAX_CATEGORY_KEY_LENGTH)?;
    if !key
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    {
        return Err(BackendError::Validation(
            "Category key can only contain alphanumeric characters, underscores, and hyphens"
                .to_string(),
        ));
    }
    Ok(())
}

pub fn validate_list_code(code: &str) -> Result<(), BackendError> {
    validate_string_length(code, "List code", MAX_LIST_CODE_LENGTH)?;
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(BackendError::Validation(
            "List code can only contain ASCII letters, digits, underscores, and hyphens"
                .to_string(),
        ));
    }
    Ok(())
}

pub fn validate_item_name(name: &str) -> Result<(), BackendError> {
    validate_string_length(name, "Item name", MAX_ITEM_NAME_LENGTH)
}

pub fn bool_to_sql(value: bool) -> i64 {
    i64::from(value)
}

pub fn sql_to_bool(value: i64) -> bool {
    value != 0
}

/// Runs one operation per id concurrently and waits for all of them.
///
/// Operations that already succeeded are not rolled back when others fail;
/// the caller only learns how many failed.
pub async fn run_bulk<F, Fut>(ids: &[String], op: F) -> Result<usize, BackendError>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<(), BackendError>>,
{
    let results = futures::future::join_all(ids.iter().cloned().map(op)).await;

    let mut failed = 0;
    for (id, result) in ids.iter().zip(&results) {
        if let Err(e) = result {
            tracing::warn!(id = %id, error = %e, "bulk operation failed");
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(BackendError::Bulk {
            failed,
            total: ids.len(),
        });
    }
    Ok(ids.len())
}
