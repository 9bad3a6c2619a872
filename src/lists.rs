use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::backend::BackendError;
use crate::database::{Db, now_unix};
use crate::models::{
    AtomicItem, CreateListPayload, ListData, ListItemPayload, ShoppingListDocument,
    UpdateListPayload,
};
use crate::utils::{backend_error, bool_to_sql, sql_to_bool, validate_item_name, validate_list_code};

pub fn extract_list_from_row(row: &libsql::Row) -> Result<ShoppingListDocument, BackendError> {
    let data: String = row.get(2)?;
    Ok(ShoppingListDocument {
        id: row.get(0)?,
        list_code: row.get(1)?,
        data: serde_json::from_str(&data)?,
        created: row.get(3)?,
        updated: row.get(4)?,
    })
}

pub fn extract_atomic_item_from_row(row: &libsql::Row) -> Result<AtomicItem, BackendError> {
    Ok(AtomicItem {
        id: row.get(0)?,
        list: row.get(1)?,
        name: row.get(2)?,
        checked: sql_to_bool(row.get(3)?),
        note: row.get(4)?,
        category: row.get(5)?,
    })
}

pub async fn find_list_by_code(
    db: &Db,
    code: &str,
) -> Result<Option<ShoppingListDocument>, BackendError> {
    let conn = db.read().await;
    let mut rows = conn
        .query(
            "SELECT id, list_code, data, created, updated FROM shopping_lists WHERE list_code = ?",
            [code],
        )
        .await?;

    match rows.next().await? {
        Some(row) => Ok(Some(extract_list_from_row(&row)?)),
        None => Ok(None),
    }
}

pub async fn get_list(db: &Db, id: &str) -> Result<ShoppingListDocument, BackendError> {
    let conn = db.read().await;
    let mut rows = conn
        .query(
            "SELECT id, list_code, data, created, updated FROM shopping_lists WHERE id = ?",
            [id],
        )
        .await?;

    match rows.next().await? {
        Some(row) => extract_list_from_row(&row),
        None => Err(BackendError::not_found("List", id)),
    }
}

/// Every list document, most recently updated first. Documents whose `data`
/// cannot be decoded are logged and left out.
pub async fn list_all_lists(db: &Db) -> Result<Vec<ShoppingListDocument>, BackendError> {
    let conn = db.read().await;
    let mut rows = conn
        .query(
            "SELECT id, list_code, data, created, updated FROM shopping_lists \
             ORDER BY updated DESC, created DESC",
            (),
        )
        .await?;

    let mut lists = Vec::new();
    while let Some(row) = rows.next().await? {
        match extract_list_from_row(&row) {
            Ok(list) => lists.push(list),
            Err(e) => {
                let id: String = row.get(0).unwrap_or_default();
                tracing::warn!(list_id = %id, error = %e, "skipping malformed list document");
            }
        }
    }
    Ok(lists)
}

pub async fn create_list(
    db: &Db,
    code: &str,
    data: &ListData,
) -> Result<ShoppingListDocument, BackendError> {
    let code = code.trim();
    validate_list_code(code)?;

    let body = serde_json::to_string(data)?;
    let id = Uuid::new_v4().to_string();
    let now = now_unix();

    {
        let conn = db.write().await;
        let mut existing = conn
            .query("SELECT id FROM shopping_lists WHERE list_code = ?", [code])
            .await?;
        if existing.next().await?.is_some() {
            return Err(BackendError::Conflict(format!(
                "List code '{}' already exists",
                code
            )));
        }

        conn.execute(
            "INSERT INTO shopping_lists (id, list_code, data, created, updated) VALUES (?, ?, ?, ?, ?)",
            (id.as_str(), code, body.as_str(), now, now),
        )
        .await?;
    }

    tracing::info!(list_code = code, "list document created");
    Ok(ShoppingListDocument {
        id,
        list_code: code.to_string(),
        data: data.clone(),
        created: now,
        updated: now,
    })
}

pub async fn update_list(
    db: &Db,
    id: &str,
    data: &ListData,
) -> Result<ShoppingListDocument, BackendError> {
    let body = serde_json::to_string(data)?;
    {
        let conn = db.write().await;
        let changed = conn
            .execute(
                "UPDATE shopping_lists SET data = ?, updated = ? WHERE id = ?",
                (body.as_str(), now_unix(), id),
            )
            .await?;
        if changed == 0 {
            return Err(BackendError::not_found("List", id));
        }
    }

    get_list(db, id).await
}

/// Deletes a list document and its atomic item records.
pub async fn delete_list(db: &Db, id: &str) -> Result<(), BackendError> {
    let conn = db.write().await;
    conn.execute("DELETE FROM shopping_items WHERE list = ?", [id])
        .await?;
    let deleted = conn
        .execute("DELETE FROM shopping_lists WHERE id = ?", [id])
        .await?;
    if deleted == 0 {
        return Err(BackendError::not_found("List", id));
    }
    tracing::info!(list_id = id, "list document deleted");
    Ok(())
}

pub async fn list_atomic_items(db: &Db, list_id: &str) -> Result<Vec<AtomicItem>, BackendError> {
    let conn = db.read().await;
    let mut rows = conn
        .query(
            "SELECT id, list, name, checked, note, category FROM shopping_items \
             WHERE list = ? ORDER BY created ASC, rowid ASC",
            [list_id],
        )
        .await?;

    let mut items = Vec::new();
    while let Some(row) = rows.next().await? {
        items.push(extract_atomic_item_from_row(&row)?);
    }
    Ok(items)
}

pub async fn create_atomic_item(
    db: &Db,
    list_id: &str,
    item: &ListItemPayload,
) -> Result<AtomicItem, BackendError> {
    validate_item_name(&item.name)?;

    let id = Uuid::new_v4().to_string();
    let conn = db.write().await;
    let mut list = conn
        .query("SELECT id FROM shopping_lists WHERE id = ?", [list_id])
        .await?;
    if list.next().await?.is_none() {
        return Err(BackendError::not_found("List", list_id));
    }

    conn.execute(
        "INSERT INTO shopping_items (id, list, name, checked, note, category, created) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        libsql::params![
            id.as_str(),
            list_id,
            item.name.as_str(),
            bool_to_sql(item.checked),
            item.note.as_str(),
            item.category.as_str(),
            now_unix()
        ],
    )
    .await?;

    Ok(AtomicItem {
        id,
        list: list_id.to_string(),
        name: item.name.clone(),
        checked: item.checked,
        note: item.note.clone(),
        category: item.category.clone(),
    })
}

pub async fn delete_atomic_item(db: &Db, id: &str) -> Result<(), BackendError> {
    let conn = db.write().await;
    let deleted = conn
        .execute("DELETE FROM shopping_items WHERE id = ?", [id])
        .await?;
    if deleted == 0 {
        return Err(BackendError::not_found("Item", id));
    }
    Ok(())
}

/// GET /lists/by-code/{code}
pub async fn show_by_code(
    State(db): State<Db>,
    Path(code): Path<String>,
) -> Result<(StatusCode, Json<ShoppingListDocument>), (StatusCode, String)> {
    match find_list_by_code(&db, &code).await.map_err(backend_error)? {
        Some(list) => Ok((StatusCode::OK, Json(list))),
        None => Err(backend_error(BackendError::not_found("List", code))),
    }
}

/// POST /lists
pub async fn create(
    State(db): State<Db>,
    Json(payload): Json<CreateListPayload>,
) -> Result<(StatusCode, Json<ShoppingListDocument>), (StatusCode, String)> {
    let list = create_list(&db, &payload.list_code, &payload.data)
        .await
        .map_err(backend_error)?;
    Ok((StatusCode::CREATED, Json(list)))
}

/// GET /lists/{id}
pub async fn show(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<ShoppingListDocument>), (StatusCode, String)> {
    let list = get_list(&db, &id).await.map_err(backend_error)?;
    Ok((StatusCode::OK, Json(list)))
}

/// PUT /lists/{id}
pub async fn update(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateListPayload>,
) -> Result<(StatusCode, Json<ShoppingListDocument>), (StatusCode, String)> {
    let list = update_list(&db, &id, &payload.data)
        .await
        .map_err(backend_error)?;
    Ok((StatusCode::OK, Json(list)))
}

/// DELETE /lists/{id}
pub async fn destroy(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    delete_list(&db, &id).await.map_err(backend_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /lists/{id}/items
pub async fn index_items(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<Vec<AtomicItem>>), (StatusCode, String)> {
    let items = list_atomic_items(&db, &id).await.map_err(backend_error)?;
    Ok((StatusCode::OK, Json(items)))
}

/// POST /lists/{id}/items
pub async fn create_item(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(payload): Json<ListItemPayload>,
) -> Result<(StatusCode, Json<AtomicItem>), (StatusCode, String)> {
    let item = create_atomic_item(&db, &id, &payload)
        .await
        .map_err(backend_error)?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// DELETE /items/{id}
pub async fn destroy_item(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    delete_atomic_item(&db, &id).await.map_err(backend_error)?;
    Ok(StatusCode::NO_CONTENT)
}
