use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tower_sessions::Session;
use uuid::Uuid;

use crate::auth::require_admin;
use crate::backend::BackendError;
use crate::database::Db;
use crate::models::{
    BulkIdsPayload, BulkVisibilityPayload, CatalogCategory, CatalogCategoryPayload, CatalogItem,
    CatalogItemPayload, CatalogQuery, Categories, CategoryEntry,
};
use crate::utils::{
    backend_error, bool_to_sql, run_bulk, sql_to_bool, validate_category_key,
    validate_item_name,
};

const CATEGORY_COLUMNS: &str =
    r#"id, key, icon, "order", name_es, name_ca, name_en, color, hidden"#;

#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub visible_only: bool,
    /// Case-insensitive substring matched against every localized name.
    pub search: Option<String>,
    /// Catalog category id.
    pub category: Option<String>,
}

impl From<&CatalogQuery> for ItemFilter {
    fn from(query: &CatalogQuery) -> Self {
        ItemFilter {
            visible_only: query.visible_only.unwrap_or(false),
            search: query.search.clone().filter(|s| !s.trim().is_empty()),
            category: query.category.clone().filter(|c| c != "all" && !c.is_empty()),
        }
    }
}

fn extract_category_at(row: &libsql::Row, offset: i32) -> Result<CatalogCategory, BackendError> {
    Ok(CatalogCategory {
        id: row.get(offset)?,
        key: row.get(offset + 1)?,
        icon: row.get(offset + 2)?,
        order: row.get(offset + 3)?,
        name_es: row.get(offset + 4)?,
        name_ca: row.get(offset + 5)?,
        name_en: row.get(offset + 6)?,
        color: row.get(offset + 7)?,
        hidden: sql_to_bool(row.get(offset + 8)?),
    })
}

pub fn extract_category_from_row(row: &libsql::Row) -> Result<CatalogCategory, BackendError> {
    extract_category_at(row, 0)
}

/// Expects item columns followed by the joined category columns.
pub fn extract_item_from_row(row: &libsql::Row) -> Result<CatalogItem, BackendError> {
    Ok(CatalogItem {
        id: row.get(0)?,
        category: row.get(1)?,
        name_es: row.get(2)?,
        name_ca: row.get(3)?,
        name_en: row.get(4)?,
        hidden: sql_to_bool(row.get(5)?),
        expand: Some(extract_category_at(row, 6)?),
    })
}

pub async fn list_categories(
    db: &Db,
    visible_only: bool,
) -> Result<Vec<CatalogCategory>, BackendError> {
    let conn = db.read().await;
    let sql = format!(
        r#"SELECT {CATEGORY_COLUMNS} FROM catalog_categories
           WHERE (?1 = 0 OR hidden = 0)
           ORDER BY "order" ASC, key ASC"#
    );
    let mut rows = conn.query(&sql, [bool_to_sql(visible_only)]).await?;

    let mut categories = Vec::new();
    while let Some(row) = rows.next().await? {
        categories.push(extract_category_from_row(&row)?);
    }
    Ok(categories)
}

pub async fn get_category(db: &Db, id: &str) -> Result<CatalogCategory, BackendError> {
    let conn = db.read().await;
    let sql = format!("SELECT {CATEGORY_COLUMNS} FROM catalog_categories WHERE id = ?");
    let mut rows = conn.query(&sql, [id]).await?;

    match rows.next().await? {
        Some(row) => extract_category_from_row(&row),
        None => Err(BackendError::not_found("Category", id)),
    }
}

async fn ensure_key_available(
    conn: &libsql::Connection,
    key: &str,
    except_id: &str,
) -> Result<(), BackendError> {
    let mut rows = conn
        .query(
            "SELECT id FROM catalog_categories WHERE key = ? AND id != ?",
            (key, except_id),
        )
        .await?;
    if rows.next().await?.is_some() {
        return Err(BackendError::Conflict(format!(
            "Category key '{}' already exists",
            key
        )));
    }
    Ok(())
}

pub async fn insert_category(
    db: &Db,
    payload: &CatalogCategoryPayload,
) -> Result<CatalogCategory, BackendError> {
    let key = payload.key.trim();
    validate_category_key(key)?;

    let id = Uuid::new_v4().to_string();
    {
        let conn = db.write().await;
        ensure_key_available(&conn, key, "").await?;
        conn.execute(
            r#"INSERT INTO catalog_categories
               (id, key, icon, "order", name_es, name_ca, name_en, color, hidden)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            libsql::params![
                id.as_str(),
                key,
                payload.icon.as_str(),
                payload.order,
                payload.name_es.as_str(),
                payload.name_ca.as_str(),
                payload.name_en.as_str(),
                payload.color.as_str(),
                bool_to_sql(payload.hidden)
            ],
        )
        .await?;
    }

    tracing::info!(key, "catalog category created");
    get_category(db, &id).await
}

pub async fn update_category_record(
    db: &Db,
    id: &str,
    payload: &CatalogCategoryPayload,
) -> Result<CatalogCategory, BackendError> {
    let key = payload.key.trim();
    validate_category_key(key)?;

    {
        let conn = db.write().await;
        ensure_key_available(&conn, key, id).await?;
        let changed = conn
            .execute(
                r#"UPDATE catalog_categories
                   SET key = ?, icon = ?, "order" = ?, name_es = ?, name_ca = ?, name_en = ?,
                       color = ?, hidden = ?
                   WHERE id = ?"#,
                libsql::params![
                    key,
                    payload.icon.as_str(),
                    payload.order,
                    payload.name_es.as_str(),
                    payload.name_ca.as_str(),
                    payload.name_en.as_str(),
                    payload.color.as_str(),
                    bool_to_sql(payload.hidden),
                    id
                ],
            )
            .await?;
        if changed == 0 {
            return Err(BackendError::not_found("Category", id));
        }
    }

    get_category(db, id).await
}

/// Deletes a category together with every catalog item referencing it.
pub async fn remove_category(db: &Db, id: &str) -> Result<(), BackendError> {
    let conn = db.write().await;
    conn.execute("DELETE FROM catalog_items WHERE category = ?", [id])
        .await?;
    let deleted = conn
        .execute("DELETE FROM catalog_categories WHERE id = ?", [id])
        .await?;
    if deleted == 0 {
        return Err(BackendError::not_found("Category", id));
    }
    Ok(())
}

pub async fn set_category_hidden(db: &Db, id: &str, hidden: bool) -> Result<(), BackendError> {
    let conn = db.write().await;
    let changed = conn
        .execute(
            "UPDATE catalog_categories SET hidden = ? WHERE id = ?",
            (bool_to_sql(hidden), id),
        )
        .await?;
    if changed == 0 {
        return Err(BackendError::not_found("Category", id));
    }
    Ok(())
}

fn matches_search(item: &CatalogItem, search: &str) -> bool {
    let needle = search.to_lowercase();
    [&item.name_es, &item.name_ca, &item.name_en]
        .into_iter()
        .any(|name| name.to_lowercase().contains(&needle))
}

pub async fn list_items(db: &Db, filter: &ItemFilter) -> Result<Vec<CatalogItem>, BackendError> {
    let conn = db.read().await;
    let sql = r#"
        SELECT i.id, i.category, i.name_es, i.name_ca, i.name_en, i.hidden,
               c.id, c.key, c.icon, c."order", c.name_es, c.name_ca, c.name_en, c.color, c.hidden
        FROM catalog_items i
        JOIN catalog_categories c ON c.id = i.category
        WHERE (?1 = '' OR i.category = ?1)
          AND (?2 = 0 OR i.hidden = 0)
        ORDER BY i.name_es ASC"#;
    let category = filter.category.as_deref().unwrap_or("");
    let mut rows = conn
        .query(sql, (category, bool_to_sql(filter.visible_only)))
        .await?;

    let mut items = Vec::new();
    while let Some(row) = rows.next().await? {
        let item = extract_item_from_row(&row)?;
        if filter
            .search
            .as_deref()
            .is_none_or(|search| matches_search(&item, search))
        {
            items.push(item);
        }
    }
    Ok(items)
}

pub async fn get_item(db: &Db, id: &str) -> Result<CatalogItem, BackendError> {
    let conn = db.read().await;
    let mut rows = conn
        .query(
            r#"SELECT i.id, i.category, i.name_es, i.name_ca, i.name_en, i.hidden,
                      c.id, c.key, c.icon, c."order", c.name_es, c.name_ca, c.name_en, c.color, c.hidden
               FROM catalog_items i
               JOIN catalog_categories c ON c.id = i.category
               WHERE i.id = ?"#,
            [id],
        )
        .await?;

    match rows.next().await? {
        Some(row) => extract_item_from_row(&row),
        None => Err(BackendError::not_found("Catalog item", id)),
    }
}

async fn validate_category_exists(
    conn: &libsql::Connection,
    category_id: &str,
) -> Result<(), BackendError> {
    let mut rows = conn
        .query("SELECT id FROM catalog_categories WHERE id = ?", [category_id])
        .await?;
    if rows.next().await?.is_none() {
        return Err(BackendError::Validation(
            "Category does not exist".to_string(),
        ));
    }
    Ok(())
}

pub async fn insert_item(
    db: &Db,
    payload: &CatalogItemPayload,
) -> Result<CatalogItem, BackendError> {
    validate_item_name(&payload.name_es)?;

    let id = Uuid::new_v4().to_string();
    {
        let conn = db.write().await;
        validate_category_exists(&conn, &payload.category).await?;
        conn.execute(
            "INSERT INTO catalog_items (id, category, name_es, name_ca, name_en, hidden) \
             VALUES (?, ?, ?, ?, ?, ?)",
            libsql::params![
                id.as_str(),
                payload.category.as_str(),
                payload.name_es.trim(),
                payload.name_ca.trim(),
                payload.name_en.trim(),
                bool_to_sql(payload.hidden)
            ],
        )
        .await?;
    }

    get_item(db, &id).await
}

pub async fn update_item_record(
    db: &Db,
    id: &str,
    payload: &CatalogItemPayload,
) -> Result<CatalogItem, BackendError> {
    validate_item_name(&payload.name_es)?;

    {
        let conn = db.write().await;
        validate_category_exists(&conn, &payload.category).await?;
        let changed = conn
            .execute(
                "UPDATE catalog_items \
                 SET category = ?, name_es = ?, name_ca = ?, name_en = ?, hidden = ? \
                 WHERE id = ?",
                libsql::params![
                    payload.category.as_str(),
                    payload.name_es.trim(),
                    payload.name_ca.trim(),
                    payload.name_en.trim(),
                    bool_to_sql(payload.hidden),
                    id
                ],
            )
            .await?;
        if changed == 0 {
            return Err(BackendError::not_found("Catalog item", id));
        }
    }

    get_item(db, id).await
}

pub async fn remove_item(db: &Db, id: &str) -> Result<(), BackendError> {
    let conn = db.write().await;
    let deleted = conn
        .execute("DELETE FROM catalog_items WHERE id = ?", [id])
        .await?;
    if deleted == 0 {
        return Err(BackendError::not_found("Catalog item", id));
    }
    Ok(())
}

pub async fn set_item_hidden(db: &Db, id: &str, hidden: bool) -> Result<(), BackendError> {
    let conn = db.write().await;
    let changed = conn
        .execute(
            "UPDATE catalog_items SET hidden = ? WHERE id = ?",
            (bool_to_sql(hidden), id),
        )
        .await?;
    if changed == 0 {
        return Err(BackendError::not_found("Catalog item", id));
    }
    Ok(())
}

/// Builds the planning category map from a catalog snapshot.
///
/// Returns `None` when no visible category remains: an empty catalog means
/// "not ready yet", and callers keep whatever they already have.
pub fn catalog_to_categories(
    categories: &[CatalogCategory],
    items: &[CatalogItem],
) -> Option<Categories> {
    let mut map: Categories = categories
        .iter()
        .filter(|c| !c.hidden)
        .map(|c| {
            let color = Some(c.color.clone()).filter(|color| !color.is_empty());
            (
                c.key.clone(),
                CategoryEntry {
                    icon: c.icon.clone(),
                    items: Vec::new(),
                    color,
                },
            )
        })
        .collect();
    if map.is_empty() {
        return None;
    }

    for item in items.iter().filter(|i| i.is_visible()) {
        let Some(category) = item.expand.as_ref() else {
            continue;
        };
        if let Some(entry) = map.get_mut(&category.key) {
            entry.items.push(item.localized());
        }
    }

    Some(map)
}

/// GET /catalog/categories
pub async fn get_categories(
    State(db): State<Db>,
    Query(query): Query<CatalogQuery>,
) -> Result<(StatusCode, Json<Vec<CatalogCategory>>), (StatusCode, String)> {
    let categories = list_categories(&db, query.visible_only.unwrap_or(false))
        .await
        .map_err(backend_error)?;
    Ok((StatusCode::OK, Json(categories)))
}

/// GET /catalog/items
pub async fn get_items(
    State(db): State<Db>,
    Query(query): Query<CatalogQuery>,
) -> Result<(StatusCode, Json<Vec<CatalogItem>>), (StatusCode, String)> {
    let items = list_items(&db, &ItemFilter::from(&query))
        .await
        .map_err(backend_error)?;
    Ok((StatusCode::OK, Json(items)))
}

/// GET /admin/catalog/categories
pub async fn admin_get_categories(
    State(db): State<Db>,
    session: Session,
    Query(query): Query<CatalogQuery>,
) -> Result<(StatusCode, Json<Vec<CatalogCategory>>), (StatusCode, String)> {
    require_admin(&session).await?;
    get_categories(State(db), Query(query)).await
}

/// GET /admin/catalog/items
pub async fn admin_get_items(
    State(db): State<Db>,
    session: Session,
    Query(query): Query<CatalogQuery>,
) -> Result<(StatusCode, Json<Vec<CatalogItem>>), (StatusCode, String)> {
    require_admin(&session).await?;
    get_items(State(db), Query(query)).await
}

/// POST /admin/catalog/categories
pub async fn create_category(
    State(db): State<Db>,
    session: Session,
    Json(payload): Json<CatalogCategoryPayload>,
) -> Result<(StatusCode, Json<CatalogCategory>), (StatusCode, String)> {
    require_admin(&session).await?;
    let category = insert_category(&db, &payload)
        .await
        .map_err(backend_error)?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /admin/catalog/categories/{id}
pub async fn update_category(
    State(db): State<Db>,
    session: Session,
    Path(id): Path<String>,
    Json(payload): Json<CatalogCategoryPayload>,
) -> Result<(StatusCode, Json<CatalogCategory>), (StatusCode, String)> {
    require_admin(&session).await?;
    let category = update_category_record(&db, &id, &payload)
        .await
        .map_err(backend_error)?;
    Ok((StatusCode::OK, Json(category)))
}

/// DELETE /admin/catalog/categories/{id}
pub async fn delete_category(
    State(db): State<Db>,
    session: Session,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    require_admin(&session).await?;
    remove_category(&db, &id).await.map_err(backend_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /admin/catalog/categories/bulk-delete
pub async fn bulk_delete_categories(
    State(db): State<Db>,
    session: Session,
    Json(payload): Json<BulkIdsPayload>,
) -> Result<StatusCode, (StatusCode, String)> {
    require_admin(&session).await?;
    let db = &db;
    run_bulk(&payload.ids, |id| async move { remove_category(db, &id).await })
        .await
        .map_err(backend_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /admin/catalog/categories/bulk-visibility
pub async fn bulk_category_visibility(
    State(db): State<Db>,
    session: Session,
    Json(payload): Json<BulkVisibilityPayload>,
) -> Result<StatusCode, (StatusCode, String)> {
    require_admin(&session).await?;
    let db = &db;
    let hidden = payload.hidden;
    run_bulk(&payload.ids, |id| async move {
        set_category_hidden(db, &id, hidden).await
    })
    .await
    .map_err(backend_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /admin/catalog/items
pub async fn create_item(
    State(db): State<Db>,
    session: Session,
    Json(payload): Json<CatalogItemPayload>,
) -> Result<(StatusCode, Json<CatalogItem>), (StatusCode, String)> {
    require_admin(&session).await?;
    let item = insert_item(&db, &payload).await.map_err(backend_error)?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /admin/catalog/items/{id}
pub async fn update_item(
    State(db): State<Db>,
    session: Session,
    Path(id): Path<String>,
    Json(payload): Json<CatalogItemPayload>,
) -> Result<(StatusCode, Json<CatalogItem>), (StatusCode, String)> {
    require_admin(&session).await?;
    let item = update_item_record(&db, &id, &payload)
        .await
        .map_err(backend_error)?;
    Ok((StatusCode::OK, Json(item)))
}

/// DELETE /admin/catalog/items/{id}
pub async fn delete_item(
    State(db): State<Db>,
    session: Session,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    require_admin(&session).await?;
    remove_item(&db, &id).await.map_err(backend_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /admin/catalog/items/bulk-delete
pub async fn bulk_delete_items(
    State(db): State<Db>,
    session: Session,
    Json(payload): Json<BulkIdsPayload>,
) -> Result<StatusCode, (StatusCode, String)> {
    require_admin(&session).await?;
    let db = &db;
    run_bulk(&payload.ids, |id| async move { remove_item(db, &id).await })
        .await
        .map_err(backend_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /admin/catalog/items/bulk-visibility
pub async fn bulk_item_visibility(
    State(db): State<Db>,
    session: Session,
    Json(payload): Json<BulkVisibilityPayload>,
) -> Result<StatusCode, (StatusCode, String)> {
    require_admin(&session).await?;
    let db = &db;
    let hidden = payload.hidden;
    run_bulk(&payload.ids, |id| async move {
        set_item_hidden(db, &id, hidden).await
    })
    .await
    .map_err(backend_error)?;
    Ok(StatusCode::NO_CONTENT)
}
