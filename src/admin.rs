use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tower_sessions::Session;

use crate::auth::require_admin;
use crate::backend::{BackendError, LocalBackend};
use crate::constants::PHANTOM_INACTIVE_DAYS;
use crate::database::{Db, now_unix};
use crate::defaults::{DEFAULT_CATEGORY_KEYS, default_items};
use crate::import::{ImportOutcome, ImportSession, ImportStrategy, export_file_name, export_list};
use crate::lists;
use crate::models::{
    AtomicItem, BulkIdsPayload, Categories, CategoryEntry, CategoryKind, ListItemPayload,
    LocalizedItem, ShoppingListDocument,
};
use crate::utils::{backend_error, run_bulk};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhantomReason {
    #[serde(rename = "Empty")]
    Empty,
    #[serde(rename = "Inactive > 7d")]
    Inactive,
}

impl fmt::Display for PhantomReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhantomReason::Empty => f.write_str("Empty"),
            PhantomReason::Inactive => write!(f, "Inactive > {}d", PHANTOM_INACTIVE_DAYS),
        }
    }
}

/// Why a list looks abandoned, if it does. Emptiness is checked first.
pub fn phantom_reason(item_count: usize, updated: i64, now: i64) -> Option<PhantomReason> {
    if item_count == 0 {
        return Some(PhantomReason::Empty);
    }
    if now - updated > PHANTOM_INACTIVE_DAYS * SECONDS_PER_DAY {
        return Some(PhantomReason::Inactive);
    }
    None
}

pub fn is_phantom(item_count: usize, updated: i64, now: i64) -> bool {
    phantom_reason(item_count, updated, now).is_some()
}

/// Items the admin sees for a list: atomic records when there are any,
/// otherwise the items embedded in the document.
pub fn effective_items(list: &ShoppingListDocument, atomic: &[AtomicItem]) -> Vec<ListItemPayload> {
    if !atomic.is_empty() {
        return atomic.iter().map(ListItemPayload::from).collect();
    }
    list.data
        .items
        .iter()
        .map(|item| ListItemPayload {
            name: item.name.clone(),
            checked: item.checked,
            category: item.category.clone(),
            note: item.note.clone(),
        })
        .collect()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CustomCategory {
    pub key: String,
    #[serde(flatten)]
    pub entry: CategoryEntry,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CustomProducts {
    pub category: String,
    pub items: Vec<LocalizedItem>,
}

pub fn custom_categories(categories: &Categories) -> Vec<CustomCategory> {
    categories
        .iter()
        .filter(|(key, _)| CategoryKind::of(key) == CategoryKind::Custom)
        .map(|(key, entry)| CustomCategory {
            key: key.clone(),
            entry: entry.clone(),
        })
        .collect()
}

/// Per category, the items whose name matches no built-in item of that same
/// category in any language. Custom categories have no built-ins, so all of
/// their items are reported.
pub fn custom_products(categories: &Categories) -> Vec<CustomProducts> {
    categories
        .iter()
        .filter_map(|(key, entry)| {
            let defaults = default_items(key);
            let items: Vec<LocalizedItem> = entry
                .items
                .iter()
                .filter(|item| {
                    let name = item.normalized_name();
                    !defaults.iter().any(|d| d.matches_name(&name))
                })
                .cloned()
                .collect();
            (!items.is_empty()).then(|| CustomProducts {
                category: key.clone(),
                items,
            })
        })
        .collect()
}

pub fn items_with_notes(items: &[ListItemPayload]) -> Vec<ListItemPayload> {
    items
        .iter()
        .filter(|item| !item.note.trim().is_empty())
        .cloned()
        .collect()
}

/// Keeps only default category keys, each with its custom items cleared.
pub fn strip_custom_categories(categories: &Categories) -> Categories {
    DEFAULT_CATEGORY_KEYS
        .iter()
        .filter_map(|key| {
            categories.get(*key).map(|entry| {
                let mut entry = entry.clone();
                entry.items.clear();
                (key.to_string(), entry)
            })
        })
        .collect()
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ListOverview {
    pub id: String,
    pub list_code: String,
    pub list_name: Option<String>,
    pub created: i64,
    pub updated: i64,
    pub item_count: usize,
    pub phantom: bool,
    pub phantom_reason: Option<PhantomReason>,
    pub custom_categories: Vec<CustomCategory>,
    pub custom_products: Vec<CustomProducts>,
    pub items_with_notes: Vec<ListItemPayload>,
}

pub fn overview(list: &ShoppingListDocument, atomic: &[AtomicItem], now: i64) -> ListOverview {
    let items = effective_items(list, atomic);
    let reason = phantom_reason(items.len(), list.updated, now);
    let categories = list.data.categories.clone().unwrap_or_default();

    ListOverview {
        id: list.id.clone(),
        list_code: list.list_code.clone(),
        list_name: list.data.list_name.clone(),
        created: list.created,
        updated: list.updated,
        item_count: items.len(),
        phantom: reason.is_some(),
        phantom_reason: reason,
        custom_categories: custom_categories(&categories),
        custom_products: custom_products(&categories),
        items_with_notes: items_with_notes(&items),
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ListsResponse {
    pub total: usize,
    pub phantom_count: usize,
    pub lists: Vec<ListOverview>,
}

pub async fn list_overviews(db: &Db) -> Result<ListsResponse, BackendError> {
    let now = now_unix();
    let mut overviews = Vec::new();
    for list in lists::list_all_lists(db).await? {
        let atomic = lists::list_atomic_items(db, &list.id).await?;
        overviews.push(overview(&list, &atomic, now));
    }

    Ok(ListsResponse {
        total: overviews.len(),
        phantom_count: overviews.iter().filter(|l| l.phantom).count(),
        lists: overviews,
    })
}

pub async fn reset_list_items(db: &Db, id: &str) -> Result<ShoppingListDocument, BackendError> {
    let mut data = lists::get_list(db, id).await?.data;
    data.items.clear();
    lists::update_list(db, id, &data).await
}

pub async fn reset_list_categories(
    db: &Db,
    id: &str,
) -> Result<ShoppingListDocument, BackendError> {
    let mut data = lists::get_list(db, id).await?.data;
    data.categories = Some(strip_custom_categories(
        &data.categories.unwrap_or_default(),
    ));
    lists::update_list(db, id, &data).await
}

/// GET /admin/lists
pub async fn get_lists(
    State(db): State<Db>,
    session: Session,
) -> Result<(StatusCode, Json<ListsResponse>), (StatusCode, String)> {
    require_admin(&session).await?;
    let response = list_overviews(&db).await.map_err(backend_error)?;
    Ok((StatusCode::OK, Json(response)))
}

/// POST /admin/lists/bulk-delete
pub async fn bulk_delete_lists(
    State(db): State<Db>,
    session: Session,
    Json(payload): Json<BulkIdsPayload>,
) -> Result<StatusCode, (StatusCode, String)> {
    require_admin(&session).await?;
    let db = &db;
    run_bulk(&payload.ids, |id| async move { lists::delete_list(db, &id).await })
        .await
        .map_err(backend_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /admin/lists/{id}/reset-items
pub async fn reset_items(
    State(db): State<Db>,
    session: Session,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<ShoppingListDocument>), (StatusCode, String)> {
    require_admin(&session).await?;
    let list = reset_list_items(&db, &id).await.map_err(backend_error)?;
    Ok((StatusCode::OK, Json(list)))
}

/// POST /admin/lists/{id}/reset-categories
pub async fn reset_categories(
    State(db): State<Db>,
    session: Session,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<ShoppingListDocument>), (StatusCode, String)> {
    require_admin(&session).await?;
    let list = reset_list_categories(&db, &id)
        .await
        .map_err(backend_error)?;
    Ok((StatusCode::OK, Json(list)))
}

/// GET /admin/lists/{id}/export
pub async fn export(
    State(db): State<Db>,
    session: Session,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    require_admin(&session).await?;
    let backend = LocalBackend::new(db);
    let file = export_list(&backend, &id).await.map_err(backend_error)?;

    let code = file.code.clone().unwrap_or_default();
    let name = export_file_name(&code, time::OffsetDateTime::now_utc().date());
    let disposition = format!("attachment; filename=\"{}\"", name);

    Ok((
        StatusCode::OK,
        [(header::CONTENT_DISPOSITION, disposition)],
        Json(file),
    ))
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ConflictSummary {
    pub id: String,
    pub list_code: String,
    pub list_name: Option<String>,
    pub updated: i64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ImportCheckResponse {
    pub conflict: Option<ConflictSummary>,
    pub strategies: Vec<ImportStrategy>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ImportRequest {
    pub file: serde_json::Value,
    pub strategy: ImportStrategy,
}

/// POST /admin/import/check
pub async fn import_check(
    State(db): State<Db>,
    session: Session,
    Json(file): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<ImportCheckResponse>), (StatusCode, String)> {
    require_admin(&session).await?;
    let backend = LocalBackend::new(db);
    let mut import = ImportSession::new();
    import.select_value(file).map_err(|e| e.into_http())?;

    let conflict = import
        .check_conflict(&backend)
        .await
        .map_err(|e| e.into_http())?
        .map(|doc| ConflictSummary {
            id: doc.id.clone(),
            list_code: doc.list_code.clone(),
            list_name: doc.data.list_name.clone(),
            updated: doc.updated,
        });

    Ok((
        StatusCode::OK,
        Json(ImportCheckResponse {
            conflict,
            strategies: import.offered_strategies(),
        }),
    ))
}

/// POST /admin/import
pub async fn import(
    State(db): State<Db>,
    session: Session,
    Json(request): Json<ImportRequest>,
) -> Result<(StatusCode, Json<ImportOutcome>), (StatusCode, String)> {
    require_admin(&session).await?;
    let backend = LocalBackend::new(db);
    let mut import = ImportSession::new();
    import.select_value(request.file).map_err(|e| e.into_http())?;
    import
        .check_conflict(&backend)
        .await
        .map_err(|e| e.into_http())?;
    import.choose(request.strategy).map_err(|e| e.into_http())?;

    let outcome = import.apply(&backend).await.map_err(|e| e.into_http())?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
