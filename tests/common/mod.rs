#![allow(dead_code)]

use shoplist_server::backend::{BackendError, ListBackend, LocalBackend};
use shoplist_server::catalog::{insert_category, insert_item};
use shoplist_server::database::{Db, init_db, now_unix};
use shoplist_server::lists::{create_atomic_item, create_list};
use shoplist_server::models::{
    CatalogCategory, CatalogCategoryPayload, CatalogItem, CatalogItemPayload, Categories,
    CategoryEntry, ListData, ListItemPayload, LocalizedItem, ShoppingListDocument,
};
use tempfile::{TempDir, tempdir};

pub async fn setup_test_environment() -> (Db, TempDir) {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let data_path = temp_dir
        .path()
        .to_str()
        .expect("Failed to convert path to string")
        .to_string();

    let db = init_db(&data_path)
        .await
        .unwrap_or_else(|e| panic!("Failed to initialize database at {}: {}", data_path, e));

    (db, temp_dir)
}

pub async fn setup_backend() -> (LocalBackend, TempDir) {
    let (db, temp_dir) = setup_test_environment().await;
    (LocalBackend::new(db), temp_dir)
}

pub fn item_payload(name: &str, category: &str) -> ListItemPayload {
    ListItemPayload {
        name: name.to_string(),
        checked: false,
        category: category.to_string(),
        note: String::new(),
    }
}

pub fn category_entry(icon: &str, items: &[(&str, &str, &str)]) -> CategoryEntry {
    CategoryEntry {
        icon: icon.to_string(),
        items: items
            .iter()
            .map(|(es, ca, en)| LocalizedItem::new(es, ca, en))
            .collect(),
        color: None,
    }
}

pub fn categories(entries: Vec<(&str, CategoryEntry)>) -> Categories {
    entries
        .into_iter()
        .map(|(key, entry)| (key.to_string(), entry))
        .collect()
}

pub async fn create_test_list(db: &Db, code: &str, data: ListData) -> ShoppingListDocument {
    create_list(db, code, &data)
        .await
        .unwrap_or_else(|e| panic!("Failed to create test list '{}': {}", code, e))
}

pub async fn add_test_items(db: &Db, list_id: &str, names: &[&str]) {
    for name in names {
        create_atomic_item(db, list_id, &item_payload(name, "other"))
            .await
            .unwrap_or_else(|e| panic!("Failed to add item '{}' to {}: {}", name, list_id, e));
    }
}

pub async fn add_test_payloads(db: &Db, list_id: &str, items: &[ListItemPayload]) {
    for item in items {
        create_atomic_item(db, list_id, item)
            .await
            .unwrap_or_else(|e| panic!("Failed to add item '{}' to {}: {}", item.name, list_id, e));
    }
}

/// Atomic items of a list as payloads, in a stable order for comparisons.
pub async fn sorted_items(backend: &impl ListBackend, list_id: &str) -> Vec<ListItemPayload> {
    let items = backend
        .atomic_items(list_id)
        .await
        .unwrap_or_else(|e| panic!("Failed to read items of {}: {}", list_id, e));
    sort_payloads(items.iter().map(ListItemPayload::from).collect())
}

pub fn sort_payloads(mut items: Vec<ListItemPayload>) -> Vec<ListItemPayload> {
    items.sort_by(|a, b| {
        (&a.name, &a.category, &a.note, a.checked).cmp(&(&b.name, &b.category, &b.note, b.checked))
    });
    items
}

/// Writes a list row with a verbatim `data` document, bypassing serialization.
pub async fn insert_raw_list(db: &Db, id: &str, code: &str, data: &str) {
    let now = now_unix();
    let conn = db.write().await;
    conn.execute(
        "INSERT INTO shopping_lists (id, list_code, data, created, updated) VALUES (?, ?, ?, ?, ?)",
        (id, code, data, now, now),
    )
    .await
    .unwrap_or_else(|e| panic!("Failed to insert raw list {}: {}", code, e));
}

/// Rewinds a list's `updated` stamp so inactivity checks can be exercised.
pub async fn backdate_list(db: &Db, list_id: &str, updated: i64) {
    let conn = db.write().await;
    conn.execute(
        "UPDATE shopping_lists SET updated = ? WHERE id = ?",
        (updated, list_id),
    )
    .await
    .unwrap_or_else(|e| panic!("Failed to backdate list {}: {}", list_id, e));
}

pub async fn create_test_category(
    db: &Db,
    key: &str,
    order: i64,
    hidden: bool,
) -> Result<CatalogCategory, BackendError> {
    insert_category(
        db,
        &CatalogCategoryPayload {
            key: key.to_string(),
            icon: "🛒".to_string(),
            order,
            name_es: key.to_string(),
            name_ca: key.to_string(),
            name_en: key.to_string(),
            color: String::new(),
            hidden,
        },
    )
    .await
}

pub async fn create_test_item(
    db: &Db,
    category_id: &str,
    name_es: &str,
    name_en: &str,
    hidden: bool,
) -> Result<CatalogItem, BackendError> {
    insert_item(
        db,
        &CatalogItemPayload {
            category: category_id.to_string(),
            name_es: name_es.to_string(),
            name_ca: String::new(),
            name_en: name_en.to_string(),
            hidden,
        },
    )
    .await
}
