use async_trait::async_trait;
use shoplist_server::backend::{BackendError, CatalogSource};
use shoplist_server::defaults::{DEFAULT_CATEGORY_KEYS, default_categories};
use shoplist_server::models::{CatalogCategory, CatalogItem, Lang, ListData, LocalizedItem};
use shoplist_server::store::{AppMode, AuthPatch, MsgType, ShopState, SyncPatch, state_file};
use tempfile::tempdir;

mod common;
use common::*;

struct FixedCatalog {
    categories: Vec<CatalogCategory>,
    items: Vec<CatalogItem>,
    server_name: Option<String>,
}

#[async_trait]
impl CatalogSource for FixedCatalog {
    async fn catalog_categories(
        &self,
        _visible_only: bool,
    ) -> Result<Vec<CatalogCategory>, BackendError> {
        Ok(self.categories.clone())
    }

    async fn catalog_items(&self, _visible_only: bool) -> Result<Vec<CatalogItem>, BackendError> {
        Ok(self.items.clone())
    }

    async fn server_name(&self) -> Result<Option<String>, BackendError> {
        Ok(self.server_name.clone())
    }
}

struct BrokenCatalog;

#[async_trait]
impl CatalogSource for BrokenCatalog {
    async fn catalog_categories(
        &self,
        _visible_only: bool,
    ) -> Result<Vec<CatalogCategory>, BackendError> {
        Err(BackendError::Status {
            status: 503,
            message: "unavailable".to_string(),
        })
    }

    async fn catalog_items(&self, _visible_only: bool) -> Result<Vec<CatalogItem>, BackendError> {
        Ok(Vec::new())
    }

    async fn server_name(&self) -> Result<Option<String>, BackendError> {
        Ok(None)
    }
}

fn catalog_category(id: &str, key: &str) -> CatalogCategory {
    CatalogCategory {
        id: id.to_string(),
        key: key.to_string(),
        icon: "🥖".to_string(),
        order: 0,
        name_es: key.to_string(),
        name_ca: key.to_string(),
        name_en: key.to_string(),
        color: "#ffcc00".to_string(),
        hidden: false,
    }
}

#[test]
fn fresh_state_uses_default_categories() {
    let state = ShopState::new();

    assert!(state.items.is_empty());
    assert_eq!(state.categories.len(), DEFAULT_CATEGORY_KEYS.len());
    assert_eq!(state.lang, Lang::Ca);
    assert_eq!(state.app_mode, AppMode::Planning);
}

#[test]
fn add_item_prepends_unchecked_item() {
    let mut state = ShopState::new();

    let first = state.add_item("Milk", Some("dairy")).id;
    let second = state.add_item("Bread", None).id;

    assert_eq!(state.items.len(), 2);
    assert_eq!(state.items[0].id, second);
    assert_eq!(state.items[0].name, "Bread");
    assert_eq!(state.items[0].category, "other");
    assert!(!state.items[0].checked);
    assert_eq!(state.items[1].id, first);
    assert_ne!(first, second);
}

#[test]
fn toggle_and_clear_completed() {
    let mut state = ShopState::new();
    let milk = state.add_item("Milk", None).id;
    state.add_item("Bread", None);

    state.toggle_check(milk);
    assert!(state.items.iter().any(|i| i.id == milk && i.checked));

    state.clear_completed();
    assert_eq!(state.items.len(), 1);
    assert!(state.items.iter().all(|i| !i.checked));

    let revision = state.revision();
    state.clear_completed();
    assert_eq!(state.items.len(), 1);
    assert_eq!(state.revision(), revision);
}

#[test]
fn unknown_ids_are_ignored() {
    let mut state = ShopState::new();
    state.add_item("Milk", None);
    let revision = state.revision();

    state.toggle_check(-1);
    state.delete_item(-1);
    state.update_item_note(-1, "two litres");

    assert_eq!(state.revision(), revision);
    assert_eq!(state.items.len(), 1);
}

#[test]
fn update_note_and_delete() {
    let mut state = ShopState::new();
    let milk = state.add_item("Milk", None).id;

    state.update_item_note(milk, "two litres");
    assert_eq!(state.items[0].note, "two litres");

    state.delete_item(milk);
    assert!(state.items.is_empty());
}

#[test]
fn theme_toggles_keep_amoled_consistent() {
    let mut state = ShopState::new();

    state.toggle_amoled();
    assert!(state.is_amoled);
    assert!(state.is_dark);

    state.toggle_theme();
    assert!(!state.is_dark);
    assert!(!state.is_amoled);
}

#[test]
fn category_items_are_removed_by_value() {
    let mut state = ShopState::new();
    state.add_category("hobby", "🍿");
    let chips = LocalizedItem::new("Patatas", "Patates", "Chips");
    let nuts = LocalizedItem::new("Nueces", "Nous", "Nuts");
    state.add_category_item("hobby", chips.clone());
    state.add_category_item("hobby", nuts.clone());

    assert!(state.remove_category_item("hobby", &chips));
    assert_eq!(state.categories["hobby"].items, vec![nuts]);
    assert!(!state.remove_category_item("hobby", &chips));
    assert!(!state.remove_category_item("missing", &chips));
}

#[test]
fn adding_to_missing_category_is_ignored() {
    let mut state = ShopState::new();
    let revision = state.revision();

    state.add_category_item("nope", LocalizedItem::new("a", "b", "c"));

    assert!(!state.categories.contains_key("nope"));
    assert_eq!(state.revision(), revision);
}

#[test]
fn add_category_keeps_existing_entry() {
    let mut state = ShopState::new();
    state.add_category("hobby", "🍿");
    state.add_category_item("hobby", LocalizedItem::new("Patatas", "Patates", "Chips"));

    state.add_category("hobby", "🥨");

    assert_eq!(state.categories["hobby"].icon, "🍿");
    assert_eq!(state.categories["hobby"].items.len(), 1);

    state.remove_category("hobby");
    assert!(!state.categories.contains_key("hobby"));
}

#[test]
fn sync_history_is_most_recent_first_and_capped() {
    let mut state = ShopState::new();

    for code in ["AAA111", "BBB222", "CCC333", "AAA111", "DDD444"] {
        state.add_to_sync_history(code);
    }

    assert_eq!(state.sync.sync_history, vec!["DDD444", "AAA111", "CCC333"]);
}

#[test]
fn sync_from_remote_replaces_working_copy() {
    let mut state = ShopState::new();
    state.add_item("Local", None);
    let remote = ListData {
        items: Vec::new(),
        categories: Some(categories(vec![("hobby", category_entry("🍿", &[]))])),
        list_name: None,
    };

    state.sync_from_remote(&remote);
    assert!(state.items.is_empty());
    assert_eq!(state.categories.len(), 1);
    assert_eq!(state.sync.sync_version, 1);

    state.sync_from_remote(&ListData::default());
    assert_eq!(state.categories, default_categories());
    assert_eq!(state.sync.sync_version, 2);
}

#[test]
fn reset_defaults_clears_items() {
    let mut state = ShopState::new();
    state.add_item("Milk", None);
    state.add_category("hobby", "🍿");

    state.reset_defaults();

    assert!(state.items.is_empty());
    assert_eq!(state.categories, default_categories());
}

#[test]
fn auth_patch_and_logout() {
    let mut state = ShopState::new();
    state.set_auth(AuthPatch {
        is_logged_in: Some(true),
        email: Some(Some("ana@example.com".to_string())),
        ..Default::default()
    });
    assert!(state.auth.is_logged_in);
    assert_eq!(state.auth.email.as_deref(), Some("ana@example.com"));

    state.logout();
    assert!(!state.auth.is_logged_in);
    assert!(state.auth.email.is_none());
}

#[test]
fn persisted_state_restarts_disconnected() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let mut state = ShopState::new();
    state.add_item("Milk", None);
    state.set_lang(Lang::En);
    state.set_sync_state(SyncPatch {
        connected: Some(true),
        code: Some(Some("ABC123".to_string())),
        record_id: Some(Some("rec-1".to_string())),
        msg: Some("Connected".to_string()),
        msg_type: Some(MsgType::Success),
        last_sync: Some(Some(1_700_000_000)),
    });
    state.add_to_sync_history("ABC123");

    state.save(dir.path()).unwrap();
    assert!(state_file(dir.path()).exists());

    let restored = ShopState::load(dir.path()).unwrap();
    assert_eq!(restored.items, state.items);
    assert_eq!(restored.lang, Lang::En);
    assert!(!restored.sync.connected);
    assert!(restored.sync.msg.is_empty());
    assert_eq!(restored.sync.code.as_deref(), Some("ABC123"));
    assert_eq!(restored.sync.record_id.as_deref(), Some("rec-1"));
    assert_eq!(restored.sync.sync_history, vec!["ABC123"]);
}

#[test]
fn missing_state_file_loads_defaults() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let state = ShopState::load(dir.path()).unwrap();
    assert_eq!(state, ShopState::new());
}

#[tokio::test]
async fn load_catalog_replaces_categories_and_server_name() {
    let mut state = ShopState::new();
    state.add_category("hobby", "🍿");

    let bakery = catalog_category("cat-1", "bakery");
    let source = FixedCatalog {
        items: vec![CatalogItem {
            id: "item-1".to_string(),
            category: bakery.id.clone(),
            name_es: "Pan".to_string(),
            name_ca: "Pa".to_string(),
            name_en: String::new(),
            hidden: false,
            expand: Some(bakery.clone()),
        }],
        categories: vec![bakery],
        server_name: Some("Casa".to_string()),
    };

    state.load_catalog(&source).await;

    assert_eq!(state.categories.len(), 1);
    let entry = &state.categories["bakery"];
    assert_eq!(entry.color.as_deref(), Some("#ffcc00"));
    assert_eq!(entry.items, vec![LocalizedItem::new("Pan", "Pa", "Pan")]);
    assert_eq!(state.server_name, "Casa");
}

#[tokio::test]
async fn empty_or_failing_catalog_keeps_state() {
    let mut state = ShopState::new();
    state.add_category("hobby", "🍿");
    let before = state.categories.clone();

    let empty = FixedCatalog {
        categories: Vec::new(),
        items: Vec::new(),
        server_name: Some("Ignored".to_string()),
    };
    state.load_catalog(&empty).await;
    assert_eq!(state.categories, before);

    state.load_catalog(&BrokenCatalog).await;
    assert_eq!(state.categories, before);
}

#[tokio::test]
async fn all_hidden_catalog_keeps_state() {
    let mut state = ShopState::new();
    state.add_category("hobby", "🍿");
    let before = state.categories.clone();

    let mut dairy = catalog_category("cat-1", "dairy");
    dairy.hidden = true;
    let mut fruit = catalog_category("cat-2", "fruit");
    fruit.hidden = true;
    let hidden = FixedCatalog {
        items: vec![CatalogItem {
            id: "item-1".to_string(),
            category: dairy.id.clone(),
            name_es: "Leche".to_string(),
            name_ca: "Llet".to_string(),
            name_en: "Milk".to_string(),
            hidden: false,
            expand: Some(dairy.clone()),
        }],
        categories: vec![dairy, fruit],
        server_name: None,
    };
    state.load_catalog(&hidden).await;

    assert_eq!(state.categories, before);
    assert!(state.categories.contains_key("hobby"));
}

#[test]
fn preferences_and_import_data() {
    let mut state = ShopState::new();
    state.set_app_mode(AppMode::Shopping);
    state.set_notify_on_add(false);
    state.set_server_name("Casa");
    assert_eq!(state.app_mode, AppMode::Shopping);
    assert!(!state.notify_on_add);
    assert_eq!(state.server_name, "Casa");

    let revision = state.revision();
    let imported = categories(vec![("pets", category_entry("🐶", &[]))]);
    state.import_data(Vec::new(), imported.clone());
    assert_eq!(state.categories, imported);
    assert!(state.revision() > revision);
}

#[test]
fn localized_display_falls_back_across_languages() {
    let full = LocalizedItem::new("Leche", "Llet", "Milk");
    assert_eq!(full.display(Lang::En), "Milk");

    let partial = LocalizedItem::new("", "Pa", "");
    assert_eq!(partial.display(Lang::En), "Pa");
    assert_eq!(LocalizedItem::default().display(Lang::Ca), "???");
}
