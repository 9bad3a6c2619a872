//! Client-side application state.
//!
//! `ShopState` is the single working copy of a user's list. It is an explicit
//! object owned by the application shell: mutations are synchronous and never
//! talk to the network themselves. Pushing changes to the remote document is
//! the job of [`crate::sync::SyncFlusher`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};

use crate::backend::{BackendError, CatalogSource};
use crate::catalog::catalog_to_categories;
use crate::constants::*;
use crate::defaults::default_categories;
use crate::models::{Categories, CategoryEntry, Lang, ListData, LocalizedItem, ShopItem};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("State file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("State file is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppMode {
    #[default]
    Planning,
    Shopping,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    List,
    Grid,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MsgType {
    #[default]
    Info,
    Success,
    Error,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    pub connected: bool,
    pub code: Option<String>,
    pub record_id: Option<String>,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub msg_type: MsgType,
    #[serde(default)]
    pub sync_history: Vec<String>,
    pub last_sync: Option<i64>,
    #[serde(default)]
    pub sync_version: u64,
}

/// Partial update for [`SyncState`]; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct SyncPatch {
    pub connected: Option<bool>,
    pub code: Option<Option<String>>,
    pub record_id: Option<Option<String>>,
    pub msg: Option<String>,
    pub msg_type: Option<MsgType>,
    pub last_sync: Option<Option<i64>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub is_logged_in: bool,
    pub email: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AuthPatch {
    pub is_logged_in: Option<bool>,
    pub email: Option<Option<String>>,
    pub user_id: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShopState {
    pub items: Vec<ShopItem>,
    pub categories: Categories,

    pub lang: Lang,
    pub app_mode: AppMode,
    pub view_mode: ViewMode,
    pub is_dark: bool,
    pub is_amoled: bool,
    pub notify_on_add: bool,
    pub notify_on_check: bool,
    pub server_name: String,

    pub sync: SyncState,
    pub auth: AuthState,

    /// Bumped on every change to `items` or `categories`.
    revision: u64,
}

/// The subset of [`ShopState`] that survives a restart.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct PersistedState {
    items: Vec<ShopItem>,
    categories: Categories,
    lang: Lang,
    app_mode: AppMode,
    view_mode: ViewMode,
    is_dark: bool,
    is_amoled: bool,
    notify_on_add: bool,
    notify_on_check: bool,
    server_name: String,
    sync: SyncState,
    auth: AuthState,
}

impl Default for ShopState {
    fn default() -> Self {
        ShopState {
            items: Vec::new(),
            categories: default_categories(),
            lang: Lang::default(),
            app_mode: AppMode::default(),
            view_mode: ViewMode::default(),
            is_dark: false,
            is_amoled: false,
            notify_on_add: true,
            notify_on_check: true,
            server_name: DEFAULT_SERVER_NAME.to_string(),
            sync: SyncState::default(),
            auth: AuthState::default(),
            revision: 0,
        }
    }
}

static LAST_ITEM_ID: AtomicI64 = AtomicI64::new(0);

/// Millisecond clock id, bumped past the last one handed out so that two
/// items created within the same millisecond still get distinct ids.
pub fn next_item_id() -> i64 {
    let now = (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64;
    let mut last = LAST_ITEM_ID.load(Ordering::Relaxed);
    loop {
        let candidate = now.max(last + 1);
        match LAST_ITEM_ID.compare_exchange_weak(last, candidate, Ordering::Relaxed, Ordering::Relaxed)
        {
            Ok(_) => return candidate,
            Err(actual) => last = actual,
        }
    }
}

pub fn state_file(dir: &Path) -> PathBuf {
    dir.join(format!("{}.json", STORAGE_KEY))
}

impl ShopState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    /// Loads the persisted snapshot from `dir`, or defaults when there is none.
    /// The connection flag and transient sync message always start cleared.
    pub fn load(dir: &Path) -> Result<Self, StoreError> {
        let path = state_file(dir);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no persisted state, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let persisted: PersistedState = serde_json::from_str(&raw)?;
        let mut sync = persisted.sync;
        sync.connected = false;
        sync.msg.clear();
        sync.msg_type = MsgType::Info;
        sync.sync_version = 0;

        Ok(ShopState {
            items: persisted.items,
            categories: persisted.categories,
            lang: persisted.lang,
            app_mode: persisted.app_mode,
            view_mode: persisted.view_mode,
            is_dark: persisted.is_dark,
            is_amoled: persisted.is_amoled,
            notify_on_add: persisted.notify_on_add,
            notify_on_check: persisted.notify_on_check,
            server_name: persisted.server_name,
            sync,
            auth: persisted.auth,
            revision: 0,
        })
    }

    pub fn save(&self, dir: &Path) -> Result<(), StoreError> {
        std::fs::create_dir_all(dir)?;
        let mut sync = self.sync.clone();
        sync.connected = false;
        sync.msg.clear();
        sync.msg_type = MsgType::Info;
        sync.sync_version = 0;

        let persisted = PersistedState {
            items: self.items.clone(),
            categories: self.categories.clone(),
            lang: self.lang,
            app_mode: self.app_mode,
            view_mode: self.view_mode,
            is_dark: self.is_dark,
            is_amoled: self.is_amoled,
            notify_on_add: self.notify_on_add,
            notify_on_check: self.notify_on_check,
            server_name: self.server_name.clone(),
            sync,
            auth: self.auth.clone(),
        };
        std::fs::write(state_file(dir), serde_json::to_string_pretty(&persisted)?)?;
        Ok(())
    }

    pub fn set_lang(&mut self, lang: Lang) {
        self.lang = lang;
    }

    pub fn set_server_name(&mut self, name: impl Into<String>) {
        self.server_name = name.into();
    }

    pub fn set_app_mode(&mut self, mode: AppMode) {
        self.app_mode = mode;
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    /// Leaving dark mode also leaves AMOLED mode.
    pub fn toggle_theme(&mut self) {
        self.is_dark = !self.is_dark;
        if !self.is_dark {
            self.is_amoled = false;
        }
    }

    /// AMOLED mode implies dark mode.
    pub fn toggle_amoled(&mut self) {
        self.is_amoled = !self.is_amoled;
        if self.is_amoled {
            self.is_dark = true;
        }
    }

    pub fn set_notify_on_add(&mut self, value: bool) {
        self.notify_on_add = value;
    }

    pub fn set_notify_on_check(&mut self, value: bool) {
        self.notify_on_check = value;
    }

    /// Prepends a new unchecked item. The caller trims and rejects empty names.
    pub fn add_item(&mut self, name: &str, category: Option<&str>) -> &ShopItem {
        let item = ShopItem {
            id: next_item_id(),
            name: name.to_string(),
            checked: false,
            note: String::new(),
            category: category.unwrap_or(DEFAULT_ITEM_CATEGORY).to_string(),
        };
        self.items.insert(0, item);
        self.touch();
        &self.items[0]
    }

    pub fn toggle_check(&mut self, id: i64) {
        if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
            item.checked = !item.checked;
            self.touch();
        }
    }

    pub fn delete_item(&mut self, id: i64) {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        if self.items.len() != before {
            self.touch();
        }
    }

    pub fn update_item_note(&mut self, id: i64, note: &str) {
        if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
            item.note = note.to_string();
            self.touch();
        }
    }

    pub fn clear_completed(&mut self) {
        let before = self.items.len();
        self.items.retain(|i| !i.checked);
        if self.items.len() != before {
            self.touch();
        }
    }

    /// Appends a custom item to an existing category; absent keys are ignored.
    pub fn add_category_item(&mut self, cat_key: &str, item: LocalizedItem) {
        if let Some(entry) = self.categories.get_mut(cat_key) {
            entry.items.push(item);
            self.touch();
        }
    }

    /// Removes the first entry equal to `item`. Matching by value keeps the
    /// removal correct even if the list was reordered since it was rendered.
    pub fn remove_category_item(&mut self, cat_key: &str, item: &LocalizedItem) -> bool {
        let Some(entry) = self.categories.get_mut(cat_key) else {
            return false;
        };
        let Some(pos) = entry.items.iter().position(|i| i == item) else {
            return false;
        };
        entry.items.remove(pos);
        self.touch();
        true
    }

    pub fn add_category(&mut self, key: &str, icon: &str) {
        if !self.categories.contains_key(key) {
            self.categories.insert(
                key.to_string(),
                CategoryEntry {
                    icon: icon.to_string(),
                    items: Vec::new(),
                    color: None,
                },
            );
            self.touch();
        }
    }

    pub fn remove_category(&mut self, key: &str) {
        if self.categories.remove(key).is_some() {
            self.touch();
        }
    }

    pub fn set_sync_state(&mut self, patch: SyncPatch) {
        if let Some(connected) = patch.connected {
            self.sync.connected = connected;
        }
        if let Some(code) = patch.code {
            self.sync.code = code;
        }
        if let Some(record_id) = patch.record_id {
            self.sync.record_id = record_id;
        }
        if let Some(msg) = patch.msg {
            self.sync.msg = msg;
        }
        if let Some(msg_type) = patch.msg_type {
            self.sync.msg_type = msg_type;
        }
        if let Some(last_sync) = patch.last_sync {
            self.sync.last_sync = last_sync;
        }
    }

    /// Wholesale replace from a remote snapshot. Missing categories fall back
    /// to the built-in defaults.
    pub fn sync_from_remote(&mut self, data: &ListData) {
        self.items = data.items.clone();
        self.categories = data
            .categories
            .clone()
            .unwrap_or_else(default_categories);
        self.sync.sync_version += 1;
        self.touch();
    }

    pub fn import_data(&mut self, items: Vec<ShopItem>, categories: Categories) {
        self.items = items;
        self.categories = categories;
        self.touch();
    }

    pub fn reset_defaults(&mut self) {
        self.items.clear();
        self.categories = default_categories();
        self.touch();
    }

    /// Most recent first, no duplicates, at most three codes.
    pub fn add_to_sync_history(&mut self, code: &str) {
        let mut history = vec![code.to_string()];
        history.extend(
            self.sync
                .sync_history
                .iter()
                .filter(|c| c.as_str() != code)
                .cloned(),
        );
        history.truncate(SYNC_HISTORY_LIMIT);
        self.sync.sync_history = history;
    }

    pub fn set_auth(&mut self, patch: AuthPatch) {
        if let Some(is_logged_in) = patch.is_logged_in {
            self.auth.is_logged_in = is_logged_in;
        }
        if let Some(email) = patch.email {
            self.auth.email = email;
        }
        if let Some(user_id) = patch.user_id {
            self.auth.user_id = user_id;
        }
    }

    pub fn logout(&mut self) {
        self.auth = AuthState::default();
    }

    /// Document body pushed to the remote list.
    pub fn list_data(&self) -> ListData {
        ListData {
            items: self.items.clone(),
            categories: Some(self.categories.clone()),
            list_name: None,
        }
    }

    /// Replaces the working categories with the visible catalog.
    ///
    /// Local custom categories and items are discarded. An empty catalog
    /// leaves the current map untouched. Failures are logged, never raised.
    pub async fn load_catalog<S>(&mut self, source: &S)
    where
        S: CatalogSource + ?Sized,
    {
        if let Err(e) = self.try_load_catalog(source).await {
            tracing::error!(error = %e, "failed to load catalog");
        }
    }

    async fn try_load_catalog<S>(&mut self, source: &S) -> Result<(), BackendError>
    where
        S: CatalogSource + ?Sized,
    {
        let categories = source.catalog_categories(true).await?;
        let items = source.catalog_items(true).await?;

        let Some(map) = catalog_to_categories(&categories, &items) else {
            tracing::debug!("catalog empty, keeping current categories");
            return Ok(());
        };
        self.categories = map;
        self.touch();

        match source.server_name().await {
            Ok(Some(name)) => self.server_name = name,
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "failed to load server name"),
        }
        Ok(())
    }
}
