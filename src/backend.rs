//! Remote storage seams used by the client store, the sync flusher and the
//! import engine.
//!
//! [`LocalBackend`] talks to libsql directly; [`crate::http_backend::HttpBackend`]
//! goes through the JSON routes.

use async_trait::async_trait;

use crate::database::Db;
use crate::models::{
    AtomicItem, CatalogCategory, CatalogItem, ListData, ListItemPayload, ShoppingListDocument,
};
use crate::{catalog, lists, settings};

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Malformed document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("{failed} of {total} bulk operations failed")]
    Bulk { failed: usize, total: usize },
}

impl BackendError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        BackendError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Read side of the shared catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn catalog_categories(
        &self,
        visible_only: bool,
    ) -> Result<Vec<CatalogCategory>, BackendError>;

    /// Items with their category expanded.
    async fn catalog_items(&self, visible_only: bool) -> Result<Vec<CatalogItem>, BackendError>;

    async fn server_name(&self) -> Result<Option<String>, BackendError>;
}

/// List documents plus their atomic item records.
#[async_trait]
pub trait ListBackend: Send + Sync {
    async fn list_by_code(&self, code: &str)
    -> Result<Option<ShoppingListDocument>, BackendError>;

    async fn get_list(&self, id: &str) -> Result<ShoppingListDocument, BackendError>;

    async fn create_list(
        &self,
        code: &str,
        data: &ListData,
    ) -> Result<ShoppingListDocument, BackendError>;

    /// Replaces the document's `data` wholesale. Last write wins.
    async fn update_list(
        &self,
        id: &str,
        data: &ListData,
    ) -> Result<ShoppingListDocument, BackendError>;

    async fn delete_list(&self, id: &str) -> Result<(), BackendError>;

    async fn atomic_items(&self, list_id: &str) -> Result<Vec<AtomicItem>, BackendError>;

    async fn create_atomic_item(
        &self,
        list_id: &str,
        item: &ListItemPayload,
    ) -> Result<AtomicItem, BackendError>;

    async fn delete_atomic_item(&self, id: &str) -> Result<(), BackendError>;
}

#[derive(Clone)]
pub struct LocalBackend {
    db: Db,
}

impl LocalBackend {
    pub fn new(db: Db) -> Self {
        LocalBackend { db }
    }

    pub fn db(&self) -> &Db {
        &self.db
    }
}

#[async_trait]
impl CatalogSource for LocalBackend {
    async fn catalog_categories(
        &self,
        visible_only: bool,
    ) -> Result<Vec<CatalogCategory>, BackendError> {
        catalog::list_categories(&self.db, visible_only).await
    }

    async fn catalog_items(&self, visible_only: bool) -> Result<Vec<CatalogItem>, BackendError> {
        let filter = catalog::ItemFilter {
            visible_only,
            ..Default::default()
        };
        catalog::list_items(&self.db, &filter).await
    }

    async fn server_name(&self) -> Result<Option<String>, BackendError> {
        settings::get_config_value(&self.db, crate::constants::CONFIG_KEY_SERVER_NAME).await
    }
}

#[async_trait]
impl ListBackend for LocalBackend {
    async fn list_by_code(
        &self,
        code: &str,
    ) -> Result<Option<ShoppingListDocument>, BackendError> {
        lists::find_list_by_code(&self.db, code).await
    }

    async fn get_list(&self, id: &str) -> Result<ShoppingListDocument, BackendError> {
        lists::get_list(&self.db, id).await
    }

    async fn create_list(
        &self,
        code: &str,
        data: &ListData,
    ) -> Result<ShoppingListDocument, BackendError> {
        lists::create_list(&self.db, code, data).await
    }

    async fn update_list(
        &self,
        id: &str,
        data: &ListData,
    ) -> Result<ShoppingListDocument, BackendError> {
        lists::update_list(&self.db, id, data).await
    }

    async fn delete_list(&self, id: &str) -> Result<(), BackendError> {
        lists::delete_list(&self.db, id).await
    }

    async fn atomic_items(&self, list_id: &str) -> Result<Vec<AtomicItem>, BackendError> {
        lists::list_atomic_items(&self.db, list_id).await
    }

    async fn create_atomic_item(
        &self,
        list_id: &str,
        item: &ListItemPayload,
    ) -> Result<AtomicItem, BackendError> {
        lists::create_atomic_item(&self.db, list_id, item).await
    }

    async fn delete_atomic_item(&self, id: &str) -> Result<(), BackendError> {
        lists::delete_atomic_item(&self.db, id).await
    }
}
