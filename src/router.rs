use axum::{
    Router,
    routing::{delete, get, post, put},
};
use time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::Key};

use crate::config::ConfigError;
use crate::constants::{SESSION_EXPIRY_DAYS, SESSION_NAME};
use crate::database::Db;
use crate::{admin, auth, catalog, lists, settings};

async fn health() -> &'static str {
    "ok"
}

pub fn build_router(db: Db, session_secret: &str) -> Result<Router, ConfigError> {
    let key = Key::try_from(session_secret.as_bytes())
        .map_err(|e| ConfigError::InvalidSessionSecret(e.to_string()))?;

    // TODO: expired sessions are never evicted from the memory store
    let store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(store)
        .with_secure(false)
        .with_name(SESSION_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::days(SESSION_EXPIRY_DAYS)))
        .with_signed(key);

    let public = Router::new()
        .route("/health", get(health))
        .route("/config/server-name", get(settings::server_name))
        .route("/catalog/categories", get(catalog::get_categories))
        .route("/catalog/items", get(catalog::get_items))
        .route("/lists", post(lists::create))
        .route("/lists/by-code/{code}", get(lists::show_by_code))
        .route(
            "/lists/{id}",
            get(lists::show).put(lists::update).delete(lists::destroy),
        )
        .route(
            "/lists/{id}/items",
            get(lists::index_items).post(lists::create_item),
        )
        .route("/items/{id}", delete(lists::destroy_item));

    let admin = Router::new()
        .route("/admin/login", post(auth::login))
        .route("/admin/logout", post(auth::logout))
        .route("/admin/config/server-name", put(settings::update_server_name))
        .route("/admin/lists", get(admin::get_lists))
        .route("/admin/lists/bulk-delete", post(admin::bulk_delete_lists))
        .route("/admin/lists/{id}/reset-items", post(admin::reset_items))
        .route(
            "/admin/lists/{id}/reset-categories",
            post(admin::reset_categories),
        )
        .route("/admin/lists/{id}/export", get(admin::export))
        .route("/admin/import/check", post(admin::import_check))
        .route("/admin/import", post(admin::import))
        .route(
            "/admin/catalog/categories",
            get(catalog::admin_get_categories).post(catalog::create_category),
        )
        .route(
            "/admin/catalog/categories/bulk-delete",
            post(catalog::bulk_delete_categories),
        )
        .route(
            "/admin/catalog/categories/bulk-visibility",
            post(catalog::bulk_category_visibility),
        )
        .route(
            "/admin/catalog/categories/{id}",
            put(catalog::update_category).delete(catalog::delete_category),
        )
        .route(
            "/admin/catalog/items",
            get(catalog::admin_get_items).post(catalog::create_item),
        )
        .route(
            "/admin/catalog/items/bulk-delete",
            post(catalog::bulk_delete_items),
        )
        .route(
            "/admin/catalog/items/bulk-visibility",
            post(catalog::bulk_item_visibility),
        )
        .route(
            "/admin/catalog/items/{id}",
            put(catalog::update_item).delete(catalog::delete_item),
        );

    Ok(public
        .merge(admin)
        .layer(session_layer)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(db))
}
