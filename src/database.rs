use anyhow::Result;
use libsql::{Builder, Connection};
use std::{path::Path, sync::Arc};
use tokio::sync::RwLock;

use crate::constants::{CONFIG_KEY_PASSWORD, DATABASE_FILE, DEFAULT_ADMIN_PASSWORD};

const CREATE_CATALOG_CATEGORIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS catalog_categories (
    id       TEXT    PRIMARY KEY,
    key      TEXT    UNIQUE NOT NULL,
    icon     TEXT    NOT NULL,
    "order"  INTEGER NOT NULL DEFAULT 0,
    name_es  TEXT    NOT NULL DEFAULT '',
    name_ca  TEXT    NOT NULL DEFAULT '',
    name_en  TEXT    NOT NULL DEFAULT '',
    color    TEXT    NOT NULL DEFAULT '',
    hidden   INTEGER NOT NULL DEFAULT 0
);
"#;

const CREATE_CATALOG_ITEMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS catalog_items (
    id        TEXT    PRIMARY KEY,
    category  TEXT    NOT NULL REFERENCES catalog_categories(id) ON DELETE CASCADE,
    name_es   TEXT    NOT NULL DEFAULT '',
    name_ca   TEXT    NOT NULL DEFAULT '',
    name_en   TEXT    NOT NULL DEFAULT '',
    hidden    INTEGER NOT NULL DEFAULT 0
);
"#;

const CREATE_SHOPPING_LISTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS shopping_lists (
    id         TEXT    PRIMARY KEY,
    list_code  TEXT    UNIQUE NOT NULL,
    data       TEXT    NOT NULL,
    created    INTEGER NOT NULL,
    updated    INTEGER NOT NULL
);
"#;

const CREATE_SHOPPING_ITEMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS shopping_items (
    id        TEXT    PRIMARY KEY,
    list      TEXT    NOT NULL REFERENCES shopping_lists(id) ON DELETE CASCADE,
    name      TEXT    NOT NULL,
    checked   INTEGER NOT NULL DEFAULT 0,
    note      TEXT    NOT NULL DEFAULT '',
    category  TEXT    NOT NULL DEFAULT 'other',
    created   INTEGER NOT NULL
);
"#;

const CREATE_ADMIN_CONFIG_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS admin_config (
    key    TEXT PRIMARY KEY,
    value  TEXT NOT NULL
);
"#;

const CREATE_SHOPPING_ITEMS_LIST_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_shopping_items_list ON shopping_items(list);";

const CREATE_CATALOG_ITEMS_CATEGORY_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_catalog_items_category ON catalog_items(category);";

pub type Db = Arc<RwLock<Connection>>;

/// Opens (or creates) `shoplist.db` inside `data_dir` and applies the schema.
pub async fn init_db(data_dir: &str) -> Result<Db> {
    tokio::fs::create_dir_all(data_dir).await?;
    let path = Path::new(data_dir).join(DATABASE_FILE);
    let db = Builder::new_local(path).build().await?;
    let conn = db.connect()?;

    conn.execute("PRAGMA foreign_keys = ON", ()).await?;
    for statement in [
        CREATE_CATALOG_CATEGORIES_TABLE,
        CREATE_CATALOG_ITEMS_TABLE,
        CREATE_SHOPPING_LISTS_TABLE,
        CREATE_SHOPPING_ITEMS_TABLE,
        CREATE_ADMIN_CONFIG_TABLE,
        CREATE_SHOPPING_ITEMS_LIST_INDEX,
        CREATE_CATALOG_ITEMS_CATEGORY_INDEX,
    ] {
        conn.execute(statement, ()).await?;
    }

    conn.execute(
        "INSERT OR IGNORE INTO admin_config (key, value) VALUES (?, ?)",
        (CONFIG_KEY_PASSWORD, DEFAULT_ADMIN_PASSWORD),
    )
    .await?;

    tracing::debug!(data_dir, "database schema ready");
    Ok(Arc::new(RwLock::new(conn)))
}

pub fn now_unix() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}
