// Server configuration
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: &str = "3000";
pub const DEFAULT_DATA_PATH: &str = "data";
pub const DATABASE_FILE: &str = "shoplist.db";

// Client configuration
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_STATE_DIR: &str = ".shoplist";
pub const STORAGE_KEY: &str = "shoplist-storage";
pub const DEFAULT_SYNC_DEBOUNCE_MS: u64 = 500;

// Session configuration
pub const SESSION_NAME: &str = "shoplist_admin";
pub const SESSION_EXPIRY_DAYS: i64 = 3;
pub const MIN_SESSION_SECRET_LENGTH: usize = 64;
pub const SESSION_ADMIN_KEY: &str = "is_admin";

// Admin config records
pub const CONFIG_KEY_PASSWORD: &str = "password";
pub const CONFIG_KEY_SERVER_NAME: &str = "server_name";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
pub const DEFAULT_SERVER_NAME: &str = "ShopList";

// Lists
pub const LIST_CODE_LENGTH: usize = 6;
pub const LIST_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const LIST_CODE_ATTEMPTS: usize = 8;
pub const SYNC_HISTORY_LIMIT: usize = 3;
pub const PHANTOM_INACTIVE_DAYS: i64 = 7;
pub const DEFAULT_ITEM_CATEGORY: &str = "other";

// Validation limits
pub const MAX_CATEGORY_KEY_LENGTH: usize = 50;
pub const MAX_ITEM_NAME_LENGTH: usize = 255;
pub const MAX_LIST_CODE_LENGTH: usize = 32;
pub const MAX_CONFIG_VALUE_LENGTH: usize = 255;

// Error messages
pub const ERR_DATABASE_OPERATION: &str = "Database operation failed";
pub const ERR_UNAUTHORIZED: &str = "Admin login required";
pub const ERR_INVALID_CREDENTIALS: &str = "Incorrect password";
