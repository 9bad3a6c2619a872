pub mod admin;
pub mod auth;
pub mod backend;
pub mod catalog;
pub mod codes;
pub mod config;
pub mod constants;
pub mod database;
pub mod defaults;
pub mod http_backend;
pub mod import;
pub mod lists;
pub mod models;
pub mod router;
pub mod settings;
pub mod store;
pub mod sync;
pub mod utils;
