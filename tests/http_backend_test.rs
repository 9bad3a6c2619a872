use reqwest::{StatusCode, header};
use serde_json::json;
use tempfile::TempDir;

use shoplist_server::admin::ListsResponse;
use shoplist_server::backend::{BackendError, CatalogSource, ListBackend};
use shoplist_server::constants::CONFIG_KEY_SERVER_NAME;
use shoplist_server::http_backend::HttpBackend;
use shoplist_server::import::{ImportError, ImportOutcome, ImportSession, ImportStrategy};
use shoplist_server::models::{ListData, ServerName};
use shoplist_server::router::build_router;
use shoplist_server::settings::set_config_value;
use shoplist_server::store::ShopState;

mod common;
use common::*;

struct TestServer {
    base_url: String,
    db: shoplist_server::database::Db,
    _temp_dir: TempDir,
}

async fn spawn_server() -> TestServer {
    let (db, temp_dir) = setup_test_environment().await;
    let secret = "s".repeat(64);
    let app = build_router(db.clone(), &secret).expect("Failed to build router");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server failed");
    });

    TestServer {
        base_url: format!("http://{}", addr),
        db,
        _temp_dir: temp_dir,
    }
}

async fn admin_cookie(client: &reqwest::Client, base_url: &str) -> String {
    let response = client
        .post(format!("{}/admin/login", base_url))
        .json(&json!({ "password": "admin123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .expect("Login did not set a session cookie")
        .to_string()
}

#[tokio::test]
async fn list_lifecycle_over_http() {
    let server = spawn_server().await;
    let backend = HttpBackend::new(&server.base_url);

    assert!(backend.list_by_code("ABC123").await.unwrap().is_none());

    let created = backend
        .create_list("ABC123", &ListData::default())
        .await
        .unwrap();
    let found = backend.list_by_code("ABC123").await.unwrap().unwrap();
    assert_eq!(found.id, created.id);

    let duplicate = backend.create_list("ABC123", &ListData::default()).await;
    assert!(matches!(duplicate, Err(BackendError::Conflict(_))));

    let mut state = ShopState::new();
    state.add_item("Milk", None);
    let updated = backend
        .update_list(&created.id, &state.list_data())
        .await
        .unwrap();
    assert_eq!(updated.data.items.len(), 1);

    let item = backend
        .create_atomic_item(&created.id, &item_payload("Milk", "dairy"))
        .await
        .unwrap();
    assert_eq!(backend.atomic_items(&created.id).await.unwrap().len(), 1);
    backend.delete_atomic_item(&item.id).await.unwrap();
    assert!(backend.atomic_items(&created.id).await.unwrap().is_empty());

    backend.delete_list(&created.id).await.unwrap();
    assert!(matches!(
        backend.get_list(&created.id).await,
        Err(BackendError::NotFound { .. })
    ));
}

#[tokio::test]
async fn codes_with_url_characters_are_rejected() {
    let server = spawn_server().await;
    let remote = HttpBackend::new(&server.base_url);
    let (local, _local_dir) = setup_backend().await;

    for code in ["AB?CD", "AB#ZZ", "AB/CD", "AB%20", "AB CD"] {
        assert!(
            matches!(
                remote.create_list(code, &ListData::default()).await,
                Err(BackendError::Validation(_))
            ),
            "remote accepted {:?}",
            code
        );
        assert!(
            matches!(
                local.create_list(code, &ListData::default()).await,
                Err(BackendError::Validation(_))
            ),
            "local accepted {:?}",
            code
        );
        assert!(remote.list_by_code(code).await.unwrap().is_none());
    }
}

#[tokio::test]
async fn import_code_is_matched_exactly_over_http() {
    let server = spawn_server().await;
    let backend = HttpBackend::new(&server.base_url);
    let existing = backend
        .create_list(
            "AB",
            &ListData {
                list_name: Some("Home".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let file = json!({
        "code": "AB#ZZ",
        "listName": "Imported",
        "items": [{ "name": "Milk", "checked": false, "category": "dairy", "note": "" }]
    });
    let mut import = ImportSession::new();
    import.select_value(file).unwrap();

    assert!(import.check_conflict(&backend).await.unwrap().is_none());
    assert_eq!(import.offered_strategies(), vec![ImportStrategy::NewCode]);
    assert!(matches!(
        import.choose(ImportStrategy::Overwrite),
        Err(ImportError::StrategyUnavailable(ImportStrategy::Overwrite))
    ));

    let unchanged = backend.list_by_code("AB").await.unwrap().unwrap();
    assert_eq!(unchanged, existing);
    assert_eq!(unchanged.data.list_name.as_deref(), Some("Home"));
    assert!(backend.atomic_items(&existing.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn catalog_and_server_name_over_http() {
    let server = spawn_server().await;
    let backend = HttpBackend::new(&server.base_url);

    assert_eq!(
        backend.server_name().await.unwrap().as_deref(),
        Some("ShopList")
    );
    set_config_value(&server.db, CONFIG_KEY_SERVER_NAME, "Casa")
        .await
        .unwrap();

    let bakery = create_test_category(&server.db, "bakery", 0, false)
        .await
        .unwrap();
    create_test_item(&server.db, &bakery.id, "Pan", "Bread", false)
        .await
        .unwrap();
    create_test_item(&server.db, &bakery.id, "Tarta", "Cake", true)
        .await
        .unwrap();

    assert_eq!(backend.catalog_items(true).await.unwrap().len(), 1);
    assert_eq!(backend.catalog_items(false).await.unwrap().len(), 2);

    let mut state = ShopState::new();
    state.load_catalog(&backend).await;
    assert_eq!(state.server_name, "Casa");
    assert_eq!(state.categories.len(), 1);
    assert_eq!(state.categories["bakery"].items.len(), 1);
}

#[tokio::test]
async fn admin_routes_require_login() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/admin/lists", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .post(format!("{}/admin/login", server.base_url))
        .json(&json!({ "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_console_over_http() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();
    let cookie = admin_cookie(&client, &server.base_url).await;

    create_test_list(&server.db, "ABC123", ListData::default()).await;

    let lists: ListsResponse = client
        .get(format!("{}/admin/lists", server.base_url))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(lists.total, 1);
    assert_eq!(lists.phantom_count, 1);

    let file = json!({
        "code": "ABC123",
        "listName": "Imported",
        "items": [{ "name": "Milk", "checked": false, "category": "dairy", "note": "" }]
    });
    let check: serde_json::Value = client
        .post(format!("{}/admin/import/check", server.base_url))
        .header(header::COOKIE, &cookie)
        .json(&file)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(check["conflict"]["list_code"], "ABC123");
    assert_eq!(check["strategies"], json!(["new_code", "overwrite", "merge"]));

    let response = client
        .post(format!("{}/admin/import", server.base_url))
        .header(header::COOKIE, &cookie)
        .json(&json!({ "file": file, "strategy": "overwrite" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let outcome: ImportOutcome = response.json().await.unwrap();
    assert_eq!(outcome.list_code, "ABC123");
    assert_eq!(outcome.items_created, 1);

    let response = client
        .get(format!(
            "{}/admin/lists/{}/export",
            server.base_url, outcome.list_id
        ))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.contains("ShopList_ABC123_"));

    let renamed: ServerName = client
        .put(format!("{}/admin/config/server-name", server.base_url))
        .header(header::COOKIE, &cookie)
        .json(&json!({ "name": "  Family  " }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(renamed.name, "Family");

    let response = client
        .post(format!("{}/admin/logout", server.base_url))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
