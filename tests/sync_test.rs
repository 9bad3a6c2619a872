use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

use shoplist_server::backend::{BackendError, ListBackend, LocalBackend};
use shoplist_server::models::{
    AtomicItem, ListData, ListItemPayload, ShopItem, ShoppingListDocument,
};
use shoplist_server::store::{MsgType, ShopState};
use shoplist_server::sync::{
    SharedState, SyncFlusher, create_remote_list, disconnect, join_remote_list,
};

mod common;
use common::*;

const TEST_DEBOUNCE: Duration = Duration::from_millis(50);
const SETTLE: Duration = Duration::from_millis(400);

/// Counts document writes and can be told to fail them.
struct RecordingBackend {
    inner: LocalBackend,
    updates: AtomicUsize,
    fail_updates: bool,
}

impl RecordingBackend {
    fn new(inner: LocalBackend, fail_updates: bool) -> Self {
        RecordingBackend {
            inner,
            updates: AtomicUsize::new(0),
            fail_updates,
        }
    }

    fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ListBackend for RecordingBackend {
    async fn list_by_code(
        &self,
        code: &str,
    ) -> Result<Option<ShoppingListDocument>, BackendError> {
        self.inner.list_by_code(code).await
    }

    async fn get_list(&self, id: &str) -> Result<ShoppingListDocument, BackendError> {
        self.inner.get_list(id).await
    }

    async fn create_list(
        &self,
        code: &str,
        data: &ListData,
    ) -> Result<ShoppingListDocument, BackendError> {
        self.inner.create_list(code, data).await
    }

    async fn update_list(
        &self,
        id: &str,
        data: &ListData,
    ) -> Result<ShoppingListDocument, BackendError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates {
            return Err(BackendError::Status {
                status: 503,
                message: "offline".to_string(),
            });
        }
        self.inner.update_list(id, data).await
    }

    async fn delete_list(&self, id: &str) -> Result<(), BackendError> {
        self.inner.delete_list(id).await
    }

    async fn atomic_items(&self, list_id: &str) -> Result<Vec<AtomicItem>, BackendError> {
        self.inner.atomic_items(list_id).await
    }

    async fn create_atomic_item(
        &self,
        list_id: &str,
        item: &ListItemPayload,
    ) -> Result<AtomicItem, BackendError> {
        self.inner.create_atomic_item(list_id, item).await
    }

    async fn delete_atomic_item(&self, id: &str) -> Result<(), BackendError> {
        self.inner.delete_atomic_item(id).await
    }
}

fn shared_state() -> SharedState {
    Arc::new(Mutex::new(ShopState::new()))
}

#[tokio::test]
async fn burst_of_changes_is_pushed_once() {
    let (local, _temp_dir) = setup_backend().await;
    let backend = Arc::new(RecordingBackend::new(local, false));
    let state = shared_state();

    let doc = create_remote_list(&state, backend.as_ref()).await.unwrap();
    let flusher = SyncFlusher::spawn(state.clone(), backend.clone(), TEST_DEBOUNCE);

    for name in ["Milk", "Bread", "Eggs", "Rice", "Salt"] {
        flusher
            .update(|s| {
                s.add_item(name, None);
            })
            .await;
    }
    tokio::time::sleep(SETTLE).await;

    assert_eq!(backend.update_count(), 1);
    let remote = backend.get_list(&doc.id).await.unwrap();
    let names: Vec<&str> = remote.data.items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Salt", "Rice", "Eggs", "Bread", "Milk"]);
    assert!(state.lock().await.sync.last_sync.is_some());

    flusher.shutdown().await;
}

#[tokio::test]
async fn unchanged_state_is_not_pushed_again() {
    let (local, _temp_dir) = setup_backend().await;
    let backend = Arc::new(RecordingBackend::new(local, false));
    let state = shared_state();
    create_remote_list(&state, backend.as_ref()).await.unwrap();

    let flusher = SyncFlusher::spawn(state.clone(), backend.clone(), TEST_DEBOUNCE);
    flusher
        .update(|s| {
            s.add_item("Milk", None);
        })
        .await;
    flusher.flush().await;
    assert_eq!(backend.update_count(), 1);

    flusher.notify();
    flusher.flush().await;
    assert_eq!(backend.update_count(), 1);

    flusher.shutdown().await;
}

#[tokio::test]
async fn disconnected_state_never_pushes() {
    let (local, _temp_dir) = setup_backend().await;
    let backend = Arc::new(RecordingBackend::new(local, false));
    let state = shared_state();

    let flusher = SyncFlusher::spawn(state.clone(), backend.clone(), TEST_DEBOUNCE);
    flusher
        .update(|s| {
            s.add_item("Milk", None);
        })
        .await;
    flusher.flush().await;

    assert_eq!(backend.update_count(), 0);
    flusher.shutdown().await;
}

#[tokio::test]
async fn failed_push_is_dropped_and_local_state_kept() {
    let (local, _temp_dir) = setup_backend().await;
    let backend = Arc::new(RecordingBackend::new(local, true));
    let state = shared_state();
    create_remote_list(&state, backend.as_ref()).await.unwrap();
    let connected_at = state.lock().await.sync.last_sync;

    let flusher = SyncFlusher::spawn(state.clone(), backend.clone(), TEST_DEBOUNCE);
    flusher
        .update(|s| {
            s.add_item("Milk", None);
        })
        .await;
    tokio::time::sleep(SETTLE).await;
    assert_eq!(backend.update_count(), 1);

    flusher
        .update(|s| {
            s.add_item("Bread", None);
        })
        .await;
    flusher.flush().await;
    assert_eq!(backend.update_count(), 2);

    let state = state.lock().await;
    assert_eq!(state.items.len(), 2);
    assert!(state.sync.connected);
    assert_eq!(state.sync.last_sync, connected_at);
    drop(state);

    flusher.shutdown().await;
}

#[tokio::test]
async fn shutdown_flushes_pending_changes() {
    let (local, _temp_dir) = setup_backend().await;
    let backend = Arc::new(RecordingBackend::new(local, false));
    let state = shared_state();
    let doc = create_remote_list(&state, backend.as_ref()).await.unwrap();

    let flusher = SyncFlusher::spawn(state.clone(), backend.clone(), Duration::from_secs(60));
    flusher
        .update(|s| {
            s.add_item("Milk", None);
        })
        .await;
    flusher.shutdown().await;

    assert_eq!(backend.update_count(), 1);
    let remote = backend.get_list(&doc.id).await.unwrap();
    assert_eq!(remote.data.items.len(), 1);
}

#[tokio::test]
async fn create_connects_and_records_history() {
    let (backend, _temp_dir) = setup_backend().await;
    let state = shared_state();
    state.lock().await.add_item("Milk", None);

    let doc = create_remote_list(&state, &backend).await.unwrap();

    assert_eq!(doc.list_code.len(), 6);
    assert_eq!(doc.data.items.len(), 1);
    let state = state.lock().await;
    assert!(state.sync.connected);
    assert_eq!(state.sync.code.as_deref(), Some(doc.list_code.as_str()));
    assert_eq!(state.sync.record_id.as_deref(), Some(doc.id.as_str()));
    assert_eq!(state.sync.sync_history, vec![doc.list_code.clone()]);
    assert_eq!(state.sync.msg_type, MsgType::Success);
}

#[tokio::test]
async fn join_replaces_working_copy() {
    let (backend, _temp_dir) = setup_backend().await;
    let remote = create_test_list(
        backend.db(),
        "ABC123",
        ListData {
            items: vec![ShopItem {
                id: 42,
                name: "Coffee".to_string(),
                checked: true,
                note: String::new(),
                category: "drinks".to_string(),
            }],
            categories: Some(categories(vec![("drinks", category_entry("🥤", &[]))])),
            list_name: None,
        },
    )
    .await;

    let state = shared_state();
    state.lock().await.add_item("Local only", None);

    let doc = join_remote_list(&state, &backend, "  ABC123 ").await.unwrap();
    assert_eq!(doc.id, remote.id);

    let state = state.lock().await;
    assert_eq!(state.items, remote.data.items);
    assert_eq!(state.categories.len(), 1);
    assert!(state.sync.connected);
    assert_eq!(state.sync.sync_version, 1);
    assert_eq!(state.sync.sync_history, vec!["ABC123"]);
}

#[tokio::test]
async fn join_unknown_code_reports_error() {
    let (backend, _temp_dir) = setup_backend().await;
    let state = shared_state();

    let result = join_remote_list(&state, &backend, "NOPE00").await;

    assert!(matches!(result, Err(BackendError::NotFound { .. })));
    let state = state.lock().await;
    assert!(!state.sync.connected);
    assert_eq!(state.sync.msg_type, MsgType::Error);
    assert!(state.sync.msg.contains("NOPE00"));
}

#[tokio::test]
async fn disconnect_clears_connection_but_keeps_history() {
    let (backend, _temp_dir) = setup_backend().await;
    let state = shared_state();
    create_remote_list(&state, &backend).await.unwrap();

    disconnect(&state).await;

    let state = state.lock().await;
    assert!(!state.sync.connected);
    assert!(state.sync.code.is_none());
    assert!(state.sync.record_id.is_none());
    assert_eq!(state.sync.sync_history.len(), 1);
}
