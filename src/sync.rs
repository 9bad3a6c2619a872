//! Pushing the client working copy to its remote list document.
//!
//! The store never syncs by itself. The shell owns a [`SyncFlusher`] and
//! calls [`SyncFlusher::notify`] (or [`SyncFlusher::update`]) after each batch
//! of mutations; bursts are coalesced into a single write once the debounce
//! delay passes without further changes. Remote writes are last-write-wins.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::backend::{BackendError, ListBackend};
use crate::codes::unique_list_code;
use crate::database::now_unix;
use crate::models::ShoppingListDocument;
use crate::store::{MsgType, ShopState, SyncPatch};

pub type SharedState = Arc<Mutex<ShopState>>;

enum Signal {
    Changed,
    Flush(oneshot::Sender<()>),
    Shutdown,
}

pub struct SyncFlusher {
    tx: mpsc::UnboundedSender<Signal>,
    handle: JoinHandle<()>,
    state: SharedState,
}

impl SyncFlusher {
    pub fn spawn(state: SharedState, backend: Arc<dyn ListBackend>, delay: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(state.clone(), backend, delay, rx));
        SyncFlusher { tx, handle, state }
    }

    /// (Re)starts the debounce timer.
    pub fn notify(&self) {
        if self.tx.send(Signal::Changed).is_err() {
            tracing::warn!("sync task is gone, change not scheduled");
        }
    }

    /// Applies `f` to the state and schedules a push.
    pub async fn update<R>(&self, f: impl FnOnce(&mut ShopState) -> R) -> R {
        let result = {
            let mut state = self.state.lock().await;
            f(&mut state)
        };
        self.notify();
        result
    }

    /// Pushes immediately, bypassing the debounce, and waits for it.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Signal::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }

    /// Flushes pending changes and stops the task.
    pub async fn shutdown(self) {
        let _ = self.tx.send(Signal::Shutdown);
        if let Err(e) = self.handle.await {
            tracing::error!(error = %e, "sync task panicked");
        }
    }
}

async fn run(
    state: SharedState,
    backend: Arc<dyn ListBackend>,
    delay: Duration,
    mut rx: mpsc::UnboundedReceiver<Signal>,
) {
    let mut pending = false;
    let mut last_pushed: Option<u64> = None;

    loop {
        let signal = if pending {
            tokio::select! {
                signal = rx.recv() => signal,
                _ = tokio::time::sleep(delay) => {
                    push_logged(&state, backend.as_ref(), &mut last_pushed).await;
                    pending = false;
                    continue;
                }
            }
        } else {
            rx.recv().await
        };

        match signal {
            Some(Signal::Changed) => pending = true,
            Some(Signal::Flush(ack)) => {
                push_logged(&state, backend.as_ref(), &mut last_pushed).await;
                pending = false;
                let _ = ack.send(());
            }
            Some(Signal::Shutdown) | None => {
                if pending {
                    push_logged(&state, backend.as_ref(), &mut last_pushed).await;
                }
                break;
            }
        }
    }
    tracing::debug!("sync task stopped");
}

async fn push_logged(state: &SharedState, backend: &dyn ListBackend, last_pushed: &mut Option<u64>) {
    match push_snapshot(state, backend, *last_pushed).await {
        Ok(Some(revision)) => *last_pushed = Some(revision),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "sync push failed, dropping it"),
    }
}

/// Writes `{items, categories}` to the connected list document.
///
/// Returns the pushed revision, or `None` when not connected or nothing
/// changed since `last_pushed`.
pub async fn push_snapshot(
    state: &SharedState,
    backend: &dyn ListBackend,
    last_pushed: Option<u64>,
) -> Result<Option<u64>, BackendError> {
    let (record_id, data, revision) = {
        let state = state.lock().await;
        let Some(record_id) = state.sync.record_id.clone().filter(|_| state.sync.connected) else {
            return Ok(None);
        };
        if last_pushed == Some(state.revision()) {
            return Ok(None);
        }
        (record_id, state.list_data(), state.revision())
    };

    backend.update_list(&record_id, &data).await?;
    tracing::debug!(record_id = %record_id, revision, "pushed list snapshot");

    let mut state = state.lock().await;
    state.set_sync_state(SyncPatch {
        last_sync: Some(Some(now_unix())),
        ..Default::default()
    });
    Ok(Some(revision))
}

fn mark_connected(state: &mut ShopState, doc: &ShoppingListDocument, msg: &str) {
    state.set_sync_state(SyncPatch {
        connected: Some(true),
        code: Some(Some(doc.list_code.clone())),
        record_id: Some(Some(doc.id.clone())),
        msg: Some(msg.to_string()),
        msg_type: Some(MsgType::Success),
        last_sync: Some(Some(now_unix())),
    });
    state.add_to_sync_history(&doc.list_code);
}

/// Publishes the working copy as a brand-new list under a fresh code.
pub async fn create_remote_list(
    state: &SharedState,
    backend: &dyn ListBackend,
) -> Result<ShoppingListDocument, BackendError> {
    let code = unique_list_code(backend, None).await?;
    let data = state.lock().await.list_data();

    let doc = match backend.create_list(&code, &data).await {
        Ok(doc) => doc,
        Err(e) => {
            tracing::error!(error = %e, "failed to create remote list");
            state.lock().await.set_sync_state(SyncPatch {
                msg: Some(e.to_string()),
                msg_type: Some(MsgType::Error),
                ..Default::default()
            });
            return Err(e);
        }
    };

    mark_connected(&mut *state.lock().await, &doc, "List created");
    tracing::info!(list_code = %doc.list_code, "connected to new list");
    Ok(doc)
}

/// Replaces the working copy with the remote list `code` and connects to it.
pub async fn join_remote_list(
    state: &SharedState,
    backend: &dyn ListBackend,
    code: &str,
) -> Result<ShoppingListDocument, BackendError> {
    let code = code.trim();
    let found = backend.list_by_code(code).await;

    let mut state = state.lock().await;
    let doc = match found {
        Ok(Some(doc)) => doc,
        Ok(None) => {
            state.set_sync_state(SyncPatch {
                msg: Some(format!("List {} not found", code)),
                msg_type: Some(MsgType::Error),
                ..Default::default()
            });
            return Err(BackendError::not_found("List", code));
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to fetch remote list");
            state.set_sync_state(SyncPatch {
                msg: Some(e.to_string()),
                msg_type: Some(MsgType::Error),
                ..Default::default()
            });
            return Err(e);
        }
    };

    state.sync_from_remote(&doc.data);
    mark_connected(&mut state, &doc, "Connected");
    tracing::info!(list_code = %doc.list_code, "joined remote list");
    Ok(doc)
}

pub async fn disconnect(state: &SharedState) {
    state.lock().await.set_sync_state(SyncPatch {
        connected: Some(false),
        code: Some(None),
        record_id: Some(None),
        msg: Some(String::new()),
        msg_type: Some(MsgType::Info),
        ..Default::default()
    });
}
