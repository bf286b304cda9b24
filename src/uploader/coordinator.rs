use std::collections::HashMap;
use tokio::task::{AbortHandle, JoinSet};

use crate::errors::{AppError, AppResult};
use crate::history::{HistoryState, HistoryStore, UploadRecord};

use super::imgur_client::ImgurClient;

pub type UploadId = u64;

/// Display surface for the upload history. Called only after the history
/// has been persisted.
pub trait HistoryView {
    fn render(&mut self, uploads: &[UploadRecord]);
}

#[derive(Debug)]
pub enum UploadEvent {
    /// The upload succeeded and its record is persisted.
    Uploaded { id: UploadId, record: UploadRecord },
    /// The upload or the history write failed.
    Failed { id: UploadId, error: AppError },
    /// The task was cancelled or panicked before reporting back.
    Aborted { id: UploadId },
}

/// Owns the history and every in-flight upload.
///
/// Uploads run on tokio tasks and only hand back a link; the history is
/// mutated here, one completion at a time. Dropping the coordinator aborts
/// whatever is still uploading.
pub struct UploadCoordinator<V: HistoryView> {
    client: ImgurClient,
    store: HistoryStore,
    state: HistoryState,
    view: V,
    in_flight: JoinSet<AppResult<String>>,
    tasks: HashMap<tokio::task::Id, UploadId>,
    handles: HashMap<UploadId, AbortHandle>,
    next_id: UploadId,
}

impl<V: HistoryView> UploadCoordinator<V> {
    /// Load the history from `store` and show it.
    pub fn new(client: ImgurClient, store: HistoryStore, mut view: V) -> Self {
        let state = store.load();
        view.render(&state.uploads);

        Self {
            client,
            store,
            state,
            view,
            in_flight: JoinSet::new(),
            tasks: HashMap::new(),
            handles: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn history(&self) -> &HistoryState {
        &self.state
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Start uploading encoded image bytes. Concurrent uploads of the same
    /// image are not deduplicated.
    pub fn start_upload(&mut self, image: Vec<u8>) -> UploadId {
        let client = self.client.clone();
        let handle = self
            .in_flight
            .spawn(async move { client.upload(&image).await });
        self.track(handle)
    }

    /// Start converting and uploading an image file.
    pub fn start_file_upload(&mut self, file_path: String, quality: u8) -> UploadId {
        let client = self.client.clone();
        let handle = self
            .in_flight
            .spawn(async move { client.upload_file(&file_path, quality).await });
        self.track(handle)
    }

    /// Cancel one in-flight upload. Its completion is reported as `Aborted`.
    pub fn cancel(&mut self, id: UploadId) -> bool {
        match self.handles.get(&id) {
            Some(handle) => {
                log::info!("Cancelling upload {}", id);
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Wait for the next upload to finish and apply it to the history.
    /// Returns `None` when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<UploadEvent> {
        let joined = self.in_flight.join_next_with_id().await?;

        let (id, result) = match joined {
            Ok((task_id, result)) => (self.untrack(task_id), result),
            Err(e) => {
                let id = self.untrack(e.id());
                if e.is_cancelled() {
                    log::info!("Upload {} cancelled", id);
                } else {
                    log::error!("Upload {} panicked: {}", id, e);
                }
                return Some(UploadEvent::Aborted { id });
            }
        };

        let event = match result {
            Ok(url) => match self.store.record_upload(&self.state, &url) {
                Ok(next) => {
                    self.state = next;
                    self.view.render(&self.state.uploads);
                    let record = self.state.uploads[0].clone();
                    UploadEvent::Uploaded { id, record }
                }
                Err(error) => {
                    log::error!("Upload {} reached {} but was not recorded: {}", id, url, error);
                    UploadEvent::Failed { id, error }
                }
            },
            Err(error) => {
                log::warn!("Upload {} failed: {}", id, error);
                UploadEvent::Failed { id, error }
            }
        };

        Some(event)
    }

    /// Remove the record(s) keyed by `key`, persist, and re-render.
    pub fn remove(&mut self, key: i64) -> AppResult<()> {
        self.state = self.store.remove(&self.state, key)?;
        self.view.render(&self.state.uploads);
        Ok(())
    }

    /// Abort every in-flight upload and wait for the tasks to wind down.
    pub async fn shutdown(&mut self) {
        let pending = self.in_flight.len();
        if pending > 0 {
            log::info!("Aborting {} in-flight upload(s)", pending);
        }

        self.in_flight.abort_all();
        while self.in_flight.join_next().await.is_some() {}
        self.tasks.clear();
        self.handles.clear();
    }

    fn track(&mut self, handle: AbortHandle) -> UploadId {
        let id = self.next_id;
        self.next_id += 1;

        self.tasks.insert(handle.id(), id);
        self.handles.insert(id, handle);

        log::info!("Started upload {} ({} in flight)", id, self.in_flight.len());
        id
    }

    fn untrack(&mut self, task_id: tokio::task::Id) -> UploadId {
        // Every task in the set is tracked at spawn time.
        let id = self.tasks.remove(&task_id).unwrap_or(UploadId::MAX);
        self.handles.remove(&id);
        id
    }
}
