//! Checkbox-driven permission editing.
//!
//! Each toggle is one command: compute the desired flags, refuse
//! write-without-read locally, apply optimistically, await the server within
//! a timeout, then keep the server's answer or roll back. Every outcome is
//! reported on the event channel and the screen's pending mark is always
//! cleared.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use toolbox_models::{PermissionFlags, RoleId, SavePermissionDto};
use tracing::{debug, warn};

use crate::{ClientError, PermissionApi, PermissionMatrix};

/// Outcome of a toggle, for display as a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionEvent {
    /// Refused before any request was made.
    Rejected { screen_name: String, reason: String },
    /// The server accepted the change; `flags` is what it stored.
    Saved {
        screen_name: String,
        flags: PermissionFlags,
    },
    /// The request failed or timed out and the prior state was restored.
    SaveFailed {
        screen_name: String,
        restored: PermissionFlags,
        error: String,
    },
}

struct EditorState {
    matrix: PermissionMatrix,
    pending: HashSet<String>,
}

pub struct PermissionEditor<A: PermissionApi + ?Sized> {
    api: Arc<A>,
    timeout: Duration,
    state: Mutex<EditorState>,
    events: mpsc::UnboundedSender<PermissionEvent>,
}

impl<A: PermissionApi + ?Sized> PermissionEditor<A> {
    pub fn new(
        api: Arc<A>,
        matrix: PermissionMatrix,
        timeout: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<PermissionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let editor = Self {
            api,
            timeout,
            state: Mutex::new(EditorState {
                matrix,
                pending: HashSet::new(),
            }),
            events,
        };
        (editor, rx)
    }

    /// Fetches the role's matrix and builds an editor over it.
    pub async fn load(
        api: Arc<A>,
        role_id: RoleId,
        timeout: Duration,
    ) -> Result<(Self, mpsc::UnboundedReceiver<PermissionEvent>), ClientError> {
        let matrix = with_timeout(timeout, PermissionMatrix::fetch(api.as_ref(), role_id)).await?;
        Ok(Self::new(api, matrix, timeout))
    }

    /// Current flags for a screen, refetching first if the matrix is stale.
    pub async fn flags(&self, screen_name: &str) -> Result<PermissionFlags, ClientError> {
        self.ensure_fresh().await?;
        Ok(self.state.lock().await.matrix.flags(screen_name))
    }

    /// Copy of the matrix as currently held, stale or not.
    pub async fn snapshot(&self) -> PermissionMatrix {
        self.state.lock().await.matrix.clone()
    }

    pub async fn is_pending(&self, screen_name: &str) -> bool {
        self.state.lock().await.pending.contains(screen_name)
    }

    /// The read checkbox of `screen_name` was set to `checked`.
    pub async fn toggle_read(
        &self,
        screen_name: &str,
        checked: bool,
    ) -> Result<PermissionFlags, ClientError> {
        self.ensure_fresh().await?;
        let current = self.state.lock().await.matrix.flags(screen_name);
        self.change(screen_name, checked, current.can_write()).await
    }

    /// The write checkbox of `screen_name` was set to `checked`.
    pub async fn toggle_write(
        &self,
        screen_name: &str,
        checked: bool,
    ) -> Result<PermissionFlags, ClientError> {
        self.ensure_fresh().await?;
        let current = self.state.lock().await.matrix.flags(screen_name);
        self.change(screen_name, current.can_read(), checked).await
    }

    async fn ensure_fresh(&self) -> Result<(), ClientError> {
        let role_id = {
            let state = self.state.lock().await;
            if !state.matrix.is_stale() {
                return Ok(());
            }
            state.matrix.role_id()
        };

        debug!(%role_id, "Refetching stale permission matrix");
        let fresh = with_timeout(self.timeout, PermissionMatrix::fetch(self.api.as_ref(), role_id))
            .await?;

        let mut state = self.state.lock().await;
        // Keep optimistic values of in-flight saves visible.
        let mut merged = fresh;
        for screen in &state.pending {
            if let Some(flags) = state.matrix.entry(screen) {
                merged.set(screen, flags);
            }
        }
        state.matrix = merged;
        Ok(())
    }

    async fn change(
        &self,
        screen_name: &str,
        can_read: bool,
        can_write: bool,
    ) -> Result<PermissionFlags, ClientError> {
        let desired = match PermissionFlags::new(can_read, can_write) {
            Ok(flags) => flags,
            Err(e) => {
                self.emit(PermissionEvent::Rejected {
                    screen_name: screen_name.to_string(),
                    reason: e.to_string(),
                });
                return Err(e.into());
            }
        };

        let (role_id, prior) = {
            let mut state = self.state.lock().await;
            if state.pending.contains(screen_name) {
                return Err(ClientError::Busy(screen_name.to_string()));
            }
            let prior = state.matrix.entry(screen_name);
            state.matrix.set(screen_name, desired);
            state.pending.insert(screen_name.to_string());
            (state.matrix.role_id(), prior)
        };

        let request = SavePermissionDto {
            role_id,
            screen_name: screen_name.to_string(),
            can_read: desired.can_read(),
            can_write: desired.can_write(),
        };
        let result = with_timeout(self.timeout, self.api.save_permission(&request)).await;

        let mut state = self.state.lock().await;
        state.pending.remove(screen_name);
        match result {
            Ok(record) => {
                state.matrix.set(screen_name, record.flags);
                state.matrix.invalidate();
                drop(state);
                self.emit(PermissionEvent::Saved {
                    screen_name: screen_name.to_string(),
                    flags: record.flags,
                });
                Ok(record.flags)
            }
            Err(e) => {
                state.matrix.restore(screen_name, prior);
                drop(state);
                warn!(%role_id, screen = %screen_name, error = %e, "Permission save failed, rolled back");
                self.emit(PermissionEvent::SaveFailed {
                    screen_name: screen_name.to_string(),
                    restored: prior.unwrap_or(PermissionFlags::DENIED),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn emit(&self, event: PermissionEvent) {
        if self.events.send(event).is_err() {
            debug!("Permission event receiver dropped");
        }
    }
}

async fn with_timeout<T, F>(timeout: Duration, fut: F) -> Result<T, ClientError>
where
    F: std::future::Future<Output = Result<T, ClientError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(ClientError::Timeout(timeout)),
    }
}
