//! Headless page-session controller
//!
//! Every piece of UI state lives in `Session`. Components read it through a
//! signal and call its methods from event handlers; each mutator leaves the
//! derived button state consistent, so there is no separate recompute step.

pub mod enhance;
pub mod export;
pub mod grid;
pub mod init;
pub mod models;
pub mod notifications;
pub mod staging;

#[cfg(test)]
pub(crate) mod testing;

use std::path::PathBuf;
use uuid::Uuid;

use crate::api::ApiError;
use crate::types::SystemInfo;

pub use enhance::EnhancementError;
pub use export::ExportError;
pub use grid::{CardAction, CardSource, GridTab, ImageCard, ImageGrid};
pub use init::{InitEvent, InitPhase, ModelInitializer};
pub use models::{DownloadState, ModelBoard, ModelEntry};
pub use notifications::{
    DismissTimer, Notification, NotificationCenter, NotificationHandle, NotificationKind,
    ERROR_DURATION_MS, PERSISTENT,
};
pub use staging::{StagedFile, UploadTracker};

/// Lifetime of informational banners (ready, saved)
pub const INFO_DURATION_MS: i64 = 5000;
/// Lifetime of the "model downloaded" banner before the next model starts
const DOWNLOADED_DURATION_MS: i64 = 3000;

/// Enabled state of the three action buttons
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ButtonState {
    pub enhance: bool,
    pub clear: bool,
    pub download_all: bool,
}

#[derive(Debug, Default)]
pub struct Session {
    pub notifications: NotificationCenter,
    pub uploads: UploadTracker,
    pub grid: ImageGrid,
    pub models: ModelBoard,
    /// Hardware summary from the status check, shown in the header
    pub system_info: Option<SystemInfo>,
    ready: bool,
    enhancing: bool,
    exporting: bool,
    download_toast: Option<NotificationHandle>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Models are downloaded and resident in server memory
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_enhancing(&self) -> bool {
        self.enhancing
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    pub fn buttons(&self) -> ButtonState {
        ButtonState {
            enhance: self.ready && !self.uploads.is_empty() && !self.enhancing,
            clear: !self.grid.is_empty(GridTab::Original) || !self.grid.is_empty(GridTab::Enhanced),
            download_all: !self.grid.is_empty(GridTab::Enhanced) && !self.exporting,
        }
    }

    // --- Selection ---

    /// Replace the staged set and rebuild the original grid
    pub fn select(&mut self, files: Vec<StagedFile>) {
        self.uploads.select(files);
        self.grid
            .render(GridTab::Original, grid::original_cards(self.uploads.files()));
        if !self.uploads.is_empty() {
            self.grid.switch_tab(GridTab::Original.name());
        }
    }

    /// Replace the selection with what a picker or drop produced. An empty
    /// result (cancelled picker, nothing but non-images) leaves the current
    /// selection alone. Returns whether anything was staged.
    pub fn stage(&mut self, files: Vec<StagedFile>) -> bool {
        if files.is_empty() {
            tracing::debug!("Ignoring empty selection, keeping {} staged file(s)", self.uploads.len());
            return false;
        }
        self.select(files);
        true
    }

    /// Unstage one file and drop its card
    pub fn remove(&mut self, id: Uuid) -> bool {
        let removed = self.uploads.remove(id);
        if removed {
            self.grid
                .remove_card(GridTab::Original, &format!("uploaded-{}", id));
            tracing::debug!("Removed staged file {}, {} left", id, self.uploads.len());
        }
        removed
    }

    pub fn switch_tab(&mut self, name: &str) -> bool {
        self.grid.switch_tab(name)
    }

    // --- Enhancement ---

    /// Gate an enhancement request. On success the session is marked busy
    /// and the staged files to send are returned; otherwise the reason is
    /// shown as an error banner.
    pub fn begin_enhance(&mut self) -> Option<Vec<StagedFile>> {
        let refusal = if self.enhancing {
            Some(EnhancementError::InProgress)
        } else if self.uploads.is_empty() {
            Some(EnhancementError::NothingStaged)
        } else if !self.ready {
            Some(EnhancementError::NotReady)
        } else {
            None
        };

        if let Some(error) = refusal {
            tracing::warn!("Enhancement refused: {}", error);
            self.notify_error(error.to_string());
            return None;
        }

        self.enhancing = true;
        Some(self.uploads.files().to_vec())
    }

    /// Apply an enhancement response. `url_for` yields the cache-busted
    /// source of each output file.
    pub fn finish_enhance(
        &mut self,
        result: Result<Vec<String>, EnhancementError>,
        url_for: impl Fn(&str) -> String,
    ) {
        self.enhancing = false;
        match result {
            Ok(names) => {
                self.grid
                    .render(GridTab::Enhanced, grid::enhanced_cards(&names, url_for));
                self.grid.switch_tab(GridTab::Enhanced.name());
            }
            Err(e) => {
                tracing::error!("Enhancement failed: {}", e);
                self.notify_error(e.to_string());
            }
        }
    }

    // --- Export ---

    pub fn begin_export(&mut self) -> bool {
        if self.exporting {
            return false;
        }
        if self.grid.is_empty(GridTab::Enhanced) {
            self.notify_error(ExportError::NothingToExport.to_string());
            return false;
        }
        self.exporting = true;
        true
    }

    pub fn finish_export(&mut self, result: Result<PathBuf, ExportError>) {
        self.exporting = false;
        self.report_saved(result);
    }

    /// Surface the outcome of saving a file locally
    pub fn report_saved(&mut self, result: Result<PathBuf, ExportError>) {
        match result {
            Ok(path) => {
                self.notify_info(format!("Saved to {}", path.display()), INFO_DURATION_MS);
            }
            Err(e) => {
                tracing::error!("Export failed: {}", e);
                self.notify_error(e.to_string());
            }
        }
    }

    // --- Clear ---

    /// Server history was cleared; drop every local trace of it
    pub fn clear_all(&mut self) {
        self.uploads.clear();
        self.grid.clear();
        self.grid.switch_tab(GridTab::Original.name());
        tracing::info!("Cleared staged and enhanced images");
    }

    pub fn clear_failed(&mut self, error: ApiError) {
        tracing::error!("Clearing history failed: {}", error);
        self.notify_error(error.to_string());
    }

    // --- Initialization ---

    /// Reflect one initialization workflow event in the page state
    pub fn apply_init(&mut self, event: InitEvent) {
        match event {
            InitEvent::StatusChecked(status) => {
                if !status.missing_models.is_empty() {
                    self.models.open_with(&status.missing_models);
                }
                self.system_info = Some(status.system_info);
            }
            InitEvent::StatusFailed(reason) => {
                self.notifications.create(
                    NotificationKind::Error,
                    format!(
                        "Could not check model status ({}). Please refresh the page.",
                        reason
                    ),
                    PERSISTENT,
                );
            }
            InitEvent::DownloadStarted { model } => {
                self.models.accepting_retries = false;
                self.models
                    .set_state(&model, DownloadState::Downloading(0.0));
                self.show_download(
                    NotificationKind::Info,
                    format!("Downloading {}...", model),
                    PERSISTENT,
                );
            }
            InitEvent::DownloadProgress { model, percent } => {
                self.models
                    .set_state(&model, DownloadState::Downloading(percent));
                self.show_download(
                    NotificationKind::Info,
                    format!("Downloading {}... {:.0}%", model, percent),
                    PERSISTENT,
                );
            }
            InitEvent::DownloadCompleted { model } => {
                self.models.set_state(&model, DownloadState::Completed);
                self.show_download(
                    NotificationKind::Info,
                    format!("{} downloaded", model),
                    DOWNLOADED_DURATION_MS,
                );
            }
            InitEvent::DownloadFailed { model, reason } => {
                // The next model's progress must not overwrite this error
                if let Some(handle) = self.download_toast.take() {
                    self.notifications.remove(handle.id());
                }
                self.notify_error(format!("Failed to download {}: {}", model, reason));
                self.models.set_state(&model, DownloadState::Failed(reason));
            }
            InitEvent::AwaitingRetry { pending } => {
                self.models.accepting_retries = true;
                self.models.message = format!(
                    "{} model(s) failed to download. Retry them to continue: {}",
                    pending.len(),
                    pending.join(", ")
                );
            }
            InitEvent::LoadingModels => {
                self.models.message = "Loading models into memory...".to_string();
            }
            InitEvent::Ready { freshly_loaded } => {
                self.models.close();
                self.ready = true;
                if freshly_loaded {
                    self.notify_info("All models loaded. Ready to enhance!", INFO_DURATION_MS);
                }
            }
            InitEvent::LoadFailed(reason) => {
                self.models.open = true;
                self.models.fatal = true;
                self.models.message = format!(
                    "Critical error: failed to load models into memory ({}). Please refresh the page.",
                    reason
                );
                self.notifications.create(
                    NotificationKind::Error,
                    "Failed to load models. Please refresh the page.",
                    PERSISTENT,
                );
            }
        }
    }

    // --- Notifications ---

    pub fn notify_info(&mut self, message: impl Into<String>, duration_ms: i64) -> NotificationHandle {
        self.notifications
            .create(NotificationKind::Info, message, duration_ms)
    }

    pub fn notify_error(&mut self, message: impl Into<String>) -> NotificationHandle {
        self.notifications
            .create(NotificationKind::Error, message, ERROR_DURATION_MS)
    }

    /// The model download banner is a single notification rewritten in place
    fn show_download(&mut self, kind: NotificationKind, message: String, duration_ms: i64) {
        let handle = match self.download_toast {
            Some(handle) => self.notifications.update(handle, kind, message, duration_ms),
            None => self.notifications.create(kind, message, duration_ms),
        };
        self.download_toast = Some(handle);
    }
}
