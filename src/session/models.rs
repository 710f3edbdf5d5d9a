//! Model download board
//!
//! What the initialization modal shows: one row per missing model.

use crate::types::ModelDescriptor;

/// Per-model download state, local to this session
#[derive(Clone, Debug, PartialEq)]
pub enum DownloadState {
    Queued,
    /// Percentage, 0-100
    Downloading(f64),
    Completed,
    /// Reason reported by the server or transport
    Failed(String),
}

impl DownloadState {
    pub fn is_completed(&self) -> bool {
        matches!(self, DownloadState::Completed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DownloadState::Failed(_))
    }

    /// Width of the progress bar, in percent
    pub fn progress(&self) -> f64 {
        match self {
            DownloadState::Queued | DownloadState::Failed(_) => 0.0,
            DownloadState::Downloading(percent) => *percent,
            DownloadState::Completed => 100.0,
        }
    }

    pub fn label(&self) -> String {
        match self {
            DownloadState::Queued => "Queued".to_string(),
            DownloadState::Downloading(percent) => format!("{:.0}%", percent),
            DownloadState::Completed => "Done".to_string(),
            DownloadState::Failed(_) => "Failed".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModelEntry {
    pub descriptor: ModelDescriptor,
    pub state: DownloadState,
}

/// Modal contents for the initialization sequence
#[derive(Debug)]
pub struct ModelBoard {
    pub open: bool,
    pub message: String,
    /// Set once loading into memory failed; the session cannot recover
    pub fatal: bool,
    /// Retry controls are live only after the queue drained and no
    /// download is running
    pub accepting_retries: bool,
    entries: Vec<ModelEntry>,
}

impl Default for ModelBoard {
    fn default() -> Self {
        Self {
            open: false,
            message: String::new(),
            fatal: false,
            accepting_retries: false,
            entries: Vec::new(),
        }
    }
}

impl ModelBoard {
    /// Open the modal with every model queued
    pub fn open_with(&mut self, models: &[ModelDescriptor]) {
        self.entries = models
            .iter()
            .map(|m| ModelEntry {
                descriptor: m.clone(),
                state: DownloadState::Queued,
            })
            .collect();
        self.open = true;
        self.fatal = false;
        self.accepting_retries = false;
        self.message = format!(
            "{} model(s) need to be downloaded before images can be enhanced.",
            models.len()
        );
    }

    pub fn set_state(&mut self, name: &str, state: DownloadState) -> bool {
        match self.entries.iter_mut().find(|e| e.descriptor.name == name) {
            Some(entry) => {
                entry.state = state;
                true
            }
            None => false,
        }
    }

    pub fn state_of(&self, name: &str) -> Option<&DownloadState> {
        self.entries
            .iter()
            .find(|e| e.descriptor.name == name)
            .map(|e| &e.state)
    }

    pub fn entries(&self) -> &[ModelEntry] {
        &self.entries
    }

    /// Models whose retry control should be shown
    pub fn failed(&self) -> Vec<&ModelEntry> {
        self.entries.iter().filter(|e| e.state.is_failed()).collect()
    }

    pub fn all_completed(&self) -> bool {
        self.entries.iter().all(|e| e.state.is_completed())
    }

    pub fn close(&mut self) {
        self.open = false;
        self.accepting_retries = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_queues_everything() {
        let mut board = ModelBoard::default();
        board.open_with(&[
            ModelDescriptor::new("GFPGAN", "GFPGANv1.4.pth", "u1"),
            ModelDescriptor::new("RealESRGAN", "RealESRGAN_x4plus.pth", "u2"),
        ]);
        assert!(board.open);
        assert_eq!(board.entries().len(), 2);
        assert!(board
            .entries()
            .iter()
            .all(|e| e.state == DownloadState::Queued));
        assert!(!board.all_completed());
    }

    #[test]
    fn test_state_transitions() {
        let mut board = ModelBoard::default();
        board.open_with(&[ModelDescriptor::new("GFPGAN", "g.pth", "u")]);

        assert!(board.set_state("GFPGAN", DownloadState::Downloading(55.0)));
        assert_eq!(board.state_of("GFPGAN").unwrap().label(), "55%");

        board.set_state("GFPGAN", DownloadState::Failed("timeout".into()));
        assert_eq!(board.failed().len(), 1);

        board.set_state("GFPGAN", DownloadState::Completed);
        assert!(board.failed().is_empty());
        assert!(board.all_completed());
        assert!(!board.set_state("Unknown", DownloadState::Completed));
    }
}
