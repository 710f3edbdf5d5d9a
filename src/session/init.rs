//! Model initialization workflow
//!
//! Status check, sequential per-model downloads over server-push streams,
//! then a single "load into memory" call. Progress is reported through an
//! `InitEvent` callback; the per-model outcome record lives here so the
//! completion check never depends on what the UI rendered.

use std::sync::{Arc, Mutex};

use crate::api::{ApiError, EnhancerApi};
use crate::session::models::DownloadState;
use crate::types::{DownloadEvent, ModelDescriptor, StatusResponse};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InitPhase {
    Idle,
    CheckingStatus,
    Downloading,
    /// Queue finished with failures; waiting for manual retries
    AwaitingRetry,
    LoadingIntoMemory,
    Ready,
    /// Status check or load failed; a page reload is required
    Failed,
}

/// Notifications emitted while the workflow runs
#[derive(Clone, Debug, PartialEq)]
pub enum InitEvent {
    StatusChecked(StatusResponse),
    StatusFailed(String),
    DownloadStarted { model: String },
    DownloadProgress { model: String, percent: f64 },
    DownloadCompleted { model: String },
    DownloadFailed { model: String, reason: String },
    AwaitingRetry { pending: Vec<String> },
    LoadingModels,
    /// `freshly_loaded` is false when the server already had models resident
    Ready { freshly_loaded: bool },
    LoadFailed(String),
}

struct InitState {
    phase: InitPhase,
    outcomes: Vec<(ModelDescriptor, DownloadState)>,
}

/// Drives the initialization sequence against an `EnhancerApi`.
///
/// Cheap to clone; clones share the outcome record, so a retry started
/// from a UI handler sees the same state as the original run.
#[derive(Clone)]
pub struct ModelInitializer {
    api: Arc<dyn EnhancerApi>,
    state: Arc<Mutex<InitState>>,
}

impl ModelInitializer {
    pub fn new(api: Arc<dyn EnhancerApi>) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(InitState {
                phase: InitPhase::Idle,
                outcomes: Vec::new(),
            })),
        }
    }

    pub fn phase(&self) -> InitPhase {
        self.state.lock().expect("init state poisoned").phase
    }

    pub fn outcome(&self, model: &str) -> Option<DownloadState> {
        self.state
            .lock()
            .expect("init state poisoned")
            .outcomes
            .iter()
            .find(|(d, _)| d.name == model)
            .map(|(_, s)| s.clone())
    }

    /// Names of models whose final state is not `Completed`
    pub fn unfinished(&self) -> Vec<String> {
        self.state
            .lock()
            .expect("init state poisoned")
            .outcomes
            .iter()
            .filter(|(_, s)| !s.is_completed())
            .map(|(d, _)| d.name.clone())
            .collect()
    }

    /// Run the whole sequence once. Returns the phase it settled in.
    pub async fn run<F>(&self, mut emit: F) -> InitPhase
    where
        F: FnMut(InitEvent),
    {
        self.set_phase(InitPhase::CheckingStatus);
        tracing::info!("Checking model status");

        let status = match self.api.status().await {
            Ok(status) => status,
            Err(e) => {
                tracing::error!("Status check failed: {}", e);
                self.set_phase(InitPhase::Failed);
                emit(InitEvent::StatusFailed(e.to_string()));
                return InitPhase::Failed;
            }
        };

        let missing = status.missing_models.clone();
        let resident = status.system_info.models_loaded;
        tracing::info!(
            "Server reports {} missing model(s), models_loaded={}",
            missing.len(),
            resident
        );
        {
            let mut state = self.state.lock().expect("init state poisoned");
            state.outcomes = missing
                .iter()
                .map(|m| (m.clone(), DownloadState::Queued))
                .collect();
        }
        emit(InitEvent::StatusChecked(status));

        if !missing.is_empty() {
            self.set_phase(InitPhase::Downloading);
            // One subscription at a time, in list order
            for model in &missing {
                self.mark(&model.name, DownloadState::Downloading(0.0));
                self.download(model, &mut emit).await;
            }
            return self.after_queue(&mut emit).await;
        }

        if resident {
            self.set_phase(InitPhase::Ready);
            emit(InitEvent::Ready {
                freshly_loaded: false,
            });
            return InitPhase::Ready;
        }

        self.load_into_memory(&mut emit).await
    }

    /// Re-download one failed model. Only accepted once the queue has
    /// drained and no other download is running; proceeds to loading when
    /// this was the last unfinished model.
    pub async fn retry<F>(&self, model: &str, mut emit: F) -> InitPhase
    where
        F: FnMut(InitEvent),
    {
        let Some(descriptor) = self.claim_retry(model) else {
            tracing::warn!("Ignoring retry for {}: no failed download awaiting retry", model);
            return self.phase();
        };

        tracing::info!("Retrying download of {}", model);
        self.download(&descriptor, &mut emit).await;
        self.after_queue(&mut emit).await
    }

    async fn after_queue<F>(&self, emit: &mut F) -> InitPhase
    where
        F: FnMut(InitEvent),
    {
        let pending = self.unfinished();
        if pending.is_empty() {
            return self.load_into_memory(emit).await;
        }

        tracing::warn!("{} model(s) still missing: {}", pending.len(), pending.join(", "));
        self.set_phase(InitPhase::AwaitingRetry);
        emit(InitEvent::AwaitingRetry { pending });
        InitPhase::AwaitingRetry
    }

    /// Consume one model's progress stream to its end. Never fails: every
    /// problem becomes a `Failed` outcome so the queue keeps moving.
    async fn download<F>(&self, model: &ModelDescriptor, emit: &mut F) -> DownloadState
    where
        F: FnMut(InitEvent),
    {
        let name = model.name.clone();
        emit(InitEvent::DownloadStarted {
            model: name.clone(),
        });

        let outcome = match self.api.open_download(model).await {
            Ok(mut stream) => {
                let mut outcome = None;
                while let Some(next) = stream.next_event().await {
                    match next {
                        Ok(event) => {
                            if let Some(percent) = event.percent() {
                                tracing::debug!("{}: {:.1}%", name, percent);
                                self.mark(&name, DownloadState::Downloading(percent));
                                emit(InitEvent::DownloadProgress {
                                    model: name.clone(),
                                    percent,
                                });
                                continue;
                            }
                            outcome = Some(terminal_state(event));
                        }
                        Err(e) => outcome = Some(DownloadState::Failed(e.to_string())),
                    }
                    break;
                }
                stream.close();
                outcome.unwrap_or_else(|| {
                    DownloadState::Failed(
                        ApiError::Network("progress stream closed before completion".into())
                            .to_string(),
                    )
                })
            }
            Err(e) => DownloadState::Failed(e.to_string()),
        };

        self.mark(&name, outcome.clone());
        match &outcome {
            DownloadState::Failed(reason) => {
                tracing::warn!("Download of {} failed: {}", name, reason);
                emit(InitEvent::DownloadFailed {
                    model: name,
                    reason: reason.clone(),
                });
            }
            _ => {
                tracing::info!("Download of {} complete", name);
                emit(InitEvent::DownloadCompleted { model: name });
            }
        }
        outcome
    }

    async fn load_into_memory<F>(&self, emit: &mut F) -> InitPhase
    where
        F: FnMut(InitEvent),
    {
        if !self.begin_loading() {
            return self.phase();
        }
        tracing::info!("Loading models into memory");
        emit(InitEvent::LoadingModels);

        match self.api.load_models().await {
            Ok(()) => {
                tracing::info!("Models loaded, application ready");
                self.set_phase(InitPhase::Ready);
                emit(InitEvent::Ready {
                    freshly_loaded: true,
                });
                InitPhase::Ready
            }
            Err(e) => {
                tracing::error!("Loading models into memory failed: {}", e);
                self.set_phase(InitPhase::Failed);
                emit(InitEvent::LoadFailed(e.to_string()));
                InitPhase::Failed
            }
        }
    }

    fn begin_loading(&self) -> bool {
        let mut state = self.state.lock().expect("init state poisoned");
        if matches!(
            state.phase,
            InitPhase::LoadingIntoMemory | InitPhase::Ready | InitPhase::Failed
        ) {
            return false;
        }
        state.phase = InitPhase::LoadingIntoMemory;
        true
    }

    /// At most one subscription is open at a time: a retry claims the
    /// `Downloading` phase and is refused while anything else holds it.
    fn claim_retry(&self, model: &str) -> Option<ModelDescriptor> {
        let mut state = self.state.lock().expect("init state poisoned");
        if state.phase != InitPhase::AwaitingRetry {
            return None;
        }
        let (descriptor, outcome) = state
            .outcomes
            .iter_mut()
            .find(|(d, s)| d.name == model && s.is_failed())?;
        *outcome = DownloadState::Downloading(0.0);
        let descriptor = descriptor.clone();
        state.phase = InitPhase::Downloading;
        Some(descriptor)
    }

    fn mark(&self, model: &str, outcome: DownloadState) {
        let mut state = self.state.lock().expect("init state poisoned");
        if let Some((_, slot)) = state.outcomes.iter_mut().find(|(d, _)| d.name == model) {
            *slot = outcome;
        }
    }

    fn set_phase(&self, phase: InitPhase) {
        self.state.lock().expect("init state poisoned").phase = phase;
    }
}

fn terminal_state(event: DownloadEvent) -> DownloadState {
    match event {
        DownloadEvent::Completed { .. } => DownloadState::Completed,
        DownloadEvent::Error { error_message, .. } => DownloadState::Failed(
            ApiError::Server(error_message.unwrap_or_else(|| "download failed".to_string()))
                .to_string(),
        ),
        DownloadEvent::Downloading { .. } => DownloadState::Downloading(0.0),
    }
}
