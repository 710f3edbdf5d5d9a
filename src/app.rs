//! Root Dioxus application component
//!
//! This module contains the App component, the shared `AppState`, and the
//! async actions UI handlers spawn against the enhancement server.

use crate::api::{EnhancerApi, HttpApi};
use crate::session::{enhance, export, ModelInitializer, Session};
use crate::storage::settings::{load_settings, save_settings, ClientSettings};
use crate::ui::Layout;
use dioxus::prelude::*;
use std::sync::Arc;

/// Global application state shared across components
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn EnhancerApi>,
    pub initializer: ModelInitializer,
    pub session: Signal<Session>,
    pub settings: Signal<ClientSettings>,
}

impl AppState {
    pub fn new() -> Self {
        let settings = load_settings();
        tracing::info!("Using enhancement server at {}", settings.server_url);

        let api: Arc<dyn EnhancerApi> = Arc::new(HttpApi::new(settings.server_url.clone()));
        Self {
            initializer: ModelInitializer::new(api.clone()),
            api,
            session: Signal::new(Session::new()),
            settings: Signal::new(settings),
        }
    }

    /// Hand newly armed banner timers to the runtime
    pub fn schedule_dismissals(&self) {
        let mut session = self.session;
        let timers = session.write().notifications.take_armed();
        for timer in timers {
            spawn(async move {
                tokio::time::sleep(timer.after).await;
                session.write().notifications.expire(timer.handle);
            });
        }
    }

    /// Run the model initialization sequence, mirroring it into the session
    pub async fn initialize(self) {
        let mut session = self.session;
        let phase = self
            .initializer
            .run(|event| {
                session.write().apply_init(event);
                self.schedule_dismissals();
            })
            .await;
        tracing::info!("Initialization settled in {:?}", phase);
    }

    pub async fn retry_download(self, model: String) {
        let mut session = self.session;
        self.initializer
            .retry(&model, |event| {
                session.write().apply_init(event);
                self.schedule_dismissals();
            })
            .await;
    }

    pub async fn enhance(self) {
        let mut session = self.session;
        let staged = session.write().begin_enhance();
        let Some(files) = staged else {
            self.schedule_dismissals();
            return;
        };

        let result = enhance::submit(self.api.as_ref(), &files).await;
        let stamp = chrono::Utc::now().timestamp_millis();
        session
            .write()
            .finish_enhance(result, |name| self.api.output_url(name, stamp));
        self.schedule_dismissals();
    }

    pub async fn download_all(self) {
        let mut session = self.session;
        let started = session.write().begin_export();
        if !started {
            self.schedule_dismissals();
            return;
        }

        let dir = self.settings.read().download_directory.clone();
        let result = export::download_all(self.api.as_ref(), &dir).await;
        session.write().finish_export(result);
        self.schedule_dismissals();
    }

    pub async fn download_image(self, file_name: String, save_as: String) {
        let mut session = self.session;
        let dir = self.settings.read().download_directory.clone();
        let result = export::download_image(self.api.as_ref(), &file_name, &save_as, &dir).await;
        session.write().report_saved(result);
        self.schedule_dismissals();
    }

    pub async fn clear_history(self) {
        let mut session = self.session;
        match self.api.clear_history().await {
            Ok(()) => session.write().clear_all(),
            Err(e) => session.write().clear_failed(e),
        }
        self.schedule_dismissals();
    }

    pub fn toggle_theme(&self) {
        let mut settings = self.settings;
        let mut settings = settings.write();
        settings.toggle_theme();
        if let Err(error) = save_settings(&settings) {
            tracing::error!("Failed to save settings: {}", error);
        }
    }
}

#[component]
pub fn App() -> Element {
    let app_state = use_context_provider(AppState::new);

    use_hook(move || {
        spawn(app_state.initialize());
    });

    rsx! {
        Layout {}
    }
}
