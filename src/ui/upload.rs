//! Drop zone, file picker and the action buttons

use crate::app::AppState;
use crate::session::staging::{format_size, stage_paths, IMAGE_EXTENSIONS};
use dioxus::html::{FileEngine, HasFileData};
use dioxus::prelude::*;
use std::sync::Arc;

/// Stage every image an input or drop event carries, replacing the
/// previous selection unless the event brought no images
fn stage_files(app_state: &AppState, files: Option<Arc<dyn FileEngine>>) {
    let paths = files.map(|engine| engine.files()).unwrap_or_default();
    let staged = stage_paths(paths);
    tracing::info!("Selected {} image(s)", staged.len());

    let mut session = app_state.session;
    session.write().stage(staged);
}

#[component]
pub fn UploadPanel() -> Element {
    let app_state = use_context::<AppState>();
    let mut dragging = use_signal(|| false);

    let session = app_state.session.read();
    let buttons = session.buttons();
    let enhancing = session.is_enhancing();
    let exporting = session.is_exporting();
    let staged_count = session.uploads.len();
    let staged_size = format_size(session.uploads.total_bytes());
    drop(session);

    let accept = IMAGE_EXTENSIONS
        .iter()
        .map(|ext| format!(".{}", ext))
        .collect::<Vec<_>>()
        .join(",");

    let state_for_input = app_state.clone();
    let state_for_drop = app_state.clone();
    let state_for_enhance = app_state.clone();
    let state_for_clear = app_state.clone();
    let state_for_download = app_state.clone();

    rsx! {
        section {
            class: "upload-panel",

            div {
                class: if dragging() { "drop-zone dragging" } else { "drop-zone" },
                ondragover: move |evt| {
                    evt.prevent_default();
                    dragging.set(true);
                },
                ondragleave: move |_| dragging.set(false),
                ondrop: move |evt| {
                    evt.prevent_default();
                    dragging.set(false);
                    stage_files(&state_for_drop, evt.files());
                },

                p { class: "drop-zone-title", "Drag & drop images here" }
                p { class: "drop-zone-hint", "or" }
                label {
                    class: "btn btn-secondary",
                    "Browse files"
                    input {
                        r#type: "file",
                        class: "hidden",
                        multiple: true,
                        accept: "{accept}",
                        onchange: move |evt| stage_files(&state_for_input, evt.files()),
                    }
                }
                if staged_count > 0 {
                    p {
                        class: "drop-zone-summary",
                        "{staged_count} image(s) selected ({staged_size})"
                    }
                }
            }

            div {
                class: "actions",

                button {
                    class: "btn btn-primary",
                    disabled: !buttons.enhance,
                    onclick: move |_| {
                        spawn(state_for_enhance.clone().enhance());
                    },
                    if enhancing { "Enhancing..." } else { "Enhance" }
                }
                button {
                    class: "btn btn-secondary",
                    disabled: !buttons.clear,
                    onclick: move |_| {
                        spawn(state_for_clear.clone().clear_history());
                    },
                    "Clear All"
                }
                button {
                    class: "btn btn-secondary",
                    disabled: !buttons.download_all,
                    onclick: move |_| {
                        spawn(state_for_download.clone().download_all());
                    },
                    if exporting { "Preparing..." } else { "Download All" }
                }
            }

            if enhancing {
                div {
                    class: "progress-indicator",
                    div { class: "spinner" }
                    span { "Enhancing {staged_count} image(s)..." }
                }
            }
        }
    }
}
