//! Model download modal
//!
//! Shown while missing models are fetched. Failed rows carry a retry
//! button once the queue has drained; a fatal load failure replaces the
//! body with a critical message.

use crate::app::AppState;
use crate::session::{DownloadState, ModelEntry};
use dioxus::prelude::*;

#[component]
pub fn ModelModal() -> Element {
    let app_state = use_context::<AppState>();
    let session = app_state.session.read();
    let board = &session.models;

    if !board.open {
        return rsx! { div {} };
    }

    let message = board.message.clone();
    let fatal = board.fatal;
    let can_retry = board.accepting_retries;
    let title = if board.all_completed() { "Models downloaded" } else { "Preparing models" };
    let entries: Vec<ModelEntry> = board.entries().to_vec();
    drop(session);

    rsx! {
        div {
            class: "modal-backdrop",

            div {
                class: if fatal { "modal modal-critical" } else { "modal" },

                h2 { class: "modal-title", "{title}" }
                p { class: "modal-message", "{message}" }

                if !fatal {
                    ul {
                        class: "model-list",
                        for entry in entries {
                            ModelRow { key: "{entry.descriptor.name}", entry: entry.clone(), can_retry }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn ModelRow(entry: ModelEntry, can_retry: bool) -> Element {
    let app_state = use_context::<AppState>();
    let name = entry.descriptor.name.clone();
    let progress = entry.state.progress();
    let label = entry.state.label();
    let retry_name = name.clone();

    rsx! {
        li {
            class: "model-row",

            div {
                class: "model-row-header",
                span { class: "model-name", "{name}" }
                span { class: "model-state", "{label}" }
            }
            div {
                class: "progress-bar",
                div {
                    class: if entry.state.is_completed() { "progress-fill done" } else { "progress-fill" },
                    style: "width: {progress}%",
                }
            }

            if let DownloadState::Failed(reason) = &entry.state {
                div {
                    class: "model-error",
                    span { "{reason}" }
                    if can_retry {
                        button {
                            class: "btn btn-small",
                            onclick: move |_| {
                                spawn(app_state.clone().retry_download(retry_name.clone()));
                            },
                            "Retry"
                        }
                    }
                }
            }
        }
    }
}
