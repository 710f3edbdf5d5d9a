//! Original/enhanced image grids and their tabs

use crate::app::AppState;
use crate::session::{CardAction, GridTab, ImageCard};
use dioxus::prelude::*;

pub fn Gallery() -> Element {
    let app_state = use_context::<AppState>();
    let mut session = app_state.session;

    let active = session.read().grid.active_tab();
    let grids: Vec<(GridTab, Vec<ImageCard>)> = GridTab::ALL
        .iter()
        .map(|tab| (*tab, session.read().grid.cards(*tab).to_vec()))
        .collect();

    rsx! {
        section {
            class: "gallery",

            div {
                class: "tabs",
                for tab in GridTab::ALL {
                    button {
                        class: if tab == active { "tab-btn active" } else { "tab-btn" },
                        onclick: move |_| {
                            session.write().switch_tab(tab.name());
                        },
                        "{tab.label()}"
                    }
                }
            }

            for (tab, cards) in grids {
                div {
                    key: "{tab.grid_id()}",
                    id: tab.grid_id(),
                    class: if tab == active { "image-grid" } else { "image-grid hidden" },

                    if cards.is_empty() {
                        p { class: "placeholder", "{tab.placeholder()}" }
                    }
                    for card in cards {
                        ImageCardView { key: "{card.key}", card: card.clone() }
                    }
                }
            }
        }
    }
}

#[component]
fn ImageCardView(card: ImageCard) -> Element {
    let app_state = use_context::<AppState>();
    let src = card.source.src();
    let action = card.action.clone();
    let action_label = match card.action {
        CardAction::Remove(_) => "Remove",
        CardAction::Download { .. } => "Download",
    };

    let on_action = move |_| match action.clone() {
        CardAction::Remove(id) => {
            let mut session = app_state.session;
            session.write().remove(id);
        }
        CardAction::Download { file_name, save_as } => {
            spawn(app_state.clone().download_image(file_name, save_as));
        }
    };

    rsx! {
        div {
            class: "image-card",
            img { src: "{src}", alt: "{card.label}" }
            div {
                class: "image-card-footer",
                div {
                    class: "image-card-meta",
                    span { class: "image-card-name", "{card.label}" }
                    if let Some(detail) = card.detail.clone() {
                        span { class: "image-card-detail", "{detail}" }
                    }
                }
                button {
                    class: "action-btn",
                    onclick: on_action,
                    "{action_label}"
                }
            }
        }
    }
}
