//! Title bar with the server's hardware summary and the theme menu

use crate::app::AppState;
use dioxus::prelude::*;

#[component]
pub fn Header() -> Element {
    let app_state = use_context::<AppState>();
    let system_info = app_state.session.read().system_info.clone();
    let dark_mode = app_state.settings.read().is_dark();
    let mut menu_open = use_signal(|| false);

    rsx! {
        header {
            class: "header",

            h1 { class: "header-title", "PicturePerfect" }

            div {
                class: "system-info",
                match system_info {
                    Some(info) => rsx! {
                        span { class: "system-info-item", "GPU: {info.gpu_detected}" }
                        span {
                            class: "system-info-item",
                            "Half precision: ",
                            if info.half_precision { "Yes" } else { "No" }
                        }
                    },
                    None => rsx! {
                        span { class: "system-info-item muted", "Checking server..." }
                    },
                }
            }

            div {
                class: "theme-menu",
                button {
                    class: "icon-btn",
                    title: "Theme",
                    onclick: move |_| menu_open.set(!menu_open()),
                    if dark_mode { "🌙" } else { "☀️" }
                }
                if menu_open() {
                    div {
                        class: "theme-menu-list",
                        for (theme, label) in [("dark", "Dark"), ("light", "Light")] {
                            button {
                                class: if (theme == "dark") == dark_mode { "theme-option active" } else { "theme-option" },
                                onclick: {
                                    let app_state = app_state.clone();
                                    move |_| {
                                        if (theme == "dark") != dark_mode {
                                            app_state.toggle_theme();
                                        }
                                        menu_open.set(false);
                                    }
                                },
                                "{label}"
                            }
                        }
                    }
                }
            }
        }
    }
}
