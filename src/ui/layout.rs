use crate::app::AppState;
use crate::ui::gallery::Gallery;
use crate::ui::header::Header;
use crate::ui::model_modal::ModelModal;
use crate::ui::toasts::Toasts;
use crate::ui::upload::UploadPanel;
use dioxus::prelude::*;

/// Page shell: header, upload panel, gallery and the overlays
pub fn Layout() -> Element {
    let app_state = use_context::<AppState>();
    let theme = app_state.settings.read().theme.clone();

    rsx! {
        div {
            class: "app theme-{theme}",

            Header {}

            main {
                class: "content",
                UploadPanel {}
                Gallery {}
            }

            ModelModal {}
            Toasts {}
        }
    }
}
