use crate::app::AppState;
use crate::session::Notification;
use dioxus::prelude::*;

/// Stacked notification banners, newest at the bottom
#[component]
pub fn Toasts() -> Element {
    let app_state = use_context::<AppState>();
    let mut session = app_state.session;
    let active: Vec<Notification> = session.read().notifications.active().to_vec();

    rsx! {
        div {
            class: "toast-stack",
            for notification in active {
                div {
                    key: "{notification.id}",
                    class: notification.kind.css_class(),
                    span { class: "toast-icon", "{notification.kind.icon()}" }
                    span { class: "toast-message", "{notification.message}" }
                    button {
                        class: "toast-close",
                        onclick: move |_| {
                            session.write().notifications.remove(notification.id);
                        },
                        "×"
                    }
                }
            }
        }
    }
}
