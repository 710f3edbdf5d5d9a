use dioxus::desktop::{Config, WindowBuilder};
use pictureperfect::app::App;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const MAIN_CSS: &str = include_str!("../assets/main.css");

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("pictureperfect=info,reqwest=warn,hyper=warn,tao=warn,wry=warn")
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting PicturePerfect...");

    let config = Config::new()
        .with_window(
            WindowBuilder::new()
                .with_title("PicturePerfect")
                .with_resizable(true),
        )
        .with_custom_head(format!("<style>{}</style>", MAIN_CSS));

    dioxus::LaunchBuilder::desktop().with_cfg(config).launch(App);
}
