mod components;
mod config;
mod error;
mod model;
mod render;
mod scene;
mod state;
mod timer;
mod util;

fn main() {
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    util::init_logging(level);
    yew::Renderer::<components::app::App>::new().render();
}
