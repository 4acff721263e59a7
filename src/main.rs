mod catalog;
mod components;
mod config;
mod error;
mod model;
mod state;
mod util;

use components::app::App;

fn main() {
    util::init_logging();
    log::info!("coin discoverer {}", env!("CARGO_PKG_VERSION"));
    yew::Renderer::<App>::new().render();
}
