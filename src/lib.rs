pub mod audio;
pub mod canvas;
pub mod components;
pub mod player;
pub mod site;
pub mod state;

use leptos::prelude::*;
use components::app::App;

#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();

    match site::load() {
        Ok(site) => {
            let _ = console_log::init_with_level(site.player.log_level());
            log::info!("{}: {} works", site.title, site.catalog.work_count());
            mount_to_body(move || view! { <App site=site /> });
        }
        Err(e) => {
            let _ = console_log::init_with_level(log::Level::Debug);
            log::error!("Failed to load site.json: {e}");
            mount_to_body(move || view! {
                <div class="empty-state">{format!("Failed to load site: {e}")}</div>
            });
        }
    }
}
