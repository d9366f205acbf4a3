//! landing-fx: scroll, counter and navigation effects for a static landing page.
//!
//! Load the wasm bundle after the page markup; `start` wires everything up
//! against the live document. Optional overrides go in a JSON
//! `data-landing-fx` attribute on `<html>`.

use log::{info, warn};
use wasm_bindgen::prelude::*;

pub mod anchor;
pub mod config;
pub mod controller;
pub mod counter;
pub mod dom;
pub mod error;
pub mod fade;
pub mod menu;
pub mod scroll;
pub mod watcher;
pub mod web;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use controller::PageController;
pub use error::FxError;

#[wasm_bindgen(start)]
pub fn start() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    let document = web_sys::window().and_then(|w| w.document());
    let (config, config_error) = Config::load(document.as_ref());

    // A second init (e.g. under the test harness) is harmless
    let _ = console_log::init_with_level(config.log_level);

    if let Some(e) = config_error {
        warn!("ignoring page config: {}", e);
    }

    info!("Starting landing effects");
    match PageController::start(config) {
        Ok(controller) => controller.keep_alive(),
        Err(e) => warn!("landing effects not started: {}", e),
    }
}
