mod app;
mod state;
mod ui;

use std::path::PathBuf;

use app::WasteFlowApp;
use eframe::egui;
use state::AppState;
use waste_flow::view::ViewConfig;

/// Environment variable naming an optional JSON view config.
const CONFIG_ENV: &str = "WASTE_FLOW_CONFIG";

fn load_config() -> ViewConfig {
    let Some(path) = std::env::var_os(CONFIG_ENV).map(PathBuf::from) else {
        return ViewConfig::default();
    };
    match ViewConfig::load(&path) {
        Ok(config) => {
            log::info!("Using view config from {}", path.display());
            config
        }
        Err(e) => {
            log::warn!("Ignoring {CONFIG_ENV}: {e:#}");
            ViewConfig::default()
        }
    }
}

fn main() -> eframe::Result {
    env_logger::init();

    let mut state = AppState::new(load_config());

    // Usage: waste-flow [DATASET] [BOUNDARIES.geojson]
    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    if let Some(dataset) = args.next() {
        ui::panels::load_dataset(&mut state, &dataset);
    }
    if let Some(boundaries) = args.next() {
        ui::panels::load_boundaries(&mut state, &boundaries);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Waste Flow – Export Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(WasteFlowApp::new(state)))),
    )
}
