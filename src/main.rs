mod app;
mod constants;
mod data;
mod models;
mod screens;
mod services;
mod state;
mod utils;

use app::SideBySideApp;
use eframe::egui;

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_NAME: &str = "Side by Side";

const APP_WIDTH: f32 = 960.0;
const APP_HEIGHT: f32 = 620.0;

fn main() -> Result<(), eframe::Error> {
    // Set RUST_LOG=debug for verbose output, RUST_LOG=info for normal logs
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("[Main] Starting {} v{}", APP_NAME, APP_VERSION);

    // A share URL passed on the command line seeds track and start position
    let deep_link = utils::deep_link::from_args(std::env::args().skip(1));
    if deep_link != utils::deep_link::DeepLink::default() {
        log::info!("[Main] Deep link: {:?}", deep_link);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!("{} v{}", APP_NAME, APP_VERSION))
            .with_inner_size([APP_WIDTH, APP_HEIGHT])
            .with_min_inner_size([720.0, 480.0])
            .with_icon(load_icon()),
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |_cc| Ok(Box::new(SideBySideApp::new(deep_link)))),
    )
}

/// Flat brand-colored icon with a white center bar.
fn load_icon() -> egui::IconData {
    let (width, height) = (64usize, 64usize);
    let (r, g, b) = constants::DOMINANT_COLOR_RGB;
    let mut pixels = vec![0u8; width * height * 4];

    for y in 0..height {
        for x in 0..width {
            let idx = (y * width + x) * 4;
            let bar = x >= 28 && x < 36;
            let (pr, pg, pb) = if bar { (255, 255, 255) } else { (r, g, b) };
            pixels[idx] = pr;
            pixels[idx + 1] = pg;
            pixels[idx + 2] = pb;
            pixels[idx + 3] = 255;
        }
    }

    egui::IconData {
        rgba: pixels,
        width: width as u32,
        height: height as u32,
    }
}
