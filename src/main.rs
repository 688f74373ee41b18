#![warn(clippy::all, rust_2018_idioms)]

use quickshape::QuickShapeApp;

fn main() -> eframe::Result {
    // Log to stderr (if you run with `RUST_LOG=debug`).
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("QuickShape")
            .with_inner_size([1024.0, 720.0])
            .with_min_inner_size([480.0, 320.0]),
        ..Default::default()
    };

    eframe::run_native(
        "QuickShape",
        native_options,
        Box::new(|cc| Ok(Box::new(QuickShapeApp::new(cc)))),
    )
}
