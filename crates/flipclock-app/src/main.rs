use anyhow::Context;

use flipclock::Application;
use flipclock_engine::logging::{init_logging, LoggingConfig};

fn main() {
    init_logging(LoggingConfig::default());

    if let Err(e) = run() {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let mut app = Application::new();
    match load_font() {
        Some((path, bytes)) => {
            log::info!("using font {path}");
            app = app.font(bytes);
        }
        None => log::warn!("no system font found; only the cards will be drawn"),
    }
    app.run().context("flip clock stopped")
}

/// Bold faces first; the digits are the whole point.
fn load_font() -> Option<(&'static str, Vec<u8>)> {
    [
        "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/noto/NotoSans-Bold.ttf",
        "/usr/share/fonts/truetype/noto/NotoSans-Bold.ttf",
        "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
        "C:\\Windows\\Fonts\\arialbd.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/noto/NotoSans-Regular.ttf",
        "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    ]
    .into_iter()
    .find_map(|p| std::fs::read(p).ok().map(|bytes| (p, bytes)))
}
