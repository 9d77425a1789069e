use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use eframe::egui;
use log::info;

use interest_calculator::app::{config::Config, App};

#[derive(Parser, Debug)]
#[command(version, about = "Compound interest calculator")]
struct Args {
    /// TOML file with window, limit and export settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start in dark mode
    #[arg(long)]
    dark: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut cfg = match &args.config {
        Some(path) => {
            info!("loading config from {}", path.display());
            Config::load(path)?
        }
        None => Config::default(),
    };
    if args.dark {
        cfg.dark_mode = true;
    }

    let title = cfg.window.title.clone();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(title.clone())
            .with_inner_size([cfg.window.width, cfg.window.height]),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(|cc| Ok(Box::new(App::new(cc, cfg)))),
    )
    .map_err(|e| anyhow!("window failed: {e}"))
}
