//! pulse-synth - terminal host for the polyphonic pulse synth
//!
//! Run with: cargo run --bin pulse-synth
//!
//! Logs go to `pulse-synth.log` (filter with `RUST_LOG`) so they do not tear
//! the TUI. `PULSE_SYNTH_PATCH` overrides where patches are saved.

mod app;
mod ui;

use std::{env, fs::File, path::PathBuf};

use color_eyre::eyre::{Result as EyreResult, WrapErr};

use app::AudioHandle;
use ui::UiApp;

const LOG_FILE: &str = "pulse-synth.log";
const DEFAULT_PATCH_FILE: &str = "pulse-synth-patch.json";

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    init_logging()?;

    let patch_path = env::var_os("PULSE_SYNTH_PATCH")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PATCH_FILE));

    let audio = AudioHandle::start()?;
    log::info!(
        "audio running at {} Hz, {} channels",
        audio.sample_rate, audio.channels
    );

    let mut terminal = ratatui::init();
    let res = UiApp::new(audio, patch_path).run(&mut terminal);
    ratatui::restore();
    res
}

fn init_logging() -> EyreResult<()> {
    let file = File::create(LOG_FILE).wrap_err("failed to create log file")?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}
