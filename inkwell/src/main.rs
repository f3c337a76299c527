#![warn(clippy::pedantic)]

//! Headless host for the inkwell engine. Replays a recorded input session through a simulated
//! display loop, and writes the flattened result as a PNG.
//!
//! `inkwell <session.toml> [out.png]`

pub mod actions;
pub mod export;
pub mod named;
pub mod replay;
pub mod session;
pub mod settings;

use anyhow::{Context, Result as AnyResult};

const USAGE: &str = "usage: inkwell <session.toml> [out.png]";

fn main() -> AnyResult<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let mut args = std::env::args_os().skip(1);
    let session_path: std::path::PathBuf = args.next().context(USAGE)?.into();
    let out_path: std::path::PathBuf = args.next().map_or_else(|| "out.png".into(), Into::into);

    let settings = settings::Settings::load();
    let session = session::Session::load(&session_path)
        .with_context(|| format!("loading {}", session_path.display()))?;
    log::info!(
        "Loaded {} events ({:.0}ms) from {}",
        session.events.len(),
        session.duration_ms(),
        session_path.display()
    );

    let mut engine = settings.engine();
    let outcome = replay::Replay::new(
        &mut engine,
        &settings.keys_to_actions,
        settings.preferences.frame_interval_ms,
    )
    .run(&session);

    for (n, image) in outcome.exports.into_iter().enumerate() {
        export::write_png(image, &export::numbered(&out_path, n + 1))?;
    }
    export::write_png(engine.export_flattened(), &out_path)?;

    let history = engine.history();
    log::info!(
        "History: {} undo, {} redo, {} bytes held",
        history.undo_len(),
        history.redo_len(),
        history.footprint()
    );

    // Write out the defaults for the user to edit, if there wasn't a file already.
    if settings.did_fail_to_load() && !settings::Settings::file_exists() {
        if let Err(e) = settings.save() {
            log::warn!("Failed to save settings:\n{e:?}");
        }
    }
    Ok(())
}
