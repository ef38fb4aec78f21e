//! Flurry headless runner
//!
//! Plays an effect without a renderer and logs what it does.
//!
//! Usage: `flurry-runner <asset.json | preset> [seconds] [fps]`
//!
//! `RUST_LOG=debug` shows state transitions, `trace` shows every burst.

use anyhow::{bail, Context, Result};
use flurry::{presets, ParticleAsset, ParticleEffect};
use std::env;
use std::path::Path;

fn load(source: &str) -> Result<ParticleAsset> {
    if Path::new(source).exists() {
        return ParticleAsset::load(source).with_context(|| format!("loading {source}"));
    }
    match presets::by_name(source) {
        Some(asset) => Ok(asset),
        None => bail!(
            "`{source}` is neither a file nor a preset (presets: {})",
            presets::NAMES.join(", ")
        ),
    }
}

fn parse_arg<T: std::str::FromStr>(args: &[String], index: usize, default: T) -> Result<T> {
    match args.get(index) {
        Some(raw) => raw
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid argument `{raw}`")),
        None => Ok(default),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let Some(source) = args.get(1) else {
        eprintln!("Usage: flurry-runner <asset.json | preset> [seconds] [fps]");
        eprintln!("Presets: {}", presets::NAMES.join(", "));
        return Ok(());
    };
    let seconds: f32 = parse_arg(&args, 2, 3.0)?;
    let fps: u32 = parse_arg(&args, 3, 60)?;
    if fps == 0 {
        bail!("fps must be greater than 0");
    }

    let asset = load(source)?;
    log::info!(
        "playing '{}' for {seconds}s at {fps} fps ({} modules, {} bursts)",
        asset.name,
        asset.modules.len(),
        asset.bursts.len()
    );

    let mut effect = ParticleEffect::new(asset);
    effect.play();

    let dt = 1.0 / fps as f32;
    let frames = (seconds * fps as f32).ceil() as u32;
    let mut peak = 0;
    for frame in 1..=frames {
        effect.tick(dt);
        let stats = effect.stats();
        peak = peak.max(stats.live);

        if frame % fps == 0 {
            log::info!(
                "t={:.2}s live={}/{} spawned={}",
                frame as f32 * dt,
                stats.live,
                stats.capacity,
                stats.total_spawned
            );
        }
        if effect.is_finished() {
            log::info!("finished after {frame} frames");
            break;
        }
    }

    let stats = effect.stats();
    log::info!(
        "done: {} spawned, peak {} live, {} live at exit",
        stats.total_spawned,
        peak,
        stats.live
    );
    Ok(())
}
