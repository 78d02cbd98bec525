//! island_demo: headless island terrain + animated ocean.
//!
//! Replays a scripted input sequence (terrain type switches, shaping mode,
//! wave height/speed) against one terrain and one ocean, uploading only what
//! each change touched.

mod cli;
mod clock;
mod config;
mod scene;
mod script;
mod upload;

use anyhow::{bail, Result};
use clap::Parser;
use heightfield::NoiseResources;

use crate::cli::Args;
use crate::clock::{FrameClock, MAX_STEP_SECONDS};
use crate::config::DemoConfig;
use crate::scene::Scene;
use crate::script::Script;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config_path = args.config_path();
    let mut config = DemoConfig::load(&config_path);
    args.apply(&mut config);

    if !(0.0..=MAX_STEP_SECONDS).contains(&config.time_step) {
        bail!(
            "Frame time must be between 0 and {} seconds, got {}",
            MAX_STEP_SECONDS,
            config.time_step
        );
    }

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║                      Island Demo                         ║");
    println!("╠══════════════════════════════════════════════════════════╣");
    println!("║  Scripted inputs stand in for the keyboard:              ║");
    println!("║    1-5  - Island / Ridged / Voronoi / Canyon / Plateaus  ║");
    println!("║    Z/X  - Raise wave height / set wave speed             ║");
    println!("╚══════════════════════════════════════════════════════════╝");

    log::info!(
        "Config {:?}: {} frames at {:.4}s, seed {:?}",
        config_path,
        config.frames,
        config.time_step,
        config.noise_seed
    );

    let resources = match config.noise_seed {
        Some(seed) => NoiseResources::seeded(seed),
        None => NoiseResources::new(),
    };

    let mut scene = Scene::new(&config, &resources)?;
    let mut script = Script::new(config.script.clone());
    let mut clock = FrameClock::new(config.time_step);

    for frame in 0..config.frames {
        clock.begin_frame();
        for command in script.due(frame) {
            scene.apply(command);
        }
        scene.update(clock.delta_seconds());
        clock.end_frame();
    }

    if script.remaining() > 0 {
        log::warn!(
            "{} scripted inputs fell after the last frame and never ran",
            script.remaining()
        );
    }

    let summary = scene.terrain_summary();
    log::info!(
        "Simulated {} frames ({:.2}s) in {:.2?}, slowest frame {:.2?}",
        clock.frame_count(),
        clock.elapsed_seconds(),
        clock.wall_time(),
        clock.slowest_frame()
    );
    println!(
        "Terrain: {} ({:?}), {} vertices, {} triangles",
        scene.terrain.terrain_type(),
        scene.terrain.shaping_mode(),
        scene.terrain.mesh().vertex_count(),
        scene.terrain.mesh().triangle_count()
    );
    println!(
        "  height {:.2} .. {:.2} m, {:.1}% land",
        summary.min_height,
        summary.max_height,
        summary.land_fraction * 100.0
    );
    println!(
        "  uploads: {} full, {} bytes, revision {}",
        scene.terrain_uploads.full_uploads,
        scene.terrain_uploads.bytes,
        scene.terrain_uploads.last_revision
    );
    println!(
        "Ocean: t = {:.2}, wave height {:.2}, speed {:.2}",
        scene.ocean.time(),
        scene.ocean.wave_height(),
        scene.ocean.wave_speed()
    );
    println!(
        "  uploads: {} full, {} patches, {} bytes",
        scene.ocean_uploads.full_uploads,
        scene.ocean_uploads.patch_uploads,
        scene.ocean_uploads.bytes
    );
    println!(
        "Centre: terrain {:.2} m, water {:.2} m",
        scene.terrain.height_at(0.0, 0.0),
        scene.ocean.surface_height_at(0.0, 0.0)
    );

    Ok(())
}
