//! Demo configuration. Loaded from `island_demo.ron` at startup.

use heightfield::{OceanConfig, ShapingMode, TerrainConfig, TerrainType};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::script::{Command, ScriptedInput};

/// Scene setup, run length, and the input script replayed against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    #[serde(default)]
    pub terrain: TerrainConfig,
    #[serde(default)]
    pub ocean: OceanConfig,
    /// Permutation seed. `None` shuffles from entropy, so every run differs.
    #[serde(default)]
    pub noise_seed: Option<u64>,
    /// Frames to simulate.
    #[serde(default = "default_frames")]
    pub frames: u32,
    /// Fixed frame time in seconds.
    #[serde(default = "default_time_step")]
    pub time_step: f32,
    #[serde(default = "default_script")]
    pub script: Vec<ScriptedInput>,
}

fn default_frames() -> u32 {
    600
}
fn default_time_step() -> f32 {
    1.0 / 60.0
}

/// Walks through every terrain type like pressing 1..5, repeats the last one,
/// then bumps the waves like pressing Z and X.
fn default_script() -> Vec<ScriptedInput> {
    let mut script: Vec<ScriptedInput> = [
        TerrainType::Ridged,
        TerrainType::Voronoi,
        TerrainType::Canyon,
        TerrainType::Plateaus,
        TerrainType::Island,
        TerrainType::Island,
    ]
    .into_iter()
    .enumerate()
    .map(|(i, t)| ScriptedInput::new(60 * (i as u32 + 1), Command::SetTerrainType(t)))
    .collect();

    script.push(ScriptedInput::new(
        420,
        Command::SetShapingMode(ShapingMode::LayeredCoastal),
    ));
    script.push(ScriptedInput::new(450, Command::RaiseWaveHeight(0.5)));
    script.push(ScriptedInput::new(480, Command::SetWaveSpeed(1.5)));
    script.push(ScriptedInput::new(540, Command::ProbeHeight { x: 0.0, z: 0.0 }));
    script
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            terrain: TerrainConfig::default(),
            ocean: OceanConfig::default(),
            noise_seed: None,
            frames: default_frames(),
            time_step: default_time_step(),
            script: default_script(),
        }
    }
}

impl DemoConfig {
    /// Load config from `path`. If the file is missing or invalid, returns default config.
    pub fn load(path: &Path) -> Self {
        if let Ok(data) = std::fs::read_to_string(path) {
            match ron::from_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }
}

/// `island_demo.ron` in the current directory.
pub fn default_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("island_demo.ron")
}
