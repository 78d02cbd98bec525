//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;
use heightfield::{ShapingMode, TerrainType};

use crate::config::{default_config_path, DemoConfig};

/// Command line arguments. Anything given here overrides the config file.
#[derive(Parser, Debug)]
#[command(name = "island_demo")]
#[command(about = "Headless island terrain and ocean heightfield demo", long_about = None)]
pub struct Args {
    /// Config file (RON). Defaults to ./island_demo.ron
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Frames to simulate
    #[arg(long)]
    pub frames: Option<u32>,

    /// Fixed frame time in seconds
    #[arg(long, value_name = "SECONDS")]
    pub dt: Option<f32>,

    /// Starting terrain type: island, ridged, voronoi, canyon, plateaus
    #[arg(long, value_name = "TYPE")]
    pub terrain: Option<TerrainType>,

    /// Use the layered coastal island profile instead of the simple radial one
    #[arg(long)]
    pub layered: bool,

    /// Apply the slope erosion filter after every terrain rebuild
    #[arg(long)]
    pub erosion: bool,

    /// Permutation seed for reproducible terrain
    #[arg(long)]
    pub seed: Option<u64>,

    /// Terrain grid subdivisions per side
    #[arg(long)]
    pub resolution: Option<u32>,
}

impl Args {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(default_config_path)
    }

    /// Fold command-line overrides into a loaded config.
    pub fn apply(&self, config: &mut DemoConfig) {
        if let Some(frames) = self.frames {
            config.frames = frames;
        }
        if let Some(dt) = self.dt {
            config.time_step = dt;
        }
        if let Some(terrain_type) = self.terrain {
            config.terrain.terrain_type = terrain_type;
        }
        if self.layered {
            config.terrain.shaping = ShapingMode::LayeredCoastal;
        }
        if self.erosion {
            config.terrain.erosion = true;
        }
        if let Some(seed) = self.seed {
            config.noise_seed = Some(seed);
        }
        if let Some(resolution) = self.resolution {
            config.terrain.resolution = resolution;
        }
    }
}
