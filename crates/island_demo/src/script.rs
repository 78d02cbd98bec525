//! Scripted parameter changes standing in for keyboard input.

use heightfield::{ShapingMode, TerrainType};
use serde::{Deserialize, Serialize};

/// A parameter change request, as the input layer would issue it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    SetTerrainType(TerrainType),
    SetHeightScale(f32),
    SetNoiseFrequency(f32),
    SetShapingMode(ShapingMode),
    Regenerate,
    /// Add to the current wave height.
    RaiseWaveHeight(f32),
    SetWaveSpeed(f32),
    SetWaveFrequency(f32),
    /// Log terrain and ocean heights at a world position.
    ProbeHeight { x: f32, z: f32 },
}

/// A command fired at the start of a given frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptedInput {
    pub frame: u32,
    pub command: Command,
}

impl ScriptedInput {
    pub fn new(frame: u32, command: Command) -> Self {
        Self { frame, command }
    }
}

/// Replays inputs in frame order.
#[derive(Debug)]
pub struct Script {
    inputs: Vec<ScriptedInput>,
    cursor: usize,
}

impl Script {
    pub fn new(mut inputs: Vec<ScriptedInput>) -> Self {
        inputs.sort_by_key(|i| i.frame);
        Self { inputs, cursor: 0 }
    }

    /// Commands due at or before `frame` that haven't fired yet.
    pub fn due(&mut self, frame: u32) -> impl Iterator<Item = Command> + '_ {
        let start = self.cursor;
        while self.cursor < self.inputs.len() && self.inputs[self.cursor].frame <= frame {
            self.cursor += 1;
        }
        self.inputs[start..self.cursor].iter().map(|i| i.command)
    }

    pub fn remaining(&self) -> usize {
        self.inputs.len() - self.cursor
    }
}
