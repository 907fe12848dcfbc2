// ============================================================
// Layer 3 — Sensor Window Domain Type
// ============================================================
// A window is a fixed-length slice of a multichannel wearable
// recording: `time_steps` rows of `channels` readings each.
// It is the atomic unit the model classifies.
//
// The label is the activity at the window's position in the
// source recording; `index` is that position, kept so a
// prediction can always be traced back to the raw sequence.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorWindow {
    /// Readings, row-major: values[t][c]
    pub values: Vec<Vec<f32>>,

    /// Activity class index
    pub target: usize,

    /// Position of this window in the source sequence
    pub index: usize,
}

impl SensorWindow {
    pub fn new(values: Vec<Vec<f32>>, target: usize, index: usize) -> Self {
        Self { values, target, index }
    }

    pub fn time_steps(&self) -> usize {
        self.values.len()
    }

    /// Channel count of the first row; 0 for an empty window
    pub fn channels(&self) -> usize {
        self.values.first().map_or(0, Vec::len)
    }

    /// True when every row has the same number of channels
    pub fn is_rectangular(&self) -> bool {
        let c = self.channels();
        self.values.iter().all(|row| row.len() == c)
    }

    /// Flatten to time-major order, the layout the batcher stacks
    pub fn flat_values(&self) -> impl Iterator<Item = f32> + '_ {
        self.values.iter().flat_map(|row| row.iter().copied())
    }
}
