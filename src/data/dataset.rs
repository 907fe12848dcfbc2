use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::domain::{split::Split, window::SensorWindow};

/// An ordered collection of windows drawn from one split.
///
/// Order matters for the test split: windows are stored in the
/// order they were cut from the source recording, and the
/// evaluation loop relies on the loader preserving it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorDataset {
    pub prefix:  Split,
    windows:     Vec<SensorWindow>,
}

impl SensorDataset {
    pub fn new(prefix: Split, windows: Vec<SensorWindow>) -> Self {
        Self { prefix, windows }
    }

    pub fn windows(&self) -> &[SensorWindow] { &self.windows }

    /// Window length shared by all samples, if the dataset is non-empty
    pub fn window_size(&self) -> Option<usize> {
        self.windows.first().map(SensorWindow::time_steps)
    }

    /// Channel count shared by all samples, if the dataset is non-empty
    pub fn channels(&self) -> Option<usize> {
        self.windows.first().map(SensorWindow::channels)
    }

    /// True when every window has the same (time, channels) shape
    pub fn is_uniform(&self) -> bool {
        self.first_irregular().is_none()
    }

    /// First window that is ragged or differs in shape from window 0.
    /// Such a window cannot be stacked into a batch tensor.
    pub fn first_irregular(&self) -> Option<&SensorWindow> {
        let first = self.windows.first()?;
        let shape = (first.time_steps(), first.channels());
        self.windows
            .iter()
            .find(|w| !w.is_rectangular() || (w.time_steps(), w.channels()) != shape)
    }

    pub fn targets(&self) -> Vec<usize> {
        self.windows.iter().map(|w| w.target).collect()
    }
}

impl Dataset<SensorWindow> for SensorDataset {
    fn get(&self, index: usize) -> Option<SensorWindow> {
        self.windows.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.windows.len()
    }
}
