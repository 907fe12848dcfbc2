// ============================================================
// Layer 4 — Sensor Window Batcher
// ============================================================
// Implements Burn's Batcher trait to stack a Vec<SensorWindow>
// into device tensors.
//
// How batching works here:
//   Input:  N windows, each T time steps × C channels
//   Output: HarBatch with inputs [N, T, C], targets [N], indices [N]
//
//   Every window is flattened time-major and appended to one
//   long Vec, then reshaped:
//   [w1_t1_c1, w1_t1_c2, ..., w1_tT_cC, w2_t1_c1, ..., wN_tT_cC] → [N, T, C]
//
// The batcher owns the target device, so tensors land on the
// accelerator (or CPU) before the model ever sees them.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::domain::window::SensorWindow;

// ─── HarBatch ─────────────────────────────────────────────────────────────────
/// A batch of windows ready for the forward pass.
#[derive(Debug, Clone)]
pub struct HarBatch<B: Backend> {
    /// Sensor readings — shape: [batch_size, time_steps, channels]
    pub inputs: Tensor<B, 3>,

    /// Activity class per window — shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,

    /// Source-sequence position per window — shape: [batch_size]
    pub indices: Tensor<B, 1, Int>,
}

// ─── HarBatcher ───────────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct HarBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> HarBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<SensorWindow, HarBatch<B>> for HarBatcher<B> {
    fn batch(&self, items: Vec<SensorWindow>) -> HarBatch<B> {
        let batch_size = items.len();
        // All windows in a dataset share one shape (checked by the caller)
        let time_steps = items.first().map_or(0, SensorWindow::time_steps);
        let channels   = items.first().map_or(0, SensorWindow::channels);

        let flat: Vec<f32> = items.iter().flat_map(SensorWindow::flat_values).collect();

        let targets: Vec<i32> = items.iter().map(|w| w.target as i32).collect();
        let indices: Vec<i32> = items.iter().map(|w| w.index as i32).collect();

        let inputs = Tensor::<B, 1>::from_floats(flat.as_slice(), &self.device)
            .reshape([batch_size, time_steps, channels]);

        let targets = Tensor::<B, 1, Int>::from_ints(targets.as_slice(), &self.device);
        let indices = Tensor::<B, 1, Int>::from_ints(indices.as_slice(), &self.device);

        HarBatch { inputs, targets, indices }
    }
}
