// ============================================================
// Layer 2 — InitUseCase
// ============================================================
// Writes a model config and a freshly initialised best
// checkpoint, so the evaluation path can be exercised end to
// end before any trained weights exist.

use anyhow::{Context, Result};
use burn::prelude::*;
use std::path::PathBuf;

use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{
    har_model::HarModel,
    model::{AttendDiscriminate, AttendDiscriminateConfig},
};

pub struct InitUseCase {
    checkpoint_dir: PathBuf,
    model:          AttendDiscriminateConfig,
    seed:           u64,
}

impl InitUseCase {
    pub fn new(checkpoint_dir: impl Into<PathBuf>, model: AttendDiscriminateConfig, seed: u64) -> Self {
        Self { checkpoint_dir: checkpoint_dir.into(), model, seed }
    }

    /// Returns the path of the written checkpoint.
    pub fn execute<B: Backend>(&self, device: &B::Device) -> Result<PathBuf> {
        B::seed(self.seed);

        let model = AttendDiscriminate::<B>::construct(&self.model, device)
            .context("Invalid model configuration")?;
        tracing::info!(
            "Initialised Attend-and-Discriminate with {} parameters",
            model.num_params()
        );

        let ckpt = CheckpointManager::new(&self.checkpoint_dir);
        let path = ckpt
            .save_best(&model)
            .with_context(|| format!("Cannot write checkpoint to '{}'", self.checkpoint_dir.display()))?;

        tracing::info!("Wrote config and checkpoint to '{}'", self.checkpoint_dir.display());
        Ok(path)
    }
}
