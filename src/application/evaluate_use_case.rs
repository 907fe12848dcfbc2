// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
//   Step 1: Read the model config from the checkpoint dir  (Layer 6)
//   Step 2: Rebuild the model from it                      (Layer 5)
//   Step 3: Read the dataset file                          (Layer 4)
//   Step 4: Restore the best state and run one epoch       (Layer 5)
//   Step 5: Append the report to the evaluation log        (Layer 6)

use anyhow::{Context, Result};
use burn::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::loader::load_dataset_json;
use crate::domain::report::EvalReport;
use crate::infra::{checkpoint::CheckpointManager, metrics::EvaluationLogger};
use crate::ml::{
    evaluator::{evaluate, EvalOptions},
    har_model::HarModel,
    model::{AttendDiscriminate, AttendDiscriminateConfig},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateConfig {
    pub checkpoint_dir: PathBuf,
    pub data_path:      PathBuf,
    pub options:        EvalOptions,
}

pub struct EvaluateUseCase {
    config: EvaluateConfig,
}

impl EvaluateUseCase {
    pub fn new(config: EvaluateConfig) -> Self {
        Self { config }
    }

    pub fn execute<B: Backend>(&self, device: &B::Device) -> Result<EvalReport> {
        let cfg  = &self.config;
        let ckpt = CheckpointManager::new(&cfg.checkpoint_dir);

        // ── Step 1 + 2: rebuild the architecture ─────────────────────────────
        let model_cfg: AttendDiscriminateConfig = ckpt
            .load_config()
            .with_context(|| format!("No usable model config in '{}'", cfg.checkpoint_dir.display()))?;
        let model = AttendDiscriminate::<B>::construct(&model_cfg, device)
            .context("Stored model config is invalid")?;

        // ── Step 3: dataset ──────────────────────────────────────────────────
        let dataset = load_dataset_json(&cfg.data_path)?;
        tracing::info!(
            "Loaded {} split from '{}': {} windows of {:?} × {:?}",
            dataset.prefix,
            cfg.data_path.display(),
            burn::data::dataset::Dataset::len(&dataset),
            dataset.window_size(),
            dataset.channels(),
        );

        // ── Step 4: evaluate ─────────────────────────────────────────────────
        let report = evaluate(model, dataset, &ckpt, None, &cfg.options, device)
            .context("Evaluation failed")?;

        // ── Step 5: persist ──────────────────────────────────────────────────
        let logger = EvaluationLogger::new(&cfg.checkpoint_dir)?;
        logger.log(&report)?;

        Ok(report)
    }
}
