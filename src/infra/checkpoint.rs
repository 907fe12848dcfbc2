// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores the best model state using Burn's named
// MessagePack recorder (gzip, full precision).
//
// What lives in a model's checkpoint directory:
//   checkpoints/
//     checkpoint_best.mpk.gz   ← every parameter of the model
//     model_config.json        ← architecture hyperparameters
//
// Why save the config separately?
//   The record alone does not say which architecture produced
//   it. Loading checks twice:
//     1. the manifests of the stored and live configs must match
//     2. every restored tensor must have the live model's shape
//   Burn's load_record accepts tensors of any shape, so the second
//   check is what catches a record that disagrees with its config.
//
// Full precision matters: a saved-then-loaded model must give
// bit-identical outputs.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkGzFileRecorder, Recorder},
};
use serde::{de::DeserializeOwned, Serialize};
use std::{fs, path::{Path, PathBuf}};

use crate::error::{EvalError, EvalResult};
use crate::ml::har_model::{check_manifest, state_shapes, HarModel};

pub const BEST_CHECKPOINT: &str = "checkpoint_best";
pub const MODEL_CONFIG:    &str = "model_config.json";

type CheckpointRecorder = NamedMpkGzFileRecorder<FullPrecisionSettings>;

/// Manages one model's checkpoint directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// The directory is created on first save, not here, so that
    /// pointing evaluation at a wrong path fails instead of
    /// silently creating an empty directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of the best-state file, extension included
    pub fn best_checkpoint_path(&self) -> PathBuf {
        self.dir.join(format!("{BEST_CHECKPOINT}.mpk.gz"))
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(MODEL_CONFIG)
    }

    /// Write the model's config and full state as the best checkpoint.
    pub fn save_best<B, M>(&self, model: &M) -> EvalResult<PathBuf>
    where
        B: Backend,
        M: HarModel<B>,
    {
        fs::create_dir_all(&self.dir)?;
        self.save_config(model.config())?;

        let path = self.dir.join(BEST_CHECKPOINT);
        model
            .clone()
            .save_file(path.clone(), &CheckpointRecorder::new())
            .map_err(|e| EvalError::CheckpointCorrupt {
                path:    path.clone(),
                message: format!("{e:?}"),
            })?;

        let written = self.best_checkpoint_path();
        tracing::debug!("Saved best checkpoint to '{}'", written.display());
        Ok(written)
    }

    /// Restore the best checkpoint into `model`.
    ///
    /// Fails when either file is missing, when the stored config or
    /// the stored tensors describe a different parameter set, or when
    /// the record cannot be decoded.
    pub fn load_best<B, M>(&self, model: M, device: &B::Device) -> EvalResult<M>
    where
        B: Backend,
        M: HarModel<B>,
    {
        let path = self.best_checkpoint_path();
        if !path.is_file() {
            return Err(EvalError::CheckpointMissing { path });
        }

        // Cheap check first: do both configs build the same architecture?
        let manifest = M::manifest(model.config());
        let stored: M::Config = self.load_config()?;
        check_manifest(&manifest, &M::manifest(&stored))?;

        tracing::info!("Loading checkpoint '{}'", path.display());

        // Decode the record; the recorder appends the extension itself
        let record: <M as Module<B>>::Record = CheckpointRecorder::new()
            .load(self.dir.join(BEST_CHECKPOINT), device)
            .map_err(|e| EvalError::CheckpointCorrupt {
                path:    path.clone(),
                message: format!("{e:?}"),
            })?;

        // Burn restores tensors without checking their shapes, so the
        // loaded model is compared against the live one before use
        let expected = state_shapes(&model, &manifest);
        let loaded   = model.load_record(record);
        check_manifest(&expected, &state_shapes(&loaded, &manifest))?;

        tracing::debug!("Restored {} parameter tensors", expected.len());
        Ok(loaded)
    }

    pub fn save_config<C: Serialize>(&self, cfg: &C) -> EvalResult<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.config_path();
        fs::write(&path, serde_json::to_string_pretty(cfg)?)?;
        tracing::debug!("Saved model config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config<C: DeserializeOwned>(&self) -> EvalResult<C> {
        let path = self.config_path();
        if !path.is_file() {
            return Err(EvalError::CheckpointMissing { path });
        }
        let json = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&json)?)
    }
}
