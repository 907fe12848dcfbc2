// ============================================================
// Layer 4 — Evaluation Loader
// ============================================================
// Wraps Burn's DataLoader together with the split tag of the
// dataset it iterates. Burn's loader hides its dataset behind a
// trait object, so the tag travels alongside it here; the
// evaluation loop needs it for test-sequence alignment.
//
// Ordering guarantees:
//   - no shuffling, ever
//   - a single loader worker: Burn's multi-worker loader yields
//     batches in completion order, which would break alignment
//     of test predictions with the source recording
//
// Also reads serialized datasets (JSON) from disk for the CLI.

use anyhow::{Context, Result};
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    prelude::*,
};
use std::{fs, path::Path, sync::Arc};

use crate::data::{
    batcher::{HarBatch, HarBatcher},
    dataset::SensorDataset,
};
use crate::domain::split::Split;
use crate::error::{EvalError, EvalResult};

pub struct EvalLoader<B: Backend> {
    loader:      Arc<dyn DataLoader<HarBatch<B>>>,
    split:       Split,
    num_items:   usize,
}

impl<B: Backend> EvalLoader<B> {
    /// Build a deterministic, non-shuffled loader over `dataset`.
    ///
    /// Every window must share one (time, channels) shape; the
    /// batcher stacks them into a single tensor.
    pub fn new(dataset: SensorDataset, batch_size: usize, device: B::Device) -> EvalResult<Self> {
        // Reject mixed shapes here: inside the loader they would
        // panic on a worker thread instead of returning an error
        if let Some(odd) = dataset.first_irregular() {
            let (time, channels) = (
                dataset.window_size().unwrap_or(0),
                dataset.channels().unwrap_or(0),
            );
            return Err(EvalError::InputShape {
                found:  [1, odd.time_steps(), odd.channels()],
                reason: format!(
                    "window {} does not match the {time} × {channels} shape of the first window",
                    odd.index
                ),
            });
        }

        let split     = dataset.prefix;
        let num_items = burn::data::dataset::Dataset::len(&dataset);

        let batcher = HarBatcher::<B>::new(device);
        let loader  = DataLoaderBuilder::new(batcher)
            .batch_size(batch_size.max(1))
            .num_workers(1)
            .build(dataset);

        tracing::debug!(
            "Eval loader ready: split={}, {} windows, batch_size={}",
            split, num_items, batch_size
        );
        Ok(Self { loader, split, num_items })
    }

    /// Split tag of the underlying dataset
    pub fn split(&self) -> Split { self.split }

    /// Number of windows (not batches) the loader yields
    pub fn num_items(&self) -> usize { self.num_items }

    pub fn iter(&self) -> impl Iterator<Item = HarBatch<B>> + '_ {
        self.loader.iter()
    }
}

/// Read a `SensorDataset` serialised as JSON.
///
/// Rejects datasets whose windows do not all share one shape,
/// since they could never be stacked into a batch tensor.
pub fn load_dataset_json(path: &Path) -> Result<SensorDataset> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read dataset '{}'", path.display()))?;

    let dataset: SensorDataset = serde_json::from_str(&json)
        .with_context(|| format!("'{}' is not a valid sensor dataset", path.display()))?;

    if !dataset.is_uniform() {
        anyhow::bail!(
            "Dataset '{}' mixes window shapes; every window must be time_steps × channels",
            path.display()
        );
    }

    tracing::info!(
        "Loaded {} {} windows from '{}'",
        dataset.windows().len(),
        dataset.prefix,
        path.display()
    );
    Ok(dataset)
}
