// ============================================================
// Layer 5 — Evaluation Driver
// ============================================================
// Runs a trained model over a dataset once and scores it.
//
//   evaluate   — seed, build an ordered loader, restore the best
//                checkpoint, run one inference epoch, log a summary
//   run_epoch  — the inference loop itself
//
// Inference mode is a property of the backend in Burn: only an
// autodiff backend tracks gradients or applies dropout. The
// driver therefore refuses autodiff backends; call `.valid()` on
// a model trained with one before evaluating it.
//
// Test-split alignment
//   Windowed inference cannot label the first (window − 1) steps
//   of a recording. For the test split, (window − 1) copies of the
//   first true label are prepended to both label sequences so the
//   result lines up 1:1 with the raw sequence. The first label is
//   a placeholder assumption, not a prediction.

use burn::{
    nn::loss::{CrossEntropyLoss, CrossEntropyLossConfig},
    prelude::*,
    tensor::activation::softmax,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::data::{dataset::SensorDataset, loader::EvalLoader};
use crate::domain::report::{format_hms, EvalReport};
use crate::error::{EvalError, EvalResult};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{AverageMeter, ClassificationScores},
};
use crate::ml::har_model::HarModel;

// ─── Criterion ────────────────────────────────────────────────────────────────

/// Maps (logits [batch, classes], targets [batch]) to a scalar loss.
pub trait Criterion<B: Backend> {
    fn loss(&self, logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1>;
}

impl<B: Backend> Criterion<B> for CrossEntropyLoss<B> {
    fn loss(&self, logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1> {
        self.forward(logits, targets)
    }
}

/// Multi-class cross-entropy over raw logits and integer targets
pub fn default_criterion<B: Backend>(device: &B::Device) -> CrossEntropyLoss<B> {
    CrossEntropyLossConfig::new().init(device)
}

// ─── Options and results ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalOptions {
    pub batch_size: usize,
    /// Seeds the backend RNG. Iteration order never depends on it.
    pub seed: u64,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self { batch_size: 256, seed: 1 }
    }
}

/// Which label sequences `run_epoch` hands back besides the metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnMode {
    MetricsOnly,
    Predictions,
    Pairs,
}

impl ReturnMode {
    /// Predictions win when both are requested.
    pub fn from_flags(return_predictions: bool, return_pairs: bool) -> Self {
        match (return_predictions, return_pairs) {
            (true, _)      => ReturnMode::Predictions,
            (false, true)  => ReturnMode::Pairs,
            (false, false) => ReturnMode::MetricsOnly,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EpochOutputs {
    MetricsOnly,
    Predictions(Vec<usize>),
    Pairs { y_true: Vec<usize>, y_pred: Vec<usize> },
}

#[derive(Debug, Clone)]
pub struct EpochResult {
    pub loss:        f64,
    pub accuracy:    f64,
    pub f1_macro:    f64,
    pub f1_weighted: f64,
    pub outputs:     EpochOutputs,
}

// ─── evaluate ─────────────────────────────────────────────────────────────────

/// Restore the best checkpoint of `model` and evaluate it on `dataset`.
///
/// `criterion` defaults to cross-entropy.
pub fn evaluate<B, M>(
    model:       M,
    dataset:     SensorDataset,
    checkpoints: &CheckpointManager,
    criterion:   Option<&dyn Criterion<B>>,
    options:     &EvalOptions,
    device:      &B::Device,
) -> EvalResult<EvalReport>
where
    B: Backend,
    M: HarModel<B>,
{
    tracing::info!("Running HAR evaluation loop ...");

    B::seed(options.seed);
    let split  = dataset.prefix;
    let loader = EvalLoader::<B>::new(dataset, options.batch_size, device.clone())?;

    let model = checkpoints.load_best(model, device)?;

    let fallback;
    let criterion: &dyn Criterion<B> = match criterion {
        Some(c) => c,
        None => {
            fallback = default_criterion::<B>(device);
            &fallback
        }
    };

    let start  = Instant::now();
    let result = run_epoch(&model, &loader, criterion, true, false)?;
    let elapsed = start.elapsed();

    tracing::info!(
        "[-] {} loss: {:.2}\tacc: {:.2}(%)\tfm: {:.2}(%)\tfw: {:.2}(%)",
        split,
        result.loss,
        100.0 * result.accuracy,
        100.0 * result.f1_macro,
        100.0 * result.f1_weighted,
    );
    tracing::info!("Finished HAR evaluation loop (h:m:s): {}", format_hms(elapsed));

    let predictions = match result.outputs {
        EpochOutputs::Predictions(p) => p,
        _ => Vec::new(),
    };

    Ok(EvalReport {
        split,
        loss:        result.loss,
        accuracy:    result.accuracy,
        f1_macro:    result.f1_macro,
        f1_weighted: result.f1_weighted,
        elapsed,
        predictions,
    })
}

// ─── run_epoch ────────────────────────────────────────────────────────────────

/// One pass over `loader` without gradients or dropout.
pub fn run_epoch<B, M>(
    model:              &M,
    loader:             &EvalLoader<B>,
    criterion:          &dyn Criterion<B>,
    return_predictions: bool,
    return_pairs:       bool,
) -> EvalResult<EpochResult>
where
    B: Backend,
    M: HarModel<B>,
{
    if B::ad_enabled() {
        return Err(EvalError::TrainingBackend);
    }

    // Loss is averaged per window, not per batch: the last batch
    // is usually smaller than the others
    let mut losses = AverageMeter::new("Loss");
    let mut y_true: Vec<usize> = Vec::with_capacity(loader.num_items());
    let mut y_pred: Vec<usize> = Vec::with_capacity(loader.num_items());
    let mut last_window: Option<usize> = None;

    for (batch_idx, batch) in loader.iter().enumerate() {
        // Shape problems surface here as an error, before forward
        let dims = batch.inputs.dims();
        model.validate_input(dims)?;
        let [batch_size, window, _] = dims;

        let output = model.forward(batch.inputs);
        let loss   = criterion.loss(output.logits.clone(), batch.targets.clone());
        losses.update(loss.into_scalar().elem::<f64>(), batch_size);

        // argmax(1) returns [batch, 1]; flatten to [batch]
        let predictions = softmax(output.logits, 1).argmax(1).flatten::<1>(0, 1);

        // Back to the host in batch order; metrics need the full run
        y_pred.extend(to_labels(predictions)?);
        y_true.extend(to_labels(batch.targets)?);
        last_window = Some(window);

        tracing::debug!(
            "batch {:>4}: {} windows, running loss {:.4}",
            batch_idx, batch_size, losses.avg()
        );
    }

    // No batch at all means loss and metrics would be 0/0
    let window = last_window.ok_or(EvalError::EmptyLoader)?;

    if loader.split().is_test() {
        align_test_sequence(&mut y_true, &mut y_pred, window);
    }

    // Scored once over the concatenated run, never per batch
    let scores = ClassificationScores::compute(&y_true, &y_pred);

    let outputs = match ReturnMode::from_flags(return_predictions, return_pairs) {
        ReturnMode::Predictions => EpochOutputs::Predictions(y_pred),
        ReturnMode::Pairs       => EpochOutputs::Pairs { y_true, y_pred },
        ReturnMode::MetricsOnly => EpochOutputs::MetricsOnly,
    };

    Ok(EpochResult {
        loss:        losses.avg(),
        accuracy:    scores.accuracy,
        f1_macro:    scores.f1_macro,
        f1_weighted: scores.f1_weighted,
        outputs,
    })
}

/// Prepend (window − 1) copies of the first true label to both sequences.
pub fn align_test_sequence(y_true: &mut Vec<usize>, y_pred: &mut Vec<usize>, window: usize) {
    let Some(&first) = y_true.first() else { return };
    let pad = window.saturating_sub(1);

    y_true.splice(0..0, std::iter::repeat(first).take(pad));
    y_pred.splice(0..0, std::iter::repeat(first).take(pad));
}

/// Move an int tensor back to the host as class indices.
///
/// A negative value is not a class and fails the run.
fn to_labels<B: Backend>(t: Tensor<B, 1, Int>) -> EvalResult<Vec<usize>> {
    let values = t
        .into_data()
        .convert::<i64>()
        .to_vec::<i64>()
        .map_err(|e| EvalError::TensorData(format!("{e:?}")))?;
    values
        .into_iter()
        .map(|v| {
            usize::try_from(v)
                .map_err(|_| EvalError::TensorData(format!("negative class index {v}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::SensorDataset;
    use crate::domain::{split::Split, window::SensorWindow};
    use crate::ml::model::{AttendDiscriminate, AttendDiscriminateConfig};
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = NdArray;

    fn config() -> AttendDiscriminateConfig {
        AttendDiscriminateConfig::new(3, 4)
            .with_hidden_dim(8)
            .with_filter_num(4)
            .with_filter_size(2)
            .with_enc_num_layers(1)
    }

    fn dataset(split: Split, n: usize, window: usize, channels: usize) -> SensorDataset {
        let windows = (0..n)
            .map(|i| {
                let values = (0..window)
                    .map(|t| (0..channels).map(|c| ((i + t + c) as f32 * 0.37).sin()).collect())
                    .collect();
                SensorWindow::new(values, i % 4, i)
            })
            .collect();
        SensorDataset::new(split, windows)
    }

    #[test]
    fn test_labels_are_read_back_in_order() {
        let device = Default::default();
        let t = Tensor::<TestBackend, 1, Int>::from_ints([3, 0, 2], &device);
        assert_eq!(to_labels(t).unwrap(), vec![3, 0, 2]);
    }

    #[test]
    fn test_negative_label_is_an_error() {
        let device = Default::default();
        let t = Tensor::<TestBackend, 1, Int>::from_ints([1, -1], &device);
        match to_labels(t) {
            Err(EvalError::TensorData(message)) => assert!(message.contains("-1"), "{message}"),
            other => panic!("expected a tensor data error, got {other:?}"),
        }
    }

    #[test]
    fn test_return_mode_precedence() {
        assert_eq!(ReturnMode::from_flags(true, true), ReturnMode::Predictions);
        assert_eq!(ReturnMode::from_flags(true, false), ReturnMode::Predictions);
        assert_eq!(ReturnMode::from_flags(false, true), ReturnMode::Pairs);
        assert_eq!(ReturnMode::from_flags(false, false), ReturnMode::MetricsOnly);
    }

    #[test]
    fn test_align_prepends_first_label() {
        let mut y_true = vec![2, 1, 1];
        let mut y_pred = vec![0, 1, 0];
        align_test_sequence(&mut y_true, &mut y_pred, 4);
        assert_eq!(y_true, vec![2, 2, 2, 2, 1, 1]);
        assert_eq!(y_pred, vec![2, 2, 2, 0, 1, 0]);
    }

    #[test]
    fn test_align_window_of_one_is_noop() {
        let mut y_true = vec![1, 0];
        let mut y_pred = vec![1, 1];
        align_test_sequence(&mut y_true, &mut y_pred, 1);
        assert_eq!(y_true, vec![1, 0]);
        assert_eq!(y_pred, vec![1, 1]);
    }

    #[test]
    fn test_non_test_split_returns_one_prediction_per_window() {
        let device = Default::default();
        let model = AttendDiscriminate::<TestBackend>::construct(&config(), &device).unwrap();
        let loader = EvalLoader::<TestBackend>::new(dataset(Split::Val, 11, 8, 3), 4, device).unwrap();
        let criterion = default_criterion::<TestBackend>(&Default::default());

        let result = run_epoch(&model, &loader, &criterion, true, false).unwrap();
        match result.outputs {
            EpochOutputs::Predictions(p) => {
                assert_eq!(p.len(), 11);
                assert!(p.iter().all(|&c| c < 4));
            }
            other => panic!("expected predictions, got {other:?}"),
        }
        assert!(result.loss.is_finite());
        assert!((0.0..=1.0).contains(&result.accuracy));
    }

    #[test]
    fn test_test_split_is_padded_by_window_minus_one() {
        let device = Default::default();
        let model = AttendDiscriminate::<TestBackend>::construct(&config(), &device).unwrap();
        let loader = EvalLoader::<TestBackend>::new(dataset(Split::Test, 10, 8, 3), 3, device).unwrap();
        let criterion = default_criterion::<TestBackend>(&Default::default());

        let result = run_epoch(&model, &loader, &criterion, false, true).unwrap();
        match result.outputs {
            EpochOutputs::Pairs { y_true, y_pred } => {
                assert_eq!(y_true.len(), 10 + 7);
                assert_eq!(y_pred.len(), 10 + 7);
                // first true label is window 0's target (0)
                assert!(y_true[..7].iter().all(|&c| c == 0));
                assert!(y_pred[..7].iter().all(|&c| c == 0));
                assert_eq!(&y_true[7..], &[0, 1, 2, 3, 0, 1, 2, 3, 0, 1]);
            }
            other => panic!("expected pairs, got {other:?}"),
        }
    }

    #[test]
    fn test_metrics_only_mode() {
        let device = Default::default();
        let model = AttendDiscriminate::<TestBackend>::construct(&config(), &device).unwrap();
        let loader = EvalLoader::<TestBackend>::new(dataset(Split::Train, 5, 8, 3), 2, device).unwrap();
        let criterion = default_criterion::<TestBackend>(&Default::default());

        let result = run_epoch(&model, &loader, &criterion, false, false).unwrap();
        assert_eq!(result.outputs, EpochOutputs::MetricsOnly);
    }

    #[test]
    fn test_empty_loader_is_an_error() {
        let device = Default::default();
        let model = AttendDiscriminate::<TestBackend>::construct(&config(), &device).unwrap();
        let loader = EvalLoader::<TestBackend>::new(SensorDataset::new(Split::Test, Vec::new()), 4, device).unwrap();
        let criterion = default_criterion::<TestBackend>(&Default::default());

        assert!(matches!(
            run_epoch(&model, &loader, &criterion, true, false),
            Err(EvalError::EmptyLoader)
        ));
    }

    #[test]
    fn test_channel_mismatch_aborts_the_run() {
        let device = Default::default();
        let model = AttendDiscriminate::<TestBackend>::construct(&config(), &device).unwrap();
        let loader = EvalLoader::<TestBackend>::new(dataset(Split::Val, 4, 8, 5), 4, device).unwrap();
        let criterion = default_criterion::<TestBackend>(&Default::default());

        assert!(matches!(
            run_epoch(&model, &loader, &criterion, true, false),
            Err(EvalError::InputShape { found: [4, 8, 5], .. })
        ));
    }

    #[test]
    fn test_autodiff_backend_is_refused() {
        type Train = Autodiff<TestBackend>;
        let device = Default::default();
        let model = AttendDiscriminate::<Train>::construct(&config(), &device).unwrap();
        let loader = EvalLoader::<Train>::new(dataset(Split::Val, 2, 8, 3), 2, device).unwrap();
        let criterion = default_criterion::<Train>(&Default::default());

        assert!(matches!(
            run_epoch(&model, &loader, &criterion, true, false),
            Err(EvalError::TrainingBackend)
        ));
    }
}
