// ============================================================
// Layer 6 — Metrics
// ============================================================
// Three pieces:
//
//   AverageMeter          — running, sample-weighted mean of a
//                           scalar (the per-batch loss)
//   ClassificationScores  — accuracy, macro-F1 and weighted-F1
//                           over two label sequences
//   EvaluationLogger      — appends one CSV row per evaluation
//
// F1 follows the usual multi-class definitions: the label set is
// the union of true and predicted labels; a class with no
// predicted and no true samples cannot appear, and a class with
// zero precision and recall scores 0.
//
//   F1_c        = 2·TP_c / (2·TP_c + FP_c + FN_c)
//   macro-F1    = mean_c F1_c
//   weighted-F1 = Σ_c support_c · F1_c / Σ_c support_c
//
// Example CSV output (checkpoints/evaluation.csv):
//   split,windows,loss,accuracy,f1_macro,f1_weighted,elapsed_secs
//   test,4120,0.412300,0.893000,0.701200,0.884100,12.402

use anyhow::Result;
use std::{
    collections::BTreeMap,
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

use crate::domain::report::EvalReport;

// ─── AverageMeter ─────────────────────────────────────────────────────────────

/// Running mean of a scalar, weighted by the number of samples
/// each observation stands for.
#[derive(Debug, Clone)]
pub struct AverageMeter {
    pub name: String,
    /// Most recent observation
    pub val:   f64,
    pub sum:   f64,
    pub count: usize,
}

impl AverageMeter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), val: 0.0, sum: 0.0, count: 0 }
    }

    /// Record `val` as the mean over `n` samples.
    pub fn update(&mut self, val: f64, n: usize) {
        self.val    = val;
        self.sum   += val * n as f64;
        self.count += n;
    }

    /// Mean over all recorded samples; NaN before the first update.
    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.sum / self.count as f64
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(std::mem::take(&mut self.name));
    }
}

// ─── Classification scores ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationScores {
    pub accuracy:    f64,
    pub f1_macro:    f64,
    pub f1_weighted: f64,
}

#[derive(Debug, Default, Clone, Copy)]
struct ClassCounts {
    tp:      usize,
    fp:      usize,
    fn_:     usize,
}

impl ClassCounts {
    fn support(&self) -> usize {
        self.tp + self.fn_
    }

    fn f1(&self) -> f64 {
        let denom = 2 * self.tp + self.fp + self.fn_;
        if denom == 0 { 0.0 } else { (2 * self.tp) as f64 / denom as f64 }
    }
}

impl ClassificationScores {
    /// Scores for `y_pred` against `y_true`.
    ///
    /// Sequences must have equal length. Empty input yields NaN
    /// for every score.
    pub fn compute(y_true: &[usize], y_pred: &[usize]) -> Self {
        debug_assert_eq!(
            y_true.len(), y_pred.len(),
            "label sequences differ in length"
        );

        if y_true.is_empty() {
            tracing::warn!("Scoring an empty label sequence; all metrics are NaN");
            return Self { accuracy: f64::NAN, f1_macro: f64::NAN, f1_weighted: f64::NAN };
        }

        let mut counts: BTreeMap<usize, ClassCounts> = BTreeMap::new();
        let mut correct = 0usize;

        // One pass builds the per-class confusion counts.
        // A miss is a false negative for the true class and a false
        // positive for the predicted one.
        for (&t, &p) in y_true.iter().zip(y_pred) {
            if t == p {
                correct += 1;
                counts.entry(t).or_default().tp += 1;
            } else {
                counts.entry(t).or_default().fn_ += 1;
                counts.entry(p).or_default().fp += 1;
            }
        }

        // Support-weighted mean divides by all samples, which equals
        // the total support of the true classes
        let n = y_true.len() as f64;
        let f1_macro = counts.values().map(ClassCounts::f1).sum::<f64>() / counts.len() as f64;
        let f1_weighted = counts
            .values()
            .map(|c| c.support() as f64 * c.f1())
            .sum::<f64>()
            / n;

        Self { accuracy: correct as f64 / n, f1_macro, f1_weighted }
    }
}

// ─── EvaluationLogger ─────────────────────────────────────────────────────────

/// Appends evaluation summaries to a CSV file and writes the
/// latest full report as JSON.
pub struct EvaluationLogger {
    dir:      PathBuf,
    csv_path: PathBuf,
}

impl EvaluationLogger {
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("evaluation.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "split,windows,loss,accuracy,f1_macro,f1_weighted,elapsed_secs")?;
            tracing::debug!("Created evaluation CSV: '{}'", csv_path.display());
        }

        Ok(Self { dir, csv_path })
    }

    pub fn log(&self, report: &EvalReport) -> Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;
        writeln!(
            f,
            "{},{},{:.6},{:.6},{:.6},{:.6},{:.3}",
            report.split,
            report.predictions.len(),
            report.loss,
            report.accuracy,
            report.f1_macro,
            report.f1_weighted,
            report.elapsed.as_secs_f64(),
        )?;

        let json_path = self.dir.join("eval_report.json");
        fs::write(&json_path, serde_json::to_string_pretty(report)?)?;

        tracing::debug!(
            "Logged {} evaluation: loss={:.4}, acc={:.4}",
            report.split, report.loss, report.accuracy,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::split::Split;
    use approx::assert_abs_diff_eq;
    use std::time::Duration;

    #[test]
    fn test_average_meter_weights_by_count() {
        let mut m = AverageMeter::new("Loss");
        m.update(1.0, 3);
        m.update(3.0, 1);
        assert_abs_diff_eq!(m.avg(), 1.5, epsilon = 1e-12);
        assert_eq!(m.count, 4);
        assert_eq!(m.val, 3.0);
    }

    #[test]
    fn test_average_meter_empty_is_nan() {
        let mut m = AverageMeter::new("Loss");
        assert!(m.avg().is_nan());
        m.update(2.0, 2);
        m.reset();
        assert!(m.avg().is_nan());
        assert_eq!(m.name, "Loss");
    }

    #[test]
    fn test_perfect_predictions() {
        let y = vec![0, 1, 2, 2, 1, 0];
        let s = ClassificationScores::compute(&y, &y);
        assert_eq!(s.accuracy, 1.0);
        assert_eq!(s.f1_macro, 1.0);
        assert_eq!(s.f1_weighted, 1.0);
    }

    #[test]
    fn test_predicted_only_class_counts_in_macro() {
        // Class 2 is never true but predicted once: F1_2 = 0
        let y_true = vec![0, 0, 1, 1];
        let y_pred = vec![0, 0, 1, 2];
        let s = ClassificationScores::compute(&y_true, &y_pred);
        // F1_0 = 1, F1_1 = 2/3, F1_2 = 0
        assert_abs_diff_eq!(s.f1_macro, (1.0 + 2.0 / 3.0) / 3.0, epsilon = 1e-12);
        // support 2, 2, 0
        assert_abs_diff_eq!(s.f1_weighted, (2.0 + 2.0 * 2.0 / 3.0) / 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.accuracy, 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_sequences_are_nan() {
        let s = ClassificationScores::compute(&[], &[]);
        assert!(s.accuracy.is_nan() && s.f1_macro.is_nan() && s.f1_weighted.is_nan());
    }

    #[test]
    fn test_logger_appends_rows() {
        let dir = tempfile::tempdir().unwrap();
        let logger = EvaluationLogger::new(dir.path()).unwrap();
        let report = EvalReport {
            split:       Split::Test,
            loss:        0.5,
            accuracy:    0.9,
            f1_macro:    0.8,
            f1_weighted: 0.85,
            elapsed:     Duration::from_millis(1500),
            predictions: vec![0, 1, 1],
        };
        logger.log(&report).unwrap();
        logger.log(&report).unwrap();

        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "test,3,0.500000,0.900000,0.800000,0.850000,1.500");
        assert!(dir.path().join("eval_report.json").exists());
    }
}
