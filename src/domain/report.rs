// ============================================================
// Layer 3 — Evaluation Report
// ============================================================
// The result of one full evaluation run. Plain data: no tensors,
// no framework types, so it can be logged, serialised to JSON
// and compared in tests without a device.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::split::Split;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalReport {
    /// Split the evaluated dataset was tagged with
    pub split: Split,

    /// Sample-weighted mean of the per-batch criterion loss
    pub loss: f64,

    /// Fraction of labels predicted exactly, in [0, 1]
    pub accuracy: f64,

    /// Unweighted mean of per-class F1
    pub f1_macro: f64,

    /// Per-class F1 weighted by class support
    pub f1_weighted: f64,

    /// Wall-clock time of the inference pass
    pub elapsed: Duration,

    /// Predicted class per window, test-split padding included
    pub predictions: Vec<usize>,
}

impl EvalReport {
    /// Elapsed time rounded to whole seconds, formatted h:mm:ss
    pub fn elapsed_hms(&self) -> String {
        format_hms(self.elapsed)
    }
}

pub fn format_hms(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64().round() as u64;
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hms_rounds_to_seconds() {
        assert_eq!(format_hms(Duration::from_millis(2_600)), "0:00:03");
        assert_eq!(format_hms(Duration::from_secs(3_725)), "1:02:05");
        assert_eq!(format_hms(Duration::ZERO), "0:00:00");
    }
}
