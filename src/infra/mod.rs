// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by the ML and application layers:
//
//   checkpoint.rs  — best-state record plus the model config as
//                    JSON, with a parameter-manifest check before
//                    any weight is restored
//
//   metrics.rs     — running loss meter, accuracy and F1 scores,
//                    and the CSV/JSON evaluation log
//
// Reference: Burn Book §5 (Checkpointing)

/// Best-checkpoint saving and loading
pub mod checkpoint;

/// Loss meter, classification scores, evaluation log
pub mod metrics;
