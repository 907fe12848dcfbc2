// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Workflow coordination only: no model math, no printing.
//
//   evaluate_use_case.rs — rebuild a model from its checkpoint
//                          directory, score it on a dataset file,
//                          persist the report
//   init_use_case.rs     — write a config and a freshly
//                          initialised best checkpoint
//
// Both are generic over the Burn backend; the CLI picks one.

/// Evaluate a checkpoint on a dataset file
pub mod evaluate_use_case;

/// Create a checkpoint directory for an untrained model
pub mod init_use_case;

/// GPU backend used by the CLI by default
pub type GpuBackend = burn::backend::Wgpu;

/// CPU backend, for machines without a usable GPU adapter
pub type CpuBackend = burn::backend::NdArray;
