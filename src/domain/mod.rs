// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types describing what the system works with:
// sensor windows, dataset splits and evaluation reports.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain structs and enums
//
// Keeping this layer free of tensors means every other layer
// (data, ml, infra, application) can exchange these types
// without caring which backend or device is active.

/// A fixed-length multichannel sensor segment with its label
pub mod window;

/// Train / validation / test tag carried by every dataset
pub mod split;

/// Outcome of a full evaluation run
pub mod report;
