// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between windowed sensor data and device tensors.
//
//   SensorDataset   → implements Burn's Dataset trait, tagged with its split
//       │
//       ▼
//   HarBatcher      → stacks windows into [batch, time, channels] tensors
//       │
//       ▼
//   EvalLoader      → ordered, non-shuffled DataLoader + split tag
//
// Windowing raw recordings into SensorWindows happens upstream;
// this layer receives windows that are already cut.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Implements Burn's Dataset trait for sensor windows
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Deterministic evaluation loader and dataset file reader
pub mod loader;
