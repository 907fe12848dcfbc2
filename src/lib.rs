// ============================================================
// har_attend_eval
// ============================================================
// Attend-and-Discriminate for wearable-sensor human activity
// recognition, and the loop that evaluates a trained model.
//
// Layers, outermost first:
//   cli          — clap commands (binary only uses this)
//   application  — evaluate / init workflows
//   domain       — plain data: windows, splits, reports
//   data         — Burn dataset, batcher and ordered loader
//   ml           — model, attention blocks, evaluation epoch
//   infra        — checkpoints and metrics
//
// `error` holds the typed errors shared by the library layers.

#![recursion_limit = "256"]

pub mod error;

pub mod cli;
pub mod application;
pub mod domain;
pub mod data;
pub mod ml;
pub mod infra;
