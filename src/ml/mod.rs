// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// Everything that builds or runs the network lives here.
//
//   attention.rs          — channel self-attention and temporal
//                           attention pooling
//   encoder.rs            — stacked (optionally bidirectional) GRU
//   feature_extractor.rs  — conv stack → self-attention → GRU →
//                           temporal attention
//   har_model.rs          — the contract every HAR model meets
//                           (forward, input check, parameter
//                           manifest)
//   model.rs              — Attend-and-Discriminate: feature
//                           extractor, normalised embedding,
//                           classifier, class centers
//   evaluator.rs          — checkpoint restore and the inference
//                           epoch that scores a model
//
// Reference: Burn Book §3 (Building Blocks)
//            Abedin et al. (2021) Attend and Discriminate

pub mod attention;

pub mod encoder;

pub mod feature_extractor;

pub mod har_model;

/// Attend-and-Discriminate architecture
pub mod model;

/// Inference epoch and evaluation driver
pub mod evaluator;
