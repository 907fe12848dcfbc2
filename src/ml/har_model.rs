// ============================================================
// Layer 5 — Model Capability Trait
// ============================================================
// What the evaluation driver and checkpoint manager need from a
// HAR model, and nothing more:
//
//   construct  — build from a config on a device
//   forward    — window batch → (normalised embedding, logits)
//   manifest   — ordered (parameter name, shape) list derived from
//                a config; two models can exchange state iff
//                their manifests match
//
// New model variants implement this trait and compose their own
// building blocks; they do not extend an existing model.

use burn::{
    module::{ModuleVisitor, ParamId},
    prelude::*,
};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;

use crate::error::{ConfigError, EvalError};

/// Both outputs of one forward pass.
#[derive(Debug, Clone)]
pub struct ModelOutput<B: Backend> {
    /// Unit-L2 embedding per window — [batch, embedding_dim]
    pub z: Tensor<B, 2>,
    /// Raw class scores — [batch, num_class]
    pub logits: Tensor<B, 2>,
}

/// One entry of a model's state manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamShape {
    pub name: String,
    pub dims: Vec<usize>,
}

impl ParamShape {
    pub fn new(name: impl Into<String>, dims: &[usize]) -> Self {
        Self { name: name.into(), dims: dims.to_vec() }
    }

    pub fn numel(&self) -> usize {
        self.dims.iter().product()
    }
}

pub trait HarModel<B: Backend>: Module<B> + Sized {
    type Config: Clone + Debug + Serialize + DeserializeOwned;

    fn construct(config: &Self::Config, device: &B::Device) -> Result<Self, ConfigError>;

    fn config(&self) -> &Self::Config;

    /// input: [batch, time, channels]
    fn forward(&self, input: Tensor<B, 3>) -> ModelOutput<B>;

    /// Reject a [batch, time, channels] input the architecture cannot consume.
    fn validate_input(&self, dims: [usize; 3]) -> Result<(), EvalError>;

    fn manifest(config: &Self::Config) -> Vec<ParamShape>;
}

/// Compare a checkpoint's manifest against the live model's.
///
/// Parameters are matched by name; the first difference found is
/// reported, live-model order first.
pub fn check_manifest(live: &[ParamShape], stored: &[ParamShape]) -> Result<(), EvalError> {
    for expected in live {
        match stored.iter().find(|p| p.name == expected.name) {
            None => {
                return Err(EvalError::MissingParameter { name: expected.name.clone() });
            }
            Some(found) if found.dims != expected.dims => {
                return Err(EvalError::ShapeMismatch {
                    name:     expected.name.clone(),
                    expected: expected.dims.clone(),
                    found:    found.dims.clone(),
                });
            }
            Some(_) => {}
        }
    }

    if let Some(extra) = stored.iter().find(|p| !live.iter().any(|l| l.name == p.name)) {
        return Err(EvalError::UnexpectedParameter { name: extra.name.clone() });
    }
    Ok(())
}

// ─── Shapes of a live module ──────────────────────────────────────────────────

/// Records the dims of every float parameter, in visiting order.
struct ShapeCollector {
    dims: Vec<Vec<usize>>,
}

impl<B: Backend> ModuleVisitor<B> for ShapeCollector {
    fn visit_float<const D: usize>(&mut self, _id: ParamId, tensor: &Tensor<B, D>) {
        self.dims.push(tensor.dims().to_vec());
    }
}

/// Actual parameter shapes of `module`, labelled with the names of
/// `manifest`.
///
/// Modules visit their fields in declaration order, which is the
/// order manifests list them in. Entries beyond the manifest get a
/// positional name.
pub fn state_shapes<B: Backend, M: Module<B>>(module: &M, manifest: &[ParamShape]) -> Vec<ParamShape> {
    let mut collector = ShapeCollector { dims: Vec::new() };
    module.visit(&mut collector);

    collector
        .dims
        .into_iter()
        .enumerate()
        .map(|(i, dims)| {
            // Fall back to the position when the module has more
            // parameters than its manifest names
            let name = manifest
                .get(i)
                .map_or_else(|| format!("param.{i}"), |p| p.name.clone());
            ParamShape { name, dims }
        })
        .collect()
}
