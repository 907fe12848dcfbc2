// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Two subcommands: `evaluate` and `init`.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::evaluate_use_case::EvaluateConfig;
use crate::ml::{
    evaluator::EvalOptions,
    feature_extractor::Activation,
    model::AttendDiscriminateConfig,
};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate the best checkpoint on a dataset file
    Evaluate(EvaluateArgs),

    /// Write a config and an untrained checkpoint
    Init(InitArgs),
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Directory holding checkpoint_best.mpk.gz and model_config.json
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: PathBuf,

    /// Sensor dataset serialised as JSON
    #[arg(long = "data")]
    pub data_path: PathBuf,

    #[arg(long, default_value_t = 256)]
    pub batch_size: usize,

    /// Backend RNG seed
    #[arg(long, default_value_t = 1)]
    pub seed: u64,

    /// Run on the CPU (ndarray) instead of the GPU
    #[arg(long)]
    pub cpu: bool,
}

impl From<&EvaluateArgs> for EvaluateConfig {
    fn from(a: &EvaluateArgs) -> Self {
        EvaluateConfig {
            checkpoint_dir: a.checkpoint_dir.clone(),
            data_path:      a.data_path.clone(),
            options:        EvalOptions { batch_size: a.batch_size, seed: a.seed },
        }
    }
}

#[derive(Args, Debug)]
pub struct InitArgs {
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: PathBuf,

    /// Sensor channels per time step
    #[arg(long)]
    pub input_dim: usize,

    /// Number of activity classes
    #[arg(long)]
    pub num_class: usize,

    /// GRU hidden size
    #[arg(long, default_value_t = 128)]
    pub hidden_dim: usize,

    /// Output channels of each temporal convolution
    #[arg(long, default_value_t = 64)]
    pub filter_num: usize,

    /// Temporal kernel length of each convolution
    #[arg(long, default_value_t = 5)]
    pub filter_size: usize,

    #[arg(long, default_value_t = 2)]
    pub enc_num_layers: usize,

    #[arg(long)]
    pub enc_is_bidirectional: bool,

    #[arg(long, default_value_t = 0.5)]
    pub dropout: f64,

    #[arg(long, default_value_t = 0.5)]
    pub dropout_rnn: f64,

    #[arg(long, default_value_t = 0.5)]
    pub dropout_cls: f64,

    /// relu or tanh
    #[arg(long, value_enum, default_value_t = Activation::Relu)]
    pub activation: Activation,

    /// Self-attention query/key channel divisor
    #[arg(long, default_value_t = 1)]
    pub sa_div: usize,

    /// Seed for weight initialisation
    #[arg(long, default_value_t = 1)]
    pub seed: u64,

    #[arg(long)]
    pub cpu: bool,
}

impl From<&InitArgs> for AttendDiscriminateConfig {
    fn from(a: &InitArgs) -> Self {
        AttendDiscriminateConfig::new(a.input_dim, a.num_class)
            .with_hidden_dim(a.hidden_dim)
            .with_filter_num(a.filter_num)
            .with_filter_size(a.filter_size)
            .with_enc_num_layers(a.enc_num_layers)
            .with_enc_is_bidirectional(a.enc_is_bidirectional)
            .with_dropout(a.dropout)
            .with_dropout_rnn(a.dropout_rnn)
            .with_dropout_cls(a.dropout_cls)
            .with_activation(a.activation)
            .with_sa_div(a.sa_div)
    }
}
