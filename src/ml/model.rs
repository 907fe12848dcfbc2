// ============================================================
// Layer 5 — Attend-and-Discriminate Model
// ============================================================
// FeatureExtractor → feature f [batch, embedding_dim]
//   z      = f / ‖f‖₂                  (no dropout)
//   logits = Classifier(Dropout(f))
//
// `centers` holds one reference embedding per class. It is part
// of the saved state, gets no gradient, and forward ignores it.
//
// Reference: Abedin et al. (2021) Attend and Discriminate

use burn::{
    module::{Ignored, Param},
    nn::{Dropout, DropoutConfig, Linear, LinearConfig},
    prelude::*,
    tensor::Distribution,
};

use crate::error::{ConfigError, EvalError};
use crate::ml::encoder::GruEncoderConfig;
use crate::ml::feature_extractor::{Activation, FeatureExtractor, FeatureExtractorConfig};
use crate::ml::har_model::{HarModel, ModelOutput, ParamShape};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct AttendDiscriminateConfig {
    /// Sensor channels per time step
    pub input_dim: usize,
    pub num_class: usize,
    #[config(default = 128)]
    pub hidden_dim: usize,
    #[config(default = 64)]
    pub filter_num: usize,
    #[config(default = 5)]
    pub filter_size: usize,
    #[config(default = 2)]
    pub enc_num_layers: usize,
    #[config(default = false)]
    pub enc_is_bidirectional: bool,
    #[config(default = 0.5)]
    pub dropout: f64,
    #[config(default = 0.5)]
    pub dropout_rnn: f64,
    #[config(default = 0.5)]
    pub dropout_cls: f64,
    #[config(default = "Activation::Relu")]
    pub activation: Activation,
    #[config(default = 1)]
    pub sa_div: usize,
}

impl AttendDiscriminateConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let at_least_one = [
            ("input_dim", self.input_dim),
            ("num_class", self.num_class),
            ("hidden_dim", self.hidden_dim),
            ("filter_num", self.filter_num),
            ("filter_size", self.filter_size),
            ("enc_num_layers", self.enc_num_layers),
            ("sa_div", self.sa_div),
        ];
        for (field, value) in at_least_one {
            if value < 1 {
                return Err(ConfigError::TooSmall { field, min: 1, value });
            }
        }

        if self.filter_num > 1 && self.sa_div > self.filter_num {
            return Err(ConfigError::DivisorTooLarge {
                sa_div:     self.sa_div,
                filter_num: self.filter_num,
            });
        }

        for (field, value) in [
            ("dropout", self.dropout),
            ("dropout_rnn", self.dropout_rnn),
            ("dropout_cls", self.dropout_cls),
        ] {
            if !(0.0..1.0).contains(&value) {
                return Err(ConfigError::InvalidDropout { field, value });
            }
        }
        Ok(())
    }

    pub fn feature_extractor(&self) -> FeatureExtractorConfig {
        FeatureExtractorConfig::new(
            self.input_dim,
            self.hidden_dim,
            self.filter_num,
            self.filter_size,
            self.enc_num_layers,
            self.enc_is_bidirectional,
            self.dropout,
            self.dropout_rnn,
            self.activation,
            self.sa_div,
        )
    }

    /// Size of z: hidden_dim, doubled when the encoder is bidirectional
    pub fn embedding_dim(&self) -> usize {
        self.feature_extractor().embedding_dim()
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> AttendDiscriminate<B> {
        let embedding_dim = self.embedding_dim();
        tracing::info!(
            "Creating AttendDiscriminate HAR model: {} channels → {} classes, embedding {}",
            self.input_dim, self.num_class, embedding_dim
        );

        let centers = Tensor::<B, 2>::random(
            [self.num_class, embedding_dim],
            Distribution::Normal(0.0, 1.0),
            device,
        );

        AttendDiscriminate {
            fe:         self.feature_extractor().init(device),
            dropout:    DropoutConfig::new(self.dropout_cls).init(),
            classifier: ClassifierConfig::new(embedding_dim, self.num_class).init(device),
            // Saved with the model but never trained by its optimiser
            centers:    Param::from_tensor(centers).set_require_grad(false),
            config:     Ignored(self.clone()),
        }
    }
}

// ─── Classifier ───────────────────────────────────────────────────────────────

#[derive(Config, Debug)]
pub struct ClassifierConfig {
    pub hidden_dim: usize,
    pub num_class:  usize,
}

impl ClassifierConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Classifier<B> {
        Classifier { fc: LinearConfig::new(self.hidden_dim, self.num_class).init(device) }
    }
}

/// Linear head producing raw logits.
#[derive(Module, Debug)]
pub struct Classifier<B: Backend> {
    pub fc: Linear<B>,
}

impl<B: Backend> Classifier<B> {
    pub fn forward(&self, z: Tensor<B, 2>) -> Tensor<B, 2> {
        self.fc.forward(z)
    }
}

// ─── AttendDiscriminate ───────────────────────────────────────────────────────

#[derive(Module, Debug)]
pub struct AttendDiscriminate<B: Backend> {
    pub fe:         FeatureExtractor<B>,
    pub dropout:    Dropout,
    pub classifier: Classifier<B>,
    /// Reference embedding per class — [num_class, embedding_dim].
    /// Part of the saved state; excluded from gradients and not
    /// used by forward.
    pub centers:    Param<Tensor<B, 2>>,
    pub config:     Ignored<AttendDiscriminateConfig>,
}

impl<B: Backend> HarModel<B> for AttendDiscriminate<B> {
    type Config = AttendDiscriminateConfig;

    fn construct(config: &Self::Config, device: &B::Device) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(config.init(device))
    }

    fn config(&self) -> &Self::Config {
        &self.config.0
    }

    fn forward(&self, input: Tensor<B, 3>) -> ModelOutput<B> {
        let feature = self.fe.forward(input);

        let norm = (feature.clone() * feature.clone()).sum_dim(1).sqrt(); // [batch, 1]
        let z = feature.clone() / norm;

        // Logits see dropout on the un-normalised feature; z never does
        let logits = self.classifier.forward(self.dropout.forward(feature));

        ModelOutput { z, logits }
    }

    fn validate_input(&self, dims: [usize; 3]) -> Result<(), EvalError> {
        let cfg = self.config();
        let [batch, time, channels] = dims;
        let min_time = cfg.feature_extractor().min_time_steps();

        let reason = if batch == 0 {
            Some("batch is empty".to_string())
        } else if channels != cfg.input_dim {
            Some(format!("model expects {} channels per time step", cfg.input_dim))
        } else if time < min_time {
            Some(format!(
                "four convolutions of size {} need at least {} time steps",
                cfg.filter_size, min_time
            ))
        } else {
            None
        };

        match reason {
            Some(reason) => Err(EvalError::InputShape { found: dims, reason }),
            None => Ok(()),
        }
    }

    fn manifest(cfg: &Self::Config) -> Vec<ParamShape> {
        let f  = cfg.filter_num;
        let fs = cfg.filter_size;
        let e  = cfg.embedding_dim();

        let mut params = Vec::new();

        for (i, channels_in) in [1, f, f, f].into_iter().enumerate() {
            params.push(ParamShape::new(format!("fe.conv{}.weight", i + 1), &[f, channels_in, fs, 1]));
            params.push(ParamShape::new(format!("fe.conv{}.bias", i + 1), &[f]));
        }

        let qk = cfg.feature_extractor().self_attention().qk_channels();
        for (proj, width) in [("query", qk), ("key", qk), ("value", f)] {
            params.push(ParamShape::new(format!("fe.sa.{proj}.weight"), &[width, f, 1]));
            params.push(ParamShape::new(format!("fe.sa.{proj}.bias"), &[width]));
        }
        params.push(ParamShape::new("fe.sa.gamma", &[1]));

        let enc: GruEncoderConfig = cfg.feature_extractor().encoder();
        let h = enc.d_hidden;
        let directions: &[&str] = if enc.bidirectional {
            &["forward_layers", "backward_layers"]
        } else {
            &["forward_layers"]
        };
        for direction in directions {
            for layer in 0..enc.num_layers {
                let d_in = enc.layer_input(layer);
                for gate in ["update_gate", "reset_gate", "new_gate"] {
                    let prefix = format!("fe.rnn.{direction}.{layer}.{gate}");
                    params.push(ParamShape::new(format!("{prefix}.input_transform.weight"), &[d_in, h]));
                    params.push(ParamShape::new(format!("{prefix}.input_transform.bias"), &[h]));
                    params.push(ParamShape::new(format!("{prefix}.hidden_transform.weight"), &[h, h]));
                    params.push(ParamShape::new(format!("{prefix}.hidden_transform.bias"), &[h]));
                }
            }
        }

        params.push(ParamShape::new("fe.ta.fc.weight", &[e, 1]));
        params.push(ParamShape::new("fe.ta.fc.bias", &[1]));
        params.push(ParamShape::new("classifier.fc.weight", &[e, cfg.num_class]));
        params.push(ParamShape::new("classifier.fc.bias", &[cfg.num_class]));
        params.push(ParamShape::new("centers", &[cfg.num_class, e]));
        params
    }
}
