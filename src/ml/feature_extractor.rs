// ============================================================
// Layer 5 — Feature Extractor
// ============================================================
// Turns one window of raw sensor readings into a fixed-size
// embedding:
//
//   [batch, time, channels]
//       │ unsqueeze image channel
//   [batch, 1, time, channels]
//       │ 4 × Conv2d (kernel filter_size × 1) + activation
//   [batch, filters, time', channels]       time' = time − 4·(filter_size − 1)
//       │ SelfAttention over (filters, channels) at every step
//       │ permute + flatten
//   [time', batch, filters·channels]
//       │ dropout → GRU stack → TemporalAttention
//   [batch, hidden × directions]
//
// Convolutions run along time only; sensor channels are never
// mixed until the recurrent encoder.

use burn::{
    module::{Ignored, Param},
    nn::{
        conv::{Conv2d, Conv2dConfig},
        Dropout, DropoutConfig,
    },
    prelude::*,
    tensor::activation::{relu, tanh},
};
use serde::{Deserialize, Serialize};

use crate::ml::attention::{
    kaiming_normal, SelfAttention, SelfAttentionConfig, TemporalAttention, TemporalAttentionConfig,
};
use crate::ml::encoder::{GruEncoder, GruEncoderConfig};

/// Non-linearity applied after every convolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Relu,
    Tanh,
}

impl Activation {
    pub fn apply<B: Backend, const D: usize>(&self, x: Tensor<B, D>) -> Tensor<B, D> {
        match self {
            Activation::Relu => relu(x),
            Activation::Tanh => tanh(x),
        }
    }
}

#[derive(Config, Debug)]
pub struct FeatureExtractorConfig {
    pub input_dim:            usize,
    pub hidden_dim:           usize,
    pub filter_num:           usize,
    pub filter_size:          usize,
    pub enc_num_layers:       usize,
    pub enc_is_bidirectional: bool,
    pub dropout:              f64,
    pub dropout_rnn:          f64,
    pub activation:           Activation,
    pub sa_div:               usize,
}

impl FeatureExtractorConfig {
    pub fn encoder(&self) -> GruEncoderConfig {
        GruEncoderConfig::new(self.filter_num * self.input_dim, self.hidden_dim)
            .with_num_layers(self.enc_num_layers)
            .with_bidirectional(self.enc_is_bidirectional)
            .with_dropout(self.dropout_rnn)
    }

    pub fn self_attention(&self) -> SelfAttentionConfig {
        SelfAttentionConfig::new(self.filter_num).with_div(self.sa_div)
    }

    /// Embedding width: the encoder's per-step output size
    pub fn embedding_dim(&self) -> usize {
        self.encoder().d_output()
    }

    /// Shortest window that survives the four valid convolutions
    pub fn min_time_steps(&self) -> usize {
        4 * (self.filter_size - 1) + 1
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> FeatureExtractor<B> {
        let conv = |channels_in: usize| self.conv(channels_in, device);
        FeatureExtractor {
            conv1:      conv(1),
            conv2:      conv(self.filter_num),
            conv3:      conv(self.filter_num),
            conv4:      conv(self.filter_num),
            activation: Ignored(self.activation),
            dropout:    DropoutConfig::new(self.dropout).init(),
            sa:         self.self_attention().init(device),
            rnn:        self.encoder().init(device),
            ta:         TemporalAttentionConfig::new(self.embedding_dim()).init(device),
        }
    }

    /// Time-axis convolution, Kaiming-normal weights, zero bias
    fn conv<B: Backend>(&self, channels_in: usize, device: &B::Device) -> Conv2d<B> {
        let mut conv = Conv2dConfig::new([channels_in, self.filter_num], [self.filter_size, 1])
            .with_initializer(kaiming_normal())
            .init(device);
        conv.bias = conv
            .bias
            .map(|_| Param::from_tensor(Tensor::<B, 1>::zeros([self.filter_num], device)));
        conv
    }
}

#[derive(Module, Debug)]
pub struct FeatureExtractor<B: Backend> {
    pub conv1:      Conv2d<B>,
    pub conv2:      Conv2d<B>,
    pub conv3:      Conv2d<B>,
    pub conv4:      Conv2d<B>,
    pub activation: Ignored<Activation>,
    pub dropout:    Dropout,
    pub sa:         SelfAttention<B>,
    pub rnn:        GruEncoder<B>,
    pub ta:         TemporalAttention<B>,
}

impl<B: Backend> FeatureExtractor<B> {
    /// x: [batch, time, channels] → [batch, embedding_dim]
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 2> {
        let act = self.activation.0;

        let x = x.unsqueeze_dim::<4>(1);
        let x = act.apply(self.conv1.forward(x));
        let x = act.apply(self.conv2.forward(x));
        let x = act.apply(self.conv3.forward(x));
        let x = act.apply(self.conv4.forward(x));

        // Self-attention across (filters, channels) at each time step.
        // Steps are independent, so they are folded into the batch axis.
        let [batch, filters, steps, channels] = x.dims();
        let per_step = x.swap_dims(1, 2).reshape([batch * steps, filters, channels, 1]);
        let refined = self
            .sa
            .forward(per_step)
            .reshape([batch, steps, filters, channels]);

        let x = refined
            .swap_dims(0, 1)
            .reshape([steps, batch, filters * channels]);
        let x = self.dropout.forward(x);

        let outputs = self.rnn.forward(x);
        self.ta.forward(outputs)
    }
}
