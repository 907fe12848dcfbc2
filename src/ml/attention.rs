// ============================================================
// Layer 5 — Attention Blocks
// ============================================================
// Two attention modules from Abedin et al. (2021),
// "Attend and Discriminate":
//
//   SelfAttention     — SAGAN-style attention across the channel
//                       axis of a feature map. A learned gate
//                       (gamma) starts at 0, so a freshly built
//                       block passes its input through unchanged.
//
//   TemporalAttention — scores every time step of an encoded
//                       sequence and collapses it into one
//                       context vector per sample.
//
// Reference: Zhang et al. (2019) Self-Attention GANs
//            Burn Book §3 (Building Blocks)

use burn::{
    module::Param,
    nn::{
        conv::{Conv1d, Conv1dConfig},
        Initializer, Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::softmax,
};

/// Kaiming-normal with the gain PyTorch uses for ReLU networks (√2)
pub(crate) fn kaiming_normal() -> Initializer {
    Initializer::KaimingNormal {
        gain:         core::f64::consts::SQRT_2,
        fan_out_only: false,
    }
}

/// 1×1 convolution, Kaiming-normal weights, zero bias.
fn conv1x1<B: Backend>(ni: usize, no: usize, device: &B::Device) -> Conv1d<B> {
    let mut conv = Conv1dConfig::new(ni, no, 1)
        .with_initializer(kaiming_normal())
        .init(device);
    conv.bias = conv
        .bias
        .map(|_| Param::from_tensor(Tensor::<B, 1>::zeros([no], device)));
    conv
}

// ─── SelfAttention ────────────────────────────────────────────────────────────

#[derive(Config, Debug)]
pub struct SelfAttentionConfig {
    /// Channel axis size of the input (dim 1)
    pub n_channels: usize,
    /// Query/key reduction divisor
    #[config(default = 1)]
    pub div: usize,
}

impl SelfAttentionConfig {
    /// Query/key width. A single channel is never divided,
    /// which would leave a zero-width projection.
    pub fn qk_channels(&self) -> usize {
        if self.n_channels > 1 {
            self.n_channels / self.div
        } else {
            self.n_channels
        }
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> SelfAttention<B> {
        let qk = self.qk_channels();
        SelfAttention {
            query: conv1x1(self.n_channels, qk, device),
            key:   conv1x1(self.n_channels, qk, device),
            value: conv1x1(self.n_channels, self.n_channels, device),
            gamma: Param::from_tensor(Tensor::zeros([1], device)),
        }
    }
}

#[derive(Module, Debug)]
pub struct SelfAttention<B: Backend> {
    pub query: Conv1d<B>,
    pub key:   Conv1d<B>,
    pub value: Conv1d<B>,
    /// Attention gate, owned by this block
    pub gamma: Param<Tensor<B, 1>>,
}

impl<B: Backend> SelfAttention<B> {
    /// x: [batch, channels, *spatial] → same shape.
    pub fn forward<const D: usize>(&self, x: Tensor<B, D>) -> Tensor<B, D> {
        let dims = x.dims();
        let spatial: usize = dims[2..].iter().product();
        let x = x.reshape([dims[0], dims[1], spatial]);

        let f = self.query.forward(x.clone()); // [b, c', n]
        let g = self.key.forward(x.clone());   // [b, c', n]
        let h = self.value.forward(x.clone()); // [b, c,  n]

        // beta[b, i, j]: weight of position i when building output position j
        let beta = softmax(f.swap_dims(1, 2).matmul(g), 1); // [b, n, n]
        let gamma = self.gamma.val().reshape([1, 1, 1]);
        let o = h.matmul(beta) * gamma + x;

        o.reshape(dims)
    }
}

// ─── TemporalAttention ────────────────────────────────────────────────────────

#[derive(Config, Debug)]
pub struct TemporalAttentionConfig {
    /// Feature size of each encoded time step
    pub hidden_dim: usize,
}

impl TemporalAttentionConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> TemporalAttention<B> {
        TemporalAttention {
            fc: LinearConfig::new(self.hidden_dim, 1).init(device),
        }
    }
}

#[derive(Module, Debug)]
pub struct TemporalAttention<B: Backend> {
    pub fc: Linear<B>,
}

impl<B: Backend> TemporalAttention<B> {
    /// Per-step attention weights: [time, batch, 1], summing to 1 over time.
    pub fn weights(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        softmax(self.fc.forward(x), 0)
    }

    /// x: [time, batch, hidden] → context: [batch, hidden]
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 2> {
        let [_, batch, hidden] = x.dims();
        let w = self.weights(x.clone());
        (w * x).sum_dim(0).reshape([batch, hidden])
    }
}
