// ============================================================
// Layer 5 — Recurrent Encoder
// ============================================================
// A stack of GRU layers over the time axis, optionally
// bidirectional. Burn's Gru is one layer in one direction, so
// the stack is assembled here:
//
//   layer 0 input:  d_input
//   layer l input:  d_hidden × directions   (l > 0)
//   output:         d_hidden × directions per time step
//
// The backward direction runs the same recurrence over the
// time-reversed sequence; its outputs are flipped back so both
// directions line up step for step before concatenation.
//
// Dropout sits between layers only, never after the last one.

use burn::{
    nn::{
        gru::{Gru, GruConfig},
        Dropout, DropoutConfig,
    },
    prelude::*,
};

#[derive(Config, Debug)]
pub struct GruEncoderConfig {
    pub d_input:  usize,
    pub d_hidden: usize,
    #[config(default = 1)]
    pub num_layers: usize,
    #[config(default = false)]
    pub bidirectional: bool,
    #[config(default = 0.0)]
    pub dropout: f64,
}

impl GruEncoderConfig {
    pub fn directions(&self) -> usize {
        if self.bidirectional { 2 } else { 1 }
    }

    /// Feature size of every output step
    pub fn d_output(&self) -> usize {
        self.d_hidden * self.directions()
    }

    /// Input width of layer `layer`
    pub fn layer_input(&self, layer: usize) -> usize {
        if layer == 0 { self.d_input } else { self.d_output() }
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> GruEncoder<B> {
        let build = |layer: usize| {
            GruConfig::new(self.layer_input(layer), self.d_hidden, true).init(device)
        };
        let forward_layers = (0..self.num_layers).map(build).collect();
        let backward_layers = if self.bidirectional {
            (0..self.num_layers).map(build).collect()
        } else {
            Vec::new()
        };
        GruEncoder {
            forward_layers,
            backward_layers,
            dropout: DropoutConfig::new(self.dropout).init(),
        }
    }
}

#[derive(Module, Debug)]
pub struct GruEncoder<B: Backend> {
    pub forward_layers:  Vec<Gru<B>>,
    /// Empty unless bidirectional
    pub backward_layers: Vec<Gru<B>>,
    pub dropout:         Dropout,
}

impl<B: Backend> GruEncoder<B> {
    /// x: [time, batch, d_input] → [time, batch, d_hidden × directions]
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        // Burn's Gru is batch-first
        let mut x = x.swap_dims(0, 1);
        let layers = self.forward_layers.len();

        for (l, gru) in self.forward_layers.iter().enumerate() {
            // None: every sequence starts from a zero hidden state
            let out_fwd = gru.forward(x.clone(), None);
            let out = match self.backward_layers.get(l) {
                Some(gru_rev) => {
                    // Reverse time, encode, then reverse back so step t
                    // of both directions describes the same reading
                    let out_rev = gru_rev.forward(x.flip([1]), None).flip([1]);
                    Tensor::cat(vec![out_fwd, out_rev], 2)
                }
                None => out_fwd,
            };
            // The last layer's output goes straight to attention pooling
            x = if l + 1 < layers { self.dropout.forward(out) } else { out };
        }

        x.swap_dims(0, 1)
    }
}
