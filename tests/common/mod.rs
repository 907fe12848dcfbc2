#![allow(dead_code)]

use har_attend_eval::{
    data::dataset::SensorDataset,
    domain::{split::Split, window::SensorWindow},
    ml::model::AttendDiscriminateConfig,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

pub type TestBackend = burn::backend::NdArray;

/// Small model that still runs every block.
pub fn small_config(input_dim: usize, num_class: usize) -> AttendDiscriminateConfig {
    AttendDiscriminateConfig::new(input_dim, num_class)
        .with_hidden_dim(16)
        .with_filter_num(8)
        .with_filter_size(3)
}

/// `n` random windows of `time × channels`, labels cycling through `num_class`.
pub fn random_windows(n: usize, time: usize, channels: usize, num_class: usize, seed: u64) -> Vec<SensorWindow> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let values = (0..time)
                .map(|_| (0..channels).map(|_| rng.gen_range(-1.0f32..1.0)).collect())
                .collect();
            SensorWindow::new(values, i % num_class, i)
        })
        .collect()
}

pub fn random_dataset(split: Split, n: usize, time: usize, channels: usize, num_class: usize) -> SensorDataset {
    SensorDataset::new(split, random_windows(n, time, channels, num_class, 7))
}
