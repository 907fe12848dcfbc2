mod common;

use burn::prelude::*;
use har_attend_eval::{
    infra::checkpoint::CheckpointManager,
    ml::{
        har_model::HarModel,
        model::{AttendDiscriminate, AttendDiscriminateConfig},
    },
};
use rand::{rngs::StdRng, Rng, SeedableRng};

use common::{small_config, TestBackend};

fn random_input(shape: [usize; 3], seed: u64) -> Tensor<TestBackend, 3> {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = shape.iter().product::<usize>();
    let values: Vec<f32> = (0..n).map(|_| rng.gen_range(-2.0f32..2.0)).collect();
    Tensor::<TestBackend, 1>::from_floats(values.as_slice(), &Default::default()).reshape(shape)
}

#[test]
fn test_end_to_end_shapes_with_reference_hidden_size() {
    let device = Default::default();
    let cfg = AttendDiscriminateConfig::new(9, 5).with_hidden_dim(128);
    let model = AttendDiscriminate::<TestBackend>::construct(&cfg, &device).unwrap();

    let out = model.forward(random_input([4, 24, 9], 1));
    assert_eq!(out.logits.dims(), [4, 5]);
    assert_eq!(out.z.dims(), [4, 128]);

    let logits = out.logits.into_data().to_vec::<f32>().unwrap();
    assert!(logits.iter().all(|v| v.is_finite()));
}

#[test]
fn test_embeddings_have_unit_norm() {
    let device = Default::default();
    let model = AttendDiscriminate::<TestBackend>::construct(&small_config(6, 3), &device).unwrap();

    let z = model.forward(random_input([5, 20, 6], 2)).z;
    let norms = (z.clone() * z).sum_dim(1).sqrt().into_data().to_vec::<f32>().unwrap();
    assert_eq!(norms.len(), 5);
    for norm in norms {
        approx::assert_abs_diff_eq!(norm, 1.0, epsilon = 1e-5);
    }
}

#[test]
fn test_bidirectional_embedding_is_doubled() {
    let device = Default::default();
    let cfg = small_config(4, 3).with_enc_is_bidirectional(true);
    let model = AttendDiscriminate::<TestBackend>::construct(&cfg, &device).unwrap();

    let out = model.forward(random_input([2, 16, 4], 3));
    assert_eq!(out.z.dims(), [2, 32]);
    assert_eq!(out.logits.dims(), [2, 3]);
}

#[test]
fn test_checkpoint_round_trip_is_bit_identical() {
    let dir = tempfile::tempdir().unwrap();
    let ckpt = CheckpointManager::new(dir.path());
    let device = Default::default();
    let cfg = small_config(5, 4);

    TestBackend::seed(11);
    let saved = AttendDiscriminate::<TestBackend>::construct(&cfg, &device).unwrap();
    ckpt.save_best(&saved).unwrap();

    TestBackend::seed(99);
    let fresh = AttendDiscriminate::<TestBackend>::construct(&cfg, &device).unwrap();
    let restored = ckpt.load_best(fresh, &device).unwrap();

    let input = random_input([3, 18, 5], 4);
    let before = saved.forward(input.clone());
    let after = restored.forward(input);

    assert_eq!(
        before.logits.into_data().to_vec::<f32>().unwrap(),
        after.logits.into_data().to_vec::<f32>().unwrap(),
    );
    assert_eq!(
        before.z.into_data().to_vec::<f32>().unwrap(),
        after.z.into_data().to_vec::<f32>().unwrap(),
    );
    assert_eq!(
        saved.centers.val().into_data().to_vec::<f32>().unwrap(),
        restored.centers.val().into_data().to_vec::<f32>().unwrap(),
    );
}
