//! End-to-end pruning over a synthetic fine-tuning loop
//!
//! Drives the callback lifecycle the way a training loop would: schedule
//! checks on step boundaries, synthetic gradients and SGD-style updates in
//! between, gradient masking before the optimizer in hook mode, and
//! re-masking after the optimizer in reapply mode.

use approx::assert_relative_eq;
use ndarray::Array1;
use podar::prune::{
    measured_sparsity, MagnitudePruningModifier, MaskMode, PruningCallback, PruningConfig,
};
use podar::train::{CallbackContext, TrainerCallback};
use podar::{Model, Tensor};

fn build_model() -> Model {
    let mut model = Model::new();
    // deterministic spread of magnitudes, including exact zeros
    let weight: Vec<f32> = (0..64)
        .map(|i| {
            let v = (i as f32) - 32.0;
            if i % 16 == 0 {
                0.0
            } else {
                v / 8.0
            }
        })
        .collect();
    model.add_param("encoder.weight", Tensor::from_slice(&weight));
    model.add_param(
        "decoder.weight",
        Tensor::from_slice(&[3.0, -7.0, 0.25, 12.0, -0.5, 4.5, -9.0, 1.5]),
    );
    model.add_param("encoder.bias", Tensor::from_slice(&[0.1, -0.2, 0.3, -0.4]));
    model
}

fn ctx_at(global_step: usize) -> CallbackContext {
    CallbackContext {
        global_step,
        ..CallbackContext::default()
    }
}

/// One SGD-style update from the stored gradient; the kind of step that
/// would drift pruned weights off zero without masking.
fn optimizer_step(model: &mut Model, lr: f32) {
    for (_, param) in model.named_parameters_mut() {
        if let Some(grad) = param.grad().cloned() {
            for (value, g) in param.data_mut().iter_mut().zip(grad.iter()) {
                *value -= lr * g;
            }
        }
        param.zero_grad();
    }
}

fn set_unit_gradients(model: &mut Model) {
    for (_, param) in model.named_parameters_mut() {
        param.set_grad(Array1::ones(param.len()));
    }
}

#[test]
fn hook_mode_keeps_pruned_weights_at_zero() {
    let mut model = build_model();
    let config = PruningConfig::new()
        .with_init_sparsity(0.0)
        .with_final_sparsity(0.75)
        .with_start_step(0)
        .with_end_step(200)
        .with_update_frequency(20)
        .with_prunable_params("weight")
        .with_mask_mode(MaskMode::GradientHook);
    let mut callback = PruningCallback::new(config).unwrap();

    callback.on_train_begin(&mut model, &ctx_at(0));
    assert_eq!(callback.modifier().num_prunable(), 2);

    for step in 0..=200 {
        let ctx = ctx_at(step);
        callback.on_step_begin(&mut model, &ctx);
        set_unit_gradients(&mut model);
        callback.mask_gradients(&mut model);
        optimizer_step(&mut model, 0.01);
        callback.on_step_end(&mut model, &ctx);

        // invariant: entries the current mask prunes stay exactly zero
        for name in ["encoder.weight", "decoder.weight"] {
            let mask = callback.modifier().engine().mask(name).unwrap();
            let param = model.param(name).unwrap();
            for (value, keep) in param.data().iter().zip(mask.values()) {
                if !keep {
                    assert_eq!(*value, 0.0, "pruned entry of {name} drifted at step {step}");
                }
            }
        }
    }

    assert_relative_eq!(callback.current_sparsity(), 0.75, epsilon = 1e-6);
    // 64 * 0.75 = 48 pruned at minimum; exact zeros tie at the threshold
    // and may push the achieved sparsity higher
    let encoder = model.param("encoder.weight").unwrap();
    assert!(measured_sparsity(encoder) >= 0.75);
    // bias was not selected and kept receiving full gradients
    let bias = model.param("encoder.bias").unwrap();
    assert!(bias.data().iter().all(|&v| v != 0.0));

    callback.on_train_end(&mut model, &ctx_at(201));
    assert_eq!(callback.modifier().num_prunable(), 0);
}

#[test]
fn reapply_mode_rezeros_after_every_optimizer_step() {
    let mut model = build_model();
    let config = PruningConfig::new()
        .with_final_sparsity(0.5)
        .with_end_step(100)
        .with_update_frequency(25)
        .with_mask_mode(MaskMode::Reapply);
    let mut callback = PruningCallback::new(config).unwrap();

    callback.on_train_begin(&mut model, &ctx_at(0));
    for step in 0..=100 {
        let ctx = ctx_at(step);
        callback.on_step_begin(&mut model, &ctx);
        // no gradient masking: every weight takes the full update
        set_unit_gradients(&mut model);
        optimizer_step(&mut model, 0.05);
        callback.on_step_end(&mut model, &ctx);

        let mask = callback.modifier().engine().mask("decoder.weight").unwrap();
        let param = model.param("decoder.weight").unwrap();
        for (value, keep) in param.data().iter().zip(mask.values()) {
            if !keep {
                assert_eq!(*value, 0.0, "re-masking missed a drifted entry at step {step}");
            }
        }
    }
}

#[test]
fn global_and_per_param_modes_diverge() {
    let mut per_param_model = Model::new();
    per_param_model.add_param("a", Tensor::from_slice(&[1.0, 2.0, 3.0]));
    per_param_model.add_param("b", Tensor::from_slice(&[10.0, 20.0, 30.0]));
    let mut global_model = per_param_model.clone();

    let base = PruningConfig::new()
        .with_init_sparsity(0.34)
        .with_final_sparsity(0.34)
        .with_start_step(0)
        .with_end_step(10)
        .with_update_frequency(10);

    let mut per_param = MagnitudePruningModifier::new(base.clone()).unwrap();
    per_param.initialize(&per_param_model);
    per_param.check_mask_update(&mut per_param_model, 10);

    let mut global =
        MagnitudePruningModifier::new(base.with_global_sparsity(true)).unwrap();
    global.initialize(&global_model);
    global.check_mask_update(&mut global_model, 10);

    // per-parameter: one prune inside each tensor
    assert_relative_eq!(
        measured_sparsity(per_param_model.param("a").unwrap()),
        1.0 / 3.0,
        epsilon = 1e-6
    );
    assert_relative_eq!(
        measured_sparsity(per_param_model.param("b").unwrap()),
        1.0 / 3.0,
        epsilon = 1e-6
    );

    // global: pooled k = floor(6 * 0.34) = 2, threshold 2 — both prunes
    // land in the small-magnitude tensor
    assert_relative_eq!(
        measured_sparsity(global_model.param("a").unwrap()),
        2.0 / 3.0,
        epsilon = 1e-6
    );
    assert_relative_eq!(
        measured_sparsity(global_model.param("b").unwrap()),
        0.0,
        epsilon = 1e-6
    );
}

#[test]
fn comp_scores_on_cpu_does_not_change_results() {
    let mut on_host = build_model();
    let mut offloaded = build_model();

    let base = PruningConfig::new()
        .with_final_sparsity(0.6)
        .with_end_step(10)
        .with_update_frequency(10)
        .with_global_sparsity(true);

    let mut a = MagnitudePruningModifier::new(base.clone()).unwrap();
    a.initialize(&on_host);
    a.check_mask_update(&mut on_host, 10);

    let mut b = MagnitudePruningModifier::new(base.with_comp_scores_on_cpu(true)).unwrap();
    b.initialize(&offloaded);
    b.check_mask_update(&mut offloaded, 10);

    for (name, param) in on_host.named_parameters() {
        assert_eq!(
            param.data(),
            offloaded.param(name).unwrap().data(),
            "score placement must not change pruning output for {name}"
        );
    }
}

#[test]
fn sparsity_is_monotone_over_the_schedule() {
    let mut model = build_model();
    let config = PruningConfig::new()
        .with_init_sparsity(0.05)
        .with_final_sparsity(0.9)
        .with_end_step(300)
        .with_update_frequency(30)
        .with_inter_pow(3.0);
    let mut modifier = MagnitudePruningModifier::new(config).unwrap();
    modifier.initialize(&model);

    let mut prev = 0.0;
    for step in 0..=300 {
        if modifier.check_mask_update(&mut model, step) {
            let sparsity = modifier.current_sparsity();
            assert!(
                sparsity >= prev - 1e-6,
                "sparsity decreased from {prev} to {sparsity} at step {step}"
            );
            prev = sparsity;
        }
    }
    assert_relative_eq!(prev, 0.9, epsilon = 1e-6);
}
