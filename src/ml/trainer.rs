// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Epoch loop with Burn's DataLoader and Adam.
//
// For every epoch, in order:
//   1. the epoch scheduler resolves and installs the learning rate
//   2. training batches (autodiff backend, rate from step 1)
//   3. validation batches (inner backend, no autodiff overhead)
//   4. summary line + metrics CSV row
//   5. checkpoint when validation loss improved
//
// Epochs are 0-based and the loop runs initial_epoch..epochs, so a
// resumed run continues with the same epoch indices (and therefore
// the same scheduled rates) as an uninterrupted one.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{bail, Result};
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use std::sync::Arc;

use crate::data::{
    batcher::{LandmarkBatch, LandmarkBatcher},
    dataset::LandmarkDataset,
};
use crate::domain::schedule::EpochLrScheduler;
use crate::infra::{
    checkpoint::{BestCheckpoint, CheckpointManager},
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::{model::LandmarkNet, optimizer::ScheduledOptimizer};

const SHUFFLE_SEED: u64 = 42;

/// How datasets are turned into batches.
#[derive(Debug, Clone)]
pub struct LoaderSettings {
    pub batch_size:  usize,
    pub num_workers: usize,
    pub input_size:  usize,
}

/// Loop parameters that are not part of the model itself.
#[derive(Debug, Clone)]
pub struct FitSettings {
    pub initial_epoch: usize,
    pub epochs:        usize,
    pub learning_rate: f64,
    pub loader:        LoaderSettings,
}

/// Mean loss over a dataset.
#[derive(Debug, Clone, Copy)]
pub struct Evaluation {
    pub loss:    f64,
    pub batches: usize,
}

/// Per-epoch collaborators of `fit`.
pub struct Callbacks<'a> {
    pub scheduler:   &'a EpochLrScheduler,
    pub checkpoints: &'a CheckpointManager,
    pub metrics:     &'a MetricsLogger,
}

pub fn fit<B: AutodiffBackend>(
    mut model: LandmarkNet<B>,
    train:     LandmarkDataset,
    valid:     LandmarkDataset,
    settings:  &FitSettings,
    callbacks: Callbacks<'_>,
    device:    &B::Device,
) -> Result<LandmarkNet<B>> {
    if settings.initial_epoch >= settings.epochs {
        tracing::warn!(
            "initial epoch {} is not below epochs {}, nothing to train",
            settings.initial_epoch,
            settings.epochs
        );
        return Ok(model);
    }

    let mut optim = ScheduledOptimizer::new(AdamConfig::new().init(), settings.learning_rate);
    let mut best  = BestCheckpoint::new();

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_loader = DataLoaderBuilder::new(LandmarkBatcher::<B>::new(device.clone(), settings.loader.input_size))
        .batch_size(settings.loader.batch_size)
        .shuffle(SHUFFLE_SEED)
        .num_workers(settings.loader.num_workers)
        .build(train);

    // ── Validation data loader (InnerBackend) ─────────────────────────────────
    let valid_loader = loader::<B::InnerBackend>(valid, &settings.loader, device);

    for epoch in settings.initial_epoch..settings.epochs {
        let lr = callbacks.scheduler.on_epoch_begin(epoch, &mut optim)?;

        // ── Training phase ────────────────────────────────────────────────────
        let mut loss_sum = 0.0f64;
        let mut batches  = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(batch.images, batch.targets);
            loss_sum += loss.clone().into_scalar().elem::<f64>();
            batches  += 1;

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step::<_, B>(model, grads);
        }

        if batches == 0 {
            bail!("training set produced no batches");
        }
        let train_loss = loss_sum / batches as f64;

        // ── Validation phase ──────────────────────────────────────────────────
        let val_loss = mean_loss(&model.valid(), valid_loader.as_ref()).loss;

        println!(
            "Epoch {:>3}/{} | loss={:.6} | val_loss={:.6} | lr={:.6}",
            epoch + 1, settings.epochs, train_loss, val_loss, lr,
        );

        let metrics = EpochMetrics::new(epoch, train_loss, val_loss, lr);
        callbacks.metrics.log(&metrics)?;

        if best.observe(&metrics) {
            callbacks.checkpoints.save::<B, _>(&model, epoch, val_loss)?;
        }
    }

    tracing::info!("Training complete, best val_loss={:.6}", best.best());
    Ok(model)
}

/// Evaluate `model` on a full dataset.
pub fn evaluate<B: Backend>(
    model:    &LandmarkNet<B>,
    dataset:  LandmarkDataset,
    settings: &LoaderSettings,
    device:   &B::Device,
) -> Result<Evaluation> {
    if dataset.sample_count() == 0 {
        bail!("evaluation set is empty");
    }
    let eval_loader = loader::<B>(dataset, settings, device);
    let result = mean_loss(model, eval_loader.as_ref());
    tracing::info!("Evaluation: loss={:.6} over {} batches", result.loss, result.batches);
    Ok(result)
}

fn loader<B: Backend>(
    dataset:  LandmarkDataset,
    settings: &LoaderSettings,
    device:   &B::Device,
) -> Arc<dyn DataLoader<LandmarkBatch<B>>> {
    DataLoaderBuilder::new(LandmarkBatcher::<B>::new(device.clone(), settings.input_size))
        .batch_size(settings.batch_size)
        .num_workers(settings.num_workers)
        .build(dataset)
}

/// Average per-batch MSE; NaN for a loader with no batches.
fn mean_loss<B: Backend>(model: &LandmarkNet<B>, loader: &dyn DataLoader<LandmarkBatch<B>>) -> Evaluation {
    let mut loss_sum = 0.0f64;
    let mut batches  = 0usize;

    for batch in loader.iter() {
        let (loss, _) = model.forward_loss(batch.images, batch.targets);
        loss_sum += loss.into_scalar().elem::<f64>();
        batches  += 1;
    }

    let loss = if batches > 0 { loss_sum / batches as f64 } else { f64::NAN };
    Evaluation { loss, batches }
}
