// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Four subcommands: `train`, `evaluate`, `export`, `predict`.
// Every command that touches the model shares RunArgs, so the
// same directories and model shape flags work everywhere.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::train_use_case::{RunConfig, TrainConfig};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the landmark model, resuming from the latest checkpoint
    Train(TrainArgs),

    /// Evaluate the latest checkpoint on the test set without training
    Evaluate(RunArgs),

    /// Save the latest checkpoint as an inference bundle without training
    Export(RunArgs),

    /// Predict landmarks for one image with an exported model
    Predict(PredictArgs),
}

/// Directories and model shape shared by train, evaluate and export.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Directory of training images with .json mark files
    #[arg(long, default_value = "data/wflw_cropped/train")]
    pub train_dir: PathBuf,

    /// Directory of test images with .json mark files
    #[arg(long, default_value = "data/wflw_cropped/test")]
    pub test_dir: PathBuf,

    /// Checkpoints used to resume training
    #[arg(long, default_value = "./checkpoints")]
    pub checkpoint_dir: PathBuf,

    /// Where the inference bundle is written
    #[arg(long, default_value = "./exported")]
    pub export_dir: PathBuf,

    /// Training logs (per-epoch metrics CSV)
    #[arg(long, default_value = "./logs")]
    pub log_dir: PathBuf,

    /// Samples per batch
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Data loader worker threads
    #[arg(long, default_value_t = 4)]
    pub num_workers: usize,

    /// Side length images are resized to
    #[arg(long, default_value_t = 256)]
    pub input_size: usize,

    /// Channel width of the first network stage
    #[arg(long, default_value_t = 18)]
    pub width: usize,

    /// Landmarks per face
    #[arg(long, default_value_t = 98)]
    pub num_marks: usize,
}

impl From<RunArgs> for RunConfig {
    fn from(a: RunArgs) -> Self {
        RunConfig {
            train_dir:      a.train_dir,
            test_dir:       a.test_dir,
            checkpoint_dir: a.checkpoint_dir,
            export_dir:     a.export_dir,
            log_dir:        a.log_dir,
            batch_size:     a.batch_size,
            num_workers:    a.num_workers,
            input_size:     a.input_size,
            width:          a.width,
            num_marks:      a.num_marks,
        }
    }
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Index of the final epoch (exclusive)
    #[arg(long, default_value_t = 60)]
    pub epochs: usize,

    /// Epoch to resume training from
    #[arg(long, default_value_t = 0)]
    pub initial_epoch: usize,

    /// Optimizer rate before the schedule's first breakpoint
    #[arg(long, default_value_t = 0.0001)]
    pub learning_rate: f64,

    /// Leading test samples used for validation
    #[arg(long, default_value_t = 320)]
    pub val_samples: usize,
}

impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            run:           a.run.into(),
            epochs:        a.epochs,
            initial_epoch: a.initial_epoch,
            learning_rate: a.learning_rate,
            val_samples:   a.val_samples,
        }
    }
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Cropped face image
    #[arg(long)]
    pub image: PathBuf,

    /// Directory written by `export`
    #[arg(long, default_value = "./exported")]
    pub export_dir: PathBuf,
}
