// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and dispatches to one use case
// per subcommand. No training logic lives here.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, PredictArgs, RunArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "facial-landmark-trainer",
    version,
    about = "Train, evaluate and export a facial landmark regression network."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Evaluate(args) => run_evaluate(args),
            Commands::Export(args)   => run_export(args),
            Commands::Predict(args)  => run_predict(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!(
        "Starting training on '{}' (epochs {}..{})",
        args.run.train_dir.display(),
        args.initial_epoch,
        args.epochs
    );
    TrainUseCase::new(args.into()).execute()?;
    println!("Training complete.");
    Ok(())
}

fn run_evaluate(args: RunArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    let report = EvaluateUseCase::new(args.into()).execute()?;
    println!("Test loss: {:.6} ({} batches)", report.loss, report.batches);
    Ok(())
}

fn run_export(args: RunArgs) -> Result<()> {
    use crate::application::export_use_case::ExportUseCase;

    ExportUseCase::new(args.into()).execute()
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::PredictUseCase;

    let marks = PredictUseCase::new(args.export_dir)?.predict(&args.image)?;
    println!("{}", serde_json::to_string(&marks)?);
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::TrainConfig;

    #[test]
    fn test_train_defaults() {
        let cli = Cli::try_parse_from(["facial-landmark-trainer", "train"]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        assert_eq!((cfg.epochs, cfg.initial_epoch, cfg.run.batch_size), (60, 0, 32));
        assert_eq!(cfg.learning_rate, 0.0001);
        assert_eq!(cfg.val_samples, 320);
        assert_eq!(cfg.run.checkpoint_dir, std::path::PathBuf::from("./checkpoints"));
    }

    #[test]
    fn test_resume_flags() {
        let cli = Cli::try_parse_from([
            "facial-landmark-trainer", "train",
            "--initial-epoch", "30", "--epochs", "45", "--batch-size", "8",
        ])
        .unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        assert_eq!((args.initial_epoch, args.epochs, args.run.batch_size), (30, 45, 8));
    }

    #[test]
    fn test_export_and_predict_parse() {
        let cli = Cli::try_parse_from(["facial-landmark-trainer", "export", "--export-dir", "out"]).unwrap();
        assert!(matches!(cli.command, Commands::Export(ref a) if a.export_dir.ends_with("out")));

        assert!(Cli::try_parse_from(["facial-landmark-trainer", "predict"]).is_err());
        let cli = Cli::try_parse_from(["facial-landmark-trainer", "predict", "--image", "face.jpg"]).unwrap();
        assert!(matches!(cli.command, Commands::Predict(_)));
    }
}
