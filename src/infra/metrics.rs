// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records one CSV row per training epoch in the log directory,
// so loss curves can be plotted after (or during) a run.
//
// Output file: logs/metrics.csv
//
//   epoch,train_loss,val_loss,learning_rate
//   1,0.041200,0.038900,0.001000
//   2,0.019300,0.018800,0.001000
//   ...
//
// The file is appended to across runs, so a resumed run simply
// continues the curve from its initial epoch.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

const CSV_HEADER: &str = "epoch,train_loss,val_loss,learning_rate";

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch index (0-based, the same index the scheduler sees)
    pub epoch: usize,

    /// Average MSE over all training batches
    pub train_loss: f64,

    /// Average MSE on the validation subset
    pub val_loss: f64,

    /// Learning rate in effect during this epoch
    pub learning_rate: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, val_loss: f64, learning_rate: f64) -> Self {
        Self { epoch, train_loss, val_loss, learning_rate }
    }

    /// Returns true if this epoch improved over the previous best val_loss
    pub fn is_improvement(&self, best_val_loss: f64) -> bool {
        self.val_loss < best_val_loss
    }

    fn csv_row(&self) -> String {
        format!(
            "{},{:.6},{:.6},{:.6}",
            self.epoch, self.train_loss, self.val_loss, self.learning_rate,
        )
    }
}

/// Appends epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create the log directory and write the CSV header if the file is new.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create log directory '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "{CSV_HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(f, "{}", m.csv_row())?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.6}, val_loss={:.6}",
            m.epoch,
            m.train_loss,
            m.val_loss,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_improvement() {
        let m = EpochMetrics::new(2, 2.5, 2.3, 1e-3);
        assert!(m.is_improvement(3.0));
        assert!(!m.is_improvement(2.0));
        assert!(m.is_improvement(f64::INFINITY));
    }

    #[test]
    fn test_rows_append_under_single_header() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("logs");
        let logger = MetricsLogger::new(&dir).unwrap();
        logger.log(&EpochMetrics::new(0, 0.5, 0.4, 1e-4)).unwrap();

        // A second logger (resumed run) must not rewrite the header
        let logger = MetricsLogger::new(&dir).unwrap();
        logger.log(&EpochMetrics::new(1, 0.25, 0.2, 1e-3)).unwrap();

        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines, vec![
            CSV_HEADER,
            "0,0.500000,0.400000,0.000100",
            "1,0.250000,0.200000,0.001000",
        ]);
    }
}
