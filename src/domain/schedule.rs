// ============================================================
// Layer 3 — Epoch-Based Learning Rate Schedule
// ============================================================
// A schedule is a short, sorted list of (epoch, rate) breakpoints.
// At the start of every epoch the training loop asks the schedule
// which learning rate should be in effect for that epoch.
//
// Resolution rule for epoch `e` and the optimizer's current rate:
//
//   e before the first breakpoint   → keep the current rate
//   e after the last breakpoint     → keep the current rate
//   e equal to a breakpoint's epoch → that breakpoint's rate
//   e strictly between breakpoints  → keep the current rate
//
// Breakpoints are sparse overrides layered on top of whatever rate
// the optimizer already has. Nothing is interpolated, and the last
// breakpoint is never repeated or extended.
//
// Resuming at epoch N therefore re-derives the rate from the epoch
// counter alone; the rate itself is never persisted.

use thiserror::Error;

use crate::domain::traits::LearningRateControl;

/// Errors raised while building a schedule or reading the rate it drives.
#[derive(Debug, Error, PartialEq)]
pub enum ScheduleError {
    #[error("learning rate schedule must contain at least one breakpoint")]
    Empty,

    #[error("schedule breakpoints must be sorted by epoch: epoch {next} follows epoch {previous}")]
    Unsorted { previous: usize, next: usize },

    #[error("schedule contains epoch {0} more than once")]
    DuplicateEpoch(usize),

    #[error("schedule rate for epoch {epoch} must be positive and finite, got {rate}")]
    InvalidRate { epoch: usize, rate: f64 },

    #[error("optimizer reported a non-finite learning rate ({0}) at epoch start")]
    InvalidCurrentRate(f64),
}

/// One explicit override: at `epoch`, install `rate`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    pub epoch: usize,
    pub rate:  f64,
}

impl From<(usize, f64)> for Breakpoint {
    fn from((epoch, rate): (usize, f64)) -> Self {
        Self { epoch, rate }
    }
}

/// A validated, non-empty, strictly ascending list of breakpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    breakpoints: Vec<Breakpoint>,
}

impl Schedule {
    /// Build a schedule, rejecting empty, unsorted or duplicated epochs
    /// and any rate that is not a positive finite number.
    pub fn new<I, P>(breakpoints: I) -> Result<Self, ScheduleError>
    where
        I: IntoIterator<Item = P>,
        P: Into<Breakpoint>,
    {
        let breakpoints: Vec<Breakpoint> = breakpoints.into_iter().map(Into::into).collect();

        if breakpoints.is_empty() {
            return Err(ScheduleError::Empty);
        }

        for bp in &breakpoints {
            if !bp.rate.is_finite() || bp.rate <= 0.0 {
                return Err(ScheduleError::InvalidRate { epoch: bp.epoch, rate: bp.rate });
            }
        }

        for pair in breakpoints.windows(2) {
            let (previous, next) = (pair[0].epoch, pair[1].epoch);
            if next == previous {
                return Err(ScheduleError::DuplicateEpoch(next));
            }
            if next < previous {
                return Err(ScheduleError::Unsorted { previous, next });
            }
        }

        Ok(Self { breakpoints })
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    /// Epoch of the first breakpoint.
    pub fn first_epoch(&self) -> usize {
        self.breakpoints[0].epoch
    }

    /// Epoch of the last breakpoint.
    pub fn last_epoch(&self) -> usize {
        self.breakpoints[self.breakpoints.len() - 1].epoch
    }

    /// The learning rate that should be in effect during `epoch`.
    ///
    /// Returns `current_rate` untouched unless `epoch` lands exactly on a
    /// breakpoint.
    pub fn resolve(&self, epoch: usize, current_rate: f64) -> f64 {
        if epoch < self.first_epoch() || epoch > self.last_epoch() {
            return current_rate;
        }
        // Epochs are sorted and unique, so a binary search finds the exact match.
        match self.breakpoints.binary_search_by_key(&epoch, |bp| bp.epoch) {
            Ok(index) => self.breakpoints[index].rate,
            Err(_)    => current_rate,
        }
    }
}

/// Drives a [`LearningRateControl`] from a [`Schedule`] once per epoch.
///
/// Holds no state beyond the schedule itself: the current rate is read
/// back from the driven optimizer on every call.
#[derive(Debug, Clone)]
pub struct EpochLrScheduler {
    schedule: Schedule,
}

impl EpochLrScheduler {
    pub fn new(schedule: Schedule) -> Self {
        Self { schedule }
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Read the optimizer's rate, resolve it for `epoch`, write it back
    /// and log the rate that will be used. Must run before the epoch's
    /// first training step.
    pub fn on_epoch_begin<T>(&self, epoch: usize, target: &mut T) -> Result<f64, ScheduleError>
    where
        T: LearningRateControl + ?Sized,
    {
        let current = target.learning_rate();
        if !current.is_finite() {
            return Err(ScheduleError::InvalidCurrentRate(current));
        }

        let scheduled = self.schedule.resolve(epoch, current);
        target.set_learning_rate(scheduled);

        tracing::info!("{}", announcement(epoch, scheduled));
        Ok(scheduled)
    }
}

/// `Epoch 00030: Learning rate is 0.000100.`
pub fn announcement(epoch: usize, rate: f64) -> String {
    format!("Epoch {epoch:05}: Learning rate is {rate:.6}.")
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn hrnet_schedule() -> Schedule {
        Schedule::new([(1, 0.001), (30, 0.0001), (50, 0.00001)]).unwrap()
    }

    /// Minimal stand-in for an optimizer with a mutable rate.
    struct FixedRate(f64);

    impl LearningRateControl for FixedRate {
        fn learning_rate(&self) -> f64 {
            self.0
        }

        fn set_learning_rate(&mut self, rate: f64) {
            self.0 = rate;
        }
    }

    #[test]
    fn test_reference_table() {
        let s = hrnet_schedule();
        assert_eq!(s.resolve(0, 0.0005), 0.0005);
        assert_eq!(s.resolve(1, 0.0005), 0.001);
        assert_eq!(s.resolve(15, 0.001), 0.001);
        assert_eq!(s.resolve(30, 0.001), 0.0001);
        assert_eq!(s.resolve(49, 0.0001), 0.0001);
        assert_eq!(s.resolve(51, 0.00001), 0.00001);
    }

    #[test]
    fn test_before_first_breakpoint_keeps_current() {
        let s = Schedule::new([(5, 0.1), (10, 0.01)]).unwrap();
        for epoch in 0..5 {
            assert_eq!(s.resolve(epoch, 0.42), 0.42);
        }
    }

    #[test]
    fn test_after_last_breakpoint_freezes_instead_of_repeating() {
        let s = hrnet_schedule();
        // The last breakpoint's rate is NOT re-applied past epoch 50.
        assert_eq!(s.resolve(51, 0.003), 0.003);
        assert_eq!(s.resolve(1_000, 0.7), 0.7);
    }

    #[test]
    fn test_exact_match_ignores_current_rate() {
        let s = hrnet_schedule();
        for bp in s.breakpoints() {
            assert_eq!(s.resolve(bp.epoch, 123.0), bp.rate);
            assert_eq!(s.resolve(bp.epoch, 0.0), bp.rate);
        }
    }

    #[test]
    fn test_between_breakpoints_no_interpolation_no_carry() {
        let s = hrnet_schedule();
        // Current rate wins even though the last breakpoint said 0.001
        assert_eq!(s.resolve(2, 0.5), 0.5);
        assert_eq!(s.resolve(29, 0.5), 0.5);
        assert_eq!(s.resolve(31, 0.2), 0.2);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let s = hrnet_schedule();
        for epoch in 0..60 {
            assert_eq!(s.resolve(epoch, 0.01), s.resolve(epoch, 0.01));
        }
    }

    #[test]
    fn test_single_breakpoint_at_zero() {
        let s = Schedule::new([(0, 0.05)]).unwrap();
        assert_eq!(s.resolve(0, 1.0), 0.05);
        assert_eq!(s.resolve(1, 1.0), 1.0);
    }

    #[test]
    fn test_rejects_malformed_schedules() {
        let empty: [(usize, f64); 0] = [];
        assert_eq!(Schedule::new(empty), Err(ScheduleError::Empty));
        assert_eq!(
            Schedule::new([(10, 0.1), (3, 0.01)]),
            Err(ScheduleError::Unsorted { previous: 10, next: 3 })
        );
        assert_eq!(
            Schedule::new([(3, 0.1), (3, 0.01)]),
            Err(ScheduleError::DuplicateEpoch(3))
        );
        assert_eq!(
            Schedule::new([(1, 0.0)]),
            Err(ScheduleError::InvalidRate { epoch: 1, rate: 0.0 })
        );
        assert!(matches!(
            Schedule::new([(1, f64::NAN)]),
            Err(ScheduleError::InvalidRate { epoch: 1, .. })
        ));
    }

    #[test]
    fn test_on_epoch_begin_walks_a_training_run() {
        let scheduler = EpochLrScheduler::new(hrnet_schedule());
        let mut optim = FixedRate(0.0001);

        let mut seen = Vec::new();
        for epoch in 0..60 {
            seen.push(scheduler.on_epoch_begin(epoch, &mut optim).unwrap());
            assert_eq!(optim.learning_rate(), seen[epoch]);
        }

        assert_eq!(seen[0], 0.0001);
        assert!(seen[1..30].iter().all(|&lr| lr == 0.001));
        assert!(seen[30..50].iter().all(|&lr| lr == 0.0001));
        assert!(seen[50..].iter().all(|&lr| lr == 0.00001));
    }

    #[test]
    fn test_resume_rederives_rate_from_epoch() {
        // Resuming at epoch 30 with a freshly built optimizer still lands
        // on the right rate for that epoch.
        let scheduler = EpochLrScheduler::new(hrnet_schedule());
        let mut optim = FixedRate(0.0001);
        assert_eq!(scheduler.on_epoch_begin(30, &mut optim).unwrap(), 0.0001);
        let mut optim = FixedRate(0.0001);
        assert_eq!(scheduler.on_epoch_begin(50, &mut optim).unwrap(), 0.00001);
    }

    #[test]
    fn test_on_epoch_begin_rejects_non_finite_rate() {
        let scheduler = EpochLrScheduler::new(hrnet_schedule());
        let mut optim = FixedRate(f64::INFINITY);
        assert_eq!(
            scheduler.on_epoch_begin(1, &mut optim),
            Err(ScheduleError::InvalidCurrentRate(f64::INFINITY))
        );
        // Nothing was written back
        assert_eq!(optim.learning_rate(), f64::INFINITY);
    }

    #[test]
    fn test_announcement_format() {
        assert_eq!(announcement(30, 0.0001), "Epoch 00030: Learning rate is 0.000100.");
        assert_eq!(announcement(1, 0.001), "Epoch 00001: Learning rate is 0.001000.");
    }
}
