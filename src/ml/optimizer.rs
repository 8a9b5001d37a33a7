// ============================================================
// Layer 5 — Scheduled Optimizer
// ============================================================
// Burn optimizers take the learning rate as an argument to every
// `step` call instead of storing it. This wrapper owns that rate
// so the epoch scheduler has a mutable value to read and write
// through the LearningRateControl trait from Layer 3.

use burn::{
    module::AutodiffModule,
    optim::{GradientsParams, Optimizer},
    tensor::backend::AutodiffBackend,
    LearningRate,
};

use crate::domain::traits::LearningRateControl;

pub struct ScheduledOptimizer<O> {
    optim:         O,
    learning_rate: LearningRate,
}

impl<O> ScheduledOptimizer<O> {
    pub fn new(optim: O, learning_rate: LearningRate) -> Self {
        Self { optim, learning_rate }
    }

    /// One update at the current learning rate.
    pub fn step<M, B>(&mut self, module: M, grads: GradientsParams) -> M
    where
        B: AutodiffBackend,
        M: AutodiffModule<B>,
        O: Optimizer<M, B>,
    {
        self.optim.step(self.learning_rate, module, grads)
    }
}

impl<O> LearningRateControl for ScheduledOptimizer<O> {
    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, rate: f64) {
        self.learning_rate = rate;
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schedule::{EpochLrScheduler, Schedule};

    #[test]
    fn test_scheduler_drives_wrapped_rate() {
        let mut optim = ScheduledOptimizer::new((), 1e-4);
        let scheduler = EpochLrScheduler::new(Schedule::new([(1, 1e-3)]).unwrap());

        scheduler.on_epoch_begin(0, &mut optim).unwrap();
        assert_eq!(optim.learning_rate(), 1e-4);
        scheduler.on_epoch_begin(1, &mut optim).unwrap();
        assert_eq!(optim.learning_rate(), 1e-3);
    }
}
