use {
    std::{
        hint::black_box,
        thread,
        time::{Duration, Instant},
    },
    tracing::trace,
};

/// consumes cpu time in fixed slices, busy for a fraction of each slice and asleep for the rest.
#[derive(Clone, Debug)]
pub struct LoadGenerator {
    slice: Duration,
}

/// how one slice was actually spent.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DutyCycle {
    pub busy: Duration,
    pub idle: Duration,
}

// === impl LoadGenerator ===

impl Default for LoadGenerator {
    fn default() -> Self {
        Self::new(Self::SLICE)
    }
}

impl LoadGenerator {
    /// the length of one duty cycle.
    pub const SLICE: Duration = Duration::from_millis(100);

    /// the number of operations performed between reads of the clock.
    const BATCH: u32 = 256;

    pub fn new(slice: Duration) -> Self {
        Self { slice }
    }

    pub fn slice(&self) -> Duration {
        self.slice
    }

    /// spends `target_percent` of one slice busy, and sleeps for the remainder.
    pub fn apply(&self, target_percent: f64) -> DutyCycle {
        let Self { slice } = *self;

        // `!(x > 0.0)` also catches NaN.
        if !(target_percent > 0.0) {
            thread::sleep(slice);
            return DutyCycle {
                busy: Duration::ZERO,
                idle: slice,
            };
        }

        let fraction = (target_percent / 100.0).min(1.0);
        let deadline = slice.mul_f64(fraction);

        let start = Instant::now();
        let mut acc = 0.0_f64;
        while start.elapsed() < deadline {
            acc = Self::spin(acc);
        }
        black_box(acc);
        let busy = start.elapsed();

        let idle = slice.saturating_sub(busy);
        if !idle.is_zero() {
            thread::sleep(idle);
        }

        trace!(?busy, ?idle, "applied load");
        DutyCycle { busy, idle }
    }

    /// performs a batch of floating point work.
    fn spin(mut acc: f64) -> f64 {
        for i in 0..Self::BATCH {
            let x = black_box(f64::from(i) + acc);
            acc = (x.sin() * x.cos()).abs().sqrt();
        }
        acc
    }
}
