use std::{
    fmt::{self, Display},
    iter::{once, repeat_n},
};

/// a horizontal bar, filled in proportion to a fraction.
#[derive(Clone, Copy, Debug)]
pub struct Meter {
    pub fraction: f64,
    pub width: usize,
}

/// === impl Meter ===

impl Meter {
    const ACTIVE: char = '█';
    const IDLE: char = '░';
    const BORDER_L: char = '[';
    const BORDER_R: char = ']';

    /// a meter showing `percent` out of 100.
    pub fn percent(percent: f64, width: usize) -> Self {
        Self {
            fraction: percent / 100.0,
            width,
        }
    }

    /// returns the number of filled cells.
    pub fn filled(&self) -> usize {
        let Self { fraction, width } = *self;

        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        ((fraction * width as f64).round() as usize).min(width)
    }
}

impl Display for Meter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filled = self.filled();
        let meter = once(Self::BORDER_L)
            .chain(repeat_n(Self::ACTIVE, filled))
            .chain(repeat_n(Self::IDLE, self.width - filled))
            .chain(once(Self::BORDER_R));

        meter.map(|c| f.write_fmt(format_args!("{c}"))).collect()
    }
}
