use std::fmt::{self, Display};

/// the absolute deviations from the target observed during one run.
#[derive(Clone, Debug, Default)]
pub struct DeviationLog {
    deviations: Vec<f64>,
}

/// how far a measurement strayed from its target.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Band {
    /// within 5 percentage points.
    InRange,
    /// within 15 percentage points.
    Moderate,
    /// more than 15 percentage points away.
    Severe,
}

/// statistics over a finished run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    pub samples: usize,
    pub max: Option<f64>,
    pub min: Option<f64>,
    pub average: Option<f64>,
}

// === impl DeviationLog ===

impl DeviationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// records the deviation of `measured` from `target`, returning it.
    pub fn record(&mut self, measured: f64, target: f64) -> f64 {
        let deviation = (measured - target).abs();
        self.deviations.push(deviation);
        deviation
    }

    pub fn len(&self) -> usize {
        self.deviations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deviations.is_empty()
    }

    pub fn latest(&self) -> Option<f64> {
        self.deviations.last().copied()
    }

    pub fn max(&self) -> Option<f64> {
        self.deviations.iter().copied().reduce(f64::max)
    }

    pub fn min(&self) -> Option<f64> {
        self.deviations.iter().copied().reduce(f64::min)
    }

    pub fn average(&self) -> Option<f64> {
        let Self { deviations } = self;
        if deviations.is_empty() {
            return None;
        }
        Some(deviations.iter().sum::<f64>() / deviations.len() as f64)
    }

    pub fn summary(&self) -> Summary {
        Summary {
            samples: self.len(),
            max: self.max(),
            min: self.min(),
            average: self.average(),
        }
    }
}

// === impl Band ===

impl Band {
    pub const IN_RANGE: f64 = 5.0;
    pub const MODERATE: f64 = 15.0;

    /// classifies a deviation. the sign is ignored.
    pub fn classify(deviation: f64) -> Self {
        match deviation.abs() {
            d if d <= Self::IN_RANGE => Self::InRange,
            d if d <= Self::MODERATE => Self::Moderate,
            _ => Self::Severe,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::InRange => "in range",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
        }
    }

    /// describes where `measured` sits relative to `target`.
    pub fn indicator(measured: f64, target: f64) -> &'static str {
        let signed = measured - target;
        match (Self::classify(signed), signed > 0.0) {
            (Self::InRange, _) => "in range",
            (Self::Moderate, true) => "above target",
            (Self::Moderate, false) => "below target",
            (Self::Severe, true) => "far above target",
            (Self::Severe, false) => "far below target",
        }
    }
}

// === impl Summary ===

impl Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Percent(Option<f64>);
        impl Display for Percent {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.0 {
                    Some(p) => write!(f, "{p:.2}%"),
                    None => f.write_str("n/a"),
                }
            }
        }

        let Self {
            samples,
            max,
            min,
            average,
        } = *self;

        writeln!(f, "deviation over {samples} samples:")?;
        writeln!(f, "  max:     {}", Percent(max))?;
        writeln!(f, "  min:     {}", Percent(min))?;
        write!(f, "  average: {}", Percent(average))
    }
}
