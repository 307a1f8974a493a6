use {std::time::Duration, thiserror::Error};

/// the parameters of one run, validated once before it starts.
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    target_percent: f64,
    duration: Duration,
    bar_length: usize,
    update_interval: Duration,
}

/// an invalid run parameter.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("target must be between 0 and 100 percent, got {0}")]
    Target(f64),
    #[error("duration must be at least {min} second, got {0}", min = RunConfig::MIN_DURATION_SECS)]
    Duration(u64),
    #[error("bar length must be at least {min} cells, got {0}", min = RunConfig::MIN_BAR_LENGTH)]
    BarLength(usize),
    #[error(
        "update interval must be at least {min} seconds, got {0}",
        min = RunConfig::MIN_INTERVAL_SECS
    )]
    UpdateInterval(f64),
}

// === impl RunConfig ===

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            target_percent: Self::DEFAULT_TARGET,
            duration: Duration::from_secs(Self::DEFAULT_DURATION_SECS),
            bar_length: Self::DEFAULT_BAR_LENGTH,
            update_interval: Duration::from_secs_f64(Self::DEFAULT_INTERVAL_SECS),
        }
    }
}

impl RunConfig {
    pub const DEFAULT_TARGET: f64 = 50.0;
    pub const DEFAULT_DURATION_SECS: u64 = 60;
    pub const DEFAULT_BAR_LENGTH: usize = 100;
    pub const DEFAULT_INTERVAL_SECS: f64 = 0.15;

    pub const MIN_DURATION_SECS: u64 = 1;
    pub const MIN_BAR_LENGTH: usize = 10;
    pub const MIN_INTERVAL_SECS: f64 = 0.05;

    pub fn new(
        target_percent: f64,
        duration_secs: u64,
        bar_length: usize,
        update_interval_secs: f64,
    ) -> Result<Self, ConfigError> {
        if !(0.0..=100.0).contains(&target_percent) {
            return Err(ConfigError::Target(target_percent));
        }
        if duration_secs < Self::MIN_DURATION_SECS {
            return Err(ConfigError::Duration(duration_secs));
        }
        if bar_length < Self::MIN_BAR_LENGTH {
            return Err(ConfigError::BarLength(bar_length));
        }
        // `>=` is false for NaN.
        if !(update_interval_secs >= Self::MIN_INTERVAL_SECS) {
            return Err(ConfigError::UpdateInterval(update_interval_secs));
        }
        let update_interval = Duration::try_from_secs_f64(update_interval_secs)
            .map_err(|_| ConfigError::UpdateInterval(update_interval_secs))?;

        Ok(Self {
            target_percent,
            duration: Duration::from_secs(duration_secs),
            bar_length,
            update_interval,
        })
    }

    pub fn target_percent(&self) -> f64 {
        self.target_percent
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn bar_length(&self) -> usize {
        self.bar_length
    }

    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }
}
