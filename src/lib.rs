//! a cpu load controller.
//!
//! `duty` holds the system's cpu utilization near a target by alternating busy work and sleep
//! in short slices, measuring the result through `/proc/stat`, and drawing the measured load in
//! place in the terminal.

use {
    crossterm::{ExecutableCommand, QueueableCommand, cursor},
    std::{
        io::Write,
        time::{Duration, Instant},
    },
    tracing::{debug, error, info},
};

pub use self::{
    config::{ConfigError, RunConfig},
    deviation::{Band, DeviationLog, Summary},
    load::{DutyCycle, LoadGenerator},
    sentinel::{Recording, Sentinel},
    source::{Clock, ProcStatFile, StatsSource, SystemClock},
    stat::{CpuId, CpuSample, CpuTime, Entry, EntryParseError, MeasurementError, UserHz},
    window::{Frame, Renderer, progress},
};

mod config;
mod deviation;
mod load;
mod meter;
mod sentinel;
mod source;
/// kernel statistics facilities.
///
/// this file provides tools to interact with `/proc/stat`.
mod stat;
mod window;

/// drives the load, the measurements, and the display for one run.
pub struct App<C = SystemClock, S = ProcStatFile> {
    config: RunConfig,
    sentinel: Sentinel<C, S>,
    load: LoadGenerator,
    renderer: Renderer,
    log: DeviationLog,
    phase: Phase,
}

/// where an [`App`] is in its run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Idle,
    Running,
    Completed,
    Aborted,
}

/// a failure that ends a run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Measurement(#[from] MeasurementError),
    #[error("could not write to the terminal: {0}")]
    Io(#[from] std::io::Error),
}

/// === impl App ===

impl App {
    /// initializes a new application, reading `/proc/stat`.
    pub fn new(config: RunConfig) -> Self {
        Self::with_sentinel(config, Sentinel::default())
    }
}

impl<C, S> App<C, S>
where
    C: Clock,
    S: StatsSource,
{
    /// initializes a new application, reading statistics through the given sentinel.
    pub fn with_sentinel(config: RunConfig, sentinel: Sentinel<C, S>) -> Self {
        Self {
            config,
            sentinel,
            load: LoadGenerator::default(),
            renderer: Renderer::new(),
            log: DeviationLog::new(),
            phase: Phase::Idle,
        }
    }

    /// replaces the load generator, e.g. to use a different slice length.
    pub fn with_load(self, load: LoadGenerator) -> Self {
        Self { load, ..self }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn log(&self) -> &DeviationLog {
        &self.log
    }

    /// runs the application, drawing to `writer`.
    ///
    /// the cursor is hidden for the duration of the run, and shown again afterwards whether or
    /// not the run succeeded.
    pub fn run(&mut self, writer: &mut impl Write) -> Result<Summary, Error> {
        info!(
            target_percent = self.config.target_percent(),
            duration = ?self.config.duration(),
            slice = ?self.load.slice(),
            "starting run"
        );
        self.phase = Phase::Running;

        let result = writer
            .queue(cursor::Hide)
            .map_err(Error::from)
            .and_then(|writer| self.drive(writer));
        let shown = writer.execute(cursor::Show).map(drop);

        match result.and_then(|summary| shown.map(|()| summary).map_err(Error::from)) {
            Ok(summary) => {
                self.phase = Phase::Completed;
                info!(?summary, "run completed");
                Ok(summary)
            }
            Err(err) => {
                self.phase = Phase::Aborted;
                error!(%err, "run aborted");
                Err(err)
            }
        }
    }

    fn drive(&mut self, writer: &mut impl Write) -> Result<Summary, Error> {
        let duration = self.config.duration();
        let interval = self.config.update_interval();
        let target = self.config.target_percent();

        let start = self.now();
        let mut last_render = start;

        loop {
            let elapsed = self.now().saturating_duration_since(start);
            if elapsed >= duration {
                break;
            }

            let cycle = self.load.apply(target);
            let measured = self.measure()?;
            debug!(?cycle, measured, "sampled");

            let now = self.now();
            if now.saturating_duration_since(last_render) >= interval {
                let elapsed = now.saturating_duration_since(start);
                self.render(writer, measured, elapsed)?;
                last_render = now;
            }
        }

        // one last reading, pinned to the end of the run.
        let measured = self.measure()?;
        self.render(writer, measured, duration)?;

        Ok(self.log.summary())
    }

    /// measures the cpu, recording the deviation from the target.
    ///
    /// the baseline reading has nothing to compare against, and is not recorded.
    fn measure(&mut self) -> Result<f64, MeasurementError> {
        let Some(recording) = self.sentinel.observe()? else {
            return Ok(0.0);
        };

        let measured = recording.utilization();
        let deviation = self.log.record(measured, self.config.target_percent());
        debug!(
            measured,
            deviation,
            interval = ?recording.interval(),
            band = Band::classify(deviation).label(),
            "measured cpu"
        );

        Ok(measured)
    }

    fn render(
        &mut self,
        writer: &mut impl Write,
        measured: f64,
        elapsed: Duration,
    ) -> Result<(), Error> {
        let Self {
            config,
            renderer,
            log,
            ..
        } = self;

        let frame = Frame {
            measured,
            elapsed,
            config,
            log,
        };
        renderer.render(writer, &frame).map_err(Error::from)
    }

    fn now(&self) -> Instant {
        self.sentinel.clock().now()
    }
}

// === impl Error ===

impl Error {
    /// the process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Io(_) => 1,
            Self::Config(_) => 2,
            Self::Measurement(_) => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::source::{MockClock, MockStatFile},
    };

    /// `n` readings at 70% utilization: each advances 700 busy and 300 idle ticks.
    fn seventy_percent(n: u64) -> Vec<String> {
        (0..n)
            .map(|i| format!("cpu {} 0 0 {} 0 0 0 0 0 0", 700 * i, 300 * i))
            .collect()
    }

    fn app(target: f64, stats: Vec<String>) -> App<MockClock, MockStatFile> {
        let config = RunConfig::new(target, 5, 10, 0.05).unwrap();
        app_with(config, stats)
    }

    /// an app whose clock advances one second per read, with a 1ms load slice.
    fn app_with(config: RunConfig, stats: Vec<String>) -> App<MockClock, MockStatFile> {
        let clock = MockClock::stepping(Duration::from_secs(1));
        let sentinel = Sentinel::new(clock, MockStatFile::new(stats));
        App::with_sentinel(config, sentinel).with_load(LoadGenerator::new(Duration::from_millis(1)))
    }

    #[test]
    fn completes_with_a_summary() {
        let mut app = app(70.0, seventy_percent(4));
        assert_eq!(app.phase(), Phase::Idle);

        let mut out = Vec::new();
        let summary = app.run(&mut out).unwrap();

        assert_eq!(app.phase(), Phase::Completed);
        assert_eq!(summary.samples, 2);
        assert_eq!(summary.max, Some(0.0));
        assert_eq!(summary.min, Some(0.0));
        assert_eq!(summary.average, Some(0.0));

        // two frames while running, and the final frame.
        assert_eq!(app.renderer().frames(), 3);
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("100.0%"), "{out}");
        assert!(out.contains("0.0s remaining"), "{out}");
    }

    /// each iteration reads the clock three times, so a 4s interval draws every other one.
    #[test]
    fn renders_are_throttled_by_the_update_interval() {
        let config = RunConfig::new(70.0, 10, 10, 4.0).unwrap();
        let mut app = app_with(config, seventy_percent(5));
        let summary = app.run(&mut Vec::<u8>::new()).unwrap();

        // three iterations and the final reading; the baseline is not recorded.
        assert_eq!(summary.samples, 3);
        // one frame in the loop, and the final frame.
        assert_eq!(app.renderer().frames(), 2);
        assert!(app.renderer().frames() < summary.samples + 1);
    }

    #[test]
    fn interval_longer_than_the_run_draws_only_the_final_frame() {
        let config = RunConfig::new(70.0, 1, 10, 2.0).unwrap();
        let mut app = app_with(config, seventy_percent(2));
        let summary = app.run(&mut Vec::<u8>::new()).unwrap();

        assert_eq!(app.phase(), Phase::Completed);
        assert_eq!(app.renderer().frames(), 1);
        assert_eq!(summary.samples, 0);
    }

    #[test]
    fn deviation_is_recorded_against_the_target() {
        let mut app = app(50.0, seventy_percent(4));
        let summary = app.run(&mut Vec::<u8>::new()).unwrap();
        assert_eq!(summary.max, Some(20.0));
        assert_eq!(app.log().latest(), Some(20.0));
    }

    #[test]
    fn restores_the_cursor() {
        let mut app = app(70.0, seventy_percent(4));
        let mut out = Vec::new();
        app.run(&mut out).unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("\x1b[?25l"), "{out:?}");
        assert!(out.ends_with("\x1b[?25h"), "{out:?}");
    }

    #[test]
    fn aborts_when_statistics_disappear() {
        // one reading for the baseline, then the source is gone.
        let mut app = app(70.0, seventy_percent(1));
        let mut out = Vec::new();
        let err = app.run(&mut out).unwrap_err();

        assert!(matches!(err, Error::Measurement(MeasurementError::Io(_))));
        assert_eq!(err.exit_code(), 3);
        assert_eq!(app.phase(), Phase::Aborted);
        // the baseline frame was drawn; nothing after the failure.
        assert_eq!(app.renderer().frames(), 1);

        let out = String::from_utf8(out).unwrap();
        assert!(out.ends_with("\x1b[?25h"), "{out:?}");
    }

    #[test]
    fn aborts_on_malformed_statistics() {
        let mut app = app(70.0, vec!["cpu 1 2 3".to_owned()]);
        let err = app.run(&mut Vec::<u8>::new()).unwrap_err();

        assert!(matches!(
            err,
            Error::Measurement(MeasurementError::Entry(EntryParseError::FieldCount { found: 3 }))
        ));
        assert_eq!(app.phase(), Phase::Aborted);
        assert_eq!(app.renderer().frames(), 0);
    }

    #[test]
    fn exit_codes_are_distinct() {
        let config = Error::from(ConfigError::Duration(0));
        let measurement = Error::from(MeasurementError::Empty);
        let io = Error::from(std::io::Error::other("closed"));
        assert_eq!(config.exit_code(), 2);
        assert_eq!(measurement.exit_code(), 3);
        assert_eq!(io.exit_code(), 1);
    }
}
