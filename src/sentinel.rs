use {
    crate::{
        source::{Clock, ProcStatFile, StatsSource, SystemClock},
        stat::{CpuSample, MeasurementError, Snapshot},
    },
    std::time::{Duration, Instant},
    tracing::debug,
};

/// observes kernel statistics.
pub struct Sentinel<C = SystemClock, S = ProcStatFile> {
    /// the clock being used to measure time.
    clock: C,
    /// the underlying source of kernel statistics.
    source: S,
    state: State,
}

enum State {
    /// no statistics have been read yet.
    Initialized,
    Running {
        /// the last observed snapshot.
        last: Snapshot,
    },
}

/// a recording of the system's cpu load between two snapshots.
#[derive(Clone, Debug)]
pub struct Recording {
    /// when the recording began.
    pub start: Instant,
    /// when the recording ended.
    pub end: Instant,
    /// the cpu ticks at the start of the recording.
    pub previous: CpuSample,
    /// the cpu ticks at the end of the recording.
    pub current: CpuSample,
}

// === impl Sentinel ===

impl<C: Default, S: Default> Default for Sentinel<C, S> {
    fn default() -> Self {
        Self::new(C::default(), S::default())
    }
}

impl<C, S> Sentinel<C, S> {
    /// creates a new [`Sentinel`].
    pub fn new(clock: C, source: S) -> Self {
        Self {
            clock,
            source,
            state: State::Initialized,
        }
    }

    /// returns the clock this sentinel reads time from.
    pub fn clock(&self) -> &C {
        &self.clock
    }
}

impl<C, S> Sentinel<C, S>
where
    C: Clock,
    S: StatsSource,
{
    /// returns a [`Recording`] of cpu time since this was last called.
    ///
    /// NB: by virtue of this being a comparison to the previous reading, this will return
    /// `Ok(None)` the first time it is called.
    pub fn observe(&mut self) -> Result<Option<Recording>, MeasurementError> {
        let Self {
            clock,
            source,
            state,
        } = self;

        let new = Snapshot::read(&*source, &*clock)?;
        match state {
            State::Initialized => {
                debug!(sample = ?new.sample, "read baseline cpu statistics");
                *state = State::Running { last: new };
                Ok(None)
            }
            State::Running { last } => {
                let prev = std::mem::replace(last, new.clone());
                Ok(Some(Recording::new(prev, new)))
            }
        }
    }

    /// returns the cpu utilization, as a percentage, since this was last called.
    ///
    /// the first call establishes a baseline and returns `0.0`.
    pub fn measure(&mut self) -> Result<f64, MeasurementError> {
        self.observe()
            .map(|recording| recording.as_ref().map_or(0.0, Recording::utilization))
    }
}

// === impl Recording ===

impl Recording {
    fn new(
        Snapshot {
            sample: previous,
            time: start,
        }: Snapshot,
        Snapshot {
            sample: current,
            time: end,
        }: Snapshot,
    ) -> Recording {
        Self {
            start,
            end,
            previous,
            current,
        }
    }

    /// returns the percentage of time the system was busy during this recording.
    pub fn utilization(&self) -> f64 {
        let Self {
            previous, current, ..
        } = self;

        current.utilization_since(previous)
    }

    /// returns the wall-clock time this recording spans.
    pub fn interval(&self) -> Duration {
        self.end.saturating_duration_since(self.start)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::source::{MockClock, MockStatFile},
    };

    fn sentinel(stats: &[&str]) -> Sentinel<MockClock, MockStatFile> {
        let clock = MockClock::stepping(Duration::from_millis(100));
        Sentinel::new(clock, MockStatFile::new(stats.iter().copied()))
    }

    #[test]
    fn first_observation_is_a_baseline() {
        let mut sentinel = sentinel(&["cpu 1 2 3 4 5 6 7"]);
        assert!(sentinel.observe().unwrap().is_none());
    }

    #[test]
    fn first_measurement_is_zero() {
        let mut sentinel = sentinel(&["cpu 900 0 900 100 0 0 0"]);
        assert_eq!(sentinel.measure().unwrap(), 0.0);
    }

    /// the total ticks advance by 1000, of which 300 were idle.
    #[test]
    fn seventy_percent() {
        let mut sentinel = sentinel(&[
            "cpu 100 0 100 100 0 0 0 0 0 0",
            "cpu 450 0 450 350 50 0 0 0 0 0",
        ]);
        assert_eq!(sentinel.measure().unwrap(), 0.0);
        assert_eq!(sentinel.measure().unwrap(), 70.0);
    }

    #[test]
    fn each_measurement_replaces_the_baseline() {
        let mut sentinel = sentinel(&[
            "cpu 0 0 0 0 0 0 0",
            "cpu 50 0 0 50 0 0 0",
            "cpu 150 0 0 50 0 0 0",
        ]);
        assert_eq!(sentinel.measure().unwrap(), 0.0);
        assert_eq!(sentinel.measure().unwrap(), 50.0);
        assert_eq!(sentinel.measure().unwrap(), 100.0);
    }

    #[test]
    fn recording_spans_the_clock() {
        let mut sentinel = sentinel(&["cpu 0 0 0 0 0 0 0", "cpu 1 0 0 1 0 0 0"]);
        sentinel.observe().unwrap();
        let recording = sentinel.observe().unwrap().unwrap();
        assert_eq!(recording.interval(), Duration::from_millis(100));
    }

    #[test]
    fn unchanged_counters_measure_zero() {
        let mut sentinel = sentinel(&["cpu 5 5 5 5 5 5 5", "cpu 5 5 5 5 5 5 5"]);
        sentinel.measure().unwrap();
        assert_eq!(sentinel.measure().unwrap(), 0.0);
    }

    #[test]
    fn missing_source() {
        let mut sentinel = sentinel(&[]);
        let err = sentinel.measure().unwrap_err();
        assert!(matches!(err, MeasurementError::Io(_)));
    }

    #[test]
    fn empty_source() {
        let mut sentinel = sentinel(&[""]);
        let err = sentinel.measure().unwrap_err();
        assert!(matches!(err, MeasurementError::Empty));
    }

    #[test]
    fn per_cpu_line_first() {
        let mut sentinel = sentinel(&["cpu3 1 2 3 4 5 6 7"]);
        let err = sentinel.measure().unwrap_err();
        assert!(matches!(err, MeasurementError::NotAggregate(_)));
    }

    #[test]
    fn malformed_source() {
        let mut sentinel = sentinel(&["intr 1462898"]);
        let err = sentinel.measure().unwrap_err();
        assert!(matches!(err, MeasurementError::Entry(_)));
    }

    #[test]
    fn only_the_first_line_is_read() {
        let mut sentinel = sentinel(&["cpu 1 2 3 4 5 6 7\ncpu0 1 2 3 4 5 6 7\nctxt 1990473\n"]);
        assert!(sentinel.observe().unwrap().is_none());
    }
}
