use {
    crate::source::{Clock, StatsSource},
    std::{
        fmt,
        io::{self, BufRead, BufReader},
        str::FromStr,
        time::Instant,
    },
    thiserror::Error,
};

pub use self::{
    cpu_time::{CpuSample, CpuTime},
    user_hz::UserHz,
};

mod cpu_time;
mod user_hz;


/// a snapshot of the system's cpu statistics at a moment in time.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub sample: CpuSample,
    pub time: Instant,
}

/// a cpu entry in the `/proc/stat` kernel statistics table.
///
/// see `proc_stat(5)` for more information.
#[derive(Debug, Eq, PartialEq)]
pub enum Entry {
    /// the amount of time that the system ("cpu" line) spent in various states.
    AllCpu { time: CpuTime },
    /// the amount of time that a specific cpu ("cpuN" line) spent in various states.
    Cpu { id: CpuId, time: CpuTime },
}

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct CpuId(u16);

#[derive(Debug, Eq, Error, PartialEq)]
pub enum EntryParseError {
    #[error("unrecognized entry kind: {kind:?}")]
    UnrecognizedEntry { kind: String },
    #[error("invalid cpu id: {0}")]
    CpuIdParse(#[source] <u16 as FromStr>::Err),
    #[error("invalid time value: {0}")]
    UserHzParse(#[source] <UserHz as FromStr>::Err),
    #[error("expected between 7 and 10 time values, found {found}")]
    FieldCount { found: usize },
}

/// a failure to measure cpu utilization.
#[derive(Debug, Error)]
pub enum MeasurementError {
    #[error("could not read cpu statistics: {0}")]
    Io(#[from] io::Error),
    #[error("cpu statistics were empty")]
    Empty,
    #[error("expected the aggregate cpu line first, found {0}")]
    NotAggregate(CpuId),
    #[error("malformed cpu statistics: {0}")]
    Entry(#[from] EntryParseError),
}

// === impl Snapshot ===

impl Snapshot {
    /// uses the given source to parse a snapshot of the aggregate cpu statistics.
    ///
    /// only the first line is consulted; the kernel always lists the aggregate line first.
    pub(crate) fn read(
        stats: &impl StatsSource,
        clock: &impl Clock,
    ) -> Result<Snapshot, MeasurementError> {
        let time = clock.now();
        let reader = stats.open()?;

        let line = BufReader::new(reader)
            .lines()
            .next()
            .ok_or(MeasurementError::Empty)??;

        match line.parse::<Entry>()? {
            Entry::AllCpu { time: cpu } => Ok(Snapshot {
                sample: cpu.sample(),
                time,
            }),
            Entry::Cpu { id, time: _ } => Err(MeasurementError::NotAggregate(id)),
        }
    }
}

// === impl Entry ===

impl FromStr for Entry {
    type Err = EntryParseError;
    fn from_str(entry: &str) -> Result<Self, Self::Err> {
        let mut tokens = entry.split_whitespace();
        let kind = tokens.next().unwrap_or_default();
        let id = Self::parse_cpu_id(kind)?;

        let time = tokens
            .map(str::parse::<UserHz>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(EntryParseError::UserHzParse)
            .and_then(CpuTime::try_from)?;

        Ok(if let Some(id) = id {
            Self::Cpu { id, time }
        } else {
            Self::AllCpu { time }
        })
    }
}

impl Entry {
    fn parse_cpu_id(token: &str) -> Result<Option<CpuId>, EntryParseError> {
        use EntryParseError::{CpuIdParse, UnrecognizedEntry};

        // strip the token of its "cpu" prefix.
        let suffix = token.strip_prefix("cpu").ok_or_else(|| UnrecognizedEntry {
            kind: token.to_owned(),
        })?;

        // if there is no suffix, this is the aggregate line.
        if suffix.is_empty() {
            return Ok(None);
        }

        // parse the id into an integer.
        suffix
            .parse::<u16>()
            .map(CpuId)
            .map(Some)
            .map_err(CpuIdParse)
    }
}

// === impl CpuId ===

impl CpuId {
    pub fn as_u16(&self) -> u16 {
        let Self(id) = self;
        *id
    }
}

impl fmt::Display for CpuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cpu{}", self.as_u16())
    }
}
