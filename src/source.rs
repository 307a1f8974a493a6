use std::{
    fs::File,
    io::{self, BufReader, Read},
    time::Instant,
};

#[cfg(test)]
use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    io::Cursor,
    time::Duration,
};

pub use self::{clock::*, stats::*};

mod clock {
    use super::*;

    pub trait Clock {
        fn now(&self) -> Instant;
    }

    #[derive(Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> Instant {
            Instant::now()
        }
    }

    /// a mock clock that advances by a fixed step each time it is read.
    #[cfg(test)]
    pub struct MockClock {
        start: Instant,
        step: Duration,
        reads: Cell<u32>,
    }

    #[cfg(test)]
    impl MockClock {
        pub fn stepping(step: Duration) -> Self {
            Self {
                start: Instant::now(),
                step,
                reads: Cell::new(0),
            }
        }
    }

    #[cfg(test)]
    impl Clock for MockClock {
        fn now(&self) -> Instant {
            let Self { start, step, reads } = self;

            let n = reads.get();
            reads.set(n + 1);
            *start + (*step * n)
        }
    }
}

/// abstracts over providers of statistics.
mod stats {
    use super::*;

    /// a source of kernel statistics.
    pub trait StatsSource {
        /// returns a reader.
        fn open(&self) -> io::Result<impl Read>;
    }

    /// stats backed by `/proc/stat`.
    #[derive(Default)]
    pub struct ProcStatFile;

    /// a mock stat source.
    ///
    /// each call to [`StatsSource::open()`] yields the next scripted file. once the script runs
    /// out, the source behaves as though the file does not exist.
    #[cfg(test)]
    #[derive(Default)]
    pub struct MockStatFile {
        stats: RefCell<VecDeque<String>>,
    }

    // === impl ProcStatFile ===

    impl StatsSource for ProcStatFile {
        fn open(&self) -> io::Result<impl Read> {
            File::open(Self::STAT).map(BufReader::new)
        }
    }

    impl ProcStatFile {
        const STAT: &str = "/proc/stat";
    }

    // === impl MockStatFile ===

    #[cfg(test)]
    impl MockStatFile {
        pub fn new<I, S>(stats: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            let stats = stats.into_iter().map(Into::into).collect();
            Self {
                stats: RefCell::new(stats),
            }
        }
    }

    #[cfg(test)]
    impl StatsSource for MockStatFile {
        fn open(&self) -> io::Result<impl Read> {
            let Self { stats } = self;

            stats.borrow_mut().pop_front().map(Cursor::new).ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "mock stats are exhausted")
            })
        }
    }
}
