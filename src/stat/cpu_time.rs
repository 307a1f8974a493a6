use super::*;

/// how a cpu spent its time since boot, as listed in `/proc/stat`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CpuTime {
    /// time spent in user mode.
    user: UserHz,
    /// time spent in user mode with low priority (nice).
    nice: UserHz,
    /// time spent in system mode.
    system: UserHz,
    /// time spent in the idle task.
    ///
    /// this value should be USER_HZ times the second entry in the /proc/uptime pseudo-file.
    idle: UserHz,
    /// time waiting for i/o to complete.
    ///
    /// this value is not reliable: the cpu does not actually wait for i/o, and the value may
    /// decrease in certain conditions. it is counted as idle time.
    iowait: UserHz,
    /// time servicing interrupts.
    irq: UserHz,
    /// time servicing softirqs.
    softirq: UserHz,
    /// stolen time, which is the time spent in other operating systems when running in a
    /// virtualized environment. (since linux 2.6.11.)
    steal: UserHz,
    /// time spent running a virtual cpu for guest operating systems. (since linux 2.6.24.)
    ///
    /// the kernel already includes this in `user`.
    guest: UserHz,
    /// time spent running a niced guest. (since linux 2.6.33.)
    ///
    /// the kernel already includes this in `nice`.
    guest_nice: UserHz,
}

/// the busy and idle ticks of a cpu, summarized from a [`CpuTime`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CpuSample {
    pub busy: UserHz,
    pub idle: UserHz,
}

// === impl CpuTime ===

impl CpuTime {
    /// the fields every kernel reports: user through softirq.
    pub const REQUIRED_FIELDS: usize = 7;
    /// the fields a modern kernel reports, adding steal, guest and guest_nice.
    pub const MAX_FIELDS: usize = 10;

    /// summarizes this into busy and idle ticks.
    pub fn sample(&self) -> CpuSample {
        let Self {
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
            steal,
            guest: _,      // already counted in `user`...
            guest_nice: _, // ...and in `nice`.
        } = *self;

        CpuSample {
            busy: [user, nice, system, irq, softirq, steal].into_iter().sum(),
            idle: idle + iowait,
        }
    }
}

impl TryFrom<Vec<UserHz>> for CpuTime {
    type Error = EntryParseError;
    fn try_from(mut times: Vec<UserHz>) -> Result<Self, Self::Error> {
        let found = times.len();
        if !(Self::REQUIRED_FIELDS..=Self::MAX_FIELDS).contains(&found) {
            return Err(EntryParseError::FieldCount { found });
        }

        // older kernels omit the trailing fields.
        times.resize(Self::MAX_FIELDS, UserHz::ZERO);

        <_ as TryInto<[_; 10]>>::try_into(times)
            .map(Self::from)
            .map_err(|times| EntryParseError::FieldCount { found: times.len() })
    }
}

impl From<[UserHz; 10]> for CpuTime {
    fn from(
        [
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
            steal,
            guest,
            guest_nice,
        ]: [UserHz; 10],
    ) -> Self {
        Self {
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
            steal,
            guest,
            guest_nice,
        }
    }
}

// === impl CpuSample ===

impl CpuSample {
    /// returns the percentage of time the cpu was busy between `earlier` and `self`.
    ///
    /// if no ticks elapsed, or the counters went backwards, this is `0.0`.
    pub fn utilization_since(&self, earlier: &CpuSample) -> f64 {
        let busy = self.busy.delta(earlier.busy);
        let idle = self.idle.delta(earlier.idle);
        let total = busy + idle;

        if total <= 0 {
            return 0.0;
        }

        // 100 * (1 - Δidle / Δtotal), kept in integers until the final division.
        let percent = (100 * (total - idle)) as f64 / total as f64;
        percent.clamp(0.0, 100.0)
    }
}
