//! Timestamps and durations.
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::wire;

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// A point in time relative to the Unix epoch.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: i32,
}

impl Timestamp {
    /// Construct a timestamp, normalizing nanoseconds into `0..1_000_000_000`.
    pub fn new(seconds: i64, nanos: i64) -> Self {
        let seconds = seconds.saturating_add(nanos.div_euclid(NANOS_PER_SECOND));
        let nanos = nanos.rem_euclid(NANOS_PER_SECOND) as i32;
        Self { seconds, nanos }
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        SystemTime::now().into()
    }

    /// Return the timestamp shifted by the given duration.
    pub fn plus(&self, duration: Duration) -> Self {
        Self::new(self.seconds.saturating_add(duration.seconds), self.nanos.into())
    }

    /// Convert into the wire representation.
    pub fn to_wire(&self) -> wire::Timestamp {
        wire::Timestamp {
            seconds: self.seconds,
            nanos: self.nanos,
        }
    }

    /// Convert from the wire representation.
    pub fn from_wire(ts: &wire::Timestamp) -> Self {
        Self::new(ts.seconds, ts.nanos.into())
    }
}

impl From<SystemTime> for Timestamp {
    fn from(t: SystemTime) -> Timestamp {
        match t.duration_since(UNIX_EPOCH) {
            Ok(d) => Timestamp::new(d.as_secs() as i64, d.subsec_nanos().into()),
            Err(err) => {
                let d = err.duration();
                Timestamp::new(-(d.as_secs() as i64), -i64::from(d.subsec_nanos()))
            }
        }
    }
}

impl From<Timestamp> for SystemTime {
    fn from(ts: Timestamp) -> SystemTime {
        let nanos = std::time::Duration::from_nanos(ts.nanos as u64);
        if ts.seconds >= 0 {
            UNIX_EPOCH + std::time::Duration::from_secs(ts.seconds as u64) + nanos
        } else {
            UNIX_EPOCH - std::time::Duration::from_secs(ts.seconds.unsigned_abs()) + nanos
        }
    }
}

/// A span of time in whole seconds.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Duration {
    pub seconds: i64,
}

impl Duration {
    /// Construct a duration from seconds.
    pub const fn from_secs(seconds: i64) -> Self {
        Self { seconds }
    }

    /// Convert into the wire representation.
    pub fn to_wire(&self) -> wire::Duration {
        wire::Duration {
            seconds: self.seconds,
        }
    }

    /// Convert from the wire representation.
    pub fn from_wire(d: &wire::Duration) -> Self {
        Self::from_secs(d.seconds)
    }
}

impl From<std::time::Duration> for Duration {
    fn from(d: std::time::Duration) -> Duration {
        Duration::from_secs(i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
    }
}

impl From<Duration> for std::time::Duration {
    fn from(d: Duration) -> std::time::Duration {
        // Negative durations clamp to zero.
        std::time::Duration::from_secs(u64::try_from(d.seconds).unwrap_or_default())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(
            Timestamp::new(1, 1_500_000_000),
            Timestamp {
                seconds: 2,
                nanos: 500_000_000
            }
        );
        assert_eq!(
            Timestamp::new(1, -1),
            Timestamp {
                seconds: 0,
                nanos: 999_999_999
            }
        );
    }

    #[test]
    fn test_system_time() {
        let ts = Timestamp::new(1_600_000_000, 123);
        let st: SystemTime = ts.into();
        assert_eq!(Timestamp::from(st), ts);

        let before_epoch = Timestamp::new(-5, 250);
        let st: SystemTime = before_epoch.into();
        assert_eq!(Timestamp::from(st), before_epoch);

        assert!(Timestamp::now() > ts);
    }

    #[test]
    fn test_plus_and_wire() {
        let ts = Timestamp::new(10, 5).plus(Duration::from_secs(120));
        assert_eq!(ts, Timestamp::new(130, 5));
        assert_eq!(Timestamp::from_wire(&ts.to_wire()), ts);

        let d = Duration::from(std::time::Duration::from_secs(180));
        assert_eq!(Duration::from_wire(&d.to_wire()), d);
        assert_eq!(
            std::time::Duration::from(Duration::from_secs(-3)),
            std::time::Duration::ZERO
        );
    }
}
