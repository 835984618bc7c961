use serde::{Deserialize, Serialize};

/// Framework clock ticks per second (100-nanosecond units).
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// A point in stream time, in 100-nanosecond ticks relative to the moment
/// the pipeline starts running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct ReferenceTime(pub i64);

impl ReferenceTime {
    pub const ZERO: ReferenceTime = ReferenceTime(0);

    pub fn from_secs(secs: u32) -> Self {
        Self(i64::from(secs) * TICKS_PER_SECOND)
    }

    pub fn ticks(self) -> i64 {
        self.0
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / TICKS_PER_SECOND as f64
    }
}

/// Start/stop times registered for one capture stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamWindow {
    pub start: ReferenceTime,
    pub stop: ReferenceTime,
}

impl StreamWindow {
    /// Window that opens as soon as the pipeline runs and closes after
    /// `duration_secs`.
    pub fn for_duration(duration_secs: u32) -> Self {
        Self {
            start: ReferenceTime::ZERO,
            stop: ReferenceTime::from_secs(duration_secs),
        }
    }

    pub fn length(&self) -> ReferenceTime {
        ReferenceTime(self.stop.0 - self.start.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_convert_to_hundred_nanosecond_ticks() {
        assert_eq!(ReferenceTime::from_secs(10).ticks(), 100_000_000);
        assert_eq!(ReferenceTime::from_secs(0), ReferenceTime::ZERO);
    }

    #[test]
    fn max_duration_does_not_overflow() {
        let t = ReferenceTime::from_secs(u32::MAX);
        assert_eq!(t.ticks(), u32::MAX as i64 * 10_000_000);
    }

    #[test]
    fn window_starts_at_zero() {
        let window = StreamWindow::for_duration(7);
        assert_eq!(window.start, ReferenceTime::ZERO);
        assert_eq!(window.stop.ticks(), 70_000_000);
        assert_eq!(window.length().as_secs_f64(), 7.0);
    }
}
