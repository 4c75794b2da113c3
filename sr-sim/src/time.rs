//! Simulated time
//!
//! The emulator never looks at the wall clock. Time is a [`SimTime`] offset
//! from the start of the run, advanced only by popping events.

use std::fmt;
use std::ops::{Add, Sub};
use std::time::Duration;

/// Instant on the simulated clock
///
/// One time unit of the emulator maps to one second of [`Duration`], so a
/// round-trip time of `16.0` units is `Duration::from_secs(16)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct SimTime(Duration);

impl SimTime {
    /// Start of the simulation
    pub const ZERO: SimTime = SimTime(Duration::ZERO);

    /// Create a time from fractional time units
    ///
    /// Negative or NaN values clamp to zero, values beyond the range of
    /// [`Duration`] saturate.
    pub fn from_units(units: f64) -> Self {
        if units.is_nan() || units <= 0.0 {
            return SimTime::ZERO;
        }
        SimTime(Duration::try_from_secs_f64(units).unwrap_or(Duration::MAX))
    }

    /// Time units since the start of the run
    #[inline]
    pub fn as_units(&self) -> f64 {
        self.0.as_secs_f64()
    }

    /// Elapsed simulated time since the start of the run
    #[inline]
    pub fn since_start(&self) -> Duration {
        self.0
    }

    /// Duration since an earlier time, zero if `earlier` is later
    #[inline]
    pub fn duration_since(&self, earlier: SimTime) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<Duration> for SimTime {
    type Output = SimTime;

    fn add(self, duration: Duration) -> SimTime {
        SimTime(self.0.saturating_add(duration))
    }
}

impl Sub for SimTime {
    type Output = Duration;

    fn sub(self, other: SimTime) -> Duration {
        self.duration_since(other)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.as_units())
    }
}

/// Single timer of an endpoint
///
/// Each arming hands out a fresh token. Expiry events carry the token, so an
/// event left in the queue after [`SimTimer::cancel`] is recognised as stale
/// when it is popped.
#[derive(Debug, Default)]
pub struct SimTimer {
    generation: u64,
    armed: Option<(u64, SimTime)>,
}

impl SimTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer to expire at `expiry`
    ///
    /// Returns `None`, leaving the running timer untouched, when the timer is
    /// already armed.
    pub fn arm(&mut self, expiry: SimTime) -> Option<u64> {
        if self.armed.is_some() {
            return None;
        }
        self.generation += 1;
        self.armed = Some((self.generation, expiry));
        Some(self.generation)
    }

    /// Disarm the timer, returning whether it was running
    pub fn cancel(&mut self) -> bool {
        self.armed.take().is_some()
    }

    /// Consume an expiry event
    ///
    /// Returns true, disarming the timer, if `token` belongs to the current
    /// arming.
    pub fn fire(&mut self, token: u64) -> bool {
        match self.armed {
            Some((current, _)) if current == token => {
                self.armed = None;
                true
            }
            _ => false,
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.armed.is_some()
    }

    /// Scheduled expiry of the running timer
    pub fn expiry(&self) -> Option<SimTime> {
        self.armed.map(|(_, expiry)| expiry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_roundtrip() {
        let t = SimTime::from_units(16.5);
        assert!((t.as_units() - 16.5).abs() < 1e-9);
        assert_eq!(SimTime::from_units(-3.0), SimTime::ZERO);
        assert_eq!(SimTime::from_units(f64::NAN), SimTime::ZERO);
    }

    #[test]
    fn test_huge_values_saturate() {
        let end = SimTime::from_units(1e20);
        assert_eq!(end.since_start(), Duration::MAX);
        assert_eq!(SimTime::from_units(f64::INFINITY), end);
        assert_eq!(end + Duration::from_secs(1), end);
    }

    #[test]
    fn test_arithmetic() {
        let t1 = SimTime::from_units(2.0);
        let t2 = t1 + Duration::from_secs(3);

        assert_eq!(t2 - t1, Duration::from_secs(3));
        assert_eq!(t1 - t2, Duration::ZERO);
        assert!(t1 < t2);
    }

    #[test]
    fn test_display() {
        assert_eq!(SimTime::from_units(1.25).to_string(), "1.250");
    }

    #[test]
    fn test_timer_arm_and_fire() {
        let mut timer = SimTimer::new();
        let token = timer.arm(SimTime::from_units(16.0)).unwrap();

        assert!(timer.is_running());
        assert_eq!(timer.expiry(), Some(SimTime::from_units(16.0)));
        assert!(timer.fire(token));
        assert!(!timer.is_running());
        assert!(!timer.fire(token));
    }

    #[test]
    fn test_timer_double_arm_refused() {
        let mut timer = SimTimer::new();
        let token = timer.arm(SimTime::from_units(1.0)).unwrap();

        assert_eq!(timer.arm(SimTime::from_units(2.0)), None);
        assert_eq!(timer.expiry(), Some(SimTime::from_units(1.0)));
        assert!(timer.fire(token));
    }

    #[test]
    fn test_cancelled_token_is_stale() {
        let mut timer = SimTimer::new();
        let old = timer.arm(SimTime::from_units(1.0)).unwrap();

        assert!(timer.cancel());
        assert!(!timer.cancel()); // idempotent

        let new = timer.arm(SimTime::from_units(5.0)).unwrap();
        assert!(!timer.fire(old));
        assert!(timer.is_running());
        assert!(timer.fire(new));
    }
}
