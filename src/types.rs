use std::fmt;
use std::ops::{Add, AddAssign, Deref, Sub};

use serde::{Deserialize, Serialize};

/// A time point in simulation, in minutes since the shop opened
#[derive(Debug, Clone, Copy, Default, PartialOrd, PartialEq, Serialize, Deserialize)]
pub struct Time(pub f64);

/// A duration of time in simulation, in minutes
#[derive(Debug, Clone, Copy, Default, PartialOrd, PartialEq, Serialize, Deserialize)]
pub struct Duration(pub f64);

impl Time {
    pub const ZERO: Time = Time(0.0);
}

impl Duration {
    pub const ZERO: Duration = Duration(0.0);
}

impl Deref for Time {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Deref for Duration {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Add<Duration> for Time {
    type Output = Time;

    fn add(self, rhs: Duration) -> Self::Output {
        Time(self.0 + rhs.0)
    }
}

impl AddAssign<Duration> for Time {
    fn add_assign(&mut self, rhs: Duration) {
        self.0 += rhs.0;
    }
}

impl Sub for Time {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Self::Output {
        Duration(self.0 - rhs.0)
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Duration) {
        self.0 += rhs.0;
    }
}

impl From<f64> for Time {
    fn from(v: f64) -> Self {
        Time(v)
    }
}

impl From<f64> for Duration {
    fn from(v: f64) -> Self {
        Duration(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_arithmetic() {
        let mut t = Time(10.0) + Duration(2.5);
        assert_eq!(t, Time(12.5));
        t += Duration(0.5);
        assert_eq!(t - Time(3.0), Duration(10.0));
        assert!(Time(1.0) < Time(1.5));
    }

    #[test]
    fn display_honors_precision() {
        assert_eq!(format!("{:.2}", Time(3.14159)), "3.14");
        assert_eq!(format!("{}", Duration(4.0)), "4");
    }
}
