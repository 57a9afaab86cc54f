use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Time;
use crate::utils::app_config::AppConfig;
use crate::utils::prelude::*;

/// Closed interval for a uniform draw
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Bounds {
    pub low: f64,
    pub high: f64,
}

impl Bounds {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

/// What happens to a drop-off customer arriving late in the day
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum CutoffPolicy {
    /// Drop-offs are accepted for as long as customers arrive
    NoCutoff,
    /// Drop-offs arriving at or after minute `after` are turned away
    RejectLateDropOffs { after: f64 },
}

impl Default for CutoffPolicy {
    fn default() -> Self {
        CutoffPolicy::NoCutoff
    }
}

impl CutoffPolicy {
    pub fn accepts_drop_off(&self, now: Time) -> bool {
        match *self {
            CutoffPolicy::NoCutoff => true,
            CutoffPolicy::RejectLateDropOffs { after } => *now < after,
        }
    }
}

/// Parameters of one simulated day
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ShopParams {
    /// Finished pairs waiting for pickup when the shop opens
    pub initial_stock: u32,
    /// Mean minutes between customer arrivals
    pub mean_interarrival: f64,
    /// Counter service time, minutes
    pub service: Bounds,
    /// Repair time, minutes
    pub repair: Bounds,
    /// Probability that an arrival is a pickup
    pub pickup_probability: f64,
    /// No new arrivals are scheduled once the clock reaches this minute
    pub day_length: f64,
    #[serde(default)]
    pub cutoff: CutoffPolicy,
}

impl Default for ShopParams {
    fn default() -> Self {
        Self {
            initial_stock: 10,
            mean_interarrival: 20.0,
            service: Bounds::new(3.0, 4.0),
            repair: Bounds::new(10.0, 20.0),
            pickup_probability: 0.5,
            day_length: 960.0,
            cutoff: CutoffPolicy::NoCutoff,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("mean interarrival time must be positive, got {0}")]
    NonPositiveMean(f64),
    #[error("{what} bounds must be positive, got [{low}, {high}]")]
    NonPositiveBounds { what: &'static str, low: f64, high: f64 },
    #[error("{what} bounds are inverted: [{low}, {high}]")]
    InvertedBounds { what: &'static str, low: f64, high: f64 },
    #[error("pickup probability must be within [0, 1], got {0}")]
    ProbabilityOutOfRange(f64),
    #[error("day length must be positive, got {0}")]
    NonPositiveDayLength(f64),
    #[error("drop-off cutoff must not be negative, got {0}")]
    NegativeCutoff(f64),
}

fn check_bounds(what: &'static str, b: &Bounds) -> std::result::Result<(), ParamError> {
    // written so NaN fails too
    if !(b.low > 0.0 && b.high > 0.0) {
        return Err(ParamError::NonPositiveBounds {
            what,
            low: b.low,
            high: b.high,
        });
    }
    if b.high < b.low {
        return Err(ParamError::InvertedBounds {
            what,
            low: b.low,
            high: b.high,
        });
    }
    Ok(())
}

impl ShopParams {
    /// Reject out-of-range or inconsistent parameters before a run starts
    pub fn validate(&self) -> std::result::Result<(), ParamError> {
        if !(self.mean_interarrival > 0.0) {
            return Err(ParamError::NonPositiveMean(self.mean_interarrival));
        }
        check_bounds("service", &self.service)?;
        check_bounds("repair", &self.repair)?;
        if !(0.0..=1.0).contains(&self.pickup_probability) {
            return Err(ParamError::ProbabilityOutOfRange(self.pickup_probability));
        }
        if !(self.day_length > 0.0 && self.day_length.is_finite()) {
            return Err(ParamError::NonPositiveDayLength(self.day_length));
        }
        if let CutoffPolicy::RejectLateDropOffs { after } = self.cutoff {
            if !(after >= 0.0) {
                return Err(ParamError::NegativeCutoff(after));
            }
        }
        Ok(())
    }
}

/// Everything a run reads from the configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimConfig {
    pub seed: Option<String>,
    pub shop: ShopParams,
    /// Stop after this many events even if some are still pending
    #[serde(default)]
    pub max_events: Option<u64>,
}

#[derive(Deserialize)]
pub(crate) struct OutputDir(PathBuf);

impl OutputDir {
    pub fn file(&self, name: impl AsRef<Path>) -> Result<PathBuf> {
        fs::create_dir_all(&self.0)?;
        Ok(self.0.join(name))
    }
}

pub(crate) trait AppConfigExt {
    fn output_dir(&self) -> Result<OutputDir>;
}

impl AppConfigExt for AppConfig {
    fn output_dir(&self) -> Result<OutputDir> {
        self.get("output_dir")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(ShopParams::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_inverted_service_bounds() {
        let params = ShopParams {
            service: Bounds::new(4.0, 3.0),
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ParamError::InvertedBounds { what: "service", .. })
        ));
    }

    #[test]
    fn rejects_bad_scalars() {
        let cases = vec![
            ShopParams {
                mean_interarrival: 0.0,
                ..Default::default()
            },
            ShopParams {
                repair: Bounds::new(-1.0, 5.0),
                ..Default::default()
            },
            ShopParams {
                pickup_probability: 1.5,
                ..Default::default()
            },
            ShopParams {
                day_length: f64::INFINITY,
                ..Default::default()
            },
            ShopParams {
                cutoff: CutoffPolicy::RejectLateDropOffs { after: -5.0 },
                ..Default::default()
            },
        ];
        for params in cases {
            assert!(params.validate().is_err(), "{:?} should be rejected", params);
        }
    }

    #[test]
    fn cutoff_policy() {
        let late = CutoffPolicy::RejectLateDropOffs { after: 600.0 };
        assert!(late.accepts_drop_off(Time(599.9)));
        assert!(!late.accepts_drop_off(Time(600.0)));
        assert!(CutoffPolicy::NoCutoff.accepts_drop_off(Time(10_000.0)));
    }
}
