//! Checkup and plugin configuration
use log::warn;
use std::f64::consts::PI;
use thiserror::Error;

use crate::frame::FixQuality;

#[cfg(feature = "serde")]
use serde::Deserialize;

/// Configuration errors. Only raised on construction:
/// everything observed at runtime is reported as a diagnostic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("{0}: expected rate should be a positive frequency, got {1}")]
    InvalidRate(String, f64),
    #[error("{0}: rate tolerance should be a positive ratio, got {1}")]
    InvalidTolerance(String, f64),
    #[error("{0} should be a positive finite value, got {1}")]
    InvalidThreshold(&'static str, f64),
}

/// Expected stream rate
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct RateConfig {
    /// Minimal expected rate [Hz]
    pub expected_rate: f64,
    /// Tolerated period excess, 0.1 meaning 10%
    #[cfg_attr(feature = "serde", serde(default = "default_tolerance"))]
    pub tolerance: f64,
}

fn default_tolerance() -> f64 {
    0.1
}

impl RateConfig {
    pub fn new(expected_rate: f64, tolerance: f64) -> Self {
        Self {
            expected_rate,
            tolerance,
        }
    }
}

fn default_gga_rate() -> RateConfig {
    RateConfig::new(1.0, default_tolerance())
}

fn default_track_angle_rate() -> RateConfig {
    RateConfig::new(1.0, default_tolerance())
}

fn default_linear_speed_rate() -> RateConfig {
    RateConfig::new(10.0, default_tolerance())
}

fn default_minimal_fix_quality() -> FixQuality {
    FixQuality::Rtk
}

fn default_maximal_hdop() -> f64 {
    5.0
}

fn default_minimal_satellites() -> u16 {
    6
}

fn default_minimal_speed_over_ground() -> f64 {
    1.0
}

fn default_course_angle_std() -> f64 {
    20.0 / 180.0 * PI
}

/// GPS localisation plugin configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Fix quality below which a fix is not trusted
    pub minimal_fix_quality: FixQuality,
    /// HDOP from which a fix is not trusted
    pub maximal_hdop: f64,
    /// Minimal number of satellites involved in the fix
    pub minimal_satellites: u16,
    /// Speed over ground [m/s] below which the RMC track angle is not trusted
    pub minimal_speed_over_ground: f64,
    /// Course angle standard deviation [rad]
    pub course_angle_std: f64,
    /// GGA stream rate
    pub gga_rate: RateConfig,
    /// RMC or HDT stream rate
    pub track_angle_rate: RateConfig,
    /// Linear speed stream rate
    pub linear_speed_rate: RateConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            minimal_fix_quality: default_minimal_fix_quality(),
            maximal_hdop: default_maximal_hdop(),
            minimal_satellites: default_minimal_satellites(),
            minimal_speed_over_ground: default_minimal_speed_over_ground(),
            course_angle_std: default_course_angle_std(),
            gga_rate: default_gga_rate(),
            track_angle_rate: default_track_angle_rate(),
            linear_speed_rate: default_linear_speed_rate(),
        }
    }
}

impl Config {
    /// Returns a copy of Self with updated minimal fix quality
    pub fn with_minimal_fix_quality(&self, quality: FixQuality) -> Self {
        let mut s = self.clone();
        s.minimal_fix_quality = quality;
        s
    }
    /// Returns a copy of Self with updated minimal speed over ground [m/s]
    pub fn with_minimal_speed_over_ground(&self, speed: f64) -> Self {
        let mut s = self.clone();
        s.minimal_speed_over_ground = speed;
        s
    }
    /// Returns a copy of Self with updated maximal HDOP
    pub fn with_maximal_hdop(&self, hdop: f64) -> Self {
        let mut s = self.clone();
        s.maximal_hdop = hdop;
        s
    }
    /// Returns a copy of Self with updated minimal number of satellites
    pub fn with_minimal_satellites(&self, satellites: u16) -> Self {
        let mut s = self.clone();
        s.minimal_satellites = satellites;
        s
    }
    /// Returns a copy of Self with updated course angle standard deviation [rad]
    pub fn with_course_angle_std(&self, std: f64) -> Self {
        let mut s = self.clone();
        s.course_angle_std = std;
        s
    }
    /// Returns a copy of Self with updated GGA rate
    pub fn with_gga_rate(&self, rate: RateConfig) -> Self {
        let mut s = self.clone();
        s.gga_rate = rate;
        s
    }
    /// Returns a copy of Self with updated RMC/HDT rate
    pub fn with_track_angle_rate(&self, rate: RateConfig) -> Self {
        let mut s = self.clone();
        s.track_angle_rate = rate;
        s
    }
    /// Returns a copy of Self with updated linear speed rate
    pub fn with_linear_speed_rate(&self, rate: RateConfig) -> Self {
        let mut s = self.clone();
        s.linear_speed_rate = rate;
        s
    }
    /// Verifies thresholds. Rates are verified by each tracker.
    pub fn validate(&self) -> Result<(), Error> {
        for (name, value) in [
            ("maximal_hdop", self.maximal_hdop),
            ("minimal_speed_over_ground", self.minimal_speed_over_ground),
            ("course_angle_std", self.course_angle_std),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::InvalidThreshold(name, value));
            }
        }
        if self.minimal_fix_quality == FixQuality::Simulation {
            warn!("minimal fix quality: only simulated fixes will be trusted");
        }
        if self.minimal_satellites < 4 {
            warn!(
                "minimal satellites ({}): a fix needs at least 4 satellites",
                self.minimal_satellites
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.minimal_fix_quality, FixQuality::Rtk);
        assert_eq!(cfg.maximal_hdop, 5.0);
        assert_eq!(cfg.minimal_satellites, 6);
        assert_eq!(cfg.minimal_speed_over_ground, 1.0);
        assert!((cfg.course_angle_std.to_degrees() - 20.0).abs() < 1.0E-9);
        assert_eq!(cfg.gga_rate, RateConfig::new(1.0, 0.1));
        assert_eq!(cfg.linear_speed_rate, RateConfig::new(10.0, 0.1));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn invalid_thresholds() {
        let cfg = Config::default().with_maximal_hdop(f64::NAN);
        assert!(matches!(
            cfg.validate(),
            Err(Error::InvalidThreshold("maximal_hdop", _))
        ));
        assert!(Config::default()
            .with_minimal_speed_over_ground(-1.0)
            .validate()
            .is_err());
        assert!(Config::default()
            .with_course_angle_std(f64::INFINITY)
            .validate()
            .is_err());
    }

    #[test]
    #[cfg(feature = "serde")]
    fn deserialize() {
        let cfg: Config = serde_json::from_str(
            r#"{
                "minimal_fix_quality": "float_rtk",
                "minimal_speed_over_ground": 0.5,
                "gga_rate": { "expected_rate": 5.0 }
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.minimal_fix_quality, FixQuality::FloatRtk);
        assert_eq!(cfg.minimal_speed_over_ground, 0.5);
        assert_eq!(cfg.gga_rate, RateConfig::new(5.0, 0.1));
        assert_eq!(cfg.maximal_hdop, 5.0);
        assert_eq!(cfg.track_angle_rate, RateConfig::new(1.0, 0.1));
    }
}
