//! NMEA frame checkups.
//!
//! Each checkup evaluates the latest frame of its stream and keeps
//! the resulting [crate::diagnostic::DiagnosticReport]. Checkups are
//! shared between the stream threads and the monitoring thread.
//!
//! Info keys are disjoint so that reports can be concatenated:
//!
//! | Checkup | Keys |
//! |---------|------|
//! | [FixCheckup] | `talker`, `latitude`, `longitude`, `geoid_height`, `altitude_above_geoid`, `fix_quality`, `number_of_satellites`, `hdop`, `correction_age`, `base_station_id` |
//! | [RmcTrackAngleCheckup] | `rmc_talker` (formerly `talker`), `speed_over_ground`, `track_angle`, `magnetic_deviation` |
//! | [HdtTrackAngleCheckup] | `hdt_talker` (formerly `talker`), `heading` (formerly `track_angle`) |
mod gga;
mod hdt;
mod rmc;

pub use gga::{FixCheckup, HDOP_TOO_HIGH, MAXIMAL_HDOP, MINIMAL_SATELLITES};
pub use hdt::HdtTrackAngleCheckup;
pub use rmc::RmcTrackAngleCheckup;

use crate::cfg::Config;

impl FixCheckup {
    /// Builds a new checkup from [Config] thresholds
    pub fn from_config(cfg: &Config) -> Self {
        Self::with_thresholds(
            cfg.minimal_fix_quality,
            cfg.maximal_hdop,
            cfg.minimal_satellites,
        )
    }
}

impl RmcTrackAngleCheckup {
    /// Builds a new checkup from [Config] thresholds
    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.minimal_speed_over_ground)
    }
}
