use log::debug;
use std::sync::{Mutex, PoisonError};

use crate::{
    diagnostic::{
        fmt::format_double, set_report_info, Diagnostic, DiagnosticReport, DiagnosticStatus,
    },
    frame::RmcFrame,
};

const INFO_KEYS: [&str; 4] = [
    "rmc_talker",
    "speed_over_ground",
    "track_angle",
    "magnetic_deviation",
];

const INCOMPLETE: &str = "RMC track angle is incomplete.";

/// RMC track angle checkup. The track angle is only meaningful
/// while the vehicle moves fast enough.
#[derive(Debug)]
pub struct RmcTrackAngleCheckup {
    minimal_speed_over_ground: f64,
    report: Mutex<DiagnosticReport>,
}

impl RmcTrackAngleCheckup {
    /// Builds a new checkup trusting track angles
    /// from `minimal_speed_over_ground` [m/s]
    pub fn new(minimal_speed_over_ground: f64) -> Self {
        Self {
            minimal_speed_over_ground,
            report: Mutex::new(Self::empty_report()),
        }
    }
    fn empty_report() -> DiagnosticReport {
        let mut report = DiagnosticReport::default();
        report.declare(&INFO_KEYS);
        report
    }
    pub fn minimal_speed_over_ground(&self) -> f64 {
        self.minimal_speed_over_ground
    }
    pub fn evaluate(&self, frame: &RmcFrame) -> DiagnosticStatus {
        let diagnostic = match frame.track() {
            None => Diagnostic::new(DiagnosticStatus::Error, INCOMPLETE),
            Some((speed, _)) if speed < self.minimal_speed_over_ground => {
                debug!("rmc track angle at {} m/s is not reliable", speed);
                Diagnostic::new(
                    DiagnosticStatus::Warn,
                    format!(
                        "RMC track angle is not reliable because vehicle speed is lower than {} m/s.",
                        format_double(self.minimal_speed_over_ground)
                    ),
                )
            },
            Some(_) => Diagnostic::new(DiagnosticStatus::Ok, "RMC track angle OK."),
        };

        let status = diagnostic.status;
        let mut report = self.report.lock().unwrap_or_else(PoisonError::into_inner);
        report.diagnostics.clear();
        report.diagnostics.push(diagnostic);

        set_report_info(&mut report, "rmc_talker", frame.talker);
        set_report_info(&mut report, "speed_over_ground", frame.speed_over_ground);
        set_report_info(&mut report, "track_angle", frame.track_angle_true);
        set_report_info(&mut report, "magnetic_deviation", frame.magnetic_deviation);
        status
    }
    /// Snapshot of the current report
    pub fn report(&self) -> DiagnosticReport {
        self.report
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
    /// Back to the initial state: no diagnostic, empty infos.
    pub fn reset(&self) {
        *self.report.lock().unwrap_or_else(PoisonError::into_inner) = Self::empty_report();
    }
    /// Resets the checkup, then flags the stream outage as an incomplete track angle.
    pub fn expire(&self) {
        let mut report = self.report.lock().unwrap_or_else(PoisonError::into_inner);
        *report = Self::empty_report();
        report
            .diagnostics
            .push(Diagnostic::new(DiagnosticStatus::Error, INCOMPLETE));
    }
}
