use log::debug;
use std::sync::{Mutex, PoisonError};

use crate::{
    diagnostic::{set_report_info, worse_status, Diagnostic, DiagnosticReport, DiagnosticStatus},
    frame::{Fix, FixQuality, GgaFrame},
};

const INFO_KEYS: [&str; 10] = [
    "talker",
    "latitude",
    "longitude",
    "geoid_height",
    "altitude_above_geoid",
    "fix_quality",
    "number_of_satellites",
    "hdop",
    "correction_age",
    "base_station_id",
];

const INCOMPLETE: &str = "GGA fix is incomplete.";

/// Reported when HDOP reaches the ceiling. Older releases of this
/// diagnostic spelled it "HDOP is two high.": string matchers relying on
/// that spelling need updating.
pub const HDOP_TOO_HIGH: &str = "HDOP is too high.";

/// Default HDOP from which a fix is no longer trusted
pub const MAXIMAL_HDOP: f64 = 5.0;

/// Default minimal number of satellites involved in a trusted fix
pub const MINIMAL_SATELLITES: u16 = 6;

/// GGA fix checkup: is the fix complete, and can it be trusted.
#[derive(Debug)]
pub struct FixCheckup {
    minimal_fix_quality: FixQuality,
    maximal_hdop: f64,
    minimal_satellites: u16,
    report: Mutex<DiagnosticReport>,
}

impl FixCheckup {
    /// Builds a new checkup with default HDOP and satellite thresholds
    pub fn new(minimal_fix_quality: FixQuality) -> Self {
        Self::with_thresholds(minimal_fix_quality, MAXIMAL_HDOP, MINIMAL_SATELLITES)
    }
    pub fn with_thresholds(
        minimal_fix_quality: FixQuality,
        maximal_hdop: f64,
        minimal_satellites: u16,
    ) -> Self {
        Self {
            minimal_fix_quality,
            maximal_hdop,
            minimal_satellites,
            report: Mutex::new(Self::empty_report()),
        }
    }
    fn empty_report() -> DiagnosticReport {
        let mut report = DiagnosticReport::default();
        report.declare(&INFO_KEYS);
        report
    }
    /// Evaluates a new frame. Diagnostics are rebuilt from scratch,
    /// returned status is the worst of them.
    pub fn evaluate(&self, frame: &GgaFrame) -> DiagnosticStatus {
        let mut report = self.report.lock().unwrap_or_else(PoisonError::into_inner);
        report.diagnostics.clear();

        match frame.fix() {
            Some(fix) => self.check_reliability(&fix, &mut report.diagnostics),
            None => report
                .diagnostics
                .push(Diagnostic::new(DiagnosticStatus::Error, INCOMPLETE)),
        }

        Self::set_report_infos(&mut report, frame);
        worse_status(&report.diagnostics).unwrap_or(DiagnosticStatus::Error)
    }
    fn check_reliability(&self, fix: &Fix, diagnostics: &mut Vec<Diagnostic>) {
        if fix.quality == FixQuality::Simulation {
            diagnostics.push(Diagnostic::new(DiagnosticStatus::Ok, "GGA fix OK."));
            return;
        }
        // every check runs, so that all failures get reported at once
        let checks = [
            (fix.hdop < self.maximal_hdop, HDOP_TOO_HIGH),
            (
                fix.satellites >= self.minimal_satellites,
                "Not enough satellites to compute fix.",
            ),
            (
                fix.quality >= self.minimal_fix_quality,
                "Fix quality is too low.",
            ),
        ];
        let mut reliable = true;
        for (passed, warning) in checks {
            if !passed {
                debug!("unreliable fix: {}", warning);
                diagnostics.push(Diagnostic::new(DiagnosticStatus::Warn, warning));
                reliable = false;
            }
        }
        if reliable {
            diagnostics.push(Diagnostic::new(DiagnosticStatus::Ok, "GGA fix OK."));
        }
    }
    fn set_report_infos(report: &mut DiagnosticReport, frame: &GgaFrame) {
        set_report_info(report, "talker", frame.talker);
        set_report_info(report, "latitude", frame.latitude);
        set_report_info(report, "longitude", frame.longitude);
        set_report_info(report, "geoid_height", frame.geoid_height);
        set_report_info(report, "altitude_above_geoid", frame.altitude_above_geoid);
        set_report_info(report, "fix_quality", frame.fix_quality);
        set_report_info(report, "number_of_satellites", frame.satellites);
        set_report_info(report, "hdop", frame.hdop);
        set_report_info(report, "correction_age", frame.dgps_correction_age);
        set_report_info(report, "base_station_id", frame.dgps_station_id);
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
    /// Resets the checkup, then flags the stream outage as an incomplete fix.
    pub fn expire(&self) {
        let mut report = self.report.lock().unwrap_or_else(PoisonError::into_inner);
        *report = Self::empty_report();
        report
            .diagnostics
            .push(Diagnostic::new(DiagnosticStatus::Error, INCOMPLETE));
    }
}
