use std::sync::{Mutex, PoisonError};

use crate::{
    diagnostic::{set_report_info, Diagnostic, DiagnosticReport, DiagnosticStatus},
    frame::HdtFrame,
};

const INFO_KEYS: [&str; 2] = ["hdt_talker", "heading"];

const INCOMPLETE: &str = "HDT track angle is incomplete.";

/// HDT (dual antenna heading) checkup
#[derive(Debug)]
pub struct HdtTrackAngleCheckup {
    report: Mutex<DiagnosticReport>,
}

impl Default for HdtTrackAngleCheckup {
    fn default() -> Self {
        Self::new()
    }
}

impl HdtTrackAngleCheckup {
    pub fn new() -> Self {
        Self {
            report: Mutex::new(Self::empty_report()),
        }
    }
    fn empty_report() -> DiagnosticReport {
        let mut report = DiagnosticReport::default();
        report.declare(&INFO_KEYS);
        report
    }
    pub fn evaluate(&self, frame: &HdtFrame) -> DiagnosticStatus {
        let diagnostic = match frame.heading {
            Some(_) => Diagnostic::new(DiagnosticStatus::Ok, "HDT track angle OK."),
            None => Diagnostic::new(DiagnosticStatus::Error, INCOMPLETE),
        };
        let status = diagnostic.status;
        let mut report = self.report.lock().unwrap_or_else(PoisonError::into_inner);
        report.diagnostics.clear();
        report.diagnostics.push(diagnostic);
        set_report_info(&mut report, "hdt_talker", frame.talker);
        set_report_info(&mut report, "heading", frame.heading);
        status
    }
    pub fn report(&self) -> DiagnosticReport {
        self.report
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
    pub fn reset(&self) {
        *self.report.lock().unwrap_or_else(PoisonError::into_inner) = Self::empty_report();
    }
    /// Resets the checkup, then flags the stream outage as an incomplete heading.
    pub fn expire(&self) {
        let mut report = self.report.lock().unwrap_or_else(PoisonError::into_inner);
        *report = Self::empty_report();
        report
            .diagnostics
            .push(Diagnostic::new(DiagnosticStatus::Error, INCOMPLETE));
    }
}
