//! Diagnostic statuses and reports
use std::collections::BTreeMap;
use std::ops::AddAssign;

pub mod fmt;

pub use fmt::ReportValue;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Diagnostic status, ordered from best to worst.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum DiagnosticStatus {
    /// Data is complete and reliable
    #[default]
    Ok,
    /// Data is complete but outside of trust thresholds
    Warn,
    /// Data is incomplete or unavailable
    Error,
    /// No data within the expected window. Only produced by heartbeats,
    /// ordered above [DiagnosticStatus::Error] for display purposes.
    Stale,
}

impl std::fmt::Display for DiagnosticStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Stale => write!(f, "STALE"),
        }
    }
}

/// Single diagnostic
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Diagnostic {
    pub status: DiagnosticStatus,
    pub message: String,
}

impl Diagnostic {
    pub fn new(status: DiagnosticStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[{}] {}", self.status, self.message)
    }
}

/// Returns the worst status of given diagnostics,
/// None when there is nothing to aggregate.
pub fn worse_status(diagnostics: &[Diagnostic]) -> Option<DiagnosticStatus> {
    diagnostics.iter().map(|diag| diag.status).max()
}

/// Diagnostic report: evaluation ordered diagnostics and
/// a key/value info table. Keys are declared once, values change.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct DiagnosticReport {
    pub diagnostics: Vec<Diagnostic>,
    pub info: BTreeMap<String, String>,
}

impl DiagnosticReport {
    /// Worst status of this report, None if it holds no diagnostic.
    pub fn status(&self) -> Option<DiagnosticStatus> {
        worse_status(&self.diagnostics)
    }
    /// Declares given keys with empty values.
    pub(crate) fn declare(&mut self, keys: &[&str]) {
        for key in keys {
            self.info.insert(key.to_string(), String::new());
        }
    }
}

impl AddAssign<&DiagnosticReport> for DiagnosticReport {
    fn add_assign(&mut self, rhs: &DiagnosticReport) {
        self.diagnostics.extend(rhs.diagnostics.iter().cloned());
        self.info
            .extend(rhs.info.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
}

impl AddAssign<DiagnosticReport> for DiagnosticReport {
    fn add_assign(&mut self, rhs: DiagnosticReport) {
        self.diagnostics.extend(rhs.diagnostics);
        self.info.extend(rhs.info);
    }
}

impl std::fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for diag in &self.diagnostics {
            writeln!(f, "{}", diag)?;
        }
        for (key, value) in &self.info {
            writeln!(f, "  {}: {}", key, value)?;
        }
        Ok(())
    }
}

/// Stores the rendering of `value` under `key`, an empty string if unset.
pub fn set_report_info<V: ReportValue>(report: &mut DiagnosticReport, key: &str, value: V) {
    report.info.insert(key.to_string(), value.to_report_string());
}
