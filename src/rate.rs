//! Stream rate and heartbeat monitoring
use hifitime::Duration;
use log::{debug, warn};
use std::sync::{Mutex, PoisonError};

use crate::{
    cfg::{Error, RateConfig},
    diagnostic::{set_report_info, Diagnostic, DiagnosticReport, DiagnosticStatus},
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
enum State {
    /// No sample received yet
    #[default]
    Unseen,
    /// Last sample is within the expected window
    Fresh,
    /// Silent for longer than the expected window
    Stale,
}

#[derive(Debug)]
struct Inner {
    state: State,
    /// Last arrival
    last: Option<Duration>,
    /// Last evaluation outcome, restored when a stream turns out alive
    evaluation: Diagnostic,
    report: DiagnosticReport,
}

/// Tracks arrivals of a named stream against its expected minimal rate.
/// [RateTracker::evaluate] runs on the stream clock, one call per sample,
/// while [RateTracker::heartbeat] runs on the monitoring clock.
#[derive(Debug)]
pub struct RateTracker {
    name: String,
    expected_rate: f64,
    /// Maximal tolerated period between two samples
    window: Duration,
    inner: Mutex<Inner>,
}

impl RateTracker {
    /// Builds a new tracker expecting at least `expected_rate` [Hz],
    /// `tolerance` being the tolerated period excess (0.1 for 10%).
    pub fn new(name: &str, expected_rate: f64, tolerance: f64) -> Result<Self, Error> {
        if !(expected_rate.is_finite() && expected_rate > 0.0) {
            return Err(Error::InvalidRate(name.to_string(), expected_rate));
        }
        if !(tolerance.is_finite() && tolerance >= 0.0) {
            return Err(Error::InvalidTolerance(name.to_string(), tolerance));
        }
        let window = Duration::from_seconds((1.0 + tolerance) / expected_rate);
        let unseen = Diagnostic::new(
            DiagnosticStatus::Error,
            format!("No {} data received.", name),
        );
        let mut report = DiagnosticReport::default();
        report.declare(&[Self::rate_key(name).as_str()]);
        report.diagnostics.push(unseen.clone());
        Ok(Self {
            name: name.to_string(),
            expected_rate,
            window,
            inner: Mutex::new(Inner {
                state: State::Unseen,
                last: None,
                evaluation: unseen,
                report,
            }),
        })
    }
    /// Builds a new tracker from [RateConfig]
    pub fn from_config(name: &str, cfg: &RateConfig) -> Result<Self, Error> {
        Self::new(name, cfg.expected_rate, cfg.tolerance)
    }
    fn rate_key(name: &str) -> String {
        format!("{}_rate", name)
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn expected_rate(&self) -> f64 {
        self.expected_rate
    }
    /// Maximal tolerated period between two samples
    pub fn window(&self) -> Duration {
        self.window
    }
    /// Records a new arrival and returns the rate diagnostic status:
    /// [DiagnosticStatus::Ok] when the period since last arrival is within the window
    /// (or on first arrival), [DiagnosticStatus::Warn] otherwise.
    pub fn evaluate(&self, stamp: Duration) -> DiagnosticStatus {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        let period = inner.last.map(|last| stamp - last);
        inner.last = Some(stamp);
        inner.state = State::Fresh;

        let diagnostic = match period {
            Some(period) if period > self.window => {
                debug!("{} - {} period {} exceeds {}", stamp, self.name, period, self.window);
                Diagnostic::new(
                    DiagnosticStatus::Warn,
                    format!("{} rate is too low.", self.name),
                )
            },
            _ => Diagnostic::new(DiagnosticStatus::Ok, format!("{} rate OK.", self.name)),
        };

        if let Some(period) = period {
            let seconds = period.to_seconds();
            if seconds > 0.0 {
                set_report_info(&mut inner.report, &Self::rate_key(&self.name), 1.0 / seconds);
            }
        }

        let status = diagnostic.status;
        inner.evaluation = diagnostic.clone();
        Self::set_diagnostic(&mut inner.report, diagnostic);
        status
    }
    /// Liveness check at monitoring instant `stamp`.
    /// Returns false when the stream is silent (or was never seen),
    /// dependent state should then be reset.
    pub fn heartbeat(&self, stamp: Duration) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let last = match inner.last {
            Some(last) => last,
            None => return false,
        };
        if stamp - last > self.window {
            if inner.state != State::Stale {
                warn!(
                    "{} - {} stream is stale (last sample {})",
                    stamp, self.name, last
                );
                inner.state = State::Stale;
                Self::set_diagnostic(
                    &mut inner.report,
                    Diagnostic::new(
                        DiagnosticStatus::Stale,
                        format!("{} stream is stale.", self.name),
                    ),
                );
            }
            false
        } else {
            if inner.state != State::Fresh {
                inner.state = State::Fresh;
                let evaluation = inner.evaluation.clone();
                Self::set_diagnostic(&mut inner.report, evaluation);
            }
            true
        }
    }
    /// Current rate diagnostic status
    pub fn status(&self) -> DiagnosticStatus {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.report.status().unwrap_or(DiagnosticStatus::Error)
    }
    /// Snapshot of the rate report
    pub fn report(&self) -> DiagnosticReport {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .report
            .clone()
    }
    fn set_diagnostic(report: &mut DiagnosticReport, diagnostic: Diagnostic) {
        match report.diagnostics.first_mut() {
            Some(slot) => *slot = diagnostic,
            None => report.diagnostics.push(diagnostic),
        }
    }
}
