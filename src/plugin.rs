//! GPS localisation plugin: turns NMEA sentences into
//! localisation observations, and reports on the streams health.
use hifitime::Duration;
use log::{debug, info};
use nalgebra::Vector2;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    PoisonError, RwLock,
};

use crate::{
    cfg::{Config, Error},
    checkup::{FixCheckup, HdtTrackAngleCheckup, RmcTrackAngleCheckup},
    course::{heading_to_course_angle, track_angle_to_course_angle},
    diagnostic::{DiagnosticReport, DiagnosticStatus},
    frame::SentenceParser,
    geodesy::{EnuConverter, GeodeticCoordinates},
    observation::{ObservationCourse, ObservationPosition},
    rate::RateTracker,
    receiver::GpsReceiver,
};

/// Source of course angle observations
#[derive(Debug)]
pub enum CourseStream {
    /// Course derived from the RMC track angle, which requires
    /// the vehicle linear speed to resolve the travel direction.
    SingleAntenna {
        /// Latest linear speed [m/s] (f64 bits), NaN when unknown
        linear_speed: AtomicU64,
        linear_speed_rate: RateTracker,
        rmc_rate: RateTracker,
        track_angle: RmcTrackAngleCheckup,
    },
    /// Course derived from the HDT true heading
    DualAntenna {
        hdt_rate: RateTracker,
        heading: HdtTrackAngleCheckup,
    },
}

impl CourseStream {
    fn single_antenna(cfg: &Config) -> Result<Self, Error> {
        Ok(Self::SingleAntenna {
            linear_speed: AtomicU64::new(f64::NAN.to_bits()),
            linear_speed_rate: RateTracker::from_config("linear_speed", &cfg.linear_speed_rate)?,
            rmc_rate: RateTracker::from_config("rmc", &cfg.track_angle_rate)?,
            track_angle: RmcTrackAngleCheckup::from_config(cfg),
        })
    }
    fn dual_antenna(cfg: &Config) -> Result<Self, Error> {
        Ok(Self::DualAntenna {
            hdt_rate: RateTracker::from_config("hdt", &cfg.track_angle_rate)?,
            heading: HdtTrackAngleCheckup::new(),
        })
    }
}

/// [LocalisationPlugin] consumes GGA sentences and either RMC sentences
/// (plus vehicle linear speed) or HDT sentences, depending on the
/// [CourseStream]. Every operation takes `&self`: streams are usually
/// fed from distinct threads while another one collects diagnostics.
#[derive(Debug)]
pub struct LocalisationPlugin<R: GpsReceiver, P: SentenceParser> {
    receiver: R,
    parser: P,
    enu: RwLock<EnuConverter>,
    gga_rate: RateTracker,
    fix: FixCheckup,
    /// [rad^2]
    course_angle_variance: f64,
    course: CourseStream,
}

impl<R: GpsReceiver, P: SentenceParser> LocalisationPlugin<R, P> {
    /// Builds a plugin deriving course angles from RMC track angles
    pub fn single_antenna(receiver: R, parser: P, cfg: &Config) -> Result<Self, Error> {
        Self::new(receiver, parser, cfg, CourseStream::single_antenna(cfg)?)
    }
    /// Builds a plugin deriving course angles from HDT headings
    pub fn dual_antenna(receiver: R, parser: P, cfg: &Config) -> Result<Self, Error> {
        Self::new(receiver, parser, cfg, CourseStream::dual_antenna(cfg)?)
    }
    fn new(receiver: R, parser: P, cfg: &Config, course: CourseStream) -> Result<Self, Error> {
        cfg.validate()?;
        info!(
            "gps plugin: minimal fix quality \"{}\", course angle std {} rad",
            cfg.minimal_fix_quality, cfg.course_angle_std
        );
        Ok(Self {
            receiver,
            parser,
            enu: RwLock::new(EnuConverter::default()),
            gga_rate: RateTracker::from_config("gga", &cfg.gga_rate)?,
            fix: FixCheckup::from_config(cfg),
            course_angle_variance: cfg.course_angle_std.powi(2),
            course,
        })
    }
    pub fn receiver(&self) -> &R {
        &self.receiver
    }
    pub fn course_stream(&self) -> &CourseStream {
        &self.course
    }
    /// Moves the local ENU frame origin
    pub fn set_anchor(&self, anchor: GeodeticCoordinates) {
        debug!(
            "enu anchor: lat={}rad lon={}rad alt={}m",
            anchor.latitude, anchor.longitude, anchor.altitude
        );
        self.enu
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set_anchor(anchor);
    }
    /// Returns a copy of the local projection
    pub fn enu_converter(&self) -> EnuConverter {
        self.enu
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
    /// Records vehicle linear speed [m/s]. Ignored by dual antenna plugins.
    pub fn process_linear_speed(&self, stamp: Duration, speed: f64) {
        match &self.course {
            CourseStream::SingleAntenna {
                linear_speed,
                linear_speed_rate,
                ..
            } => {
                linear_speed.store(speed.to_bits(), Ordering::SeqCst);
                linear_speed_rate.evaluate(stamp);
            },
            CourseStream::DualAntenna { .. } => {
                debug!("{} - linear speed is not used by dual antenna plugins", stamp);
            },
        }
    }
    /// Processes a GGA sentence received at `stamp`. The rate and the fix
    /// are always both evaluated. Returns an observation when the GGA rate
    /// is OK and the fix can be trusted.
    pub fn process_position(&self, stamp: Duration, sentence: &str) -> Option<ObservationPosition> {
        let frame = self.parser.gga(sentence);
        let rate = self.gga_rate.evaluate(stamp);
        let status = self.fix.evaluate(&frame);
        if !Self::accepted(stamp, "gga fix", rate, status) {
            return None;
        }
        let fix = frame.fix()?;
        let enu = self
            .enu
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .to_enu(&GeodeticCoordinates::new(
                fix.latitude,
                fix.longitude,
                fix.altitude,
            ));
        let std = fix.hdop * self.receiver.uere(fix.quality);
        Some(ObservationPosition::new(
            Vector2::new(enu[0], enu[1]),
            std,
            self.receiver.antenna_body_position(),
        ))
    }
    /// Processes a RMC sentence (single antenna) or a HDT sentence
    /// (dual antenna) received at `stamp`.
    /// Returns an observation when the stream rate is OK and the angle
    /// can be trusted.
    pub fn process_course(&self, stamp: Duration, sentence: &str) -> Option<ObservationCourse> {
        let angle = match &self.course {
            CourseStream::SingleAntenna {
                linear_speed,
                rmc_rate,
                track_angle,
                ..
            } => {
                let frame = self.parser.rmc(sentence);
                let rate = rmc_rate.evaluate(stamp);
                let status = track_angle.evaluate(&frame);
                if !Self::accepted(stamp, "rmc track angle", rate, status) {
                    return None;
                }
                let speed = f64::from_bits(linear_speed.load(Ordering::SeqCst));
                if !speed.is_finite() {
                    debug!("{} - rmc track angle dropped: unknown linear speed", stamp);
                    return None;
                }
                let (_, angle) = frame.track()?;
                track_angle_to_course_angle(angle, speed)
            },
            CourseStream::DualAntenna { hdt_rate, heading } => {
                let frame = self.parser.hdt(sentence);
                let rate = hdt_rate.evaluate(stamp);
                let status = heading.evaluate(&frame);
                if !Self::accepted(stamp, "hdt heading", rate, status) {
                    return None;
                }
                heading_to_course_angle(frame.heading?)
            },
        };
        Some(ObservationCourse::new(angle, self.course_angle_variance))
    }
    /// Both the stream rate and the frame checkup must be OK.
    fn accepted(
        stamp: Duration,
        stream: &str,
        rate: DiagnosticStatus,
        status: DiagnosticStatus,
    ) -> bool {
        if rate != DiagnosticStatus::Ok {
            debug!("{} - {} rejected: rate {}", stamp, stream, rate);
            false
        } else if status != DiagnosticStatus::Ok {
            debug!("{} - {} rejected ({})", stamp, stream, status);
            false
        } else {
            true
        }
    }
    /// Forwards a GSV sentence to the receiver.
    /// Returns true when the satellites view got updated.
    pub fn process_satellites_view(&self, sentence: &str) -> bool {
        self.receiver.update_satellites_views(sentence)
    }
    /// Checks every stream liveness at `stamp`, then gathers all reports.
    /// Silent streams have their checkup expired.
    pub fn make_diagnostic_report(&self, stamp: Duration) -> DiagnosticReport {
        let mut report = DiagnosticReport::default();
        match &self.course {
            CourseStream::SingleAntenna {
                linear_speed,
                linear_speed_rate,
                rmc_rate,
                track_angle,
            } => {
                if !linear_speed_rate.heartbeat(stamp) {
                    linear_speed.store(f64::NAN.to_bits(), Ordering::SeqCst);
                }
                self.check_gga_heartbeat(stamp);
                if !rmc_rate.heartbeat(stamp) {
                    track_angle.expire();
                }
                report += linear_speed_rate.report();
                report += self.gga_rate.report();
                report += self.fix.report();
                report += rmc_rate.report();
                report += track_angle.report();
            },
            CourseStream::DualAntenna { hdt_rate, heading } => {
                self.check_gga_heartbeat(stamp);
                if !hdt_rate.heartbeat(stamp) {
                    heading.expire();
                }
                report += self.gga_rate.report();
                report += self.fix.report();
                report += hdt_rate.report();
                report += heading.report();
            },
        }
        report
    }
    fn check_gga_heartbeat(&self, stamp: Duration) {
        if !self.gga_rate.heartbeat(stamp) {
            self.fix.expire();
        }
    }
}
