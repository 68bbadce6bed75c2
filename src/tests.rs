use hifitime::Duration;
use nalgebra::Vector3;
use std::collections::HashMap;
use std::f64::consts::PI;

use crate::{
    prelude::{
        between_minus_pi_and_pi, Config, DiagnosticReport, DiagnosticStatus, FixQuality,
        GeodeticCoordinates, GgaFrame, GpsReceiver, HdtFrame, LocalisationPlugin, RateConfig, Receiver,
        RmcFrame, SentenceParser, TalkerId,
    },
    Error,
};

const GGA: &str = "$GNGGA,fix";
const GGA_FLOAT: &str = "$GNGGA,float";
const GGA_INCOMPLETE: &str = "$GNGGA,incomplete";
const RMC: &str = "$GPRMC,track";
const RMC_SLOW: &str = "$GPRMC,slow";
const RMC_INCOMPLETE: &str = "$GPRMC,incomplete";
const HDT: &str = "$GLHDT,heading";
const HDT_INCOMPLETE: &str = "$GLHDT,incomplete";

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn t(seconds: f64) -> Duration {
    Duration::from_seconds(seconds)
}

fn gga_frame() -> GgaFrame {
    GgaFrame {
        talker: Some(TalkerId::GN),
        longitude: Some(0.03),
        latitude: Some(0.7854),
        geoid_height: Some(400.8),
        altitude_above_geoid: Some(53.3),
        hdop: Some(1.2),
        satellites: Some(12),
        fix_quality: Some(FixQuality::Rtk),
        dgps_correction_age: Some(2.5),
        dgps_station_id: Some(1),
    }
}

fn rmc_frame() -> RmcFrame {
    RmcFrame {
        talker: Some(TalkerId::GP),
        speed_over_ground: Some(3.2),
        track_angle_true: Some(1.54),
        magnetic_deviation: Some(0.0378),
    }
}

/// Decodes the few sentences these scenarios rely on
#[derive(Debug)]
struct FakeParser {
    gga: HashMap<&'static str, GgaFrame>,
    rmc: HashMap<&'static str, RmcFrame>,
    hdt: HashMap<&'static str, HdtFrame>,
}

impl Default for FakeParser {
    fn default() -> Self {
        let mut float = gga_frame();
        float.fix_quality = Some(FixQuality::FloatRtk);
        let mut incomplete = gga_frame();
        incomplete.latitude = None;
        let mut slow = rmc_frame();
        slow.speed_over_ground = Some(0.5);
        Self {
            gga: HashMap::from([
                (GGA, gga_frame()),
                (GGA_FLOAT, float),
                (GGA_INCOMPLETE, incomplete),
            ]),
            rmc: HashMap::from([
                (RMC, rmc_frame()),
                (RMC_SLOW, slow),
                (
                    RMC_INCOMPLETE,
                    RmcFrame {
                        talker: Some(TalkerId::GP),
                        ..Default::default()
                    },
                ),
            ]),
            hdt: HashMap::from([
                (
                    HDT,
                    HdtFrame {
                        talker: Some(TalkerId::GL),
                        heading: Some(0.378),
                    },
                ),
                (
                    HDT_INCOMPLETE,
                    HdtFrame {
                        talker: Some(TalkerId::GL),
                        heading: None,
                    },
                ),
            ]),
        }
    }
}

impl SentenceParser for FakeParser {
    fn gga(&self, sentence: &str) -> GgaFrame {
        self.gga.get(sentence).cloned().unwrap_or_default()
    }
    fn rmc(&self, sentence: &str) -> RmcFrame {
        self.rmc.get(sentence).cloned().unwrap_or_default()
    }
    fn hdt(&self, sentence: &str) -> HdtFrame {
        self.hdt.get(sentence).cloned().unwrap_or_default()
    }
}

fn receiver() -> Receiver {
    Receiver::default().with_antenna_body_position(Vector3::new(0.3, 0.0, 2.0))
}

fn anchor() -> GeodeticCoordinates {
    GeodeticCoordinates::new(0.7854, 0.03, 454.1)
}

fn single_antenna() -> LocalisationPlugin<Receiver, FakeParser> {
    init_logger();
    let plugin =
        LocalisationPlugin::single_antenna(receiver(), FakeParser::default(), &Config::default())
            .unwrap();
    plugin.set_anchor(anchor());
    plugin
}

fn dual_antenna() -> LocalisationPlugin<Receiver, FakeParser> {
    init_logger();
    let plugin =
        LocalisationPlugin::dual_antenna(receiver(), FakeParser::default(), &Config::default())
            .unwrap();
    plugin.set_anchor(anchor());
    plugin
}

/// Feeds 21 linear speed samples at 20 Hz, up to t=1s
fn feed_linear_speed<R: GpsReceiver, P: SentenceParser>(
    plugin: &LocalisationPlugin<R, P>,
    speed: f64,
) {
    for n in 0..=20 {
        plugin.process_linear_speed(t(n as f64 * 0.05), speed);
    }
}

fn messages(report: &DiagnosticReport) -> Vec<(DiagnosticStatus, &str)> {
    report
        .diagnostics
        .iter()
        .map(|diag| (diag.status, diag.message.as_str()))
        .collect()
}

fn assert_angle(angle: f64, expected: f64) {
    assert!(
        (angle - expected).abs() < 1.0E-9,
        "got {} expected {}",
        angle,
        expected
    );
}

#[test]
fn single_antenna_nominal() {
    let plugin = single_antenna();
    feed_linear_speed(&plugin, 1.0);

    let position = plugin.process_position(t(1.0), GGA).unwrap();
    assert!(position.position().norm() < 1.0E-6);
    let variance = (1.2_f64 * 0.02).powi(2);
    assert!((position.covariance()[(0, 0)] - variance).abs() < 1.0E-12);
    assert!((position.covariance()[(1, 1)] - variance).abs() < 1.0E-12);
    assert_eq!(position.covariance()[(0, 1)], 0.0);
    assert_eq!(position.covariance()[(1, 0)], 0.0);
    assert_eq!(position.lever_arm(), Vector3::new(0.3, 0.0, 2.0));

    let course = plugin.process_course(t(1.0), RMC).unwrap();
    assert_angle(course.angle(), PI / 2.0 - 1.54);
    assert_angle(course.variance(), (20.0_f64.to_radians()).powi(2));

    let report = plugin.make_diagnostic_report(t(1.0));
    assert_eq!(
        messages(&report),
        vec![
            (DiagnosticStatus::Ok, "linear_speed rate OK."),
            (DiagnosticStatus::Ok, "gga rate OK."),
            (DiagnosticStatus::Ok, "GGA fix OK."),
            (DiagnosticStatus::Ok, "rmc rate OK."),
            (DiagnosticStatus::Ok, "RMC track angle OK."),
        ]
    );
    assert_eq!(report.status(), Some(DiagnosticStatus::Ok));
    assert_eq!(report.info.len(), 17);
    assert_eq!(report.info["linear_speed_rate"], "20");
    assert_eq!(report.info["gga_rate"], "");
    assert_eq!(report.info["fix_quality"], "rtk fix (4)");
    assert_eq!(report.info["talker"], "GNSS");
    assert_eq!(report.info["rmc_talker"], "NAVSTAR");
    assert_eq!(report.info["track_angle"], "1.54");
}

#[test]
fn reversing_vehicle() {
    let plugin = single_antenna();
    feed_linear_speed(&plugin, -1.0);
    let course = plugin.process_course(t(1.0), RMC).unwrap();
    assert_angle(course.angle(), between_minus_pi_and_pi(PI / 2.0 - 1.54 + PI));
}

#[test]
fn no_linear_speed() {
    let plugin = single_antenna();
    assert!(plugin.process_position(t(1.0), GGA).is_some());
    assert!(plugin.process_course(t(1.0), RMC).is_none());

    let report = plugin.make_diagnostic_report(t(1.0));
    assert_eq!(
        messages(&report),
        vec![
            (DiagnosticStatus::Error, "No linear_speed data received."),
            (DiagnosticStatus::Ok, "gga rate OK."),
            (DiagnosticStatus::Ok, "GGA fix OK."),
            (DiagnosticStatus::Ok, "rmc rate OK."),
            (DiagnosticStatus::Ok, "RMC track angle OK."),
        ]
    );
    assert_eq!(report.status(), Some(DiagnosticStatus::Error));
}

#[test]
fn unreliable_frames() {
    let plugin = single_antenna();
    feed_linear_speed(&plugin, 1.0);
    assert!(plugin.process_position(t(1.0), GGA_FLOAT).is_none());
    assert!(plugin.process_course(t(1.0), RMC_SLOW).is_none());

    let report = plugin.make_diagnostic_report(t(1.0));
    assert_eq!(
        messages(&report),
        vec![
            (DiagnosticStatus::Ok, "linear_speed rate OK."),
            (DiagnosticStatus::Ok, "gga rate OK."),
            (DiagnosticStatus::Warn, "Fix quality is too low."),
            (DiagnosticStatus::Ok, "rmc rate OK."),
            (
                DiagnosticStatus::Warn,
                "RMC track angle is not reliable because vehicle speed is lower than 1 m/s."
            ),
        ]
    );
    assert_eq!(report.info["fix_quality"], "float rtk fix (5)");
    assert_eq!(report.info["speed_over_ground"], "0.5");
}

#[test]
fn incomplete_frames() {
    let plugin = single_antenna();
    feed_linear_speed(&plugin, 1.0);
    assert!(plugin.process_position(t(1.0), GGA_INCOMPLETE).is_none());
    assert!(plugin.process_course(t(1.0), RMC_INCOMPLETE).is_none());
    // unknown sentences decode into empty frames
    assert!(plugin.process_position(t(1.0), "$GNGSA").is_none());

    let report = plugin.make_diagnostic_report(t(1.0));
    assert_eq!(report.diagnostics[2].status, DiagnosticStatus::Error);
    assert_eq!(report.diagnostics[2].message, "GGA fix is incomplete.");
    assert_eq!(report.diagnostics[4].status, DiagnosticStatus::Error);
    assert_eq!(report.diagnostics[4].message, "RMC track angle is incomplete.");
    assert_eq!(report.info["rmc_talker"], "NAVSTAR");
    assert_eq!(report.info["track_angle"], "");
}

#[test]
fn stale_gga_stream() {
    let plugin = single_antenna();
    assert!(plugin.process_position(t(0.0), GGA).is_some());

    let report = plugin.make_diagnostic_report(t(2.0));
    assert_eq!(
        messages(&report),
        vec![
            (DiagnosticStatus::Error, "No linear_speed data received."),
            (DiagnosticStatus::Stale, "gga stream is stale."),
            (DiagnosticStatus::Error, "GGA fix is incomplete."),
            (DiagnosticStatus::Error, "No rmc data received."),
            (DiagnosticStatus::Error, "RMC track angle is incomplete."),
        ]
    );
    assert_eq!(report.status(), Some(DiagnosticStatus::Stale));
    for key in ["latitude", "longitude", "hdop", "fix_quality", "talker"] {
        assert_eq!(report.info[key], "", "{} should have been reset", key);
    }

    // late fix: the stream recovers, but its rate is too low to be trusted
    assert!(plugin.process_position(t(2.5), GGA).is_none());
    let report = plugin.make_diagnostic_report(t(2.6));
    assert_eq!(report.diagnostics[1].status, DiagnosticStatus::Warn);
    assert_eq!(report.diagnostics[1].message, "gga rate is too low.");
    assert_eq!(report.diagnostics[2].message, "GGA fix OK.");
    assert_eq!(report.info["gga_rate"], "0.4");

    // back on time
    assert!(plugin.process_position(t(3.0), GGA).is_some());
    let report = plugin.make_diagnostic_report(t(3.0));
    assert_eq!(report.diagnostics[1].status, DiagnosticStatus::Ok);
    assert_eq!(report.info["gga_rate"], "2");
}

#[test]
fn late_samples_are_rejected() {
    let plugin = single_antenna();
    feed_linear_speed(&plugin, 1.0);
    assert!(plugin.process_position(t(0.0), GGA).is_some());
    assert!(plugin.process_course(t(0.0), RMC).is_some());

    // complete and reliable frames, arriving too late
    assert!(plugin.process_position(t(3.0), GGA).is_none());
    assert!(plugin.process_course(t(3.0), RMC).is_none());

    let report = plugin.make_diagnostic_report(t(3.0));
    assert_eq!(
        messages(&report)[1..],
        [
            (DiagnosticStatus::Warn, "gga rate is too low."),
            (DiagnosticStatus::Ok, "GGA fix OK."),
            (DiagnosticStatus::Warn, "rmc rate is too low."),
            (DiagnosticStatus::Ok, "RMC track angle OK."),
        ]
    );

    plugin.process_linear_speed(t(3.5), 1.0);
    assert!(plugin.process_position(t(3.5), GGA).is_some());
    assert!(plugin.process_course(t(3.5), RMC).is_some());

    let plugin = dual_antenna();
    assert!(plugin.process_course(t(0.0), HDT).is_some());
    assert!(plugin.process_course(t(2.0), HDT).is_none());
    let report = plugin.make_diagnostic_report(t(2.0));
    assert_eq!(report.diagnostics[2].status, DiagnosticStatus::Warn);
    assert_eq!(report.diagnostics[2].message, "hdt rate is too low.");
    assert!(plugin.process_course(t(2.5), HDT).is_some());
}

#[test]
fn stale_linear_speed() {
    let plugin = single_antenna();
    plugin.process_linear_speed(t(0.0), 2.0);
    assert!(plugin.process_course(t(0.05), RMC).is_some());

    let report = plugin.make_diagnostic_report(t(0.5));
    assert_eq!(report.diagnostics[0].status, DiagnosticStatus::Stale);
    assert_eq!(report.diagnostics[0].message, "linear_speed stream is stale.");

    // cached speed was invalidated
    assert!(plugin.process_course(t(0.6), RMC).is_none());
    plugin.process_linear_speed(t(0.7), 2.0);
    assert!(plugin.process_course(t(0.8), RMC).is_some());
}

#[test]
fn report_is_stable() {
    let plugin = single_antenna();
    feed_linear_speed(&plugin, 1.0);
    plugin.process_position(t(1.0), GGA);
    plugin.process_course(t(1.0), RMC);
    assert_eq!(
        plugin.make_diagnostic_report(t(1.05)),
        plugin.make_diagnostic_report(t(1.05))
    );
}

#[test]
fn dual_antenna_nominal() {
    let plugin = dual_antenna();
    // not required
    plugin.process_linear_speed(t(0.0), 1.0);

    let position = plugin.process_position(t(1.0), GGA).unwrap();
    assert_eq!(position.lever_arm(), Vector3::new(0.3, 0.0, 2.0));
    let course = plugin.process_course(t(1.0), HDT).unwrap();
    assert_angle(course.angle(), PI / 2.0 - 0.378);

    let report = plugin.make_diagnostic_report(t(1.0));
    assert_eq!(
        messages(&report),
        vec![
            (DiagnosticStatus::Ok, "gga rate OK."),
            (DiagnosticStatus::Ok, "GGA fix OK."),
            (DiagnosticStatus::Ok, "hdt rate OK."),
            (DiagnosticStatus::Ok, "HDT track angle OK."),
        ]
    );
    assert_eq!(report.info.len(), 14);
    assert_eq!(report.info["hdt_talker"], "GLONASS");
    assert_eq!(report.info["heading"], "0.378");
}

#[test]
fn dual_antenna_degraded() {
    let plugin = dual_antenna();
    assert!(plugin.process_course(t(0.0), HDT_INCOMPLETE).is_none());
    assert!(plugin.process_position(t(0.0), GGA_FLOAT).is_none());

    let report = plugin.make_diagnostic_report(t(0.5));
    assert_eq!(
        messages(&report),
        vec![
            (DiagnosticStatus::Ok, "gga rate OK."),
            (DiagnosticStatus::Warn, "Fix quality is too low."),
            (DiagnosticStatus::Ok, "hdt rate OK."),
            (DiagnosticStatus::Error, "HDT track angle is incomplete."),
        ]
    );

    let report = plugin.make_diagnostic_report(t(5.0));
    assert_eq!(
        messages(&report),
        vec![
            (DiagnosticStatus::Stale, "gga stream is stale."),
            (DiagnosticStatus::Error, "GGA fix is incomplete."),
            (DiagnosticStatus::Stale, "hdt stream is stale."),
            (DiagnosticStatus::Error, "HDT track angle is incomplete."),
        ]
    );
    assert_eq!(report.info["hdt_talker"], "");
}

#[test]
fn custom_configuration() {
    init_logger();
    let cfg = Config::default()
        .with_minimal_fix_quality(FixQuality::FloatRtk)
        .with_course_angle_std(0.1)
        .with_gga_rate(RateConfig::new(10.0, 0.1));
    let plugin = LocalisationPlugin::dual_antenna(receiver(), FakeParser::default(), &cfg).unwrap();

    let position = plugin.process_position(t(0.0), GGA_FLOAT).unwrap();
    let variance = (1.2_f64 * 0.25).powi(2);
    assert!((position.covariance()[(0, 0)] - variance).abs() < 1.0E-12);
    let course = plugin.process_course(t(0.0), HDT).unwrap();
    assert_angle(course.variance(), 0.01);

    // unset anchor: (0, 0, 0)
    assert!(position.position().norm() > 1.0E5);
    assert_eq!(plugin.enu_converter().anchor(), GeodeticCoordinates::default());

    plugin.process_position(t(0.2), GGA);
    let report = plugin.make_diagnostic_report(t(0.25));
    assert_eq!(report.diagnostics[0].message, "gga rate is too low.");
}

#[test]
fn invalid_configuration() {
    init_logger();
    let cfg = Config::default().with_gga_rate(RateConfig::new(0.0, 0.1));
    assert!(matches!(
        LocalisationPlugin::single_antenna(receiver(), FakeParser::default(), &cfg),
        Err(Error::InvalidRate(_, _))
    ));
    let cfg = Config::default().with_track_angle_rate(RateConfig::new(1.0, -0.5));
    assert!(matches!(
        LocalisationPlugin::dual_antenna(receiver(), FakeParser::default(), &cfg),
        Err(Error::InvalidTolerance(_, _))
    ));
    let cfg = Config::default().with_maximal_hdop(-1.0);
    assert!(matches!(
        LocalisationPlugin::single_antenna(receiver(), FakeParser::default(), &cfg),
        Err(Error::InvalidThreshold("maximal_hdop", _))
    ));
}

/// Completes a satellites view on the last GSV sentence of a cycle
#[derive(Debug, Default)]
struct GsvReceiver {
    receiver: Receiver,
}

impl GpsReceiver for GsvReceiver {
    fn uere(&self, quality: FixQuality) -> f64 {
        self.receiver.uere(quality)
    }
    fn antenna_body_position(&self) -> Vector3<f64> {
        self.receiver.antenna_body_position()
    }
    fn update_satellites_views(&self, sentence: &str) -> bool {
        sentence.starts_with("$GPGSV,3,3")
    }
}

#[test]
fn satellites_view() {
    let plugin = single_antenna();
    assert!(!plugin.process_satellites_view("$GPGSV,3,3,11"));

    let plugin = LocalisationPlugin::single_antenna(
        GsvReceiver::default(),
        FakeParser::default(),
        &Config::default(),
    )
    .unwrap();
    assert!(!plugin.process_satellites_view("$GPGSV,3,1,11"));
    assert!(!plugin.process_satellites_view("$GPGSV,3,2,11"));
    assert!(plugin.process_satellites_view("$GPGSV,3,3,11"));
}

#[test]
fn concurrent_streams() {
    let plugin = single_antenna();
    std::thread::scope(|scope| {
        scope.spawn(|| feed_linear_speed(&plugin, 1.0));
        scope.spawn(|| {
            for n in 0..=4 {
                plugin.process_position(t(n as f64 * 0.25), GGA);
            }
        });
        scope.spawn(|| {
            for n in 0..=4 {
                plugin.make_diagnostic_report(t(n as f64 * 0.25));
            }
        });
    });
    // heartbeats may have raced the feeders: refresh both streams
    plugin.process_linear_speed(t(1.0), 1.0);
    assert!(plugin.process_position(t(1.0), GGA).is_some());
    assert!(plugin.process_course(t(1.0), RMC).is_some());
    let report = plugin.make_diagnostic_report(t(1.0));
    assert_eq!(report.diagnostics.len(), 5);
    assert_eq!(report.status(), Some(DiagnosticStatus::Ok));
}
