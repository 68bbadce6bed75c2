//! NMEA angles to ENU course angles.
//!
//! NMEA track angles and headings are measured clockwise from true north,
//! course angles counterclockwise from east. Course angles lie in ]-pi, pi].
use std::f64::consts::{PI, TAU};

/// Wraps given angle [rad] into ]-pi, pi]
pub fn between_minus_pi_and_pi(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Converts RMC track angle [rad] to a course angle.
/// `linear_speed` is the vehicle speed [m/s]: when reversing, the
/// antenna travels opposite to the vehicle heading.
pub fn track_angle_to_course_angle(track_angle: f64, linear_speed: f64) -> f64 {
    let course = PI / 2.0 - track_angle;
    if linear_speed < 0.0 {
        between_minus_pi_and_pi(course + PI)
    } else {
        between_minus_pi_and_pi(course)
    }
}

/// Converts HDT true heading [rad] to a course angle
pub fn heading_to_course_angle(heading: f64) -> f64 {
    between_minus_pi_and_pi(PI / 2.0 - heading)
}
