#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

// private modules
mod cfg;
mod course;
mod geodesy;
mod observation;
mod plugin;
mod rate;
mod receiver;

pub mod checkup;
pub mod diagnostic;
pub mod frame;

// pub export
pub use cfg::Error;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::cfg::{Config, RateConfig};
    pub use crate::checkup::{FixCheckup, HdtTrackAngleCheckup, RmcTrackAngleCheckup};
    pub use crate::course::{
        between_minus_pi_and_pi, heading_to_course_angle, track_angle_to_course_angle,
    };
    pub use crate::diagnostic::{
        set_report_info, worse_status, Diagnostic, DiagnosticReport, DiagnosticStatus,
    };
    pub use crate::frame::{FixQuality, GgaFrame, HdtFrame, RmcFrame, SentenceParser, TalkerId};
    pub use crate::geodesy::{EnuConverter, GeodeticCoordinates};
    pub use crate::observation::{ObservationCourse, ObservationPosition};
    pub use crate::plugin::{CourseStream, LocalisationPlugin};
    pub use crate::rate::RateTracker;
    pub use crate::receiver::{GpsReceiver, Receiver};
    // re-export
    pub use hifitime::Duration;
    pub use nalgebra::{Matrix2, Vector2, Vector3};
}
