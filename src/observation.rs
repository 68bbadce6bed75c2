use nalgebra::{Matrix2, Vector2, Vector3};

/// Position observation, expressed in the local ENU frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationPosition {
    /// East, North [m]
    pub(crate) position: Vector2<f64>,
    /// Isotropic covariance [m^2]
    pub(crate) covariance: Matrix2<f64>,
    /// Antenna position in the vehicle body frame [m]
    pub(crate) lever_arm: Vector3<f64>,
}

impl ObservationPosition {
    /// Builds a new observation of isotropic standard deviation `std` [m]
    pub fn new(position: Vector2<f64>, std: f64, lever_arm: Vector3<f64>) -> Self {
        Self {
            position,
            covariance: Matrix2::identity() * std.powi(2),
            lever_arm,
        }
    }
    pub fn position(&self) -> Vector2<f64> {
        self.position
    }
    pub fn covariance(&self) -> Matrix2<f64> {
        self.covariance
    }
    pub fn lever_arm(&self) -> Vector3<f64> {
        self.lever_arm
    }
}

/// Course angle observation
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ObservationCourse {
    /// Course angle [rad], counterclockwise from east
    pub(crate) angle: f64,
    /// [rad^2]
    pub(crate) variance: f64,
}

impl ObservationCourse {
    pub fn new(angle: f64, variance: f64) -> Self {
        Self { angle, variance }
    }
    pub fn angle(&self) -> f64 {
        self.angle
    }
    pub fn variance(&self) -> f64 {
        self.variance
    }
}
