use nalgebra::Vector3;

use crate::frame::FixQuality;

/// Implement this trait to describe your GPS receiver.
pub trait GpsReceiver {
    /// User Equivalent Range Error [m] of fixes of given quality
    fn uere(&self, quality: FixQuality) -> f64;
    /// Antenna position in the vehicle body frame [m]
    fn antenna_body_position(&self) -> Vector3<f64>;
    /// Feeds a GSV (satellites in view) sentence.
    /// Returns true once a complete satellite view has been gathered.
    fn update_satellites_views(&self, _sentence: &str) -> bool {
        false
    }
}

/// Generic receiver: one UERE per fix quality and an antenna lever arm.
#[derive(Debug, Clone, PartialEq)]
pub struct Receiver {
    /// UERE [m] indexed by fix quality indicator
    uere: [f64; 9],
    antenna_body_position: Vector3<f64>,
}

impl Default for Receiver {
    fn default() -> Self {
        let mut uere = [10.0; 9];
        for (quality, value) in [
            (FixQuality::Gps, 3.0),
            (FixQuality::Pps, 3.0),
            (FixQuality::Dgps, 0.75),
            (FixQuality::FloatRtk, 0.25),
            (FixQuality::Rtk, 0.02),
            (FixQuality::Simulation, 0.02),
        ] {
            uere[quality.indicator() as usize] = value;
        }
        Self {
            uere,
            antenna_body_position: Vector3::zeros(),
        }
    }
}

impl Receiver {
    /// Returns a copy of Self with updated UERE [m] for given fix quality
    pub fn with_uere(&self, quality: FixQuality, uere: f64) -> Self {
        let mut s = self.clone();
        s.set_uere(quality, uere);
        s
    }
    /// Returns a copy of Self with updated antenna lever arm [m]
    pub fn with_antenna_body_position(&self, position: Vector3<f64>) -> Self {
        let mut s = self.clone();
        s.set_antenna_body_position(position);
        s
    }
    pub fn set_uere(&mut self, quality: FixQuality, uere: f64) {
        self.uere[quality.indicator() as usize] = uere;
    }
    pub fn set_antenna_body_position(&mut self, position: Vector3<f64>) {
        self.antenna_body_position = position;
    }
}

impl GpsReceiver for Receiver {
    fn uere(&self, quality: FixQuality) -> f64 {
        self.uere[quality.indicator() as usize]
    }
    fn antenna_body_position(&self) -> Vector3<f64> {
        self.antenna_body_position
    }
}
