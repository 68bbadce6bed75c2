//! WGS84 to local East North Up projection
use map_3d::{deg2rad, geodetic2ecef, Ellipsoid};
use nalgebra::{Matrix3, Vector3};

/// WGS84 geodetic coordinates
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct GeodeticCoordinates {
    /// Latitude [rad]
    pub latitude: f64,
    /// Longitude [rad]
    pub longitude: f64,
    /// Altitude above the ellipsoid [m]
    pub altitude: f64,
}

impl GeodeticCoordinates {
    /// Builds Self from coordinates in radians
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }
    /// Builds Self from coordinates in decimal degrees
    pub fn from_ddeg(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self::new(deg2rad(latitude), deg2rad(longitude), altitude)
    }
    /// Returns coordinates in ECEF [m]
    pub fn ecef(&self) -> Vector3<f64> {
        let (x, y, z) = geodetic2ecef(
            self.latitude,
            self.longitude,
            self.altitude,
            Ellipsoid::WGS84,
        );
        Vector3::new(x, y, z)
    }
}

/// Projects geodetic coordinates into a local ENU frame,
/// centered on the anchor. Defaults to the (0, 0, 0) anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct EnuConverter {
    anchor: GeodeticCoordinates,
    anchor_ecef: Vector3<f64>,
    /// ECEF to ENU rotation at anchor
    rotation: Matrix3<f64>,
}

impl Default for EnuConverter {
    fn default() -> Self {
        Self::new(GeodeticCoordinates::default())
    }
}

impl EnuConverter {
    pub fn new(anchor: GeodeticCoordinates) -> Self {
        let (lat, lon) = (anchor.latitude, anchor.longitude);
        let rotation = Matrix3::<f64>::new(
            -lon.sin(),
            lon.cos(),
            0.0_f64,
            -lat.sin() * lon.cos(),
            -lat.sin() * lon.sin(),
            lat.cos(),
            lat.cos() * lon.cos(),
            lat.cos() * lon.sin(),
            lat.sin(),
        );
        Self {
            anchor,
            anchor_ecef: anchor.ecef(),
            rotation,
        }
    }
    /// Moves the local frame origin
    pub fn set_anchor(&mut self, anchor: GeodeticCoordinates) {
        *self = Self::new(anchor);
    }
    pub fn anchor(&self) -> GeodeticCoordinates {
        self.anchor
    }
    /// Returns ENU coordinates [m] of given position
    pub fn to_enu(&self, coords: &GeodeticCoordinates) -> Vector3<f64> {
        self.rotation * (coords.ecef() - self.anchor_ecef)
    }
}
