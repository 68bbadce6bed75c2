//! Structured NMEA frames, as produced by a [SentenceParser].
//!
//! Every field a receiver may leave blank is optional: a frame
//! always exists, completeness is judged by the checkups.
use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::Deserialize;

/// Implement this trait to turn raw NMEA sentences into frames.
/// Fields that are missing or cannot be decoded are simply left unset.
pub trait SentenceParser {
    /// Decodes a GGA (fix data) sentence
    fn gga(&self, sentence: &str) -> GgaFrame;
    /// Decodes a RMC (recommended minimum) sentence
    fn rmc(&self, sentence: &str) -> RmcFrame;
    /// Decodes a HDT (true heading) sentence
    fn hdt(&self, sentence: &str) -> HdtFrame;
}

/// Sentence talker
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TalkerId {
    /// GPS (NAVSTAR)
    GP,
    /// GLONASS
    GL,
    /// Galileo
    GA,
    /// BeiDou
    GB,
    /// QZSS
    GQ,
    /// Multi constellation
    GN,
}

impl TalkerId {
    /// Constellation behind this talker
    pub fn constellation(&self) -> &'static str {
        match self {
            Self::GP => "NAVSTAR",
            Self::GL => "GLONASS",
            Self::GA => "GALILEO",
            Self::GB => "BEIDOU",
            Self::GQ => "QZSS",
            Self::GN => "GNSS",
        }
    }
}

impl std::str::FromStr for TalkerId {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "GP" => Ok(Self::GP),
            "GL" => Ok(Self::GL),
            "GA" => Ok(Self::GA),
            "GB" | "BD" => Ok(Self::GB),
            "GQ" => Ok(Self::GQ),
            "GN" => Ok(Self::GN),
            _ => Err(()),
        }
    }
}

/// GGA fix quality indicator.
/// Ordered by trust: [FixQuality::Rtk] is the best fix a receiver
/// can report, [FixQuality::Simulation] is handled aside.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FixQuality {
    NoFix,
    Gps,
    Dgps,
    Pps,
    Rtk,
    FloatRtk,
    /// Dead reckoning
    Estimated,
    Manual,
    Simulation,
}

impl FixQuality {
    /// Builds Self from GGA quality indicator
    pub fn from_indicator(indicator: u8) -> Option<Self> {
        match indicator {
            0 => Some(Self::NoFix),
            1 => Some(Self::Gps),
            2 => Some(Self::Dgps),
            3 => Some(Self::Pps),
            4 => Some(Self::Rtk),
            5 => Some(Self::FloatRtk),
            6 => Some(Self::Estimated),
            7 => Some(Self::Manual),
            8 => Some(Self::Simulation),
            _ => None,
        }
    }
    /// GGA quality indicator
    pub fn indicator(&self) -> u8 {
        match self {
            Self::NoFix => 0,
            Self::Gps => 1,
            Self::Dgps => 2,
            Self::Pps => 3,
            Self::Rtk => 4,
            Self::FloatRtk => 5,
            Self::Estimated => 6,
            Self::Manual => 7,
            Self::Simulation => 8,
        }
    }
    pub fn name(&self) -> &'static str {
        match self {
            Self::NoFix => "no fix",
            Self::Gps => "gps fix",
            Self::Dgps => "dgps fix",
            Self::Pps => "pps fix",
            Self::Rtk => "rtk fix",
            Self::FloatRtk => "float rtk fix",
            Self::Estimated => "estimated fix",
            Self::Manual => "manual fix",
            Self::Simulation => "simulation fix",
        }
    }
    fn rank(&self) -> u8 {
        match self {
            Self::NoFix => 0,
            Self::Estimated => 1,
            Self::Manual => 2,
            Self::Gps => 3,
            Self::Pps => 4,
            Self::Dgps => 5,
            Self::FloatRtk => 6,
            Self::Rtk => 7,
            Self::Simulation => 8,
        }
    }
}

impl PartialOrd for FixQuality {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FixQuality {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl std::fmt::Display for FixQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// GGA frame
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GgaFrame {
    pub talker: Option<TalkerId>,
    /// Latitude [rad]
    pub latitude: Option<f64>,
    /// Longitude [rad]
    pub longitude: Option<f64>,
    /// Antenna altitude above geoid (mean sea level) [m]
    pub altitude_above_geoid: Option<f64>,
    /// Geoid separation to the WGS84 ellipsoid [m]
    pub geoid_height: Option<f64>,
    /// Horizontal Dilution of Precision
    pub hdop: Option<f64>,
    /// Number of satellites used to compute the fix
    pub satellites: Option<u16>,
    pub fix_quality: Option<FixQuality>,
    /// Age of differential corrections [s]
    pub dgps_correction_age: Option<f64>,
    /// Differential reference station
    pub dgps_station_id: Option<u32>,
}

/// Fields of a complete GGA frame
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Fix {
    /// Latitude [rad]
    pub latitude: f64,
    /// Longitude [rad]
    pub longitude: f64,
    /// Altitude above the WGS84 ellipsoid [m]
    pub altitude: f64,
    pub hdop: f64,
    pub satellites: u16,
    pub quality: FixQuality,
}

impl GgaFrame {
    /// Returns the fix, if every field needed to exploit it is present.
    pub fn fix(&self) -> Option<Fix> {
        Some(Fix {
            latitude: self.latitude?,
            longitude: self.longitude?,
            altitude: self.altitude_above_geoid? + self.geoid_height?,
            hdop: self.hdop?,
            satellites: self.satellites?,
            quality: self.fix_quality?,
        })
    }
    pub fn is_complete(&self) -> bool {
        self.fix().is_some()
    }
}

/// RMC frame
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RmcFrame {
    pub talker: Option<TalkerId>,
    /// Speed over ground [m/s]
    pub speed_over_ground: Option<f64>,
    /// Track angle, clockwise from true north [rad]
    pub track_angle_true: Option<f64>,
    /// Magnetic variation [rad]
    pub magnetic_deviation: Option<f64>,
}

impl RmcFrame {
    /// Returns (speed over ground [m/s], track angle [rad]) when both are present.
    pub fn track(&self) -> Option<(f64, f64)> {
        Some((self.speed_over_ground?, self.track_angle_true?))
    }
}

/// HDT frame
#[derive(Debug, Default, Clone, PartialEq)]
pub struct HdtFrame {
    pub talker: Option<TalkerId>,
    /// True heading, clockwise from true north [rad]
    pub heading: Option<f64>,
}
