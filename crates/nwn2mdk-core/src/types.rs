//! Common types used across NWN2MDK
//!
//! This module provides value types shared by the metadata schema and the
//! interchange options.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Error;

/// Linear RGB colour with components in `[0, 1]`
///
/// Components are only reachable through constructors that clamp, including
/// deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRgb")]
pub struct Rgb {
    r: f32,
    g: f32,
    b: f32,
}

#[derive(Deserialize)]
struct RawRgb {
    r: f32,
    g: f32,
    b: f32,
}

impl From<RawRgb> for Rgb {
    fn from(raw: RawRgb) -> Self {
        Self::new(raw.r, raw.g, raw.b)
    }
}

impl Rgb {
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0 };
    pub const BLACK: Self = Self { r: 0.0, g: 0.0, b: 0.0 };

    /// Create a colour, clamping every component into `[0, 1]`
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: clamp_unit(r),
            g: clamp_unit(g),
            b: clamp_unit(b),
        }
    }

    /// Create a colour from a `[r, g, b]` triple, clamping as [`Rgb::new`]
    pub fn from_array(rgb: [f32; 3]) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2])
    }

    pub fn r(&self) -> f32 {
        self.r
    }

    pub fn g(&self) -> f32 {
        self.g
    }

    pub fn b(&self) -> f32 {
        self.b
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<[f32; 3]> for Rgb {
    fn from(value: [f32; 3]) -> Self {
        Self::from_array(value)
    }
}

// NaN maps to 0 so that a colour is always inside the unit cube.
fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Signed coordinate axis used for interchange axis conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    #[serde(rename = "X")]
    PosX,
    #[serde(rename = "Y")]
    PosY,
    #[serde(rename = "Z")]
    PosZ,
    #[serde(rename = "-X")]
    NegX,
    #[serde(rename = "-Y")]
    NegY,
    #[serde(rename = "-Z")]
    NegZ,
}

impl Axis {
    /// Conventional short name (`"X"`, `"-Z"`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::PosX => "X",
            Axis::PosY => "Y",
            Axis::PosZ => "Z",
            Axis::NegX => "-X",
            Axis::NegY => "-Y",
            Axis::NegZ => "-Z",
        }
    }

    /// Whether two axes lie on the same line (e.g. `Y` and `-Y`)
    pub fn is_parallel_to(&self, other: &Axis) -> bool {
        self.base() == other.base()
    }

    fn base(&self) -> u8 {
        match self {
            Axis::PosX | Axis::NegX => 0,
            Axis::PosY | Axis::NegY => 1,
            Axis::PosZ | Axis::NegZ => 2,
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Axis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "X" | "+X" => Ok(Axis::PosX),
            "Y" | "+Y" => Ok(Axis::PosY),
            "Z" | "+Z" => Ok(Axis::PosZ),
            "-X" => Ok(Axis::NegX),
            "-Y" => Ok(Axis::NegY),
            "-Z" => Ok(Axis::NegZ),
            _ => Err(Error::invalid_value("axis", format!("unknown axis {s:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_clamps_components() {
        let c = Rgb::new(1.5, -0.25, 0.5);
        assert_eq!(c.to_array(), [1.0, 0.0, 0.5]);

        let nan = Rgb::new(f32::NAN, 0.2, 0.3);
        assert_eq!(nan.r(), 0.0);
    }

    #[test]
    fn test_rgb_deserialize_clamps() {
        let c: Rgb = serde_json::from_str(r#"{ "r": 2.0, "g": -1.0, "b": 0.5 }"#).unwrap();
        assert_eq!(c.to_array(), [1.0, 0.0, 0.5]);

        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, r#"{"r":1.0,"g":0.0,"b":0.5}"#);
    }

    #[test]
    fn test_rgb_in_range_is_exact() {
        let c = Rgb::from_array([0.1, 0.2, 0.3]);
        assert_eq!(c.to_array(), [0.1, 0.2, 0.3]);
        assert_eq!(Rgb::default(), Rgb::WHITE);
    }

    #[test]
    fn test_axis_parse_and_display() {
        assert_eq!("-z".parse::<Axis>().unwrap(), Axis::NegZ);
        assert_eq!("+Y".parse::<Axis>().unwrap(), Axis::PosY);
        assert_eq!(Axis::NegZ.to_string(), "-Z");
        assert!("W".parse::<Axis>().is_err());
    }

    #[test]
    fn test_axis_parallel() {
        assert!(Axis::PosY.is_parallel_to(&Axis::NegY));
        assert!(!Axis::NegZ.is_parallel_to(&Axis::PosY));
    }
}
