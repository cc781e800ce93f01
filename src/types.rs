//! Shared types and enums used across radgrid.
//! Includes the radiometric `UnitSystem`, `Scale` and `AngleUnit`, the on-disk
//! `PixelType` used when writing, and the `OutputDriver` picked from a file extension.
use std::path::Path;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Radiometric quantity stored in a grid.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UnitSystem {
    /// Backscatter coefficient (sigma naught)
    Bsc,
    /// Bidirectional reflectance distribution function
    Brdf,
    /// Bidirectional reflectance factor
    Brf,
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UnitSystem::Bsc => "BSC",
            UnitSystem::Brdf => "BRDF",
            UnitSystem::Brf => "BRF",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for UnitSystem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BSC" => Ok(UnitSystem::Bsc),
            "BRDF" => Ok(UnitSystem::Brdf),
            "BRF" => Ok(UnitSystem::Brf),
            _ => Err(Error::InvalidArgument {
                arg: "unit system",
                value: s.to_string(),
            }),
        }
    }
}

/// Linear or logarithmic (decibel) scale of the stored values.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
pub enum Scale {
    #[serde(rename = "linear")]
    Linear,
    #[serde(rename = "dB")]
    #[value(alias = "dB")]
    Db,
}

impl std::fmt::Display for Scale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scale::Linear => write!(f, "linear"),
            Scale::Db => write!(f, "dB"),
        }
    }
}

impl FromStr for Scale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "linear" => Ok(Scale::Linear),
            "dB" | "db" => Ok(Scale::Db),
            _ => Err(Error::InvalidArgument {
                arg: "scale",
                value: s.to_string(),
            }),
        }
    }
}

/// Unit of the zenith angles handed to BRDF/BSC conversions.
#[derive(
    Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum AngleUnit {
    #[default]
    Rad,
    Deg,
}

impl std::fmt::Display for AngleUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AngleUnit::Rad => write!(f, "RAD"),
            AngleUnit::Deg => write!(f, "DEG"),
        }
    }
}

impl FromStr for AngleUnit {
    type Err = Error;

    // Exact match only, "rad" or "degrees" are rejected.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "RAD" => Ok(AngleUnit::Rad),
            "DEG" => Ok(AngleUnit::Deg),
            _ => Err(Error::InvalidArgument {
                arg: "angle unit",
                value: s.to_string(),
            }),
        }
    }
}

/// Pixel types the writers can emit. Names follow GDAL's data type names.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
pub enum PixelType {
    #[value(name = "byte")]
    Byte,
    #[value(name = "uint16")]
    UInt16,
    #[value(name = "int16")]
    Int16,
    #[value(name = "uint32")]
    UInt32,
    #[value(name = "int32")]
    Int32,
    #[value(name = "float32")]
    Float32,
    #[value(name = "float64")]
    Float64,
}

impl PixelType {
    pub fn is_integer(&self) -> bool {
        !matches!(self, PixelType::Float32 | PixelType::Float64)
    }

    /// GDAL data type name, e.g. `Float32`.
    pub fn gdal_name(&self) -> &'static str {
        match self {
            PixelType::Byte => "Byte",
            PixelType::UInt16 => "UInt16",
            PixelType::Int16 => "Int16",
            PixelType::UInt32 => "UInt32",
            PixelType::Int32 => "Int32",
            PixelType::Float32 => "Float32",
            PixelType::Float64 => "Float64",
        }
    }
}

impl std::fmt::Display for PixelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.gdal_name())
    }
}

impl FromStr for PixelType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "byte" | "uint8" | "u8" => Ok(PixelType::Byte),
            "uint16" | "u16" => Ok(PixelType::UInt16),
            "int16" | "i16" => Ok(PixelType::Int16),
            "uint32" | "u32" => Ok(PixelType::UInt32),
            "int32" | "i32" => Ok(PixelType::Int32),
            "float32" | "f32" => Ok(PixelType::Float32),
            "float64" | "f64" => Ok(PixelType::Float64),
            _ => Err(Error::InvalidArgument {
                arg: "pixel type",
                value: s.to_string(),
            }),
        }
    }
}

/// GDAL driver used for an output file.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum OutputDriver {
    GTiff,
    Envi,
}

impl OutputDriver {
    /// Pick the driver from the file extension: `tif`/`tiff` or `bin`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "tif" | "tiff" => Ok(OutputDriver::GTiff),
            "bin" => Ok(OutputDriver::Envi),
            _ => Err(Error::InvalidArgument {
                arg: "output extension",
                value: ext,
            }),
        }
    }

    pub fn gdal_name(&self) -> &'static str {
        match self {
            OutputDriver::GTiff => "GTiff",
            OutputDriver::Envi => "ENVI",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("BSC", UnitSystem::Bsc)]
    #[case("brdf", UnitSystem::Brdf)]
    #[case(" BRF ", UnitSystem::Brf)]
    fn parses_unit_systems(#[case] text: &str, #[case] expected: UnitSystem) {
        assert_eq!(text.parse::<UnitSystem>().unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_unit_system() {
        let err = "sigma".parse::<UnitSystem>().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { arg: "unit system", .. }));
    }

    #[test]
    fn angle_unit_requires_exact_spelling() {
        assert_eq!("DEG".parse::<AngleUnit>().unwrap(), AngleUnit::Deg);
        assert!("deg".parse::<AngleUnit>().is_err());
        assert!("GRAD".parse::<AngleUnit>().is_err());
    }

    #[test]
    fn scale_round_trips_through_display() {
        for scale in [Scale::Linear, Scale::Db] {
            assert_eq!(scale.to_string().parse::<Scale>().unwrap(), scale);
        }
        assert!("log".parse::<Scale>().is_err());
    }

    #[rstest]
    #[case("out.tif", OutputDriver::GTiff)]
    #[case("out.TIFF", OutputDriver::GTiff)]
    #[case("dir/out.bin", OutputDriver::Envi)]
    fn picks_driver_from_extension(#[case] path: &str, #[case] expected: OutputDriver) {
        assert_eq!(OutputDriver::from_path(Path::new(path)).unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_extension() {
        assert!(OutputDriver::from_path(Path::new("out.jpg")).is_err());
        assert!(OutputDriver::from_path(Path::new("out")).is_err());
    }

    #[test]
    fn rejects_complex_pixel_types() {
        assert_eq!("Float32".parse::<PixelType>().unwrap(), PixelType::Float32);
        assert!("CInt16".parse::<PixelType>().is_err());
        assert!(PixelType::Int16.is_integer());
        assert!(!PixelType::Float64.is_integer());
    }
}
