use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::radiometry::ZenithAngle;
use crate::error::{Error, Result};
use crate::types::{AngleUnit, PixelType, Scale, UnitSystem};

/// Which raster files make up a grid: explicit `filenames`, or every file in
/// `base_dir` whose name ends with `extension`. Exactly one of the two must be given.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenOptions {
    pub filenames: Vec<PathBuf>,
    pub extension: Option<String>,
    /// Relative filenames are resolved against this directory
    pub base_dir: Option<PathBuf>,
    /// Require every file to share the same rows/cols
    pub check_dim: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            filenames: Vec::new(),
            extension: None,
            base_dir: None,
            check_dim: true,
        }
    }
}

impl OpenOptions {
    pub fn files<I, P>(filenames: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            filenames: filenames.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn extension(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            extension: Some(extension.into()),
            base_dir: Some(dir.into()),
            ..Self::default()
        }
    }
}

/// Bands to load, 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandSelection {
    #[default]
    All,
    Single(usize),
    List(Vec<usize>),
}

impl BandSelection {
    pub fn range(range: RangeInclusive<usize>) -> Self {
        BandSelection::List(range.collect())
    }

    /// Concrete band indices for a source with `band_count` bands.
    pub fn resolve(&self, band_count: usize) -> Result<Vec<usize>> {
        let bands = match self {
            BandSelection::All => (1..=band_count).collect(),
            BandSelection::Single(b) => vec![*b],
            BandSelection::List(list) => list.clone(),
        };
        if bands.is_empty() {
            return Err(Error::InvalidArgument {
                arg: "bands",
                value: "empty band list".to_string(),
            });
        }
        if let Some(bad) = bands.iter().find(|&&b| b == 0 || b > band_count) {
            return Err(Error::InvalidArgument {
                arg: "bands",
                value: format!("band {} of {}", bad, band_count),
            });
        }
        Ok(bands)
    }
}

impl FromStr for BandSelection {
    type Err = Error;

    /// `all`, `2`, `1,3` or `1-3`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidArgument {
            arg: "bands",
            value: s.to_string(),
        };
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(BandSelection::All);
        }
        if let Some((start, end)) = s.split_once('-') {
            let start: usize = start.trim().parse().map_err(|_| invalid())?;
            let end: usize = end.trim().parse().map_err(|_| invalid())?;
            if start > end {
                return Err(invalid());
            }
            return Ok(BandSelection::range(start..=end));
        }
        if s.contains(',') {
            let list = s
                .split(',')
                .map(|b| b.trim().parse::<usize>().map_err(|_| invalid()))
                .collect::<Result<Vec<_>>>()?;
            return Ok(BandSelection::List(list));
        }
        s.parse().map(BandSelection::Single).map_err(|_| invalid())
    }
}

/// Pixel window `[start, end)` on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subset {
    pub x: (usize, usize),
    pub y: (usize, usize),
}

impl Subset {
    pub fn new(x: (usize, usize), y: (usize, usize)) -> Self {
        Self { x, y }
    }

    /// Check the window against a `rows x cols` extent.
    pub fn validate(&self, rows: usize, cols: usize) -> Result<()> {
        for (arg, (start, end), limit) in [("subset_x", self.x, cols), ("subset_y", self.y, rows)] {
            if start >= end {
                return Err(Error::InvalidArgument {
                    arg,
                    value: format!(
                        "({}, {}): the end must be greater than the start",
                        start, end
                    ),
                });
            }
            if end > limit {
                return Err(Error::InvalidArgument {
                    arg,
                    value: format!("({}, {}) exceeds the extent {}", start, end, limit),
                });
            }
        }
        Ok(())
    }
}

/// Parse `start:end` as used on the command line.
pub fn parse_window(s: &str) -> Result<(usize, usize)> {
    let invalid = || Error::InvalidArgument {
        arg: "window",
        value: s.to_string(),
    };
    let (start, end) = s.split_once(':').ok_or_else(invalid)?;
    Ok((
        start.trim().parse().map_err(|_| invalid())?,
        end.trim().parse().map_err(|_| invalid())?,
    ))
}

/// How raster files are materialized by `Grid::to_array`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToArrayOptions {
    pub bands: BandSelection,
    /// Collapse each band plane into one row
    pub flatten: bool,
    /// Values are divided by this factor when it is greater than 1 (e.g. 10000 for Sentinel-2)
    pub quantification_factor: f64,
    pub subset: Option<Subset>,
}

impl Default for ToArrayOptions {
    fn default() -> Self {
        Self {
            bands: BandSelection::All,
            flatten: true,
            quantification_factor: 1.0,
            subset: None,
        }
    }
}

/// Radiometric conversion request for `Grid::convert`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionParams {
    pub system: UnitSystem,
    pub to: UnitSystem,
    pub system_scale: Scale,
    pub output_scale: Scale,
    /// Sun or incidence zenith angle
    pub iza: Option<ZenithAngle>,
    /// View or scattering zenith angle
    pub vza: Option<ZenithAngle>,
    pub angle_unit: AngleUnit,
}

impl Default for ConversionParams {
    fn default() -> Self {
        Self {
            system: UnitSystem::Bsc,
            to: UnitSystem::Brdf,
            system_scale: Scale::Linear,
            output_scale: Scale::Linear,
            iza: None,
            vza: None,
            angle_unit: AngleUnit::Rad,
        }
    }
}

impl ConversionParams {
    pub fn new(system: UnitSystem, to: UnitSystem) -> Self {
        Self {
            system,
            to,
            ..Self::default()
        }
    }

    pub fn scales(mut self, system_scale: Scale, output_scale: Scale) -> Self {
        self.system_scale = system_scale;
        self.output_scale = output_scale;
        self
    }

    pub fn angles(
        mut self,
        iza: impl Into<ZenithAngle>,
        vza: impl Into<ZenithAngle>,
        unit: AngleUnit,
    ) -> Self {
        self.iza = Some(iza.into());
        self.vza = Some(vza.into());
        self.angle_unit = unit;
        self
    }
}

/// Options for `Grid::write` and `Grid::write_array`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    /// Relative output filenames are resolved against this directory
    pub base_dir: Option<PathBuf>,
    /// Source whose geotransform and projection are written
    pub reference: usize,
    /// Output pixel type; defaults to the grid's current pixel type
    pub pixel_type: Option<PixelType>,
}

/// Processing parameters suitable for config files: everything the CLI does
/// after opening the inputs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    pub load: ToArrayOptions,
    pub no_data: Option<f64>,
    pub convert: Option<ConversionParams>,
    pub write: WriteOptions,
}

impl PipelineParams {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("all", BandSelection::All)]
    #[case("2", BandSelection::Single(2))]
    #[case("1,3", BandSelection::List(vec![1, 3]))]
    #[case("2-4", BandSelection::List(vec![2, 3, 4]))]
    fn parses_band_selections(#[case] text: &str, #[case] expected: BandSelection) {
        assert_eq!(text.parse::<BandSelection>().unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("x")]
    #[case("3-1")]
    #[case("1,,2")]
    fn rejects_malformed_band_selections(#[case] text: &str) {
        assert!(text.parse::<BandSelection>().is_err());
    }

    #[test]
    fn resolves_bands_against_the_band_count() {
        assert_eq!(BandSelection::All.resolve(3).unwrap(), vec![1, 2, 3]);
        assert_eq!(BandSelection::Single(2).resolve(3).unwrap(), vec![2]);
        assert!(BandSelection::Single(0).resolve(3).is_err());
        assert!(BandSelection::List(vec![1, 4]).resolve(3).is_err());
        assert!(BandSelection::List(vec![]).resolve(3).is_err());
    }

    #[test]
    fn subset_rejects_empty_and_oversized_windows() {
        assert!(Subset::new((5, 5), (0, 10)).validate(100, 100).is_err());
        assert!(Subset::new((0, 10), (7, 3)).validate(100, 100).is_err());
        assert!(Subset::new((0, 101), (0, 10)).validate(100, 100).is_err());
        assert!(Subset::new((0, 10), (0, 10)).validate(100, 100).is_ok());
    }

    #[test]
    fn parses_windows() {
        assert_eq!(parse_window("0:10").unwrap(), (0, 10));
        assert!(parse_window("10").is_err());
        assert!(parse_window("a:b").is_err());
    }

    #[test]
    fn pipeline_params_read_from_json() {
        let json = r#"{
            "load": { "bands": { "list": [1, 2] }, "flatten": false },
            "convert": { "system": "BRF", "to": "BRDF", "output_scale": "dB" },
            "write": { "reference": 1, "pixel_type": "Float32" }
        }"#;
        let params: PipelineParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.load.bands, BandSelection::List(vec![1, 2]));
        assert!(!params.load.flatten);
        assert_eq!(params.load.quantification_factor, 1.0);
        let convert = params.convert.unwrap();
        assert_eq!(convert.system, UnitSystem::Brf);
        assert_eq!(convert.output_scale, Scale::Db);
        assert_eq!(convert.system_scale, Scale::Linear);
        assert_eq!(params.write.reference, 1);
        assert_eq!(params.write.pixel_type, Some(PixelType::Float32));
    }

    #[test]
    fn open_options_check_dimensions_by_default() {
        let opts: OpenOptions = serde_json::from_str(r#"{ "filenames": ["a.tif"] }"#).unwrap();
        assert!(opts.check_dim);
        assert_eq!(opts.filenames, vec![PathBuf::from("a.tif")]);
    }
}
