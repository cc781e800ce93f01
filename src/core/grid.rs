//! The `Grid`: one or more co-registered rasters loaded together, with their
//! pixel data materialized as arrays and an optional derived stack.
//!
//! ```text
//! Unloaded --to_array--> Loaded(flat) <--reshape/flatten--> Loaded(shaped)
//!                         \___ dstack ___> + Stack           reset -> Unloaded
//! ```
//!
//! Every operation after `to_array` is applied to all sources in the same call,
//! and a failing operation leaves the arrays and the stack as they were.
use std::path::{Path, PathBuf};

use ndarray::{Array3, ArrayD, ArrayView3, Axis, Ix3, s};
use serde::Serialize;
use tracing::{debug, info};

use crate::core::conversion;
use crate::core::params::{ConversionParams, OpenOptions, ToArrayOptions, WriteOptions};
use crate::core::state::{Extent, GridData, Layout, NoDataRule, Stack, column_stack};
use crate::error::{Error, Result};
use crate::io::discover::{find_by_extension, resolve_path};
use crate::io::writers::{RasterTarget, embed_metadata, processing_metadata, write_raster};
use crate::io::{GdalRaster, RasterSource, SourceInfo};
use crate::types::{OutputDriver, PixelType, Scale, UnitSystem};

#[derive(Debug)]
pub struct Grid {
    sources: Vec<Box<dyn RasterSource>>,
    no_data: Vec<f64>,
    data: Option<GridData>,
    stack: Option<Stack>,
    units: Option<(UnitSystem, Scale)>,
}

/// Summary of one source, as reported by `Grid::info`
#[derive(Debug, Clone, Serialize)]
pub struct SourceSummary {
    pub name: String,
    pub cols: usize,
    pub rows: usize,
    pub bands: usize,
    pub pixel_type: PixelType,
    pub geotransform: [f64; 6],
    pub projection: String,
    pub epsg: Option<String>,
    pub xmin: f64,
    pub ymin: f64,
    pub xres: f64,
    pub yres: f64,
    pub nodata: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridInfo {
    pub sources: Vec<SourceSummary>,
    pub layout: Option<Layout>,
    pub extents: Option<Vec<Extent>>,
    pub unit_system: Option<UnitSystem>,
    pub scale: Option<Scale>,
}

impl Grid {
    /// Open the files named by `options` through GDAL.
    pub fn open(options: &OpenOptions) -> Result<Self> {
        let base = options.base_dir.as_deref();
        let paths: Vec<PathBuf> = match (options.filenames.is_empty(), &options.extension) {
            (false, None) => options
                .filenames
                .iter()
                .map(|f| resolve_path(base, f))
                .collect(),
            (true, Some(extension)) => {
                let dir = base.unwrap_or(Path::new("."));
                let found = find_by_extension(dir, extension)?;
                if found.is_empty() {
                    return Err(Error::Configuration(format!(
                        "No files with extension {:?} in {:?}",
                        extension, dir
                    )));
                }
                found
            }
            _ => {
                return Err(Error::Configuration(
                    "You must define filenames OR an extension".to_string(),
                ));
            }
        };

        let mut sources: Vec<Box<dyn RasterSource>> = Vec::with_capacity(paths.len());
        for path in &paths {
            info!("Opening raster {:?}", path);
            sources.push(Box::new(GdalRaster::open(path)?));
        }
        Self::from_sources(sources, options.check_dim)
    }

    /// Build a grid over already opened sources.
    pub fn from_sources(sources: Vec<Box<dyn RasterSource>>, check_dim: bool) -> Result<Self> {
        if sources.is_empty() {
            return Err(Error::Configuration(
                "A grid needs at least one raster source".to_string(),
            ));
        }
        if check_dim && sources.len() > 1 {
            let cols: Vec<usize> = sources.iter().map(|s| s.info().size_x).collect();
            let rows: Vec<usize> = sources.iter().map(|s| s.info().size_y).collect();
            if cols.windows(2).any(|w| w[0] != w[1]) || rows.windows(2).any(|w| w[0] != w[1]) {
                return Err(Error::DimensionMismatch { cols, rows });
            }
        }
        let no_data = sources.iter().map(|s| s.info().no_data).collect();
        info!("Grid over {} raster source(s)", sources.len());
        Ok(Grid {
            sources,
            no_data,
            data: None,
            stack: None,
            units: None,
        })
    }

    pub fn from_source(source: impl RasterSource + 'static) -> Result<Self> {
        Self::from_sources(vec![Box::new(source)], true)
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn source_info(&self, index: usize) -> Option<&SourceInfo> {
        self.sources.get(index).map(|s| s.info())
    }

    pub fn no_data(&self) -> &[f64] {
        &self.no_data
    }

    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }

    pub fn data(&self) -> Option<&GridData> {
        self.data.as_ref()
    }

    pub fn layout(&self) -> Option<Layout> {
        self.data.as_ref().map(|d| d.layout())
    }

    pub fn stack(&self) -> Option<&Stack> {
        self.stack.as_ref()
    }

    /// Unit system and scale after the last `convert`, unknown for freshly loaded data.
    pub fn units(&self) -> Option<(UnitSystem, Scale)> {
        self.units
    }

    fn loaded(&self, operation: &str) -> Result<&GridData> {
        self.data.as_ref().ok_or_else(|| Error::not_loaded(operation))
    }

    fn loaded_mut(&mut self, operation: &str) -> Result<&mut GridData> {
        self.data.as_mut().ok_or_else(|| Error::not_loaded(operation))
    }

    /// The loaded arrays, one per source.
    pub fn arrays(&self) -> Result<&[ArrayD<f64>]> {
        Ok(self.loaded("access the arrays")?.arrays())
    }

    /// The loaded array of a single-source grid.
    pub fn array(&self) -> Result<&ArrayD<f64>> {
        match self.arrays()? {
            [single] => Ok(single),
            arrays => Err(Error::Precondition(format!(
                "The grid holds {} arrays, use Grid::arrays()",
                arrays.len()
            ))),
        }
    }

    /// An owned copy of the loaded arrays.
    pub fn copy(&self) -> Result<Vec<ArrayD<f64>>> {
        Ok(self.loaded("copy the arrays")?.arrays().to_vec())
    }

    /// Read the selected bands of every source into arrays.
    pub fn to_array(&mut self, options: &ToArrayOptions) -> Result<()> {
        let n = self.sources.len();
        let mut arrays = Vec::with_capacity(n);
        let mut extents = Vec::with_capacity(n);
        let mut pixel_types = Vec::with_capacity(n);

        for (source, &no_data) in self.sources.iter().zip(&self.no_data) {
            let info = source.info();
            let bands = options.bands.resolve(info.bands)?;
            if let Some(subset) = &options.subset {
                subset.validate(info.size_y, info.size_x)?;
            }

            let planes = bands
                .iter()
                .map(|&b| source.read_band(b))
                .collect::<Result<Vec<_>>>()?;
            let views: Vec<_> = planes.iter().map(|p| p.view()).collect();
            let mut cube: Array3<f64> = ndarray::stack(Axis(0), &views)?;

            let mut pixel_type = info.pixel_type;
            if options.quantification_factor > 1.0 {
                let factor = options.quantification_factor;
                cube.mapv_inplace(|v| v / factor);
                pixel_type = PixelType::Float32;
            }
            // after quantification, so the no-data value is stored unscaled
            cube.mapv_inplace(|v| if v.is_nan() { no_data } else { v });

            if let Some(subset) = &options.subset {
                let (x0, x1) = subset.x;
                let (y0, y1) = subset.y;
                cube = cube.slice(s![.., y0..y1, x0..x1]).to_owned();
                debug!("{}: subset to x {}..{}, y {}..{}", info.name, x0, x1, y0, y1);
            }

            let (bands, rows, cols) = cube.dim();
            extents.push(Extent { bands, rows, cols });
            pixel_types.push(pixel_type);
            arrays.push(cube.into_dyn());
        }

        let data = GridData::load(arrays, extents, pixel_types, options.flatten)?;
        info!(
            "Loaded {} source(s) as {:?} {:?}",
            n,
            data.layout(),
            data.arrays()[0].shape()
        );
        self.data = Some(data);
        self.units = None;
        Ok(())
    }

    /// Restore `(bands, rows, cols)`, or `(rows, cols)` for single-band data.
    /// Already shaped data is left as is.
    pub fn reshape(&mut self) -> Result<()> {
        self.loaded_mut("reshape")?.reshape()
    }

    /// Collapse each band into one row. Already flat data is left as is.
    pub fn flatten(&mut self) -> Result<()> {
        self.loaded_mut("flatten")?.flatten()
    }

    /// Store a new no-data value for every source and write it over NaN pixels
    /// (and zero pixels, with `NoDataRule::NanAndZero`).
    pub fn set_no_data(&mut self, value: f64, rule: NoDataRule) -> Result<()> {
        let data = self
            .data
            .as_mut()
            .ok_or_else(|| Error::not_loaded("assign a no-data value"))?;
        self.no_data = vec![value; self.sources.len()];
        data.replace_no_data(&self.no_data, rule);
        debug!("set_no_data: {} ({:?})", value, rule);
        Ok(())
    }

    /// Build the stack. Plain mode column-joins the per-source arrays; `unfold`
    /// turns the bands of each source into columns of a `(rows*cols, bands)` array.
    pub fn dstack(&mut self, unfold: bool) -> Result<()> {
        let source_count = self.sources.len();
        let data = self
            .data
            .as_mut()
            .ok_or_else(|| Error::not_loaded("build a stack"))?;

        let arrays = if unfold {
            if let Some((idx, e)) = data.extents.iter().enumerate().find(|(_, e)| e.bands < 2) {
                return Err(Error::Precondition(format!(
                    "You need more than one band to build an unfolded stack, source {} has {}",
                    idx, e.bands
                )));
            }
            if data.layout == Layout::Shaped {
                debug!("dstack: flattening shaped arrays before unfolding");
                data.flatten()?;
            }
            data.unfold()?
        } else {
            if source_count < 2 {
                return Err(Error::Precondition(
                    "You need more than one source to build a stack".to_string(),
                ));
            }
            let (cols, rows): (Vec<usize>, Vec<usize>) =
                data.extents.iter().map(|e| (e.cols, e.rows)).unzip();
            if cols.windows(2).any(|w| w[0] != w[1]) || rows.windows(2).any(|w| w[0] != w[1]) {
                return Err(Error::DimensionMismatch { cols, rows });
            }
            let views: Vec<_> = data.arrays.iter().map(|a| a.view()).collect();
            vec![column_stack(&views)?]
        };

        info!(
            "Built {} stack of {} array(s), first {:?}",
            if unfold { "unfolded" } else { "plain" },
            arrays.len(),
            arrays[0].shape()
        );
        self.stack = Some(Stack {
            arrays,
            unfolded: unfold,
        });
        Ok(())
    }

    /// Apply a radiometric conversion to every source. Shapes are unchanged.
    pub fn convert(&mut self, params: &ConversionParams) -> Result<()> {
        let data = self
            .data
            .as_mut()
            .ok_or_else(|| Error::not_loaded("convert"))?;
        let converted = conversion::convert_arrays(&data.arrays, params, &self.no_data)?;
        data.arrays = converted;
        for pixel_type in data.pixel_types.iter_mut() {
            if pixel_type.is_integer() {
                *pixel_type = PixelType::Float64;
            }
        }
        self.units = Some((params.to, params.output_scale));
        info!(
            "Converted {} ({}) -> {} ({})",
            params.system, params.system_scale, params.to, params.output_scale
        );
        Ok(())
    }

    /// Drop the arrays and the stack. Safe to call at any time.
    pub fn reset(&mut self) {
        self.data = None;
        self.stack = None;
        self.units = None;
    }

    pub fn reset_stack(&mut self) {
        self.stack = None;
    }

    pub fn info(&self) -> GridInfo {
        let sources = self
            .sources
            .iter()
            .zip(&self.no_data)
            .map(|(s, &nodata)| {
                let i = s.info();
                let geo = i.geo_reference();
                SourceSummary {
                    name: i.name.clone(),
                    cols: i.size_x,
                    rows: i.size_y,
                    bands: i.bands,
                    pixel_type: i.pixel_type,
                    geotransform: i.geotransform,
                    epsg: i.epsg(),
                    xmin: geo.origin_x,
                    ymin: geo.origin_y,
                    xres: geo.pixel_width,
                    yres: geo.pixel_height,
                    projection: geo.projection,
                    nodata,
                }
            })
            .collect();
        GridInfo {
            sources,
            layout: self.layout(),
            extents: self.data.as_ref().map(|d| d.extents().to_vec()),
            unit_system: self.units.map(|u| u.0),
            scale: self.units.map(|u| u.1),
        }
    }

    /// Current pixel type of a source: the loaded one if any, else the file's.
    pub fn pixel_type(&self, index: usize) -> Option<PixelType> {
        let loaded = self
            .data
            .as_ref()
            .and_then(|d| d.pixel_types().get(index).copied());
        loaded.or_else(|| self.source_info(index).map(|i| i.pixel_type))
    }

    /// Write arrays as rasters, one file per array. 2-D arrays become single-band
    /// files, 3-D arrays one band per leading index. Georeferencing comes from the
    /// `reference` source. When there is one array per source each file gets its
    /// source's no-data value, otherwise the reference source's.
    pub fn write<P: AsRef<Path>>(
        &self,
        data: &[ArrayD<f64>],
        filenames: &[P],
        options: &WriteOptions,
    ) -> Result<()> {
        if data.len() != filenames.len() {
            return Err(Error::InvalidArgument {
                arg: "filenames",
                value: format!("{} filename(s) for {} array(s)", filenames.len(), data.len()),
            });
        }
        let reference = self
            .source_info(options.reference)
            .ok_or_else(|| Error::InvalidArgument {
                arg: "reference",
                value: format!("{} of {} source(s)", options.reference, self.sources.len()),
            })?;
        let pixel_type = options
            .pixel_type
            .or_else(|| self.pixel_type(options.reference))
            .unwrap_or(PixelType::Float64);

        // Validate every output before touching the disk.
        let mut jobs = Vec::with_capacity(data.len());
        for (array, filename) in data.iter().zip(filenames) {
            let path = resolve_path(options.base_dir.as_deref(), filename.as_ref());
            let driver = OutputDriver::from_path(&path)?;
            jobs.push((path, driver, as_cube(array)?));
        }

        let per_source = data.len() == self.sources.len();
        for (i, (path, driver, cube)) in jobs.into_iter().enumerate() {
            let no_data = if per_source {
                self.no_data[i]
            } else {
                self.no_data[options.reference]
            };
            let target = RasterTarget {
                driver,
                pixel_type,
                geotransform: reference.geotransform,
                projection: &reference.projection,
                no_data,
            };
            let bands = cube.len_of(Axis(0));
            let mut ds = write_raster(&path, cube, &target)?;
            embed_metadata(&mut ds, &processing_metadata(self.units, no_data))?;
            info!(
                "Wrote {:?} ({} band(s), {}, {})",
                path,
                bands,
                pixel_type,
                driver.gdal_name()
            );
        }
        Ok(())
    }

    /// Write the grid's own arrays, one file per source. Flat data is shaped for
    /// writing without changing the grid.
    pub fn write_array<P: AsRef<Path>>(&self, filenames: &[P], options: &WriteOptions) -> Result<()> {
        let shaped = self.loaded("write the arrays")?.shaped_arrays()?;
        self.write(&shaped, filenames, options)
    }
}

fn as_cube(array: &ArrayD<f64>) -> Result<ArrayView3<'_, f64>> {
    match array.ndim() {
        2 => Ok(array
            .view()
            .insert_axis(Axis(0))
            .into_dimensionality::<Ix3>()?),
        3 => Ok(array.view().into_dimensionality::<Ix3>()?),
        n => Err(Error::InvalidArgument {
            arg: "array",
            value: format!("{}-D array, only 2-D or 3-D arrays can be written", n),
        }),
    }
}
