#![doc = r#"
RADGRID: co-registered raster grids with radiometric unit conversion.

This crate opens one or more GDAL-readable rasters (GeoTIFF, ENVI, ...) as a single
`Grid`, materializes their bands as `ndarray` arrays, and moves them through shape
changes, no-data handling, stacking and conversion between backscatter (BSC),
BRDF and BRF units in linear or decibel scale. Results are written back through GDAL
with the georeferencing of a reference input.

Requirements
------------
- GDAL development headers and runtime available on your system.
- Rust 2024 edition toolchain.

Quick start: load, convert, write
---------------------------------
```rust,no_run
use radgrid::{ConversionParams, Grid, OpenOptions, Scale, ToArrayOptions, UnitSystem, WriteOptions};

fn main() -> radgrid::Result<()> {
    let mut grid = Grid::open(&OpenOptions::files(["/data/brf_b04.tif", "/data/brf_b08.tif"]))?;
    grid.to_array(&ToArrayOptions::default())?;

    let params = ConversionParams::new(UnitSystem::Brf, UnitSystem::Brdf)
        .scales(Scale::Linear, Scale::Db);
    grid.convert(&params)?;

    grid.write_array(
        &["/out/brdf_b04.tif", "/out/brdf_b08.tif"],
        &WriteOptions::default(),
    )
}
```

Backscatter to BRDF with per-pixel angles
-----------------------------------------
```rust,no_run
use ndarray::ArrayD;
use radgrid::{AngleUnit, ConversionParams, Grid, OpenOptions, ToArrayOptions, UnitSystem};

fn to_brdf(incidence: ArrayD<f64>) -> radgrid::Result<()> {
    let mut grid = Grid::open(&OpenOptions::extension("/data/s1", "tif"))?;
    grid.to_array(&ToArrayOptions { flatten: false, ..ToArrayOptions::default() })?;
    grid.convert(
        &ConversionParams::new(UnitSystem::Bsc, UnitSystem::Brdf)
            .angles(incidence, 0.0, AngleUnit::Deg),
    )?;
    Ok(())
}
```

Arrays built elsewhere
----------------------
```rust
use ndarray::Array3;
use radgrid::{Grid, MemoryRaster, ToArrayOptions};

let cube = Array3::from_shape_fn((2, 4, 4), |(b, r, c)| (b * 16 + r * 4 + c) as f64);
let mut grid = Grid::from_source(MemoryRaster::new("synthetic", cube)).unwrap();
grid.to_array(&ToArrayOptions::default()).unwrap();
assert_eq!(grid.array().unwrap().shape(), &[2, 16]);

grid.dstack(true).unwrap();
assert_eq!(grid.stack().unwrap().arrays()[0].shape(), &[16, 2]);
```

Error handling
--------------
All public functions return `radgrid::Result<T>`; match on `radgrid::Error` to handle
specific cases.

```rust,no_run
use radgrid::{Error, Grid, OpenOptions};

fn main() {
    match Grid::open(&OpenOptions::files(["/data/missing.bin"])) {
        Ok(grid) => println!("{} source(s)", grid.source_count()),
        Err(Error::NotFound { path }) => eprintln!("cannot open {path:?}"),
        Err(Error::DimensionMismatch { cols, rows }) => eprintln!("cols {cols:?} rows {rows:?}"),
        Err(other) => eprintln!("Other error: {other}"),
    }
}
```

Useful modules
--------------
- [`core`]: the `Grid`, its array state, radiometry and conversion.
- [`types`]: unit systems, scales, angle units and pixel types.
- [`io`]: raster sources (GDAL and in-memory), file discovery and writers.
- [`error`]: crate-level `Error` and `Result`.
"#]

pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
pub use core::grid::{Grid, GridInfo, SourceSummary};
pub use core::params::{
    BandSelection, ConversionParams, OpenOptions, PipelineParams, Subset, ToArrayOptions,
    WriteOptions,
};
pub use core::radiometry::ZenithAngle;
pub use core::state::{Extent, GridData, Layout, NoDataRule, Stack};
pub use error::{Error, Result};
pub use types::{AngleUnit, OutputDriver, PixelType, Scale, UnitSystem};

pub use io::{DEFAULT_NO_DATA, GdalError, GdalRaster, MemoryRaster, RasterSource, SourceInfo};
