use clap::Parser;
use std::path::PathBuf;

use radgrid::{AngleUnit, PixelType, Scale, UnitSystem};

#[derive(Parser)]
#[command(name = "radgrid", version, about = "RADGRID CLI")]
pub struct CliArgs {
    /// Input raster (repeat for several co-registered files)
    #[arg(short, long)]
    pub input: Vec<PathBuf>,

    /// Directory to search for inputs (use with --extension)
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// File name suffix of the inputs inside --input-dir, e.g. "tif" or "_B04.bin"
    #[arg(long)]
    pub extension: Option<String>,

    /// Output raster, one per input (.tif/.tiff or .bin)
    #[arg(short, long)]
    pub output: Vec<PathBuf>,

    /// JSON file with processing parameters; command line flags override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Bands to load: all, 2, 1,3 or 1-3
    #[arg(long)]
    pub bands: Option<String>,

    /// Keep each band plane flattened into one row
    #[arg(long, default_value_t = false)]
    pub flatten: bool,

    /// Divide loaded values by this factor (e.g. 10000 for Sentinel-2 reflectance)
    #[arg(long)]
    pub quantification: Option<f64>,

    /// Column window start:end
    #[arg(long)]
    pub subset_x: Option<String>,

    /// Row window start:end
    #[arg(long)]
    pub subset_y: Option<String>,

    /// Replace invalid pixels with this no-data value
    #[arg(long, allow_hyphen_values = true)]
    pub nodata: Option<f64>,

    /// Treat zero pixels as invalid as well (with --nodata)
    #[arg(long, default_value_t = false)]
    pub nodata_zero: bool,

    /// Unit system of the input values
    #[arg(long, value_enum)]
    pub from: Option<UnitSystem>,

    /// Unit system to convert to
    #[arg(long, value_enum)]
    pub to: Option<UnitSystem>,

    /// Scale of the input values
    #[arg(long, value_enum, default_value_t = Scale::Linear)]
    pub from_scale: Scale,

    /// Scale of the converted values
    #[arg(long, value_enum, default_value_t = Scale::Linear)]
    pub to_scale: Scale,

    /// Incidence (or sun) zenith angle, needed for conversions through BSC
    #[arg(long, allow_hyphen_values = true)]
    pub iza: Option<f64>,

    /// Viewing zenith angle, needed for conversions through BSC
    #[arg(long, allow_hyphen_values = true)]
    pub vza: Option<f64>,

    /// Unit of --iza and --vza
    #[arg(long, value_enum, default_value_t = AngleUnit::Rad)]
    pub angle_unit: AngleUnit,

    /// Input whose georeferencing is written to the outputs (0-based)
    #[arg(long)]
    pub reference: Option<usize>,

    /// Output pixel type; defaults to the pixel type of the reference input
    #[arg(long, value_enum)]
    pub pixel_type: Option<PixelType>,

    /// Print a JSON summary of the inputs
    #[arg(long, default_value_t = false)]
    pub info: bool,

    /// Allow inputs whose rows/cols differ
    #[arg(long, default_value_t = false)]
    pub no_check_dim: bool,

    /// Enable logging
    #[arg(long, default_value_t = false)]
    pub log: bool,
}
