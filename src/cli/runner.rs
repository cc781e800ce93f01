use tracing::info;

use radgrid::core::params::parse_window;
use radgrid::{
    ConversionParams, Grid, NoDataRule, OpenOptions, PipelineParams, Subset, ToArrayOptions,
};

use super::args::CliArgs;
use super::errors::AppError;

fn open_options(args: &CliArgs) -> OpenOptions {
    OpenOptions {
        filenames: args.input.clone(),
        extension: args.extension.clone(),
        base_dir: args.input_dir.clone(),
        check_dim: !args.no_check_dim,
    }
}

/// Start from the `--config` file (if any) and apply the command line on top.
fn pipeline_params(args: &CliArgs) -> Result<PipelineParams, AppError> {
    let mut params = match &args.config {
        Some(path) => {
            info!("Reading parameters from {:?}", path);
            PipelineParams::from_json_file(path)?
        }
        None => PipelineParams {
            load: ToArrayOptions {
                flatten: false,
                ..ToArrayOptions::default()
            },
            ..PipelineParams::default()
        },
    };

    if let Some(bands) = &args.bands {
        params.load.bands = bands.parse()?;
    }
    if args.flatten {
        params.load.flatten = true;
    }
    if let Some(factor) = args.quantification {
        params.load.quantification_factor = factor;
    }
    match (&args.subset_x, &args.subset_y) {
        (Some(x), Some(y)) => {
            params.load.subset = Some(Subset::new(parse_window(x)?, parse_window(y)?));
        }
        (Some(_), None) => {
            return Err(AppError::IncompleteArgumentPair {
                given: "--subset-x",
                missing: "--subset-y",
            });
        }
        (None, Some(_)) => {
            return Err(AppError::IncompleteArgumentPair {
                given: "--subset-y",
                missing: "--subset-x",
            });
        }
        (None, None) => {}
    }

    if args.nodata.is_some() {
        params.no_data = args.nodata;
    }
    if args.nodata_zero && params.no_data.is_none() {
        return Err(AppError::IncompleteArgumentPair {
            given: "--nodata-zero",
            missing: "--nodata",
        });
    }

    match (args.from, args.to) {
        (Some(from), Some(to)) => {
            let mut convert = ConversionParams::new(from, to).scales(args.from_scale, args.to_scale);
            convert.iza = args.iza.map(Into::into);
            convert.vza = args.vza.map(Into::into);
            convert.angle_unit = args.angle_unit;
            params.convert = Some(convert);
        }
        (Some(_), None) => {
            return Err(AppError::IncompleteArgumentPair {
                given: "--from",
                missing: "--to",
            });
        }
        (None, Some(_)) => {
            return Err(AppError::IncompleteArgumentPair {
                given: "--to",
                missing: "--from",
            });
        }
        (None, None) => {}
    }

    if let Some(reference) = args.reference {
        params.write.reference = reference;
    }
    if args.pixel_type.is_some() {
        params.write.pixel_type = args.pixel_type;
    }
    Ok(params)
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.log {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }

    if args.output.is_empty() && !args.info {
        return Err(AppError::NothingToDo.into());
    }

    let params = pipeline_params(&args)?;
    let mut grid = Grid::open(&open_options(&args))?;

    grid.to_array(&params.load)?;

    if let Some(value) = params.no_data {
        let rule = if args.nodata_zero {
            NoDataRule::NanAndZero
        } else {
            NoDataRule::NanOnly
        };
        grid.set_no_data(value, rule)?;
    }

    if let Some(convert) = &params.convert {
        grid.convert(convert)?;
    }

    if args.info {
        println!("{}", serde_json::to_string_pretty(&grid.info())?);
    }

    if !args.output.is_empty() {
        grid.write_array(&args.output, &params.write)?;
        info!(
            "Successfully processed {} input(s) -> {:?}",
            grid.source_count(),
            args.output
        );
    }

    Ok(())
}
