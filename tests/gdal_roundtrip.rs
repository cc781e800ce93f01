use ndarray::{Array3, ArrayD, Axis, IxDyn};
use radgrid::{
    ConversionParams, Error, Grid, Layout, MemoryRaster, OpenOptions, PixelType, Scale,
    ToArrayOptions, UnitSystem, WriteOptions,
};
use std::f64::consts::PI;
use std::path::Path;
use tempfile::tempdir;

const GEOTRANSFORM: [f64; 6] = [500000.0, 10.0, 0.0, 4600000.0, 0.0, -10.0];

fn synthetic_cube() -> Array3<f64> {
    Array3::from_shape_fn((2, 5, 4), |(b, r, c)| (b * 100 + r * 10 + c) as f64)
}

fn synthetic() -> MemoryRaster {
    MemoryRaster::new("synthetic", synthetic_cube())
        .with_geotransform(GEOTRANSFORM)
        .with_no_data(-9999.0)
        .with_pixel_type(PixelType::Float32)
}

fn write_options(dir: &Path) -> WriteOptions {
    WriteOptions {
        base_dir: Some(dir.to_path_buf()),
        ..WriteOptions::default()
    }
}

fn shaped() -> ToArrayOptions {
    ToArrayOptions {
        flatten: false,
        ..ToArrayOptions::default()
    }
}

#[test]
fn geotiff_round_trip_keeps_values_and_georeferencing() {
    let dir = tempdir().unwrap();
    let mut grid = Grid::from_source(synthetic()).unwrap();
    grid.to_array(&ToArrayOptions::default()).unwrap();
    grid.write_array(&["out.tif"], &write_options(dir.path()))
        .unwrap();
    // writing shapes a copy, the grid stays flat
    assert_eq!(grid.layout(), Some(Layout::PerBandFlat));

    let mut reopened = Grid::open(&OpenOptions::files([dir.path().join("out.tif")])).unwrap();
    let info = reopened.source_info(0).unwrap();
    assert_eq!((info.size_x, info.size_y, info.bands), (4, 5, 2));
    assert_eq!(info.geotransform, GEOTRANSFORM);
    assert_eq!(info.no_data, -9999.0);
    assert_eq!(info.pixel_type, PixelType::Float32);
    assert_eq!(
        info.metadata.get("RADGRID_NODATA").map(String::as_str),
        Some("-9999")
    );
    assert!(!info.metadata.contains_key("RADGRID_UNIT_SYSTEM"));

    reopened.to_array(&shaped()).unwrap();
    assert_eq!(reopened.array().unwrap(), &synthetic_cube().into_dyn());
}

#[test]
fn converted_grid_is_tagged_with_its_units() {
    let dir = tempdir().unwrap();
    let mut grid = Grid::from_source(synthetic()).unwrap();
    grid.to_array(&shaped()).unwrap();
    grid.convert(&ConversionParams::new(UnitSystem::Brf, UnitSystem::Brdf))
        .unwrap();
    grid.write_array(
        &["brdf.tif"],
        &WriteOptions {
            pixel_type: Some(PixelType::Float64),
            ..write_options(dir.path())
        },
    )
    .unwrap();

    let mut reopened = Grid::open(&OpenOptions::files([dir.path().join("brdf.tif")])).unwrap();
    let info = reopened.source_info(0).unwrap();
    assert_eq!(info.pixel_type, PixelType::Float64);
    assert_eq!(
        info.metadata.get("RADGRID_UNIT_SYSTEM").map(String::as_str),
        Some("BRDF")
    );
    assert_eq!(
        info.metadata.get("RADGRID_SCALE").map(String::as_str),
        Some("linear")
    );

    reopened.to_array(&shaped()).unwrap();
    let expected = synthetic_cube().mapv(|v| v / PI).into_dyn();
    assert_eq!(reopened.array().unwrap(), &expected);
}

#[test]
fn envi_outputs_are_found_by_extension() {
    let dir = tempdir().unwrap();
    let mut grid = Grid::from_source(synthetic()).unwrap();
    grid.to_array(&shaped()).unwrap();
    let first = grid.array().unwrap().index_axis(Axis(0), 0).to_owned();
    let second = grid.array().unwrap().index_axis(Axis(0), 1).to_owned();
    grid.write(&[first, second], &["b1.bin", "b2.bin"], &write_options(dir.path()))
        .unwrap();

    let mut found = Grid::open(&OpenOptions::extension(dir.path(), ".bin")).unwrap();
    assert_eq!(found.source_count(), 2);
    assert_eq!(found.source_info(0).unwrap().name, "b1.bin");
    assert_eq!(found.source_info(1).unwrap().bands, 1);

    found.to_array(&ToArrayOptions::default()).unwrap();
    assert_eq!(found.layout(), Some(Layout::Flat));
    found.dstack(false).unwrap();
    let stack = &found.stack().unwrap().arrays()[0];
    assert_eq!(stack.shape(), &[20, 2]);
    assert_eq!(stack[[7, 0]], 13.0);
    assert_eq!(stack[[7, 1]], 113.0);
}

#[test]
fn integer_outputs_replace_values_that_do_not_fit() {
    let dir = tempdir().unwrap();
    let grid = Grid::from_source(synthetic().with_no_data(255.0)).unwrap();
    let data = ArrayD::from_shape_vec(IxDyn(&[1, 3]), vec![12.0, 300.0, f64::NAN]).unwrap();
    grid.write(
        &[data],
        &["bytes.tif"],
        &WriteOptions {
            pixel_type: Some(PixelType::Byte),
            ..write_options(dir.path())
        },
    )
    .unwrap();

    let mut reopened = Grid::open(&OpenOptions::files([dir.path().join("bytes.tif")])).unwrap();
    assert_eq!(reopened.source_info(0).unwrap().pixel_type, PixelType::Byte);
    reopened.to_array(&ToArrayOptions::default()).unwrap();
    assert_eq!(reopened.no_data(), &[255.0]);
    assert_eq!(
        reopened.array().unwrap().iter().copied().collect::<Vec<_>>(),
        vec![12.0, 255.0, 255.0]
    );
}

#[test]
fn decibel_output_round_trips_through_disk() {
    let dir = tempdir().unwrap();
    let mut grid = Grid::from_source(synthetic()).unwrap();
    grid.to_array(&ToArrayOptions::default()).unwrap();
    grid.convert(
        &ConversionParams::new(UnitSystem::Brdf, UnitSystem::Brdf).scales(Scale::Linear, Scale::Db),
    )
    .unwrap();
    grid.write_array(
        &["db.tif"],
        &WriteOptions {
            pixel_type: Some(PixelType::Float64),
            ..write_options(dir.path())
        },
    )
    .unwrap();

    let mut reopened = Grid::open(&OpenOptions::files([dir.path().join("db.tif")])).unwrap();
    reopened.to_array(&ToArrayOptions::default()).unwrap();
    reopened
        .convert(
            &ConversionParams::new(UnitSystem::Brdf, UnitSystem::Brdf)
                .scales(Scale::Db, Scale::Linear),
        )
        .unwrap();
    let original = synthetic_cube();
    for (a, b) in reopened.array().unwrap().iter().zip(original.iter()) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }
}

#[test]
fn missing_files_are_not_found() {
    let dir = tempdir().unwrap();
    let err = Grid::open(&OpenOptions::files([dir.path().join("missing.bin")])).unwrap_err();
    match err {
        Error::NotFound { path } => assert!(path.ends_with("missing.bin")),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn open_needs_exactly_one_way_to_name_the_inputs() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        Grid::open(&OpenOptions::default()),
        Err(Error::Configuration(_))
    ));
    let both = OpenOptions {
        filenames: vec!["a.tif".into()],
        ..OpenOptions::extension(dir.path(), "tif")
    };
    assert!(matches!(Grid::open(&both), Err(Error::Configuration(_))));
    assert!(matches!(
        Grid::open(&OpenOptions::extension(dir.path(), "tif")),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn relative_inputs_resolve_against_the_base_dir() {
    let dir = tempdir().unwrap();
    let mut grid = Grid::from_source(synthetic()).unwrap();
    grid.to_array(&shaped()).unwrap();
    grid.write_array(&["rel.tif"], &write_options(dir.path()))
        .unwrap();

    let opened = Grid::open(&OpenOptions {
        filenames: vec!["rel.tif".into()],
        base_dir: Some(dir.path().to_path_buf()),
        ..OpenOptions::default()
    })
    .unwrap();
    assert_eq!(opened.source_info(0).unwrap().name, "rel.tif");
}
