//! End-to-end tests against real files: NetCDF grids written with the `netcdf`
//! crate and GeoTIFFs written with GDAL.

use gdal::{spatial_ref::SpatialRef, DriverManager};
use seabed_2030::{
    cog::{ProcessRunner, ToolRunner},
    config::SeabedConfig,
    data_source::{GridMetadataReader, RasterMetadataReader},
    errors::{Result, SeabedError},
    netcdf_io::NetCDFGridReader,
    raster_io::GdalRasterReader,
    records::{AssetFields, Bbox, Item, StacRecord},
    stac::{create_item, IMAGE_ASSET_KEY},
};
use std::{fs, path::Path};
use tempfile::tempdir;

/// Writes a small GEBCO-like NetCDF grid
fn write_gebco_netcdf(path: &Path, title: &str, with_lat: bool) -> Result<()> {
    let mut file = netcdf::create(path)?;

    file.add_dimension("lon", 8)?;
    if with_lat {
        file.add_dimension("lat", 4)?;
        file.add_variable::<i16>("elevation", &["lat", "lon"])?;
    }

    file.add_attribute("title", title)?;
    file.add_attribute("institution", "On behalf of the General Bathymetric Chart of the Oceans (GEBCO)")?;
    file.add_attribute("source", "The GEBCO Grid")?;
    file.add_attribute("history", "Created for testing")?;
    file.add_attribute("comment", "Not for navigation")?;
    Ok(())
}

fn item_bbox(item: &Item) -> [f64; 4] {
    match item.bbox {
        Some(Bbox::TwoDimensional(bbox)) => bbox,
        other => panic!("Expected a 2D bbox, got {:?}", other),
    }
}

/// Writes a single band int16 GeoTIFF with the given GDAL geotransform
fn write_geotiff(path: &Path, geo_transform: [f64; 6], width: usize, height: usize, epsg: u32) -> Result<()> {
    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let mut ds = driver.create_with_band_type::<i16, _>(path, width, height, 1)?;
    ds.set_geo_transform(&geo_transform)?;
    ds.set_spatial_ref(&SpatialRef::from_epsg(epsg)?)?;
    Ok(())
}

#[test]
fn test_netcdf_grid_reader() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let nc_path = temp_dir.path().join("GEBCO_2020.nc");
    write_gebco_netcdf(&nc_path, "The GEBCO 2020 Grid", true)?;

    let grid = NetCDFGridReader.read_grid(&nc_path.to_string_lossy())?;
    assert_eq!(grid.title, "The GEBCO 2020 Grid");
    assert_eq!(grid.lon_count, 8);
    assert_eq!(grid.lat_count, 4);
    assert_eq!(grid.comment.as_deref(), Some("Not for navigation"));
    Ok(())
}

#[test]
fn test_netcdf_missing_dimension() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let nc_path = temp_dir.path().join("no_lat.nc");
    write_gebco_netcdf(&nc_path, "The GEBCO 2020 Grid", false)?;

    match NetCDFGridReader.read_grid(&nc_path.to_string_lossy()) {
        Err(SeabedError::MissingDimension { name }) => assert_eq!(name, "lat"),
        other => panic!("Expected MissingDimension error, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_missing_files_are_unreadable() {
    let nc = NetCDFGridReader.read_grid("/nonexistent/GEBCO_2020.nc");
    assert!(matches!(nc, Err(SeabedError::NetCDFError(_))));

    let tif = GdalRasterReader.read_header("/nonexistent/GEBCO_2020.tif");
    assert!(matches!(tif, Err(SeabedError::RasterError(_))));
}

#[test]
fn test_create_item_from_source_and_cog() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let nc_path = temp_dir.path().join("GEBCO_2020.nc");
    let cog_path = temp_dir.path().join("GEBCO_2020_cog.tif");
    write_gebco_netcdf(&nc_path, "The GEBCO 2020 Grid", true)?;
    write_geotiff(&cog_path, [-180.0, 45.0, 0.0, 90.0, 0.0, -45.0], 8, 4, 4326)?;

    let config = SeabedConfig::default();
    let cog_href = cog_path.to_string_lossy().to_string();
    let item = create_item(&config, &cog_href, Some(&nc_path.to_string_lossy()), None)?;

    assert_eq!(item.id, "seabed-2030-gebco-2020");
    assert_eq!(
        item.properties.datetime.map(|d| d.to_rfc3339()).as_deref(),
        Some("2020-01-01T00:00:00+00:00")
    );
    assert_eq!(item.properties.additional_fields["history"], "Created for testing");

    let asset = &item.assets[IMAGE_ASSET_KEY];
    assert_eq!(asset.href, cog_href);
    assert_eq!(asset.file_size(), Some(fs::metadata(&cog_path)?.len()));

    let proj = asset.projection()?.expect("projection");
    assert_eq!(proj.shape, [4, 8]);
    assert_eq!(proj.transform, [45.0, 0.0, -180.0, 0.0, -45.0, 90.0]);
    Ok(())
}

#[test]
fn test_create_item_from_cog_only() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let cog_path = temp_dir.path().join("GEBCO_2020_5_7_01_01.tif");
    write_geotiff(&cog_path, [-180.0, 0.25, 0.0, 90.0, 0.0, -0.25], 40, 20, 4326)?;

    let header = GdalRasterReader.read_header(&cog_path.to_string_lossy())?;
    assert_eq!(header.epsg, Some(4326));
    assert_eq!(header.bounds, [-180.0, 85.0, -170.0, 90.0]);

    let config = SeabedConfig::default();
    let item = create_item(&config, &cog_path.to_string_lossy(), None, None)?;

    assert_eq!(item.id, "seabed-2030-GEBCO_2020_5_7_01_01");
    assert_eq!(item_bbox(&item), header.bounds);

    let proj = item.assets[IMAGE_ASSET_KEY].projection()?.expect("projection");
    assert_eq!(proj.shape, [20, 40]);
    assert_eq!(proj.transform, [0.25, 0.0, -180.0, 0.0, -0.25, 90.0]);
    assert_eq!(proj.bbox, item_bbox(&item));

    // write it out and read it back
    let destination = temp_dir.path().join("item.json");
    let mut item = item;
    item.save(&destination)?;

    let read_back: Item = serde_json::from_str(&fs::read_to_string(&destination)?)?;
    assert_eq!(read_back.id, "seabed-2030-GEBCO_2020_5_7_01_01");
    assert!(read_back.links.iter().any(|l| l.rel == "self"));
    read_back.validate()?;
    Ok(())
}

#[test]
fn test_create_item_from_projected_cog() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let cog_path = temp_dir.path().join("mercator_tile.tif");
    // 1000 km square west of Greenwich, north of the equator
    write_geotiff(&cog_path, [-1_000_000.0, 10_000.0, 0.0, 1_000_000.0, 0.0, -10_000.0], 100, 100, 3857)?;

    let config = SeabedConfig::default();
    let item = create_item(&config, &cog_path.to_string_lossy(), None, None)?;

    let proj = item.assets[IMAGE_ASSET_KEY].projection()?.expect("projection");
    assert_eq!(proj.epsg, 3857);
    assert_eq!(proj.bbox, [-1_000_000.0, 0.0, 0.0, 1_000_000.0]);

    let [west, south, east, north] = item_bbox(&item);
    assert!((west + 8.983).abs() < 0.01, "west {}", west);
    assert!(south.abs() < 1e-6, "south {}", south);
    assert!(east.abs() < 1e-6, "east {}", east);
    assert!((north - 8.947).abs() < 0.01, "north {}", north);
    item.validate()?;
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_process_runner_reports_failures() {
    let runner = ProcessRunner;
    assert!(runner.run("sh", &["-c".to_string(), "exit 0".to_string()]).is_ok());

    let result = runner.run("sh", &["-c".to_string(), "echo boom >&2; exit 3".to_string()]);
    match result {
        Err(SeabedError::ExternalTool { tool, status, stderr }) => {
            assert_eq!(tool, "sh");
            assert_eq!(status, Some(3));
            assert_eq!(stderr.trim(), "boom");
        }
        other => panic!("Expected ExternalTool error, got {:?}", other),
    }

    // a tool that cannot be started is a tool failure, not an unreadable input
    match runner.run("/nonexistent/gdal_translate", &[]) {
        Err(e @ SeabedError::ExternalTool { status: None, .. }) => {
            assert!(!e.is_file_unreadable());
            assert!(e.to_string().contains("/nonexistent/gdal_translate"));
        }
        other => panic!("Expected ExternalTool error, got {:?}", other),
    }
}
