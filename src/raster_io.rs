//! GeoTIFF header access through GDAL
//!
//! Opening a COG only reads its header (remote files via `/vsicurl/` range
//! reads), which is all the item builder needs: CRS, geotransform and size.

use crate::data_source::{RasterHeader, RasterMetadataReader};
use crate::errors::Result;
use crate::href_io::gdal_path;
use crate::metadata::{affine_from_geotransform, bounds_from_transform};
use gdal::spatial_ref::{AxisMappingStrategy, CoordTransform, SpatialRef};
use gdal::Dataset;
use tracing::{debug, warn};

/// EPSG code of geographic WGS 84
pub const WGS84_EPSG: u32 = 4326;

/// Densification points per edge when reprojecting bounds
const BOUNDS_DENSIFY_PTS: i32 = 21;

/// [`RasterMetadataReader`] backed by GDAL
#[derive(Debug, Clone, Copy, Default)]
pub struct GdalRasterReader;

impl RasterMetadataReader for GdalRasterReader {
    fn read_header(&self, href: &str) -> Result<RasterHeader> {
        let path = gdal_path(href);
        let ds = Dataset::open(&path)?;
        debug!("opened raster {}", path);
        read_raster_header(&ds)
    }
}

/// Reads CRS, transform, size and bounds from an open dataset.
pub fn read_raster_header(ds: &Dataset) -> Result<RasterHeader> {
    let transform = affine_from_geotransform(&ds.geo_transform()?);
    let (width, height) = ds.raster_size();
    let bounds = bounds_from_transform(&transform, [height, width]);

    let srs = ds.spatial_ref().ok();
    let epsg = srs.as_ref().and_then(epsg_code);

    let geographic_bounds = match &srs {
        Some(srs) if epsg != Some(WGS84_EPSG) => to_geographic_bounds(srs, &bounds)?,
        Some(_) => bounds,
        None => {
            warn!("raster has no CRS, treating its bounds as geographic");
            bounds
        }
    };

    Ok(RasterHeader {
        epsg,
        transform,
        width,
        height,
        bounds,
        geographic_bounds,
    })
}

fn epsg_code(srs: &SpatialRef) -> Option<u32> {
    match srs.auth_name() {
        Some(name) if name.eq_ignore_ascii_case("EPSG") => {
            srs.auth_code().ok().and_then(|code| u32::try_from(code).ok())
        }
        _ => None,
    }
}

/// Reprojects `[west, south, east, north]` from `srs` to EPSG:4326 in lon/lat order
fn to_geographic_bounds(srs: &SpatialRef, bounds: &[f64; 4]) -> Result<[f64; 4]> {
    let mut source = srs.clone();
    source.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
    let mut target = SpatialRef::from_epsg(WGS84_EPSG)?;
    target.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);

    let transform = CoordTransform::new(&source, &target)?;
    Ok(transform.transform_bounds(bounds, BOUNDS_DENSIFY_PTS)?)
}
