//! Reader capabilities used by the item builder
//!
//! Each trait exposes only the named fields the builder reads, so the NetCDF and
//! GDAL handles never leak out as free-form attribute bags. The default
//! implementations live in [`crate::netcdf_io`], [`crate::raster_io`] and
//! [`crate::href_io`].

use crate::errors::Result;

/// Header values of a GEBCO NetCDF grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridAttributes {
    pub title: String,
    pub institution: Option<String>,
    pub source: Option<String>,
    pub history: Option<String>,
    pub comment: Option<String>,
    /// Length of the `lon` dimension
    pub lon_count: usize,
    /// Length of the `lat` dimension
    pub lat_count: usize,
}

/// Georeferencing of a raster as read from its header
#[derive(Debug, Clone, PartialEq)]
pub struct RasterHeader {
    /// EPSG code of the raster CRS, if it has one
    pub epsg: Option<u32>,
    /// Affine coefficients `[a, b, c, d, e, f]`
    pub transform: [f64; 6],
    pub width: usize,
    pub height: usize,
    /// `[west, south, east, north]` in the raster CRS
    pub bounds: [f64; 4],
    /// `bounds` reprojected to EPSG:4326
    pub geographic_bounds: [f64; 4],
}

impl RasterHeader {
    /// `[rows, cols]`
    pub fn shape(&self) -> [usize; 2] {
        [self.height, self.width]
    }
}

/// Reads descriptive attributes and grid dimensions from a multidimensional dataset
pub trait GridMetadataReader {
    fn read_grid(&self, href: &str) -> Result<GridAttributes>;
}

/// Reads the georeferencing header of a raster
pub trait RasterMetadataReader {
    fn read_header(&self, href: &str) -> Result<RasterHeader>;
}

/// Reports the size in bytes of the file behind an href.
/// `None` means the size could not be determined; callers treat that as soft.
pub trait SizeProbe {
    fn size(&self, href: &str) -> Option<u64>;
}

/// Rewrites an href before it is opened for metadata extraction, e.g. to
/// attach a short-lived signature. Stored hrefs are never rewritten.
pub trait CredentialResolver {
    fn resolve(&self, href: &str) -> String;
}

impl<F> CredentialResolver for F
where
    F: Fn(&str) -> String,
{
    fn resolve(&self, href: &str) -> String {
        self(href)
    }
}
