//! Fixed catalog values for the Seabed 2030 GEBCO grid
//!
//! All of the textual, organizational and geometric constants used by the
//! builders live in one immutable [`SeabedConfig`] value that callers pass in.
//! The defaults describe the GEBCO_2020 release; a JSON file can override any
//! subset of fields.

use crate::errors::{Result, SeabedError};
use crate::records::{Provider, RasterBand};
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use std::{fs, path::Path};

/// Immutable configuration shared by the converter and the record builders
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeabedConfig {
    /// Collection id, also the prefix of every item id
    pub id: String,
    pub title: String,
    pub description: String,
    pub license: String,
    pub license_href: String,
    pub provider: Provider,

    /// Whole-Earth extent as `[west, south, east, north]`
    pub spatial_extent: [f64; 4],
    /// First grid release; the temporal extent stays open-ended
    pub temporal_start: DateTime<Utc>,

    pub epsg: u32,
    pub doi: String,
    pub citation: String,
    pub thumbnail_href: String,

    /// Schema of the single elevation band in every COG
    pub raster_band: RasterBand,

    /// Descriptive item properties used when no NetCDF source is available
    pub item_title: String,
    pub item_institution: String,
    pub item_source: String,
    pub item_history: String,
    pub item_comment: String,

    /// Elevation variable inside the GEBCO NetCDF file
    pub variable: String,
    /// Tile edge length in pixels for `gdal_retile.py`
    pub tile_size: usize,
    pub translate_program: String,
    pub retile_program: String,
}

impl Default for SeabedConfig {
    fn default() -> Self {
        Self {
            id: "seabed-2030".to_string(),
            title: "Seabed 2030 General Bathymetric Chart of the Oceans (GEBCO) Grid".to_string(),
            description: "GEBCO's gridded bathymetric datasets are a global terrain model for ocean and land, \
                          providing elevation data, in meters, on a 15 arc-second interval grid."
                .to_string(),
            license: "CC-BY-4.0".to_string(),
            license_href:
                "https://www.gebco.net/data_and_products/gridded_bathymetry_data/gebco_2020/grid_terms_of_use.html"
                    .to_string(),
            provider: gebco_provider(),
            spatial_extent: [-180.0, -90.0, 180.0, 90.0],
            temporal_start: Utc.with_ymd_and_hms(2003, 1, 1, 0, 0, 0).single().unwrap_or_default(),
            epsg: 4326,
            doi: "10.5285/a29c5465-b138-234d-e053-6c86abc040b9".to_string(),
            citation: "GEBCO Compilation Group (2020) GEBCO 2020 Grid \
                       (doi:10.5285/a29c5465-b138-234d-e053-6c86abc040b9)"
                .to_string(),
            thumbnail_href:
                "https://www.gebco.net/data_and_products/gridded_bathymetry_data/gebco_2020/gebco_2020_thumbnail.png"
                    .to_string(),
            raster_band: RasterBand {
                data_type: "int16".to_string(),
                nodata: -32767.0,
                sampling: "area".to_string(),
                spatial_resolution: 463.0,
            },
            item_title: "The GEBCO_2020 Grid - a continuous terrain model for oceans and land at 15 arc-second intervals"
                .to_string(),
            item_institution: "On behalf of the General Bathymetric Chart of the Oceans (GEBCO), \
                               NERC - National Oceanography Centre"
                .to_string(),
            item_source: "The GEBCO_2020 Grid is the latest global bathymetric product released by the \
                          General Bathymetric Chart of the Oceans (GEBCO) and has been developed through \
                          the Nippon Foundation-GEBCO Seabed 2030 Project."
                .to_string(),
            item_history: "Information on the development of the data set and the source data sets \
                           included in the grid can be found in the data set documentation available \
                           from https://www.gebco.net"
                .to_string(),
            item_comment: "The data in the GEBCO_2020 Grid should not be used for navigation or any \
                           purpose relating to safety at sea."
                .to_string(),
            variable: "elevation".to_string(),
            tile_size: 21600,
            translate_program: "gdal_translate".to_string(),
            retile_program: "gdal_retile.py".to_string(),
        }
    }
}

fn gebco_provider() -> Provider {
    let mut provider = Provider::new("GEBCO Compilation Group");
    provider.roles = Some(vec!["producer".to_string(), "processor".to_string(), "host".to_string()]);
    provider.url = Some("https://www.gebco.net/data_and_products/gridded_bathymetry_data/".to_string());
    provider
}

impl SeabedConfig {
    /// Load a configuration from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            SeabedError::ConfigError(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_json_str(&text)
            .map_err(|e| SeabedError::ConfigError(format!("'{}': {}", path.display(), e)))
    }

    /// Parse a configuration from JSON text. Missing fields keep their defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: SeabedConfig = serde_json::from_str(text)?;
        config.check()?;
        Ok(config)
    }

    /// DOI resolver URL used for the `cite-as` link
    pub fn doi_href(&self) -> String {
        format!("https://doi.org/{}", self.doi)
    }

    fn check(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(SeabedError::ConfigError("'id' must not be empty".to_string()));
        }
        if self.tile_size == 0 {
            return Err(SeabedError::ConfigError("'tile_size' must be positive".to_string()));
        }
        let [west, south, east, north] = self.spatial_extent;
        if west > east || south > north {
            return Err(SeabedError::ConfigError(format!(
                "'spatial_extent' {:?} is not ordered as [west, south, east, north]",
                self.spatial_extent
            )));
        }
        Ok(())
    }
}
