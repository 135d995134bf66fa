//! seabed_2030: STAC records and COGs for the Seabed 2030 GEBCO grid
//!
//! Builds STAC collection and item records describing the GEBCO global
//! bathymetry grid, and converts the GEBCO NetCDF grid into Cloud-Optimized
//! GeoTIFFs with GDAL's command line tools.
//!
//! ## Key Features
//!
//! - **Collection**: a fixed collection assembled from [`config::SeabedConfig`]
//! - **Items**: derived either from the NetCDF source plus its COG, or from a COG alone
//! - **Projection consistency**: `proj:bbox`, `proj:transform` and `proj:shape` always agree
//! - **Remote assets**: COG headers and sizes are read through byte-range requests
//! - **Conversion**: single COG or fixed-size GeoTIFF tiles via `gdal_translate` / `gdal_retile.py`
//!
//! ## Module Organization
//!
//! - [`stac`]: collection and item builders
//! - [`metadata`]: year, id, timestamp and transform derivation rules
//! - [`records`]: STAC record helpers, validation and persistence
//! - [`data_source`]: reader capability traits
//! - [`netcdf_io`]: NetCDF header reader
//! - [`raster_io`]: GeoTIFF header reader (GDAL)
//! - [`href_io`]: href classification and size probes
//! - [`cog`]: NetCDF to COG conversion
//! - [`config`]: catalog constants
//! - [`errors`]: centralized error handling
//!
//! ## Usage Examples
//!
//! ```rust,no_run
//! use seabed_2030::prelude::*;
//! use std::path::Path;
//!
//! let config = SeabedConfig::default();
//!
//! let mut collection = create_collection(&config, None).unwrap();
//! collection.save(Path::new("catalog/collection.json")).unwrap();
//!
//! // COG only: geometry and projection come from the COG header
//! let mut item = create_item(&config, "GEBCO_2020_5_7_01_01.tif", None, None).unwrap();
//! item.save(Path::new("catalog/GEBCO_2020_5_7_01_01.json")).unwrap();
//!
//! // Signed URLs are used for reading only, the stored href stays as given
//! let sign = |href: &str| format!("{}?token=abc", href);
//! let item = ItemBuilder::new(&config)
//!     .with_credential_resolver(&sign)
//!     .build("https://example.com/GEBCO_2020.tif", None)
//!     .unwrap();
//! ```

// Core modules
pub mod cli;
pub mod cog;
pub mod config;
pub mod data_source;
pub mod errors;
pub mod href_io;
pub mod metadata;
pub mod netcdf_io;
pub mod raster_io;
pub mod records;
pub mod stac;

// Direct re-exports for the public API
pub use errors::*;
pub use stac::{create_collection, create_item, ItemBuilder};

// High-level convenience API
pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::cog::{create_cog, CogTarget, ProcessRunner, ToolRunner};
    pub use crate::config::SeabedConfig;
    pub use crate::data_source::{
        CredentialResolver, GridAttributes, GridMetadataReader, RasterHeader, RasterMetadataReader,
        SizeProbe,
    };
    pub use crate::errors::{Result, SeabedError};
    pub use crate::records::{validate_schema, AssetFields, Collection, Item, StacRecord};
    pub use crate::stac::{create_collection, create_item, ItemBuilder};
}
