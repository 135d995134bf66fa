//! Collection and item builders for the Seabed 2030 GEBCO grid
//!
//! The collection is assembled from [`SeabedConfig`] alone. Items come in two
//! flavors:
//!
//! - **source + COG**: descriptive attributes and grid size are read from the
//!   original NetCDF file, the geometry is the whole Earth, and the id embeds the
//!   year found in the NetCDF title.
//! - **COG only**: descriptive attributes come from the configuration, while
//!   geometry, transform and shape are read from the COG header; the id embeds
//!   the COG file name.
//!
//! Hrefs stored in records are never rewritten. A [`CredentialResolver`] only
//! affects the href used to open the COG header.

use crate::config::SeabedConfig;
use crate::data_source::{
    CredentialResolver, GridAttributes, GridMetadataReader, RasterMetadataReader, SizeProbe,
};
use crate::errors::Result;
use crate::href_io::HrefSizeProbe;
use crate::metadata::{
    asset_title, extract_year, global_grid_transform, item_datetime, raster_item_id, source_item_id,
};
use crate::netcdf_io::NetCDFGridReader;
use crate::raster_io::GdalRasterReader;
use crate::records::{
    Asset, AssetFields, Bbox, Collection, Fields, Item, ItemAsset, Link, Projection, StacRecord,
    COG_MEDIA_TYPE, FILE_EXTENSION, HTML_MEDIA_TYPE, ITEM_ASSETS_EXTENSION, PNG_MEDIA_TYPE,
    PROJECTION_EXTENSION, RASTER_BANDS_FIELD, RASTER_EXTENSION, SCIENTIFIC_EXTENSION, STAC_VERSION,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Map};
use tracing::{debug, info, warn};

/// Asset key of the elevation COG
pub const IMAGE_ASSET_KEY: &str = "image";
/// Asset key of the collection thumbnail
pub const THUMBNAIL_ASSET_KEY: &str = "thumbnail";

/// Builds the Seabed 2030 collection. `thumbnail_href` overrides the configured thumbnail.
pub fn create_collection(config: &SeabedConfig, thumbnail_href: Option<&str>) -> Result<Collection> {
    let mut thumbnail = Asset::new(thumbnail_href.unwrap_or(&config.thumbnail_href)).role("thumbnail");
    thumbnail.r#type = Some(PNG_MEDIA_TYPE.to_string());
    thumbnail.title = Some(format!("{} thumbnail", config.title));

    let mut image = ItemAsset {
        title: Some(asset_title(&config.item_title)),
        description: None,
        r#type: Some(COG_MEDIA_TYPE.to_string()),
        roles: vec!["data".to_string()],
        additional_fields: Map::new(),
    };
    let _ = image
        .additional_fields
        .insert(RASTER_BANDS_FIELD.to_string(), json!([config.raster_band]));

    let mut collection = Collection::new(&config.id, &config.description);
    collection.version = STAC_VERSION;
    collection.extensions = vec![
        PROJECTION_EXTENSION.to_string(),
        RASTER_EXTENSION.to_string(),
        SCIENTIFIC_EXTENSION.to_string(),
        ITEM_ASSETS_EXTENSION.to_string(),
    ];
    collection.title = Some(config.title.clone());
    collection.license = config.license.clone();
    collection.providers = Some(vec![config.provider.clone()]);
    collection.extent.spatial.bbox = vec![Bbox::TwoDimensional(config.spatial_extent)];
    collection.extent.temporal.interval = vec![[Some(config.temporal_start), None]];
    collection.summaries = Some(Map::from_iter([("proj:epsg".to_string(), json!([config.epsg]))]));
    let _ = collection.assets.insert(THUMBNAIL_ASSET_KEY.to_string(), thumbnail);
    let _ = collection.item_assets.insert(IMAGE_ASSET_KEY.to_string(), image);
    let _ = collection.set_field("sci:doi", &config.doi)?;
    let _ = collection.set_field("sci:citation", &config.citation)?;
    collection.links = vec![
        Link::new(&config.license_href, "license")
            .r#type(HTML_MEDIA_TYPE.to_string())
            .title(format!("{} license", config.license)),
        Link::new(config.doi_href(), "cite-as").title("GEBCO Grid DOI".to_string()),
    ];

    collection.validate()?;
    debug!("built collection {}", collection.id);
    Ok(collection)
}

/// Descriptive item properties, from the NetCDF source or the configuration
struct Description {
    title: String,
    institution: Option<String>,
    source: Option<String>,
    history: Option<String>,
    comment: Option<String>,
    datetime: DateTime<Utc>,
}

/// Builds items from a COG and, optionally, the NetCDF file it was converted from.
///
/// Readers default to the NetCDF, GDAL and href implementations of this crate
/// and can be swapped out.
pub struct ItemBuilder<'a> {
    config: &'a SeabedConfig,
    credential_resolver: Option<&'a dyn CredentialResolver>,
    grid_reader: &'a dyn GridMetadataReader,
    raster_reader: &'a dyn RasterMetadataReader,
    size_probe: &'a dyn SizeProbe,
}

impl<'a> ItemBuilder<'a> {
    pub fn new(config: &'a SeabedConfig) -> Self {
        Self {
            config,
            credential_resolver: None,
            grid_reader: &NetCDFGridReader,
            raster_reader: &GdalRasterReader,
            size_probe: &HrefSizeProbe,
        }
    }

    pub fn with_credential_resolver(mut self, resolver: &'a dyn CredentialResolver) -> Self {
        self.credential_resolver = Some(resolver);
        self
    }

    pub fn with_grid_reader(mut self, reader: &'a dyn GridMetadataReader) -> Self {
        self.grid_reader = reader;
        self
    }

    pub fn with_raster_reader(mut self, reader: &'a dyn RasterMetadataReader) -> Self {
        self.raster_reader = reader;
        self
    }

    pub fn with_size_probe(mut self, probe: &'a dyn SizeProbe) -> Self {
        self.size_probe = probe;
        self
    }

    /// Builds and validates the item for `cog_href`. With `nc_href` the source
    /// + COG derivation is used, otherwise the COG-only one.
    pub fn build(&self, cog_href: &str, nc_href: Option<&str>) -> Result<Item> {
        let item = match nc_href {
            Some(nc_href) => self.build_from_source(cog_href, nc_href)?,
            None => self.build_from_cog(cog_href)?,
        };
        item.validate()?;
        info!("built item {}", item.id);
        Ok(item)
    }

    fn build_from_source(&self, cog_href: &str, nc_href: &str) -> Result<Item> {
        let grid = self.grid_reader.read_grid(nc_href)?;
        let year = extract_year(&grid.title)?;
        let config = self.config;

        let [west, _, _, north] = config.spatial_extent;
        let projection = Projection {
            epsg: config.epsg,
            bbox: config.spatial_extent,
            transform: global_grid_transform(west, north, grid.lon_count, grid.lat_count),
            shape: [grid.lat_count, grid.lon_count],
        };

        let GridAttributes {
            title,
            institution,
            source,
            history,
            comment,
            ..
        } = grid;
        let description = Description {
            title,
            institution,
            source,
            history,
            comment,
            datetime: item_datetime(year)?,
        };

        self.assemble(
            source_item_id(&config.id, year),
            config.spatial_extent,
            description,
            cog_href,
            projection,
        )
    }

    fn build_from_cog(&self, cog_href: &str) -> Result<Item> {
        let config = self.config;
        let read_href = match self.credential_resolver {
            Some(resolver) => resolver.resolve(cog_href),
            None => cog_href.to_string(),
        };
        let header = self.raster_reader.read_header(&read_href)?;

        let epsg = header.epsg.unwrap_or_else(|| {
            warn!("{} has no EPSG code, assuming EPSG:{}", cog_href, config.epsg);
            config.epsg
        });
        let projection = Projection {
            epsg,
            bbox: header.bounds,
            transform: header.transform,
            shape: header.shape(),
        };

        let year = extract_year(&config.item_title)?;
        let description = Description {
            title: config.item_title.clone(),
            institution: Some(config.item_institution.clone()),
            source: Some(config.item_source.clone()),
            history: Some(config.item_history.clone()),
            comment: Some(config.item_comment.clone()),
            datetime: item_datetime(year)?,
        };

        self.assemble(
            raster_item_id(&config.id, cog_href),
            header.geographic_bounds,
            description,
            cog_href,
            projection,
        )
    }

    fn assemble(
        &self,
        id: String,
        bbox: [f64; 4],
        description: Description,
        cog_href: &str,
        projection: Projection,
    ) -> Result<Item> {
        let mut asset = Asset::new(cog_href).role("data");
        asset.r#type = Some(COG_MEDIA_TYPE.to_string());
        asset.title = Some(asset_title(&description.title));
        asset.set_projection(&projection)?;
        asset.set_raster_bands(std::slice::from_ref(&self.config.raster_band))?;

        let mut item = Item::new(id);
        item.version = STAC_VERSION;
        item.extensions = vec![PROJECTION_EXTENSION.to_string(), RASTER_EXTENSION.to_string()];
        if let Some(size) = self.size_probe.size(cog_href) {
            asset.set_file_size(size)?;
            item.extensions.push(FILE_EXTENSION.to_string());
        }

        let bbox = Bbox::TwoDimensional(bbox);
        item.geometry = Some(bbox.to_geometry());
        item.bbox = Some(bbox);
        item.properties.datetime = Some(description.datetime);
        item.properties.title = Some(description.title);
        let optional = [
            ("institution", description.institution),
            ("source", description.source),
            ("history", description.history),
            ("comment", description.comment),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                let _ = item.set_field(key, value)?;
            }
        }
        let _ = item.assets.insert(IMAGE_ASSET_KEY.to_string(), asset);
        Ok(item)
    }
}

/// Builds an item with the default readers.
pub fn create_item(
    config: &SeabedConfig,
    cog_href: &str,
    nc_href: Option<&str>,
    credential_resolver: Option<&dyn CredentialResolver>,
) -> Result<Item> {
    let mut builder = ItemBuilder::new(config);
    if let Some(resolver) = credential_resolver {
        builder = builder.with_credential_resolver(resolver);
    }
    builder.build(cog_href, nc_href)
}
