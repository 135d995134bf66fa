//! Catalog records (STAC 1.0.0 collections and items)
//!
//! Records are the `stac` crate's [`Collection`] and [`Item`]. Extension fields
//! (`proj:*`, `raster:bands`, `file:size`, `sci:*`) live in the records' field
//! maps; [`AssetFields`] reads and writes the asset level ones with typed
//! values.
//!
//! [`StacRecord::validate`] runs the STAC core JSON schemas bundled with
//! `stac-validate` and then the cross-field rules the schemas cannot express:
//! projection consistency, geometry against bbox, and declared extensions.

use crate::errors::{Result, SeabedError};
use geojson::{GeometryValue, Position};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use stac::ToJson;
use stac_validate::Validator;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

pub use stac::{
    Asset, Bbox, Collection, Extent, Fields, Item, ItemAsset, Link, Links, Provider, SelfHref,
    SpatialExtent, TemporalExtent, Version,
};

pub const STAC_VERSION: Version = Version::v1_0_0;

pub const PROJECTION_EXTENSION: &str = "https://stac-extensions.github.io/projection/v1.0.0/schema.json";
pub const RASTER_EXTENSION: &str = "https://stac-extensions.github.io/raster/v1.1.0/schema.json";
pub const FILE_EXTENSION: &str = "https://stac-extensions.github.io/file/v2.1.0/schema.json";
pub const SCIENTIFIC_EXTENSION: &str = "https://stac-extensions.github.io/scientific/v1.0.0/schema.json";
pub const ITEM_ASSETS_EXTENSION: &str = "https://stac-extensions.github.io/item-assets/v1.0.0/schema.json";

pub const COG_MEDIA_TYPE: &str = "image/tiff; application=geotiff; profile=cloud-optimized";
pub const PNG_MEDIA_TYPE: &str = "image/png";
pub const HTML_MEDIA_TYPE: &str = "text/html";

pub const RASTER_BANDS_FIELD: &str = "raster:bands";
pub const FILE_SIZE_FIELD: &str = "file:size";
const PROJECTION_PREFIX: &str = "proj";

/// Relative tolerance for comparing coordinates that went through floating point arithmetic
const COORD_TOLERANCE: f64 = 1e-9;

/// One entry of the raster extension's `raster:bands`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterBand {
    pub data_type: String,
    pub nodata: f64,
    pub sampling: String,
    pub spatial_resolution: f64,
}

/// Projection extension (v1.0.0) fields of an asset, without their `proj:` prefix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub epsg: u32,
    /// `[west, south, east, north]` in the asset's native CRS
    pub bbox: [f64; 4],
    /// Affine coefficients `[a, b, c, d, e, f]`
    pub transform: [f64; 6],
    /// `[rows, cols]`
    pub shape: [usize; 2],
}

impl Projection {
    /// Envelope of the pixel grid in native coordinates
    pub fn grid_bounds(&self) -> [f64; 4] {
        crate::metadata::bounds_from_transform(&self.transform, self.shape)
    }
}

/// Typed access to the extension fields this crate puts on assets
pub trait AssetFields: Fields {
    fn projection(&self) -> Result<Option<Projection>> {
        if self.field("proj:epsg").is_none() {
            return Ok(None);
        }
        Ok(Some(self.fields_with_prefix(PROJECTION_PREFIX)?))
    }

    fn set_projection(&mut self, projection: &Projection) -> Result<()> {
        self.remove_fields_with_prefix(PROJECTION_PREFIX);
        self.set_fields_with_prefix(PROJECTION_PREFIX, projection)?;
        Ok(())
    }

    fn raster_bands(&self) -> Result<Option<Vec<RasterBand>>> {
        self.field(RASTER_BANDS_FIELD)
            .map(|value| serde_json::from_value(value.clone()))
            .transpose()
            .map_err(SeabedError::from)
    }

    fn set_raster_bands(&mut self, bands: &[RasterBand]) -> Result<()> {
        let _ = self.set_field(RASTER_BANDS_FIELD, bands)?;
        Ok(())
    }

    fn file_size(&self) -> Option<u64> {
        self.field(FILE_SIZE_FIELD).and_then(Value::as_u64)
    }

    fn set_file_size(&mut self, size: u64) -> Result<()> {
        let _ = self.set_field(FILE_SIZE_FIELD, size)?;
        Ok(())
    }
}

impl AssetFields for Asset {}

/// Behavior shared by collections and items
pub trait StacRecord: Serialize + Links + SelfHref + Sized {
    fn id(&self) -> &str;

    /// Rules spanning several fields that the JSON schemas cannot check
    fn check_consistency(&self) -> Result<()>;

    /// Links added next to `self` when the record gets a location
    fn location_links(&self, _file_name: &str) -> Vec<Link> {
        Vec::new()
    }

    /// Check the record against the core schemas and the consistency rules
    fn validate(&self) -> Result<()> {
        self.check_consistency()?;
        validate_schema(self, false)
    }

    /// Replace the self link (and any location-derived links) for `dest`
    fn set_location(&mut self, dest: &Path) -> Result<()> {
        let absolute = absolute_path(dest)?;
        let href = absolute.to_string_lossy().into_owned();
        let file_name = absolute
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        for link in self.location_links(&file_name) {
            self.set_link(link);
        }
        self.set_link(Link::self_(&href));
        self.set_self_href(&href);
        Ok(())
    }

    /// Validate, set the self location and write pretty printed JSON to `dest`
    fn save(&mut self, dest: &Path) -> Result<()> {
        self.validate()?;
        self.set_location(dest)?;

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut json = self.to_json_vec(true)?;
        json.push(b'\n');
        fs::write(dest, json)?;

        info!("wrote {} to {}", self.id(), dest.display());
        Ok(())
    }
}

impl StacRecord for Collection {
    fn id(&self) -> &str {
        &self.id
    }

    fn location_links(&self, file_name: &str) -> Vec<Link> {
        vec![Link::root(format!("./{}", file_name)).title(self.title.clone())]
    }

    fn check_consistency(&self) -> Result<()> {
        check_extensions(&self.extensions)?;

        for bbox in &self.extent.spatial.bbox {
            check_geographic_bbox(&[bbox.xmin(), bbox.ymin(), bbox.xmax(), bbox.ymax()])?;
        }
        for [start, end] in &self.extent.temporal.interval {
            match (start, end) {
                (None, None) => {
                    return Err(SeabedError::validation("temporal interval is open on both ends"))
                }
                (Some(s), Some(e)) if s > e => {
                    return Err(SeabedError::validation(format!(
                        "temporal interval starts after it ends ({} > {})",
                        s, e
                    )))
                }
                _ => {}
            }
        }

        for (key, asset) in &self.assets {
            check_asset(key, asset)?;
        }
        let mut item_asset_bands = false;
        for (key, item_asset) in &self.item_assets {
            if let Some(bands) = item_asset.additional_fields.get(RASTER_BANDS_FIELD) {
                let bands: Vec<RasterBand> = serde_json::from_value(bands.clone())?;
                check_bands(key, &bands)?;
                item_asset_bands = true;
            }
        }

        let uses_proj = self
            .summaries
            .as_ref()
            .is_some_and(|s| has_prefixed_field(s, "proj:"));
        require_extension(&self.extensions, uses_proj, PROJECTION_EXTENSION)?;
        require_extension(&self.extensions, !self.item_assets.is_empty(), ITEM_ASSETS_EXTENSION)?;
        require_extension(&self.extensions, item_asset_bands, RASTER_EXTENSION)?;
        require_extension(
            &self.extensions,
            has_prefixed_field(&self.additional_fields, "sci:"),
            SCIENTIFIC_EXTENSION,
        )?;
        Ok(())
    }
}

impl StacRecord for Item {
    fn id(&self) -> &str {
        &self.id
    }

    fn check_consistency(&self) -> Result<()> {
        check_extensions(&self.extensions)?;

        let bbox = match self.bbox {
            Some(Bbox::TwoDimensional(bbox)) => bbox,
            Some(Bbox::ThreeDimensional(_)) => {
                return Err(SeabedError::validation("item bbox must be two dimensional"))
            }
            None => return Err(SeabedError::validation("item has no bbox")),
        };
        check_geographic_bbox(&bbox)?;

        let geometry = self
            .geometry
            .as_ref()
            .ok_or_else(|| SeabedError::validation("item has no geometry"))?;
        let ring = match &geometry.value {
            GeometryValue::Polygon { coordinates } => coordinates
                .first()
                .ok_or_else(|| SeabedError::validation("polygon has no rings"))?,
            other => {
                return Err(SeabedError::validation(format!(
                    "geometry is a {}, expected a Polygon",
                    other.type_name()
                )))
            }
        };
        if ring.len() < 4 || ring.first() != ring.last() {
            return Err(SeabedError::validation("polygon ring is not closed"));
        }
        let envelope = ring_envelope(ring).ok_or_else(|| SeabedError::validation("polygon has no vertices"))?;
        if !bbox_matches(&envelope, &bbox) {
            return Err(SeabedError::validation(format!(
                "geometry envelope {:?} does not match bbox {:?}",
                envelope, bbox
            )));
        }

        if self.assets.is_empty() {
            return Err(SeabedError::validation("item has no assets"));
        }
        for (key, asset) in &self.assets {
            if let Some(proj) = check_asset(key, asset)? {
                if proj.epsg == 4326 && !bbox_matches(&proj.bbox, &bbox) {
                    return Err(SeabedError::validation(format!(
                        "asset '{}' proj:bbox {:?} does not match item bbox {:?}",
                        key, proj.bbox, bbox
                    )));
                }
            }
        }

        let assets_use = |prefix: &str| {
            self.assets
                .values()
                .any(|a| has_prefixed_field(&a.additional_fields, prefix))
        };
        require_extension(&self.extensions, assets_use("proj:"), PROJECTION_EXTENSION)?;
        require_extension(&self.extensions, assets_use("file:"), FILE_EXTENSION)?;
        require_extension(&self.extensions, assets_use("raster:"), RASTER_EXTENSION)?;
        Ok(())
    }
}

/// Validates `record` against the STAC JSON schemas.
///
/// The core schemas ship with `stac-validate`. Extension schemas listed in
/// `stac_extensions` have to be downloaded, so they are only checked when
/// `with_extensions` is set.
pub fn validate_schema<T: Serialize>(record: &T, with_extensions: bool) -> Result<()> {
    let mut value = serde_json::to_value(record)?;
    if !with_extensions {
        if let Some(object) = value.as_object_mut() {
            let _ = object.remove("stac_extensions");
        }
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async move {
        let mut validator = Validator::new().await?;
        validator.validate_value(value).await.map(|_| ())
    })?;

    debug!("schema validation passed (extensions: {})", with_extensions);
    Ok(())
}

//--- consistency helpers

fn check_extensions(extensions: &[String]) -> Result<()> {
    for (i, ext) in extensions.iter().enumerate() {
        if extensions[..i].contains(ext) {
            return Err(SeabedError::validation(format!("extension '{}' is listed twice", ext)));
        }
    }
    Ok(())
}

fn require_extension(extensions: &[String], used: bool, uri: &str) -> Result<()> {
    if used && !extensions.iter().any(|e| e == uri) {
        Err(SeabedError::validation(format!("fields of '{}' used but not declared", uri)))
    } else {
        Ok(())
    }
}

fn has_prefixed_field(fields: &Map<String, Value>, prefix: &str) -> bool {
    fields.keys().any(|k| k.starts_with(prefix))
}

fn check_geographic_bbox(bbox: &[f64; 4]) -> Result<()> {
    let [west, south, east, north] = *bbox;
    if bbox.iter().any(|v| !v.is_finite()) {
        return Err(SeabedError::validation(format!("bbox {:?} is not finite", bbox)));
    }
    if west > east || south > north {
        return Err(SeabedError::validation(format!(
            "bbox {:?} is not ordered as [west, south, east, north]",
            bbox
        )));
    }
    // grids covering the globe can overshoot the poles or the antimeridian by a few ulps
    let outside = |v: f64, limit: f64| v.abs() > limit && !coords_match(v.abs(), limit);
    if outside(west, 180.0) || outside(east, 180.0) || outside(south, 90.0) || outside(north, 90.0) {
        return Err(SeabedError::validation(format!(
            "bbox {:?} exceeds geographic bounds",
            bbox
        )));
    }
    Ok(())
}

/// Validates the extension fields of one asset and returns its projection
fn check_asset(key: &str, asset: &Asset) -> Result<Option<Projection>> {
    if asset.href.trim().is_empty() {
        return Err(SeabedError::validation(format!("asset '{}' has an empty href", key)));
    }

    let projection = asset.projection()?;
    if let Some(proj) = &projection {
        if proj.shape.iter().any(|&n| n == 0) {
            return Err(SeabedError::validation(format!(
                "asset '{}' has an empty proj:shape {:?}",
                key, proj.shape
            )));
        }
        let grid = proj.grid_bounds();
        if !bbox_matches(&grid, &proj.bbox) {
            return Err(SeabedError::validation(format!(
                "asset '{}' proj:transform and proj:shape span {:?}, proj:bbox is {:?}",
                key, grid, proj.bbox
            )));
        }
    }
    if let Some(bands) = asset.raster_bands()? {
        check_bands(key, &bands)?;
    }
    Ok(projection)
}

fn check_bands(key: &str, bands: &[RasterBand]) -> Result<()> {
    if bands.is_empty() {
        return Err(SeabedError::validation(format!("asset '{}' declares no raster bands", key)));
    }
    for band in bands {
        if band.sampling != "area" && band.sampling != "point" {
            return Err(SeabedError::validation(format!(
                "raster band sampling '{}' is neither 'area' nor 'point'",
                band.sampling
            )));
        }
        if band.spatial_resolution.is_nan() || band.spatial_resolution <= 0.0 {
            return Err(SeabedError::validation("raster band spatial_resolution must be positive"));
        }
    }
    Ok(())
}

/// Envelope `[west, south, east, north]` of a polygon ring
fn ring_envelope(ring: &[Position]) -> Option<[f64; 4]> {
    let mut points = ring.iter().filter(|p| p.len() >= 2);
    let first = points.next()?;
    let init = [first[0], first[1], first[0], first[1]];
    Some(points.fold(init, |b, p| {
        [b[0].min(p[0]), b[1].min(p[1]), b[2].max(p[0]), b[3].max(p[1])]
    }))
}

fn coords_match(x: f64, y: f64) -> bool {
    (x - y).abs() <= COORD_TOLERANCE * x.abs().max(y.abs()).max(1.0)
}

/// Coordinate-wise equality with a small relative tolerance
pub fn bbox_matches(a: &[f64; 4], b: &[f64; 4]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| coords_match(*x, *y))
}

fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
