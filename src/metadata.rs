//! Derivation rules for item metadata
//!
//! Small pure functions that turn header values into record fields: the year
//! and id heuristics, the item timestamp, and the transform/bounds arithmetic
//! that keeps `proj:transform`, `proj:shape` and `proj:bbox` consistent.

use crate::errors::{Result, SeabedError};
use chrono::{DateTime, TimeZone, Utc};
use regex::Regex;
use std::{path::Path, sync::OnceLock};

fn year_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[0-9]{4}").expect("valid year pattern"))
}

/// Returns the first run of four ASCII digits in `title`.
///
/// This is deliberately naive: any unrelated 4-digit number that precedes the
/// release year wins. Item ids downstream depend on this exact behavior.
pub fn extract_year(title: &str) -> Result<i32> {
    year_pattern()
        .find(title)
        .and_then(|m| m.as_str().parse::<i32>().ok())
        .ok_or_else(|| SeabedError::MissingYear {
            title: title.to_string(),
        })
}

/// January 1 of `year`, 00:00 UTC
pub fn item_datetime(year: i32) -> Result<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| SeabedError::MissingYear {
            title: format!("{:04}", year),
        })
}

/// Item id for a record built from the NetCDF source, e.g. `seabed-2030-gebco-2020`
pub fn source_item_id(prefix: &str, year: i32) -> String {
    format!("{}-gebco-{:04}", prefix, year)
}

/// Item id for a record built from a COG alone, e.g. `seabed-2030-GEBCO_2020_5_7_01_01`
pub fn raster_item_id(prefix: &str, href: &str) -> String {
    format!("{}-{}", prefix, href_stem(href))
}

/// Base name of the last path segment of `href` with its extension removed.
/// Query strings and fragments of URLs are ignored.
pub fn href_stem(href: &str) -> String {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| name.to_string())
}

/// Asset title derived from the grid title ("GEBCO_2020 Grid" -> "GEBCO_2020 COG")
pub fn asset_title(title: &str) -> String {
    title.replace("Grid", "COG")
}

/// Affine transform of a global grid with `lon_count` x `lat_count` cells whose
/// upper left corner is `(west, north)`. Cell sizes are `360/lon` and `180/lat`.
pub fn global_grid_transform(west: f64, north: f64, lon_count: usize, lat_count: usize) -> [f64; 6] {
    let x_cellsize = 360.0 / lon_count as f64;
    let y_cellsize = 180.0 / lat_count as f64;
    [x_cellsize, 0.0, west, 0.0, -y_cellsize, north]
}

/// Reorders a GDAL geotransform `[c, a, b, f, d, e]` into affine order `[a, b, c, d, e, f]`
pub fn affine_from_geotransform(gt: &[f64; 6]) -> [f64; 6] {
    [gt[1], gt[2], gt[0], gt[4], gt[5], gt[3]]
}

/// Envelope `[west, south, east, north]` of a `[rows, cols]` grid under `transform`
pub fn bounds_from_transform(transform: &[f64; 6], shape: [usize; 2]) -> [f64; 4] {
    let [a, b, c, d, e, f] = *transform;
    let (rows, cols) = (shape[0] as f64, shape[1] as f64);

    let corners = [(0.0, 0.0), (cols, 0.0), (0.0, rows), (cols, rows)];
    let mut bounds = [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY];
    for (col, row) in corners {
        let x = a * col + b * row + c;
        let y = d * col + e * row + f;
        bounds[0] = bounds[0].min(x);
        bounds[1] = bounds[1].min(y);
        bounds[2] = bounds[2].max(x);
        bounds[3] = bounds[3].max(y);
    }
    bounds
}
