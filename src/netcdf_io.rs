//! NetCDF header access for GEBCO grid files
//!
//! Only global attributes and dimension lengths are read; the elevation data
//! itself is never loaded.

use crate::data_source::{GridAttributes, GridMetadataReader};
use crate::errors::{Result, SeabedError};
use netcdf::{AttributeValue, File};
use tracing::debug;

/// [`GridMetadataReader`] backed by the `netcdf` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct NetCDFGridReader;

impl GridMetadataReader for NetCDFGridReader {
    fn read_grid(&self, href: &str) -> Result<GridAttributes> {
        let file = netcdf::open(href)?;
        debug!("opened NetCDF grid {}", href);
        read_grid_attributes(&file)
    }
}

/// Collects the descriptive global attributes and the `lon`/`lat` dimension lengths.
pub fn read_grid_attributes(file: &File) -> Result<GridAttributes> {
    let title = global_string_attribute(file, "title")?.ok_or_else(|| SeabedError::MissingAttribute {
        name: "title".to_string(),
    })?;

    Ok(GridAttributes {
        title,
        institution: global_string_attribute(file, "institution")?,
        source: global_string_attribute(file, "source")?,
        history: global_string_attribute(file, "history")?,
        comment: global_string_attribute(file, "comment")?,
        lon_count: dimension_len(file, "lon")?,
        lat_count: dimension_len(file, "lat")?,
    })
}

/// Reads a global text attribute. Missing attributes yield `None`; numeric
/// attributes are rendered as text.
pub fn global_string_attribute(file: &File, name: &str) -> Result<Option<String>> {
    let attr = match file.attribute(name) {
        Some(attr) => attr,
        None => return Ok(None),
    };

    let text = match attr.value()? {
        AttributeValue::Str(s) => s,
        AttributeValue::Strs(ss) => ss.join("\n"),
        AttributeValue::Double(d) => d.to_string(),
        AttributeValue::Float(f) => f.to_string(),
        AttributeValue::Int(i) => i.to_string(),
        AttributeValue::Short(s) => s.to_string(),
        other => format!("{:?}", other),
    };
    Ok(Some(text))
}

fn dimension_len(file: &File, name: &str) -> Result<usize> {
    let dim = file.dimension(name).ok_or_else(|| SeabedError::MissingDimension {
        name: name.to_string(),
    })?;
    match dim.len() {
        0 => Err(SeabedError::MissingDimension {
            name: format!("{} (empty)", name),
        }),
        n => Ok(n),
    }
}
