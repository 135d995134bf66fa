//! Centralized error handling for seabed_2030
//!
//! Every failure is propagated to the caller unchanged; nothing here is retried.

use std::fmt;

/// Main error type for seabed_2030 operations
#[derive(Debug)]
pub enum SeabedError {
    /// Caller misuse, e.g. no output destination for a conversion
    InvalidArguments { message: String },

    /// No 4-digit year could be found in a dataset title
    MissingYear { title: String },

    /// An external conversion tool exited unsuccessfully
    ExternalTool {
        tool: String,
        status: Option<i32>,
        stderr: String,
    },

    /// NetCDF file operation errors
    NetCDFError(netcdf::Error),

    /// Raster (GDAL) open or header errors
    RasterError(gdal::errors::GdalError),

    /// I/O operation errors
    IoError(std::io::Error),

    /// Global attribute missing from the NetCDF source
    MissingAttribute { name: String },

    /// Dimension missing from the NetCDF source
    MissingDimension { name: String },

    /// Record serialization errors
    JsonError(serde_json::Error),

    /// Configuration file could not be used
    ConfigError(String),

    /// A built record violates the STAC schemas or the record rules
    Validation { message: String },

    /// STAC record construction or serialization errors
    StacError(stac::Error),

    /// The STAC schemas themselves could not be loaded
    SchemaUnavailable(String),
}

impl fmt::Display for SeabedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeabedError::InvalidArguments { message } => write!(f, "Invalid arguments: {}", message),
            SeabedError::MissingYear { title } => {
                write!(f, "Unable to obtain year from the dataset title '{}'", title)
            }
            SeabedError::ExternalTool { tool, status, stderr } => {
                match status {
                    Some(code) => write!(f, "'{}' exited with status {}", tool, code)?,
                    None => write!(f, "'{}' did not exit normally", tool)?,
                }
                if !stderr.trim().is_empty() {
                    write!(f, ": {}", stderr.trim())?;
                }
                Ok(())
            }
            SeabedError::NetCDFError(e) => write!(f, "NetCDF error: {}", e),
            SeabedError::RasterError(e) => write!(f, "Raster error: {}", e),
            SeabedError::IoError(e) => write!(f, "I/O error: {}", e),
            SeabedError::MissingAttribute { name } => {
                write!(f, "Global attribute '{}' not found in file", name)
            }
            SeabedError::MissingDimension { name } => {
                write!(f, "Dimension '{}' not found in file", name)
            }
            SeabedError::JsonError(e) => write!(f, "JSON error: {}", e),
            SeabedError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            SeabedError::Validation { message } => write!(f, "Invalid record: {}", message),
            SeabedError::StacError(e) => write!(f, "STAC error: {}", e),
            SeabedError::SchemaUnavailable(msg) => write!(f, "STAC schemas unavailable: {}", msg),
        }
    }
}

impl std::error::Error for SeabedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SeabedError::NetCDFError(e) => Some(e),
            SeabedError::RasterError(e) => Some(e),
            SeabedError::IoError(e) => Some(e),
            SeabedError::JsonError(e) => Some(e),
            SeabedError::StacError(e) => Some(e),
            _ => None,
        }
    }
}

impl SeabedError {
    /// True for the errors caused by a missing, corrupt or unsupported input file
    pub fn is_file_unreadable(&self) -> bool {
        matches!(
            self,
            SeabedError::NetCDFError(_)
                | SeabedError::RasterError(_)
                | SeabedError::IoError(_)
                | SeabedError::MissingAttribute { .. }
                | SeabedError::MissingDimension { .. }
        )
    }

    pub(crate) fn invalid_arguments(message: impl Into<String>) -> Self {
        SeabedError::InvalidArguments {
            message: message.into(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        SeabedError::Validation {
            message: message.into(),
        }
    }
}

impl From<netcdf::Error> for SeabedError {
    fn from(error: netcdf::Error) -> Self {
        SeabedError::NetCDFError(error)
    }
}

impl From<gdal::errors::GdalError> for SeabedError {
    fn from(error: gdal::errors::GdalError) -> Self {
        SeabedError::RasterError(error)
    }
}

impl From<std::io::Error> for SeabedError {
    fn from(error: std::io::Error) -> Self {
        SeabedError::IoError(error)
    }
}

impl From<serde_json::Error> for SeabedError {
    fn from(error: serde_json::Error) -> Self {
        SeabedError::JsonError(error)
    }
}

impl From<stac::Error> for SeabedError {
    fn from(error: stac::Error) -> Self {
        SeabedError::StacError(error)
    }
}

impl From<stac_validate::Error> for SeabedError {
    fn from(error: stac_validate::Error) -> Self {
        match error {
            stac_validate::Error::Validation(errors) => {
                let messages: Vec<String> = errors
                    .into_iter()
                    .map(|e| match e.into_json()["error"].as_str() {
                        Some(message) => message.to_string(),
                        None => "schema violation".to_string(),
                    })
                    .collect();
                SeabedError::validation(messages.join("; "))
            }
            stac_validate::Error::Stac(e) => SeabedError::StacError(e),
            stac_validate::Error::SerdeJson(e) => SeabedError::JsonError(e),
            other => SeabedError::SchemaUnavailable(other.to_string()),
        }
    }
}

/// Result type alias for seabed_2030 operations
pub type Result<T> = std::result::Result<T, SeabedError>;
