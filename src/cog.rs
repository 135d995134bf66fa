//! NetCDF to Cloud-Optimized GeoTIFF conversion
//!
//! The conversion itself is done by GDAL's command line tools; this module only
//! builds their argument lists and runs them. A failing tool is fatal and its
//! output is handed back unchanged. Partial outputs are left in place.

use crate::config::SeabedConfig;
use crate::errors::{Result, SeabedError};
use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};
use tracing::{debug, info};

/// Internal block size of retiled GeoTIFFs
pub const TILE_BLOCK_SIZE: usize = 512;

/// Runs an external program to completion
pub trait ToolRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<()>;
}

/// [`ToolRunner`] that spawns a child process and waits for it
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<()> {
        debug!("executing {} {}", program, args.join(" "));

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| SeabedError::ExternalTool {
                tool: program.to_string(),
                status: None,
                stderr: format!("failed to start: {}", e),
            })?;
        if output.status.success() {
            info!("{} completed with status {}", program, output.status);
            Ok(())
        } else {
            Err(SeabedError::ExternalTool {
                tool: program.to_string(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            })
        }
    }
}

/// What the converter should produce
#[derive(Debug, Clone, PartialEq)]
pub enum CogTarget {
    /// One COG at the given path
    Single(PathBuf),
    /// GeoTIFF tiles of `tile_size` x `tile_size` pixels in a directory
    Tiles { dir: PathBuf, tile_size: usize },
}

impl CogTarget {
    /// Picks the conversion mode. A single destination wins over a tile directory.
    pub fn from_options(
        cog_path: Option<&Path>,
        tile_dir: Option<&Path>,
        tile_size: Option<usize>,
        config: &SeabedConfig,
    ) -> Result<Self> {
        match (cog_path, tile_dir) {
            (Some(path), _) => Ok(CogTarget::Single(path.to_path_buf())),
            (None, Some(dir)) => {
                let tile_size = tile_size.unwrap_or(config.tile_size);
                if tile_size == 0 {
                    return Err(SeabedError::invalid_arguments("tile size must be positive"));
                }
                Ok(CogTarget::Tiles {
                    dir: dir.to_path_buf(),
                    tile_size,
                })
            }
            (None, None) => Err(SeabedError::invalid_arguments(
                "a COG destination or a tile directory is required",
            )),
        }
    }
}

/// GDAL subdataset name addressing `variable` inside a NetCDF file
pub fn netcdf_subdataset(nc_href: &str, variable: &str) -> String {
    format!("NETCDF:\"{}\":{}", nc_href, variable)
}

/// `gdal_translate` arguments for a single LZW compressed COG
pub fn translate_args(nc_href: &str, variable: &str, cog_path: &Path) -> Vec<String> {
    vec![
        "-of".to_string(),
        "COG".to_string(),
        "-co".to_string(),
        "compress=LZW".to_string(),
        netcdf_subdataset(nc_href, variable),
        cog_path.to_string_lossy().to_string(),
    ]
}

/// `gdal_retile.py` arguments for tiled, LZW compressed GeoTIFFs in EPSG:4326
pub fn retile_args(nc_href: &str, variable: &str, dir: &Path, tile_size: usize) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-targetDir".to_string(),
        dir.to_string_lossy().to_string(),
        "-ps".to_string(),
        tile_size.to_string(),
        tile_size.to_string(),
        "-of".to_string(),
        "GTiff".to_string(),
    ];
    for option in [
        "TILED=YES".to_string(),
        format!("BLOCKXSIZE={}", TILE_BLOCK_SIZE),
        format!("BLOCKYSIZE={}", TILE_BLOCK_SIZE),
        "COMPRESS=LZW".to_string(),
    ] {
        args.push("-co".to_string());
        args.push(option);
    }
    args.push("-s_srs".to_string());
    args.push("EPSG:4326".to_string());
    args.push(netcdf_subdataset(nc_href, variable));
    args
}

/// Converts the elevation `variable` of a GEBCO NetCDF file.
///
/// Fails with [`SeabedError::InvalidArguments`] if neither `cog_path` nor
/// `tile_dir` is given. Tile size defaults to the configured one.
pub fn create_cog(
    nc_href: &str,
    cog_path: Option<&Path>,
    tile_dir: Option<&Path>,
    variable: &str,
    tile_size: Option<usize>,
    config: &SeabedConfig,
    runner: &dyn ToolRunner,
) -> Result<CogTarget> {
    let target = CogTarget::from_options(cog_path, tile_dir, tile_size, config)?;

    match &target {
        CogTarget::Single(path) => {
            info!("converting {}:{} to COG {}", nc_href, variable, path.display());
            runner.run(&config.translate_program, &translate_args(nc_href, variable, path))?;
        }
        CogTarget::Tiles { dir, tile_size } => {
            info!(
                "retiling {}:{} into {}x{} tiles under {}",
                nc_href,
                variable,
                tile_size,
                tile_size,
                dir.display()
            );
            fs::create_dir_all(dir)?;
            runner.run(&config.retile_program, &retile_args(nc_href, variable, dir, *tile_size))?;
        }
    }

    Ok(target)
}
