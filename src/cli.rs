//! Defines command-line interface options using `clap` for the seabed2030 tool.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Commands for working with the Seabed 2030 GEBCO grid
#[derive(Parser, Debug)]
#[command(
    version,
    name = "seabed2030",
    about = "Create STAC collections, items and COGs for the Seabed 2030 GEBCO grid"
)]
pub struct Args {
    /// Enable verbose (debug) logging. RUST_LOG takes precedence when set.
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// JSON file overriding the built-in catalog constants
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Also validate against the schemas of the declared STAC extensions (fetched over the network)
    #[arg(long, global = true, default_value_t = false)]
    pub check_extensions: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Creates a COG (or a directory of GeoTIFF tiles) from a GEBCO NetCDF file
    CreateCog {
        /// HREF of the GEBCO NetCDF file
        source: String,

        /// Path of the output COG
        destination: Option<PathBuf>,

        /// Directory for tiled output instead of a single COG
        #[arg(long)]
        tile_dir: Option<PathBuf>,

        /// Name of the elevation variable in the NetCDF file
        #[arg(short, long)]
        name: Option<String>,

        /// Tile edge length in pixels (tiled output only)
        #[arg(long)]
        tile_size: Option<usize>,
    },

    /// Creates the STAC collection
    CreateCollection {
        /// Path of the collection JSON
        destination: PathBuf,

        /// HREF of the collection thumbnail
        #[arg(long)]
        thumbnail: Option<String>,
    },

    /// Creates a STAC item for a COG
    CreateItem {
        /// HREF of the COG asset
        source: String,

        /// Path of the item JSON
        destination: PathBuf,

        /// HREF of the GEBCO NetCDF file the COG was created from
        #[arg(long)]
        nc: Option<String>,
    },
}
