//! Entry point for the seabed2030 command line tool.
//! Handles CLI parsing and logging setup, then dispatches to the converter or the record builders.

use clap::Parser;
use seabed_2030::cli::{Args, Commands};
use seabed_2030::prelude::*;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => SeabedConfig::from_json_file(path)?,
        None => SeabedConfig::default(),
    };

    match args.command {
        Commands::CreateCog {
            source,
            destination,
            tile_dir,
            name,
            tile_size,
        } => {
            let variable = name.as_deref().unwrap_or(&config.variable);
            let target = create_cog(
                &source,
                destination.as_deref(),
                tile_dir.as_deref(),
                variable,
                tile_size,
                &config,
                &ProcessRunner,
            )?;
            match target {
                CogTarget::Single(path) => println!("✅ Saved COG to {}", path.display()),
                CogTarget::Tiles { dir, .. } => println!("✅ Saved tiles to {}", dir.display()),
            }
        }
        Commands::CreateCollection {
            destination,
            thumbnail,
        } => {
            let mut collection = create_collection(&config, thumbnail.as_deref())?;
            if args.check_extensions {
                validate_schema(&collection, true)?;
            }
            collection.save(&destination)?;
            println!("✅ Saved collection to {}", destination.display());
        }
        Commands::CreateItem {
            source,
            destination,
            nc,
        } => {
            let mut item = create_item(&config, &source, nc.as_deref(), None)?;
            if args.check_extensions {
                validate_schema(&item, true)?;
            }
            item.save(&destination)?;
            println!("✅ Saved item {} to {}", item.id, destination.display());
        }
    }

    Ok(())
}
