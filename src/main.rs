pub mod config;
pub mod data;
pub mod error;
pub mod grid;
pub mod proj;
pub mod render;
pub mod server;
pub mod types;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::proj::UtmZone;
use crate::types::GridCollection;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a random example survey data file
    Generate {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
    /// Build the grid and render the interactive map
    Render {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
    /// Serve the rendered map and the plot lookup API
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Generate { config } => {
            let app_config = config::AppConfig::load_from_file(config)?;
            let generate = app_config
                .generate
                .as_ref()
                .ok_or_else(|| anyhow!("Config has no [generate] section"))?;

            println!(
                "Generating {} random survey rows into {:?}",
                generate.num_rows, app_config.input.data_file
            );
            data::generate_random_data(generate, &app_config.input.data_file)?;
            println!("Generation complete!");
        }
        Commands::Render { config } => {
            let app_config = config::AppConfig::load_from_file(config)?;
            let grid = load_and_build_grid(&app_config)?;

            println!("Composing the map");
            let html = render::compose_map(&grid, &app_config.map)?;
            let path = render::save_map(&app_config, &html)?;
            println!("Map saved to {:?}", path);
        }
        Commands::Serve { config } => {
            let app_config = config::AppConfig::load_from_file(config)?;
            // The lookup API needs the same grid the map was rendered from.
            let grid = load_and_build_grid(&app_config)?;
            server::start_server(app_config, grid).await?;
        }
    }

    Ok(())
}

fn load_and_build_grid(config: &config::AppConfig) -> anyhow::Result<GridCollection> {
    println!("Loading survey data from {:?}", config.input.data_file);
    let records = data::load_records(&config.input.data_file)
        .with_context(|| format!("Failed to load {:?}", config.input.data_file))?;
    println!("Loaded {} records", records.len());

    let zone = UtmZone::from_epsg(config.grid.utm_epsg)?;
    println!(
        "Building {} m grid cells in UTM zone EPSG:{}",
        config.grid.size_meters,
        zone.epsg()
    );
    let grid = grid::build_grid(&records, zone, config.grid.size_meters)?;
    println!("Built {} grid cells", grid.len());

    Ok(grid)
}
