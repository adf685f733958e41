use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    pub generate: Option<GenerateConfig>,
    pub grid: GridConfig,
    pub map: MapConfig,
    pub output: OutputConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    /// Tab-separated survey data with a header row:
    /// cell, latitude, longitude, n_seagrass_plants, method.
    pub data_file: PathBuf,
}

/// Parameters for the random example-data generator.
#[derive(Debug, Deserialize, Clone)]
pub struct GenerateConfig {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
    pub num_rows: u32,
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GridConfig {
    /// EPSG code of the UTM zone covering the survey area, e.g. 32631.
    pub utm_epsg: u32,
    /// Full width/height of each plot in meters.
    pub size_meters: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MapConfig {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub file: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let toml = r#"
            [input]
            data_file = "random_lat_lon.txt"

            [generate]
            min_lat = 51.4459
            max_lat = 51.4521
            min_lon = 4.1828
            max_lon = 4.2032
            num_rows = 100
            seed = 100

            [grid]
            utm_epsg = 32631
            size_meters = 20.0

            [map]
            center_lat = 51.4501
            center_lon = 4.1901
            zoom = 15

            [output]
            dir = "output"
            file = "seagrass_map.html"

            [server]
            port = 8080
        "#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.grid.utm_epsg, 32631);
        assert_eq!(config.grid.size_meters, 20.0);
        assert_eq!(config.generate.unwrap().seed, Some(100));
        assert_eq!(config.output.file, "seagrass_map.html");
    }

    #[test]
    fn generate_section_is_optional() {
        let toml = r#"
            [input]
            data_file = "data.txt"

            [grid]
            utm_epsg = 32631
            size_meters = 20.0

            [map]
            center_lat = 51.45
            center_lon = 4.19
            zoom = 15

            [output]
            dir = "output"
            file = "map.html"

            [server]
            port = 8080
        "#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert!(config.generate.is_none());
    }
}
