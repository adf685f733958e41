use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("EPSG:{epsg} is not a supported UTM zone (expected 32601-32660 or 32701-32760)")]
    InvalidZone { epsg: u32 },

    #[error("invalid geodetic coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("invalid planar coordinate: x {x}, y {y}")]
    InvalidPlanarCoordinate { x: f64, y: f64 },

    #[error("projection transform failed: {0}")]
    Transform(#[from] proj4rs::errors::Error),
}

#[derive(Debug, Error)]
pub enum GridError {
    #[error("grid size must be a positive number of meters, got {size}")]
    InvalidGridSize { size: f64 },

    #[error("failed to build grid cell for record {cell}")]
    Record {
        cell: u32,
        #[source]
        source: ProjectionError,
    },
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read data file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse data file: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing column '{column}' in data file header")]
    MissingColumn { column: String },

    #[error("malformed record on line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },
}
