//! Geodetic (WGS84 lat/lon) to UTM reprojection and back.
//!
//! This exists so a fixed-size square can be drawn in meters around each
//! sample point. Both directions are pure functions over a zone code; there
//! is no shared state, so calls are safe from any number of threads.

use proj4rs::proj::Proj;
use proj4rs::transform::transform;

use crate::error::ProjectionError;
use crate::types::PlanarPoint;

const GEOGRAPHIC_PROJ4: &str = "+proj=longlat +datum=WGS84 +no_defs +type=crs";

/// A geodetic coordinate in signed degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodeticCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// A WGS84 UTM zone, identified by its EPSG code: 32601-32660 are the
/// northern zones, 32701-32760 the southern ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtmZone {
    zone: u8,
    south: bool,
}

impl UtmZone {
    pub fn from_epsg(epsg: u32) -> Result<UtmZone, ProjectionError> {
        match epsg {
            32601..=32660 => Ok(UtmZone { zone: (epsg - 32600) as u8, south: false }),
            32701..=32760 => Ok(UtmZone { zone: (epsg - 32700) as u8, south: true }),
            _ => Err(ProjectionError::InvalidZone { epsg }),
        }
    }

    pub fn epsg(&self) -> u32 {
        let base = if self.south { 32700 } else { 32600 };
        base + self.zone as u32
    }

    fn proj4_string(&self) -> String {
        let south = if self.south { " +south" } else { "" };
        format!(
            "+proj=utm +zone={}{south} +datum=WGS84 +units=m +no_defs +type=crs",
            self.zone
        )
    }
}

/// Project a geodetic coordinate into UTM meters for the given zone.
pub fn to_planar(coord: GeodeticCoordinate, zone: UtmZone) -> Result<PlanarPoint, ProjectionError> {
    let valid = coord.latitude.is_finite()
        && coord.longitude.is_finite()
        && (-90.0..=90.0).contains(&coord.latitude)
        && (-180.0..=180.0).contains(&coord.longitude);
    if !valid {
        return Err(ProjectionError::InvalidCoordinate {
            latitude: coord.latitude,
            longitude: coord.longitude,
        });
    }

    let from = Proj::from_proj_string(GEOGRAPHIC_PROJ4)?;
    let to = Proj::from_proj_string(&zone.proj4_string())?;

    // proj4rs takes geographic coordinates in radians and returns meters.
    let mut point = (coord.longitude.to_radians(), coord.latitude.to_radians(), 0.0);
    transform(&from, &to, &mut point)?;

    Ok(PlanarPoint { x: point.0, y: point.1 })
}

/// Inverse of [`to_planar`] for the same zone.
pub fn to_geodetic(point: PlanarPoint, zone: UtmZone) -> Result<GeodeticCoordinate, ProjectionError> {
    if !point.x.is_finite() || !point.y.is_finite() {
        return Err(ProjectionError::InvalidPlanarCoordinate { x: point.x, y: point.y });
    }

    let from = Proj::from_proj_string(&zone.proj4_string())?;
    let to = Proj::from_proj_string(GEOGRAPHIC_PROJ4)?;

    let mut point = (point.x, point.y, 0.0);
    transform(&from, &to, &mut point)?;

    Ok(GeodeticCoordinate {
        latitude: point.1.to_degrees(),
        longitude: point.0.to_degrees(),
    })
}
