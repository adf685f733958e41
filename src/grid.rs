//! Builds one square grid cell around each sample point.
//!
//! The square is constructed in UTM meters so its side length is exact, then
//! its corners are reprojected back to WGS84 for display. The resulting
//! geodetic ring is therefore the image of a planar square, not a square in
//! degrees; at survey-plot scale the distortion is far below the width of a
//! map stroke.

use geo::{Coord, LineString, Polygon};

use crate::error::{GridError, ProjectionError};
use crate::proj::{self, GeodeticCoordinate, UtmZone};
use crate::types::{GridCell, GridCollection, PlanarPoint, SampleRecord};

/// Build one grid cell per record, in input order.
///
/// `edge_meters` is the full width/height of each plot. Records are never
/// merged, split or dropped: a reprojection failure aborts the build with the
/// offending record's id attached rather than silently skipping it.
pub fn build_grid(
    records: &[SampleRecord],
    zone: UtmZone,
    edge_meters: f64,
) -> Result<GridCollection, GridError> {
    if !edge_meters.is_finite() || edge_meters <= 0.0 {
        return Err(GridError::InvalidGridSize { size: edge_meters });
    }

    let mut cells = Vec::with_capacity(records.len());
    for record in records {
        let geometry = build_cell_ring(record, zone, edge_meters)
            .map_err(|source| GridError::Record { cell: record.cell, source })?;
        cells.push(GridCell {
            cell: record.cell,
            n_plants: record.n_plants,
            method: record.method,
            geometry,
        });
    }

    Ok(GridCollection { cells, zone, edge_meters })
}

fn build_cell_ring(
    record: &SampleRecord,
    zone: UtmZone,
    edge_meters: f64,
) -> Result<Polygon<f64>, ProjectionError> {
    let center = proj::to_planar(
        GeodeticCoordinate { latitude: record.latitude, longitude: record.longitude },
        zone,
    )?;

    let half = edge_meters / 2.0;
    let corners = [
        PlanarPoint { x: center.x - half, y: center.y - half },
        PlanarPoint { x: center.x + half, y: center.y - half },
        PlanarPoint { x: center.x + half, y: center.y + half },
        PlanarPoint { x: center.x - half, y: center.y + half },
    ];

    let mut ring = Vec::with_capacity(5);
    for corner in corners {
        let geo = proj::to_geodetic(corner, zone)?;
        ring.push(Coord { x: geo.longitude, y: geo.latitude });
    }

    // Polygon::new closes the exterior ring.
    Ok(Polygon::new(LineString::from(ring), vec![]))
}
