use geo::Polygon;

use crate::proj::UtmZone;

/// One parsed survey row: where the plot is, how many plants were counted
/// and which planting method was used.
#[derive(Debug, Clone)]
pub struct SampleRecord {
    pub cell: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub n_plants: u32,
    pub method: Method,
}

/// A coordinate in UTM meters. Transient: only exists while a grid cell is
/// being constructed, never serialized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

/// Planting method categories recorded in the survey data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    One,
    Two,
    Three,
    Four,
}

/// Border styling for one method on the map.
#[derive(Debug, Clone, Copy)]
pub struct BorderStyle {
    pub color: &'static str,
    pub weight: u32,
}

impl Method {
    pub const ALL: [Method; 4] = [Method::One, Method::Two, Method::Three, Method::Four];

    pub fn parse(s: &str) -> Option<Method> {
        match s.trim() {
            "1" => Some(Method::One),
            "2" => Some(Method::Two),
            "3" => Some(Method::Three),
            "4" => Some(Method::Four),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Method::One => "1",
            Method::Two => "2",
            Method::Three => "3",
            Method::Four => "4",
        }
    }

    /// Method-to-border-style lookup table shared by the map layers and the
    /// legend. Adding a method means adding a row here, nothing else.
    pub fn border_style(&self) -> BorderStyle {
        const STYLES: [BorderStyle; 4] = [
            BorderStyle { color: "orange", weight: 4 },
            BorderStyle { color: "red", weight: 4 },
            BorderStyle { color: "blue", weight: 4 },
            BorderStyle { color: "yellow", weight: 4 },
        ];
        STYLES[*self as usize]
    }
}

/// One square survey plot. The ring is a square in UTM meters centered on the
/// sample point, reprojected back to WGS84 for display. It is only square in
/// the planar system: the geodetic ring is the image of a planar square, not
/// itself a square in degrees.
#[derive(Debug, Clone)]
pub struct GridCell {
    pub cell: u32,
    pub n_plants: u32,
    pub method: Method,
    pub geometry: Polygon<f64>,
}

/// All grid cells of one run, in input-record order. Built once, immutable
/// afterwards.
#[derive(Debug, Clone)]
pub struct GridCollection {
    pub cells: Vec<GridCell>,
    pub zone: UtmZone,
    pub edge_meters: f64,
}

impl GridCollection {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GridCell> {
        self.cells.iter()
    }
}
