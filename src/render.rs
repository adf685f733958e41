use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection, Geometry};
use serde_json::json;
use std::fs;
use std::path::PathBuf;

use crate::config::{AppConfig, MapConfig};
use crate::types::{GridCollection, Method};

// ColorBrewer YlGn, the ramp used for the plant-count fill.
const FILL_RAMP: [[u8; 3]; 5] = [
    [0xff, 0xff, 0xcc],
    [0xc2, 0xe6, 0x99],
    [0x78, 0xc6, 0x79],
    [0x31, 0xa3, 0x54],
    [0x00, 0x68, 0x37],
];

/// Serialize the grid as a GeoJSON FeatureCollection. Each feature carries
/// the plot attributes plus precomputed styling: `fill` from the plant-count
/// ramp, `color`/`weight` from the method lookup table.
pub fn to_feature_collection(grid: &GridCollection) -> FeatureCollection {
    let min = grid.iter().map(|c| c.n_plants).min().unwrap_or(0);
    let max = grid.iter().map(|c| c.n_plants).max().unwrap_or(0);

    let features = grid
        .iter()
        .map(|cell| {
            let style = cell.method.border_style();
            let mut properties = geojson::JsonObject::new();
            properties.insert("cell".into(), json!(cell.cell));
            properties.insert("method".into(), json!(cell.method.label()));
            properties.insert("n_plants".into(), json!(cell.n_plants));
            properties.insert("fill".into(), json!(fill_color(cell.n_plants, min, max)));
            properties.insert("color".into(), json!(style.color));
            properties.insert("weight".into(), json!(style.weight));

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(geojson::Value::from(&cell.geometry))),
                id: Some(geojson::feature::Id::Number(cell.cell.into())),
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection { bbox: None, features, foreign_members: None }
}

/// Linear interpolation over the YlGn ramp, scaled to the batch's count range.
pub fn fill_color(n_plants: u32, min: u32, max: u32) -> String {
    let t = if max > min {
        (n_plants - min) as f64 / (max - min) as f64
    } else {
        1.0
    };

    let scaled = t.clamp(0.0, 1.0) * (FILL_RAMP.len() - 1) as f64;
    let idx = (scaled.floor() as usize).min(FILL_RAMP.len() - 2);
    let frac = scaled - idx as f64;

    let lo = FILL_RAMP[idx];
    let hi = FILL_RAMP[idx + 1];
    let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;

    format!(
        "#{:02x}{:02x}{:02x}",
        channel(lo[0], hi[0]),
        channel(lo[1], hi[1]),
        channel(lo[2], hi[2])
    )
}

/// Build the self-contained interactive map document: a Leaflet map with the
/// plant-count fill layer, the method border layer, hover tooltips and a
/// fixed legend.
pub fn compose_map(grid: &GridCollection, map: &MapConfig) -> Result<String> {
    let collection = to_feature_collection(grid);
    let geojson = serde_json::to_string(&collection).context("Failed to serialize grid GeoJSON")?;

    let min = grid.iter().map(|c| c.n_plants).min().unwrap_or(0);
    let max = grid.iter().map(|c| c.n_plants).max().unwrap_or(0);

    let mut method_rows = String::new();
    for method in Method::ALL {
        let style = method.border_style();
        method_rows.push_str(&format!(
            "&nbsp; Method {} &nbsp; <i style=\"background:{}; width:20px; height:10px; \
             display:inline-block; border:1px solid black; border-radius: 4px;\"></i><br>\n",
            method.label(),
            style.color
        ));
    }

    let gradient = format!(
        "linear-gradient(to right, #{:02x}{:02x}{:02x}, #{:02x}{:02x}{:02x}, #{:02x}{:02x}{:02x}, #{:02x}{:02x}{:02x}, #{:02x}{:02x}{:02x})",
        FILL_RAMP[0][0], FILL_RAMP[0][1], FILL_RAMP[0][2],
        FILL_RAMP[1][0], FILL_RAMP[1][1], FILL_RAMP[1][2],
        FILL_RAMP[2][0], FILL_RAMP[2][1], FILL_RAMP[2][2],
        FILL_RAMP[3][0], FILL_RAMP[3][1], FILL_RAMP[3][2],
        FILL_RAMP[4][0], FILL_RAMP[4][1], FILL_RAMP[4][2],
    );

    let html = MAP_TEMPLATE
        .replace("__GEOJSON__", &geojson)
        .replace("__CENTER_LAT__", &map.center_lat.to_string())
        .replace("__CENTER_LON__", &map.center_lon.to_string())
        .replace("__ZOOM__", &map.zoom.to_string())
        .replace("__METHOD_ROWS__", &method_rows)
        .replace("__GRADIENT__", &gradient)
        .replace("__MIN_PLANTS__", &min.to_string())
        .replace("__MAX_PLANTS__", &max.to_string())
        .replace("__EDGE_METERS__", &grid.edge_meters.to_string())
        .replace("__UTM_EPSG__", &grid.zone.epsg().to_string());

    Ok(html)
}

/// Write the map document under the configured output directory and return
/// its path.
pub fn save_map(config: &AppConfig, html: &str) -> Result<PathBuf> {
    fs::create_dir_all(&config.output.dir)
        .with_context(|| format!("Failed to create output directory: {:?}", config.output.dir))?;
    let path = config.output.dir.join(&config.output.file);
    fs::write(&path, html).with_context(|| format!("Failed to write map file: {:?}", path))?;
    Ok(path)
}

const MAP_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Seagrass survey map</title>
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>
    html, body, #map { height: 100%; margin: 0; }
    .legend {
        position: fixed;
        bottom: 50px; right: 50px; width: 170px;
        border: 2px solid grey; z-index: 9999; font-size: 14px;
        font-family: arial; background-color: rgba(255, 255, 255, 0.8);
        border-radius: 8px; padding: 4px;
    }
    .legend .scale {
        height: 10px; margin: 2px 6px;
        border: 1px solid black; background: __GRADIENT__;
    }
    .legend .note { font-size: 10px; color: #555555; margin: 4px 6px 2px; }
</style>
</head>
<body>
<div id="map"></div>
<div class="legend">
    &nbsp; <strong>Legend</strong> <br>
__METHOD_ROWS__
    &nbsp; Number of plants <br>
    <div class="scale"></div>
    <span style="float:left; margin-left:6px;">__MIN_PLANTS__</span>
    <span style="float:right; margin-right:6px;">__MAX_PLANTS__</span>
    <br style="clear:both">
    <div class="note">Plots are __EDGE_METERS__ m squares in UTM meters
    (EPSG:__UTM_EPSG__); their outlines are only approximately square in
    latitude/longitude.</div>
</div>
<script>
    var grid = __GEOJSON__;

    var map = L.map('map').setView([__CENTER_LAT__, __CENTER_LON__], __ZOOM__);
    L.tileLayer('https://tile.openstreetmap.org/{z}/{x}/{y}.png', {
        maxZoom: 19,
        attribution: '&copy; OpenStreetMap contributors'
    }).addTo(map);

    var fillLayer = L.geoJSON(grid, {
        style: function (feature) {
            return {
                fillColor: feature.properties.fill,
                fillOpacity: 1,
                color: '#333333',
                weight: 0.5
            };
        }
    }).addTo(map);

    var methodLayer = L.geoJSON(grid, {
        style: function (feature) {
            return {
                color: feature.properties.color,
                weight: feature.properties.weight,
                fill: false
            };
        }
    }).addTo(map);

    var hoverLayer = L.geoJSON(grid, {
        style: { fillColor: '#ffffff', color: '#000000', fillOpacity: 0.1, weight: 0.1 },
        onEachFeature: function (feature, layer) {
            layer.bindTooltip(
                'Plot number: ' + feature.properties.cell + '<br>' +
                'Method: ' + feature.properties.method + '<br>' +
                'Number of plants: ' + feature.properties.n_plants,
                { sticky: true }
            );
            layer.on('mouseover', function () {
                layer.setStyle({ fillColor: '#000000', fillOpacity: 0.5 });
            });
            layer.on('mouseout', function () {
                layer.setStyle({ fillColor: '#ffffff', fillOpacity: 0.1 });
            });
        }
    }).addTo(map);
    hoverLayer.bringToFront();

    L.control.layers(null, {
        'Plant counts': fillLayer,
        'Methods': methodLayer
    }).addTo(map);
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::build_grid;
    use crate::proj::UtmZone;
    use crate::types::{Method, SampleRecord};

    fn sample_grid() -> GridCollection {
        let records = vec![
            SampleRecord { cell: 1, latitude: 51.4501, longitude: 4.1901, n_plants: 0, method: Method::One },
            SampleRecord { cell: 2, latitude: 51.4470, longitude: 4.1950, n_plants: 50, method: Method::Two },
            SampleRecord { cell: 3, latitude: 51.4510, longitude: 4.2010, n_plants: 100, method: Method::Four },
        ];
        build_grid(&records, UtmZone::from_epsg(32631).unwrap(), 20.0).unwrap()
    }

    #[test]
    fn fill_ramp_endpoints() {
        assert_eq!(fill_color(0, 0, 100), "#ffffcc");
        assert_eq!(fill_color(100, 0, 100), "#006837");
    }

    #[test]
    fn fill_ramp_handles_constant_counts() {
        // A batch where every plot has the same count still gets a color.
        assert_eq!(fill_color(7, 7, 7), "#006837");
    }

    #[test]
    fn feature_collection_carries_attributes_and_styling() {
        let grid = sample_grid();
        let collection = to_feature_collection(&grid);

        assert_eq!(collection.features.len(), 3);
        let props = collection.features[1].properties.as_ref().unwrap();
        assert_eq!(props["cell"], 2);
        assert_eq!(props["method"], "2");
        assert_eq!(props["n_plants"], 50);
        assert_eq!(props["color"], "red");
        assert_eq!(props["weight"], 4);
        assert!(props["fill"].as_str().unwrap().starts_with('#'));
    }

    #[test]
    fn composed_map_embeds_data_and_legend() {
        let grid = sample_grid();
        let map = MapConfig { center_lat: 51.4501, center_lon: 4.1901, zoom: 15 };
        let html = compose_map(&grid, &map).unwrap();

        assert!(html.contains("\"FeatureCollection\""));
        assert!(html.contains("Plot number: "));
        assert!(html.contains("Method 1"));
        assert!(html.contains("Method 4"));
        assert!(html.contains("setView([51.4501, 4.1901], 15)"));
        assert!(html.contains("EPSG:32631"));
        // The planar-square approximation is surfaced to the reader.
        assert!(html.contains("approximately square"));
    }
}
