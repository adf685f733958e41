use anyhow::Result;
use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use geo::algorithm::bounding_rect::BoundingRect;
use geo::algorithm::contains::Contains;
use geo::Point;
use rstar::{RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::config::AppConfig;
use crate::types::GridCollection;

// Wrapper for RTree indexing
struct CellIndex {
    index: usize,
    aabb: AABB<[f64; 2]>,
}

impl RTreeObject for CellIndex {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

pub struct AppState {
    pub grid: GridCollection,
    pub tree: RTree<CellIndex>,
}

#[derive(Deserialize)]
pub struct QueryParams {
    lat: f64,
    lon: f64,
}

#[derive(Serialize)]
pub struct QueryResponse {
    cell: u32,
    method: String,
    n_plants: u32,
}

pub async fn start_server(config: AppConfig, grid: GridCollection) -> Result<()> {
    println!("Building spatial index for {} plots...", grid.len());
    let tree_items: Vec<CellIndex> = grid
        .iter()
        .enumerate()
        .filter_map(|(i, cell)| {
            let rect = cell.geometry.bounding_rect()?;
            Some(CellIndex {
                index: i,
                aabb: AABB::from_corners(
                    [rect.min().x, rect.min().y],
                    [rect.max().x, rect.max().y],
                ),
            })
        })
        .collect();

    let tree = RTree::bulk_load(tree_items);
    println!("Spatial index built.");

    let state = Arc::new(AppState { grid, tree });

    let port = config.server.port;
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    println!("Starting server on http://{}", addr);

    let app = Router::new()
        .route("/api/query", get(query_handler))
        .fallback_service(ServeDir::new(&config.output.dir))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn query_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryParams>,
) -> Json<Option<QueryResponse>> {
    let point = Point::new(params.lon, params.lat);
    let envelope = AABB::from_point([params.lon, params.lat]);

    let candidates = state.tree.locate_in_envelope_intersecting(&envelope);

    for candidate in candidates {
        if let Some(cell) = state.grid.cells.get(candidate.index) {
            if cell.geometry.contains(&point) {
                return Json(Some(QueryResponse {
                    cell: cell.cell,
                    method: cell.method.label().to_string(),
                    n_plants: cell.n_plants,
                }));
            }
        }
    }

    Json(None)
}
