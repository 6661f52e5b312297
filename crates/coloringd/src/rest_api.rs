//! Color report endpoint.
//!
//! Serves `GET /colors` with every known switch's configured color field
//! and field-encoded color value. The handler takes the reconciler mutex
//! briefly, so the report always reflects the last completed pass.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::color_sync::ColorSync;
use crate::snapshot::{color_snapshot, ColorEntry};

/// Reconciler shared between the reconciliation loop and the report
/// endpoint. The mutex also serializes reconciliation passes.
pub type SharedSync = Arc<Mutex<ColorSync>>;

/// Body of the `/colors` response.
#[derive(Debug, Serialize)]
pub struct ColorsResponse {
    /// Per-switch color entries.
    pub colors: BTreeMap<String, ColorEntry>,
}

/// Builds the report router.
pub fn router(sync: SharedSync) -> Router {
    Router::new().route("/colors", get(get_colors)).with_state(sync)
}

async fn get_colors(State(sync): State<SharedSync>) -> Json<ColorsResponse> {
    let sync = sync.lock().await;
    Json(ColorsResponse {
        colors: color_snapshot(sync.table(), sync.color_field()),
    })
}
