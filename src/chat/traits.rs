//! Service trait abstractions.
//!
//! The classification oracle, the geospatial database, and the
//! vegetation/impact analysis service are external collaborators. These
//! traits are the only surface the router sees, which keeps every branch
//! testable against the mocks in [`super::mock`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::intent::{Intent, LandUseType};
use crate::ledger::LedgerError;

/// Result type for chat operations.
pub type ChatResult<T> = Result<T, ChatError>;

/// Chat routing errors.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The classification oracle failed outright (no output at all).
    /// The router degrades this to an unknown-intent reply.
    #[error("classifier error: {0}")]
    Classifier(String),

    /// The geospatial query service failed or returned nothing usable.
    #[error("geospatial service error: {0}")]
    Geo(String),

    /// The impact-analysis service failed.
    #[error("impact service error: {0}")]
    Impact(String),

    /// A ledger operation was rejected.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Filter sent to the geospatial query service.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationFilter {
    /// e.g. "district", "city", "park"
    pub location_type: Option<String>,
    pub value: String,
}

/// One geographic feature with its area attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoFeature {
    pub name: String,
    pub area_m2: f64,
    /// GeoJSON geometry, passed through to the impact service untouched.
    pub geometry: serde_json::Value,
}

/// Before/after report from the impact-analysis service.
///
/// Field names mirror the service's JSON response; `None` means the
/// underlying raster had no data for the geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactReport {
    pub affected_population_10_min_walk: u64,
    pub ndvi_before: Option<f64>,
    pub ndvi_after: Option<f64>,
    pub walkability_before: Option<f64>,
    pub walkability_after: Option<f64>,
    pub pm25_before: Option<f64>,
    pub pm25_after: Option<f64>,
}

/// Free text in, structured intent out.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> ChatResult<Intent>;
}

/// Location filter in, geographic features out.
#[async_trait]
pub trait GeoQueryService: Send + Sync {
    async fn features(&self, filter: &LocationFilter) -> ChatResult<Vec<GeoFeature>>;
}

/// Geometry plus land-use hypothesis in, environmental deltas out.
#[async_trait]
pub trait ImpactService: Send + Sync {
    async fn analyze(
        &self,
        geometry: &serde_json::Value,
        land_use: LandUseType,
    ) -> ChatResult<ImpactReport>;
}
