//! Mock services for testing.
//!
//! Stand-ins for the classification oracle, the geospatial database, and
//! the impact-analysis service, with call recording for assertions.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::intent::{Intent, LandUseType};
use super::traits::*;

/// Scripted classifier: returns the intent stubbed for the exact query
/// text, or an error when nothing is stubbed.
#[derive(Clone, Default)]
pub struct MockClassifier {
    state: Arc<Mutex<ClassifierState>>,
}

#[derive(Default)]
struct ClassifierState {
    stubs: HashMap<String, Intent>,
    fail: bool,
    calls: Vec<String>,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stub(&self, text: &str, intent: Intent) {
        self.state
            .lock()
            .unwrap()
            .stubs
            .insert(text.to_string(), intent);
    }

    /// Make every call fail, simulating an unreachable oracle.
    pub fn fail(&self) {
        self.state.lock().unwrap().fail = true;
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl IntentClassifier for MockClassifier {
    async fn classify(&self, text: &str) -> ChatResult<Intent> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(text.to_string());
        if state.fail {
            return Err(ChatError::Classifier("oracle unreachable".to_string()));
        }
        state
            .stubs
            .get(text)
            .cloned()
            .ok_or_else(|| ChatError::Classifier(format!("no stubbed intent for '{text}'")))
    }
}

/// Geospatial service backed by a fixed feature list.
#[derive(Clone, Default)]
pub struct MockGeoService {
    state: Arc<Mutex<GeoState>>,
}

#[derive(Default)]
struct GeoState {
    features: Vec<GeoFeature>,
    fail: bool,
    calls: Vec<LocationFilter>,
}

impl MockGeoService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_feature(&self, feature: GeoFeature) {
        self.state.lock().unwrap().features.push(feature);
    }

    pub fn fail(&self) {
        self.state.lock().unwrap().fail = true;
    }

    pub fn calls(&self) -> Vec<LocationFilter> {
        self.state.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl GeoQueryService for MockGeoService {
    async fn features(&self, filter: &LocationFilter) -> ChatResult<Vec<GeoFeature>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(filter.clone());
        if state.fail {
            return Err(ChatError::Geo("database unreachable".to_string()));
        }
        Ok(state.features.clone())
    }
}

/// Impact service returning one canned report.
#[derive(Clone)]
pub struct MockImpactService {
    state: Arc<Mutex<ImpactState>>,
}

struct ImpactState {
    report: ImpactReport,
    fail: bool,
    calls: Vec<(serde_json::Value, LandUseType)>,
}

impl MockImpactService {
    pub fn new(report: ImpactReport) -> Self {
        Self {
            state: Arc::new(Mutex::new(ImpactState {
                report,
                fail: false,
                calls: Vec::new(),
            })),
        }
    }

    pub fn fail(&self) {
        self.state.lock().unwrap().fail = true;
    }

    pub fn calls(&self) -> Vec<(serde_json::Value, LandUseType)> {
        self.state.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl ImpactService for MockImpactService {
    async fn analyze(
        &self,
        geometry: &serde_json::Value,
        land_use: LandUseType,
    ) -> ChatResult<ImpactReport> {
        let mut state = self.state.lock().unwrap();
        state.calls.push((geometry.clone(), land_use));
        if state.fail {
            return Err(ChatError::Impact("analysis service unreachable".to_string()));
        }
        Ok(state.report.clone())
    }
}
