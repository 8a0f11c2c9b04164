//! Offline service implementations.
//!
//! The real deployment talks to a language-model classifier, a geospatial
//! database, and a remote analysis service. These implementations keep the
//! CLI usable with none of that infrastructure: a deterministic keyword
//! classifier, a GeoJSON-file-backed feature store, and an impact service
//! that reports itself as unconfigured.

use async_trait::async_trait;
use std::path::Path;

use super::intent::{AreaUnit, Intent, IntentTag, LandUseType};
use super::traits::*;

/// Deterministic keyword-matching classifier.
///
/// Far cruder than the language-model oracle, but produces the same intent
/// records and never needs a network.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IntentClassifier for KeywordClassifier {
    async fn classify(&self, text: &str) -> ChatResult<Intent> {
        let lower = text.to_lowercase();

        if lower.contains("proposals") || (lower.contains("what") && lower.contains("vote")) {
            return Ok(Intent {
                tag: IntentTag::ListProposals,
                ..Intent::default()
            });
        }

        if lower.contains("vote") {
            let support = if lower.contains(" yes") {
                Some(true)
            } else if lower.contains(" no") {
                Some(false)
            } else {
                None
            };
            return Ok(Intent {
                tag: IntentTag::CastVote,
                proposal_id: first_number(&lower),
                support,
                ..Intent::default()
            });
        }

        if lower.contains("proposal") {
            return Ok(Intent {
                tag: IntentTag::ProposalDetails,
                proposal_id: first_number(&lower),
                ..Intent::default()
            });
        }

        if lower.contains("impact") || lower.contains("ndvi") || lower.contains("vegetation") {
            let land_use = if lower.contains("building") || lower.contains("built") {
                Some(LandUseType::ReplacedByBuilding)
            } else if lower.contains("remov") {
                Some(LandUseType::Removed)
            } else {
                None
            };
            return Ok(Intent {
                tag: IntentTag::ImpactAnalysis,
                location_value: location_after_in(text),
                land_use,
                ..Intent::default()
            });
        }

        if lower.contains("green") || lower.contains("park") || lower.contains("area") {
            let unit = if lower.contains("hectare") {
                Some(AreaUnit::Hectares)
            } else if lower.contains("square kilometer") || lower.contains("km") {
                Some(AreaUnit::SquareKilometers)
            } else {
                None
            };
            return Ok(Intent {
                tag: IntentTag::GreenSpaceArea,
                location_value: location_after_in(text),
                unit,
                ..Intent::default()
            });
        }

        Ok(Intent::unknown())
    }
}

/// First integer appearing in the text.
fn first_number(text: &str) -> Option<u64> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// The phrase following the last " in ", with trailing punctuation trimmed.
///
/// Matched case-insensitively on the raw bytes; the needle is pure ASCII,
/// so every match starts and ends on a char boundary even in non-ASCII
/// text, and the location keeps its original casing.
fn location_after_in(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let mut start = None;
    for i in 0..bytes.len().saturating_sub(3) {
        if bytes[i] == b' '
            && bytes[i + 1].eq_ignore_ascii_case(&b'i')
            && bytes[i + 2].eq_ignore_ascii_case(&b'n')
            && bytes[i + 3] == b' '
        {
            start = Some(i + 4);
        }
    }
    let rest = text[start?..].trim().trim_end_matches(['?', '.', '!']);
    if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    }
}

/// Geospatial service backed by a GeoJSON FeatureCollection on disk.
///
/// Each feature needs `properties.name` and `properties.area_m2`; the
/// filter matches case-insensitively against name and `properties.district`.
#[derive(Debug)]
pub struct FileGeoService {
    features: Vec<GeoFeature>,
    districts: Vec<Option<String>>,
}

impl FileGeoService {
    /// No feature data configured; every query matches nothing.
    pub fn empty() -> Self {
        Self {
            features: Vec::new(),
            districts: Vec::new(),
        }
    }

    pub fn load(path: &Path) -> ChatResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ChatError::Geo(format!("cannot read {}: {e}", path.display())))?;
        let collection: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|e| ChatError::Geo(format!("invalid GeoJSON in {}: {e}", path.display())))?;

        let mut features = Vec::new();
        let mut districts = Vec::new();
        for feature in collection["features"].as_array().into_iter().flatten() {
            let props = &feature["properties"];
            let name = match props["name"].as_str() {
                Some(n) => n.to_string(),
                None => continue,
            };
            let area_m2 = props["area_m2"].as_f64().unwrap_or(0.0);
            features.push(GeoFeature {
                name,
                area_m2,
                geometry: feature["geometry"].clone(),
            });
            districts.push(props["district"].as_str().map(str::to_string));
        }

        Ok(Self {
            features,
            districts,
        })
    }
}

#[async_trait]
impl GeoQueryService for FileGeoService {
    async fn features(&self, filter: &LocationFilter) -> ChatResult<Vec<GeoFeature>> {
        let needle = filter.value.to_lowercase();
        Ok(self
            .features
            .iter()
            .zip(&self.districts)
            .filter(|(f, district)| {
                f.name.to_lowercase().contains(&needle)
                    || district
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .map(|(f, _)| f.clone())
            .collect())
    }
}

/// Placeholder used when no analysis endpoint is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredImpactService;

#[async_trait]
impl ImpactService for UnconfiguredImpactService {
    async fn analyze(
        &self,
        _geometry: &serde_json::Value,
        _land_use: LandUseType,
    ) -> ChatResult<ImpactReport> {
        Err(ChatError::Impact(
            "impact analysis service not configured".to_string(),
        ))
    }
}
