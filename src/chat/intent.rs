//! Structured intent records.
//!
//! The classification oracle emits one JSON object per query. Anything that
//! fails to parse as an [`Intent`] is treated as `Unknown` - the caller
//! must never see a raw classifier failure.

use serde::{Deserialize, Serialize};

/// What the user is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IntentTag {
    /// "How much green space is there in <place>?"
    GreenSpaceArea,
    /// "What happens to vegetation if the park is built over?"
    ImpactAnalysis,
    /// "What proposals can I vote on?"
    ListProposals,
    /// "Show me proposal 3."
    ProposalDetails,
    /// "Vote yes on proposal 3."
    CastVote,
    #[default]
    Unknown,
}

/// Requested output unit for area answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AreaUnit {
    #[default]
    SquareMeters,
    Hectares,
    SquareKilometers,
}

impl AreaUnit {
    /// Convert an area in square meters into this unit.
    pub fn from_m2(&self, area_m2: f64) -> f64 {
        match self {
            AreaUnit::SquareMeters => area_m2,
            AreaUnit::Hectares => area_m2 / 10_000.0,
            AreaUnit::SquareKilometers => area_m2 / 1_000_000.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AreaUnit::SquareMeters => "m²",
            AreaUnit::Hectares => "ha",
            AreaUnit::SquareKilometers => "km²",
        }
    }
}

/// Land-use hypothesis for impact analysis.
///
/// Names follow the analysis service wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LandUseType {
    #[default]
    Removed,
    ReplacedByBuilding,
    Unchanged,
}

/// Structured classifier output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Intent {
    #[serde(rename = "intent")]
    pub tag: IntentTag,
    #[serde(default)]
    pub location_type: Option<String>,
    #[serde(default)]
    pub location_value: Option<String>,
    #[serde(default)]
    pub unit: Option<AreaUnit>,
    #[serde(default)]
    pub metric: Option<String>,
    #[serde(default)]
    pub land_use: Option<LandUseType>,
    #[serde(default)]
    pub proposal_id: Option<u64>,
    #[serde(default)]
    pub support: Option<bool>,
}

impl Intent {
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Parse raw classifier output, falling back to `Unknown` when the
    /// oracle produced something that is not a valid intent record.
    pub fn from_classifier_output(raw: &str) -> Self {
        match serde_json::from_str(raw) {
            Ok(intent) => intent,
            Err(e) => {
                tracing::warn!(error = %e, "unparsable classifier output, treating as unknown");
                Self::unknown()
            }
        }
    }
}
