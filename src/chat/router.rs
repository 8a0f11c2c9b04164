//! Intent dispatch.
//!
//! One branch per intent tag. The ledger sits behind a single async mutex
//! so a vote routed through chat is the same indivisible read-modify-write
//! as a vote submitted directly.

use std::sync::Arc;
use tokio::sync::Mutex;

use super::intent::{AreaUnit, Intent, IntentTag, LandUseType};
use super::traits::*;
use crate::ledger::{Identity, ProposalLedger, ProposalView};

/// Structured reply from the router. `render()` turns it into the
/// user-facing text.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatReply {
    Area {
        total: f64,
        unit: AreaUnit,
        feature_count: usize,
    },
    Impact(ImpactReport),
    Proposals(Vec<ProposalView>),
    Proposal(ProposalView),
    VoteAccepted {
        proposal: u64,
        support: bool,
    },
    Unknown,
}

impl ChatReply {
    pub fn render(&self) -> String {
        match self {
            ChatReply::Area {
                total,
                unit,
                feature_count,
            } => format!(
                "{feature_count} green space(s) matched, {total:.2} {} in total.",
                unit.label()
            ),
            ChatReply::Impact(report) => {
                let fmt = |v: &Option<f64>| {
                    v.map(|x| format!("{x:.4}"))
                        .unwrap_or_else(|| "n/a".to_string())
                };
                format!(
                    "Impact: NDVI {} -> {}, walkability {} -> {}, PM2.5 {} -> {}, \
                     {} people within a 10 minute walk.",
                    fmt(&report.ndvi_before),
                    fmt(&report.ndvi_after),
                    fmt(&report.walkability_before),
                    fmt(&report.walkability_after),
                    fmt(&report.pm25_before),
                    fmt(&report.pm25_after),
                    report.affected_population_10_min_walk,
                )
            }
            ChatReply::Proposals(views) => {
                if views.is_empty() {
                    "No proposals are open for voting right now.".to_string()
                } else {
                    let lines: Vec<String> = views
                        .iter()
                        .map(|v| {
                            format!(
                                "#{} {} (yes {} / no {})",
                                v.id, v.title, v.yes_count, v.no_count
                            )
                        })
                        .collect();
                    format!("Open proposals:\n{}", lines.join("\n"))
                }
            }
            ChatReply::Proposal(v) => format!(
                "#{} {} - {} | size {} | yes {} / no {} | {}",
                v.id,
                v.title,
                v.description,
                v.size,
                v.yes_count,
                v.no_count,
                if v.active { "open" } else { "closed" }
            ),
            ChatReply::VoteAccepted { proposal, support } => format!(
                "Recorded your {} vote on proposal {proposal}.",
                if *support { "yes" } else { "no" }
            ),
            ChatReply::Unknown => {
                "Sorry, I don't understand that. Try asking about green spaces, \
                 impact, or open proposals."
                    .to_string()
            }
        }
    }
}

/// Chat router over the three service seams and the shared ledger.
pub struct ChatRouter<C, G, I> {
    classifier: C,
    geo: G,
    impact: I,
    ledger: Arc<Mutex<ProposalLedger>>,
}

impl<C, G, I> ChatRouter<C, G, I>
where
    C: IntentClassifier,
    G: GeoQueryService,
    I: ImpactService,
{
    pub fn new(classifier: C, geo: G, impact: I, ledger: Arc<Mutex<ProposalLedger>>) -> Self {
        Self {
            classifier,
            geo,
            impact,
            ledger,
        }
    }

    /// Route one free-text query from `caller`.
    ///
    /// Classifier failures degrade to [`ChatReply::Unknown`]; failures in
    /// the geospatial or analysis services, and rejected ledger operations,
    /// surface as errors.
    pub async fn handle(&self, text: &str, caller: &Identity) -> ChatResult<ChatReply> {
        let intent = match self.classifier.classify(text).await {
            Ok(intent) => intent,
            Err(e) => {
                tracing::warn!(error = %e, "classifier failed, degrading to unknown intent");
                Intent::unknown()
            }
        };
        tracing::debug!(tag = ?intent.tag, caller = %caller, "dispatching intent");

        match intent.tag {
            IntentTag::GreenSpaceArea => self.green_space_area(&intent).await,
            IntentTag::ImpactAnalysis => self.impact_analysis(&intent).await,
            IntentTag::ListProposals => {
                let ledger = self.ledger.lock().await;
                let views = ledger
                    .active_proposals()
                    .into_iter()
                    .map(|id| ledger.get_proposal(id))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ChatReply::Proposals(views))
            }
            IntentTag::ProposalDetails => match intent.proposal_id {
                Some(id) => {
                    let view = self.ledger.lock().await.get_proposal(id)?;
                    Ok(ChatReply::Proposal(view))
                }
                None => Ok(ChatReply::Unknown),
            },
            IntentTag::CastVote => match (intent.proposal_id, intent.support) {
                (Some(id), Some(support)) => {
                    // The router is the trust layer for the Delegated
                    // policy: the chat caller is the voter identity.
                    self.ledger.lock().await.vote(id, support, caller)?;
                    Ok(ChatReply::VoteAccepted {
                        proposal: id,
                        support,
                    })
                }
                _ => Ok(ChatReply::Unknown),
            },
            IntentTag::Unknown => Ok(ChatReply::Unknown),
        }
    }

    async fn green_space_area(&self, intent: &Intent) -> ChatResult<ChatReply> {
        let Some(location) = intent.location_value.clone() else {
            return Ok(ChatReply::Unknown);
        };
        let filter = LocationFilter {
            location_type: intent.location_type.clone(),
            value: location,
        };
        let features = self.geo.features(&filter).await?;
        let unit = intent.unit.unwrap_or_default();
        let total_m2: f64 = features.iter().map(|f| f.area_m2).sum();
        Ok(ChatReply::Area {
            total: unit.from_m2(total_m2),
            unit,
            feature_count: features.len(),
        })
    }

    async fn impact_analysis(&self, intent: &Intent) -> ChatResult<ChatReply> {
        let Some(location) = intent.location_value.clone() else {
            return Ok(ChatReply::Unknown);
        };
        let filter = LocationFilter {
            location_type: intent.location_type.clone(),
            value: location,
        };
        let features = self.geo.features(&filter).await?;
        let feature = features
            .first()
            .ok_or_else(|| ChatError::Geo(format!("no feature matched '{}'", filter.value)))?;

        let land_use = intent.land_use.unwrap_or(LandUseType::Removed);
        let report = self.impact.analyze(&feature.geometry, land_use).await?;
        Ok(ChatReply::Impact(report))
    }
}
