//! Chat query routing.
//!
//! Intent-classification-then-dispatch: a classification oracle turns free
//! text into a structured [`Intent`], and the router runs the matching
//! branch against the geospatial service, the impact-analysis service, or
//! the ledger. Classifier failure degrades to an "unknown" reply; upstream
//! service failure is surfaced as an explicit error, never a crash.

pub mod intent;
pub mod mock;
pub mod offline;
pub mod router;
pub mod traits;

pub use intent::{AreaUnit, Intent, IntentTag, LandUseType};
pub use mock::{MockClassifier, MockGeoService, MockImpactService};
pub use offline::KeywordClassifier;
pub use router::{ChatReply, ChatRouter};
pub use traits::{
    ChatError, ChatResult, GeoFeature, GeoQueryService, ImpactReport, ImpactService,
    IntentClassifier, LocationFilter,
};
