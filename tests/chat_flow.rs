//! End-to-end chat flow with the offline service implementations.
//!
//! Exercises the whole pipeline: free text -> keyword classifier ->
//! GeoJSON-backed geospatial lookup / shared ledger -> rendered reply.

use std::sync::Arc;
use tokio::sync::Mutex;

use parkvote::chat::offline::{FileGeoService, UnconfiguredImpactService};
use parkvote::chat::{ChatError, ChatReply, ChatRouter, KeywordClassifier, MockImpactService};
use parkvote::chat::{AreaUnit, ImpactReport};
use parkvote::ledger::{Identity, ManualClock, ProposalLedger, VotePolicy};

const NOW: u64 = 1_700_000_000;

fn write_features(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("greens.geojson");
    std::fs::write(
        &path,
        r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"name": "Stadtpark", "district": "Altstadt", "area_m2": 52000.0},
                    "geometry": {"type": "Point", "coordinates": [8.4, 49.0]}
                },
                {
                    "type": "Feature",
                    "properties": {"name": "Rosengarten", "district": "Altstadt", "area_m2": 8000.0},
                    "geometry": {"type": "Point", "coordinates": [8.41, 49.01]}
                },
                {
                    "type": "Feature",
                    "properties": {"name": "West Meadow", "district": "Weststadt", "area_m2": 18000.0},
                    "geometry": {"type": "Point", "coordinates": [8.3, 49.0]}
                }
            ]
        }"#,
    )
    .unwrap();
    path
}

fn shared_ledger() -> (Arc<Mutex<ProposalLedger>>, ManualClock) {
    let clock = ManualClock::new(NOW);
    let ledger = ProposalLedger::with_clock(VotePolicy::Delegated, Arc::new(clock.clone()));
    (Arc::new(Mutex::new(ledger)), clock)
}

#[tokio::test]
async fn test_area_question_over_geojson_file() {
    let dir = tempfile::tempdir().unwrap();
    let geo = FileGeoService::load(&write_features(&dir)).unwrap();
    let (ledger, _) = shared_ledger();
    let router = ChatRouter::new(KeywordClassifier::new(), geo, UnconfiguredImpactService, ledger);

    let reply = router
        .handle(
            "How many hectares of green space are there in Altstadt?",
            &Identity::from("resident-1"),
        )
        .await
        .unwrap();

    // Stadtpark + Rosengarten, 60_000 m2 = 6 ha.
    assert_eq!(
        reply,
        ChatReply::Area {
            total: 6.0,
            unit: AreaUnit::Hectares,
            feature_count: 2
        }
    );
    assert!(reply.render().contains("6.00 ha"));
}

#[tokio::test]
async fn test_impact_question_reaches_impact_service() {
    let dir = tempfile::tempdir().unwrap();
    let geo = FileGeoService::load(&write_features(&dir)).unwrap();
    let (ledger, _) = shared_ledger();
    let report = ImpactReport {
        affected_population_10_min_walk: 1_200,
        ndvi_before: Some(0.52),
        ndvi_after: Some(0.08),
        walkability_before: Some(74.0),
        walkability_after: Some(61.0),
        pm25_before: Some(0.9),
        pm25_after: Some(1.3),
    };
    let impact = MockImpactService::new(report.clone());
    let router = ChatRouter::new(KeywordClassifier::new(), geo, impact.clone(), ledger);

    let reply = router
        .handle(
            "What is the impact if the green space is replaced by a building in Weststadt?",
            &Identity::from("resident-1"),
        )
        .await
        .unwrap();
    assert_eq!(reply, ChatReply::Impact(report));
    assert_eq!(impact.calls().len(), 1);
}

#[tokio::test]
async fn test_unconfigured_impact_service_is_an_explicit_error() {
    let dir = tempfile::tempdir().unwrap();
    let geo = FileGeoService::load(&write_features(&dir)).unwrap();
    let (ledger, _) = shared_ledger();
    let router = ChatRouter::new(KeywordClassifier::new(), geo, UnconfiguredImpactService, ledger);

    let err = router
        .handle(
            "What is the impact on vegetation in Weststadt?",
            &Identity::from("resident-1"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::Impact(_)));
}

#[tokio::test]
async fn test_list_and_vote_conversation() {
    let (ledger, _) = shared_ledger();
    ledger
        .lock()
        .await
        .create_proposal(
            "Stadtpark playground",
            "Replace the old equipment",
            300,
            "forum/55",
            NOW + 3_600,
            &Identity::from("parks-office"),
        )
        .unwrap();

    let router = ChatRouter::new(
        KeywordClassifier::new(),
        FileGeoService::empty(),
        UnconfiguredImpactService,
        ledger.clone(),
    );
    let caller = Identity::from("resident-2");

    let reply = router
        .handle("What proposals can I vote on?", &caller)
        .await
        .unwrap();
    match &reply {
        ChatReply::Proposals(views) => {
            assert_eq!(views.len(), 1);
            assert_eq!(views[0].title, "Stadtpark playground");
        }
        other => panic!("expected proposal list, got {other:?}"),
    }

    let reply = router.handle("I vote yes on proposal 1", &caller).await.unwrap();
    assert_eq!(
        reply,
        ChatReply::VoteAccepted {
            proposal: 1,
            support: true
        }
    );

    let ledger = ledger.lock().await;
    assert_eq!(ledger.get_proposal(1).unwrap().yes_count, 1);
    assert_eq!(ledger.get_voters(1), vec![caller]);
}

#[tokio::test]
async fn test_nonsense_gets_unknown_reply() {
    let (ledger, _) = shared_ledger();
    let router = ChatRouter::new(
        KeywordClassifier::new(),
        FileGeoService::empty(),
        UnconfiguredImpactService,
        ledger,
    );

    let reply = router
        .handle("please order me a pizza", &Identity::from("resident-3"))
        .await
        .unwrap();
    assert_eq!(reply, ChatReply::Unknown);
}
