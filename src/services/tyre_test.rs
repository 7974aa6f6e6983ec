use super::*;
use crate::state::test_helpers;

#[test]
fn status_round_trips() {
    for status in TyreStatus::ALL {
        assert_eq!(TyreStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(TyreStatus::parse("mounted"), None);
}

#[test]
fn fit_requires_in_store() {
    assert!(fit_precondition(TyreStatus::InStore).is_ok());
    assert!(matches!(fit_precondition(TyreStatus::Fitted), Err(TyreError::AlreadyFitted)));
    assert!(matches!(fit_precondition(TyreStatus::Scrapped), Err(TyreError::Scrapped)));
}

#[test]
fn remove_requires_fitted() {
    assert!(remove_precondition(TyreStatus::Fitted).is_ok());
    assert!(matches!(remove_precondition(TyreStatus::InStore), Err(TyreError::NotFitted)));
    assert!(matches!(remove_precondition(TyreStatus::Scrapped), Err(TyreError::NotFitted)));
}

#[test]
fn tyre_serde_round_trip_preserves_fields() {
    let tyre = Tyre {
        id: Uuid::new_v4(),
        serial: "BSN-44721".into(),
        brand: "Bridgestone".into(),
        size: "315/80R22.5".into(),
        tread_depth_mm: Some(14.5),
        status: TyreStatus::InStore,
        created_at: "2026-06-15 10:00:00".into(),
    };
    let json = serde_json::to_string(&tyre).expect("serialize");
    let restored: Tyre = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(restored.serial, "BSN-44721");
    assert_eq!(restored.size, "315/80R22.5");
    assert_eq!(restored.tread_depth_mm, Some(14.5));
    assert_eq!(restored.status, TyreStatus::InStore);
}

#[test]
fn history_entry_serde_round_trip() {
    let entry = TyreHistoryEntry {
        id: Uuid::new_v4(),
        tyre_id: Uuid::new_v4(),
        vehicle_id: Some(Uuid::new_v4()),
        fleet_number: "H-03".into(),
        position: "left-front".into(),
        event: EVENT_FITTED.into(),
        odometer_km: Some(210_500),
        recorded_at: "2026-08-02 14:20:00".into(),
    };
    let json = serde_json::to_string(&entry).expect("serialize");
    let restored: TyreHistoryEntry = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(restored.fleet_number, "H-03");
    assert_eq!(restored.position, "left-front");
    assert_eq!(restored.event, "fitted");
    assert_eq!(restored.odometer_km, Some(210_500));
}

#[tokio::test]
async fn create_rejects_blank_serial_before_touching_db() {
    let state = test_helpers::test_app_state();
    let new = NewTyre {
        serial: "".into(),
        brand: "Michelin".into(),
        size: "315/80R22.5".into(),
        tread_depth_mm: None,
    };
    let err = create_tyre(&state, new).await.expect_err("blank serial");
    assert!(matches!(err, TyreError::Invalid(_)));
}
