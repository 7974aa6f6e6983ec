use super::*;
use crate::state::test_helpers;

#[test]
fn status_round_trips() {
    for status in InspectionStatus::ALL {
        assert_eq!(InspectionStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(InspectionStatus::parse("ok"), None);
}

#[test]
fn inspection_serde_round_trip_preserves_fields() {
    let inspection = Inspection {
        id: Uuid::new_v4(),
        vehicle_id: Uuid::new_v4(),
        inspector: "S. Dlamini".into(),
        inspected_on: "2026-07-30".into(),
        odometer_km: Some(182_450),
        status: InspectionStatus::Failed,
        notes: Some("brake pads worn".into()),
    };
    let json = serde_json::to_string(&inspection).expect("serialize");
    let restored: Inspection = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(restored.id, inspection.id);
    assert_eq!(restored.vehicle_id, inspection.vehicle_id);
    assert_eq!(restored.inspector, "S. Dlamini");
    assert_eq!(restored.inspected_on, "2026-07-30");
    assert_eq!(restored.odometer_km, Some(182_450));
    assert_eq!(restored.status, InspectionStatus::Failed);
    assert_eq!(restored.notes.as_deref(), Some("brake pads worn"));
}

#[tokio::test]
async fn create_rejects_blank_inspector_before_touching_db() {
    let state = test_helpers::test_app_state();
    let new = NewInspection {
        vehicle_id: Uuid::new_v4(),
        inspector: "  ".into(),
        inspected_on: "2026-08-01".into(),
        odometer_km: None,
        status: None,
        notes: None,
    };
    let err = create_inspection(&state, new).await.expect_err("blank inspector");
    assert!(matches!(err, InspectionError::Invalid(_)));
}

#[tokio::test]
async fn create_rejects_malformed_date_before_touching_db() {
    let state = test_helpers::test_app_state();
    let new = NewInspection {
        vehicle_id: Uuid::new_v4(),
        inspector: "S. Dlamini".into(),
        inspected_on: "01/08/2026".into(),
        odometer_km: None,
        status: None,
        notes: None,
    };
    let err = create_inspection(&state, new).await.expect_err("bad date");
    assert!(matches!(err, InspectionError::Invalid(_)));
}
