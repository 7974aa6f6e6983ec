use super::*;
use crate::state::test_helpers;

#[test]
fn category_round_trips() {
    for category in VehicleCategory::ALL {
        assert_eq!(VehicleCategory::parse(category.as_str()), Some(category));
    }
    assert_eq!(VehicleCategory::parse("trailer"), None);
    assert_eq!(VehicleCategory::parse(""), None);
}

#[test]
fn status_round_trips() {
    for status in VehicleStatus::ALL {
        assert_eq!(VehicleStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(VehicleStatus::parse("parked"), None);
}

#[test]
fn category_serde_uses_snake_case() {
    let json = serde_json::to_string(&VehicleCategory::Bakkie).expect("serialize");
    assert_eq!(json, "\"bakkie\"");
    let back: VehicleStatus = serde_json::from_str("\"in_workshop\"").expect("deserialize");
    assert_eq!(back, VehicleStatus::InWorkshop);
}

#[test]
fn vehicle_serde_round_trip_preserves_fields() {
    let vehicle = Vehicle {
        id: Uuid::new_v4(),
        fleet_number: "H-07".into(),
        registration: "ND 123-456".into(),
        make: "Scania".into(),
        model: "R460".into(),
        year: Some(2021),
        category: VehicleCategory::Horse,
        status: VehicleStatus::Active,
        odometer_km: 412_000,
        created_at: "2026-01-12 08:30:00".into(),
    };
    let json = serde_json::to_string(&vehicle).expect("serialize");
    let restored: Vehicle = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(restored.id, vehicle.id);
    assert_eq!(restored.fleet_number, "H-07");
    assert_eq!(restored.registration, "ND 123-456");
    assert_eq!(restored.year, Some(2021));
    assert_eq!(restored.category, VehicleCategory::Horse);
    assert_eq!(restored.status, VehicleStatus::Active);
    assert_eq!(restored.odometer_km, 412_000);
    assert_eq!(restored.created_at, "2026-01-12 08:30:00");
}

#[test]
fn odometer_must_not_decrease() {
    assert!(check_odometer(100, 100).is_ok());
    assert!(check_odometer(100, 150).is_ok());
    let err = check_odometer(100, 99).expect_err("decrease rejected");
    assert!(matches!(err, VehicleError::Invalid(_)));
}

#[tokio::test]
async fn create_rejects_blank_identifiers_before_touching_db() {
    let state = test_helpers::test_app_state();
    let new = NewVehicle {
        fleet_number: "   ".into(),
        registration: "ND 1".into(),
        make: "Isuzu".into(),
        model: "NPR".into(),
        year: None,
        category: VehicleCategory::Bakkie,
        status: None,
        odometer_km: None,
    };
    let err = create_vehicle(&state, new).await.expect_err("blank fleet number");
    assert!(matches!(err, VehicleError::Invalid(_)));
}

#[tokio::test]
async fn create_rejects_negative_odometer() {
    let state = test_helpers::test_app_state();
    let new = NewVehicle {
        fleet_number: "B-02".into(),
        registration: "ND 2".into(),
        make: "Toyota".into(),
        model: "Hilux".into(),
        year: Some(2023),
        category: VehicleCategory::Bakkie,
        status: None,
        odometer_km: Some(-5),
    };
    let err = create_vehicle(&state, new).await.expect_err("negative odometer");
    assert!(matches!(err, VehicleError::Invalid(_)));
}
