use super::*;

#[test]
fn allocation_conflicts_map_to_409() {
    assert_eq!(tyre_error_to_status(&TyreError::AlreadyFitted), StatusCode::CONFLICT);
    assert_eq!(
        tyre_error_to_status(&TyreError::PositionOccupied("left-front".into())),
        StatusCode::CONFLICT
    );
    assert_eq!(tyre_error_to_status(&TyreError::NotFitted), StatusCode::CONFLICT);
    assert_eq!(tyre_error_to_status(&TyreError::Scrapped), StatusCode::CONFLICT);
}

#[test]
fn lookup_and_input_errors_map_as_expected() {
    assert_eq!(
        tyre_error_to_status(&TyreError::NotFound(Uuid::new_v4())),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        tyre_error_to_status(&TyreError::VehicleNotFound(Uuid::new_v4())),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        tyre_error_to_status(&TyreError::Invalid("position required".into())),
        StatusCode::BAD_REQUEST
    );
}

#[test]
fn remove_body_defaults_to_return_to_store() {
    let body: RemoveTyreBody = serde_json::from_str("{}").expect("deserialize");
    assert!(!body.scrap);
    assert!(body.odometer_km.is_none());

    let scrap: RemoveTyreBody =
        serde_json::from_str(r#"{"odometer_km": 250000, "scrap": true}"#).expect("deserialize");
    assert!(scrap.scrap);
    assert_eq!(scrap.odometer_km, Some(250_000));
}
