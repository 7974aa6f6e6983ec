use super::*;

#[test]
fn vehicle_errors_map_to_expected_statuses() {
    assert_eq!(
        vehicle_error_to_status(&VehicleError::NotFound(Uuid::new_v4())),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        vehicle_error_to_status(&VehicleError::Invalid("fleet_number required".into())),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        vehicle_error_to_status(&VehicleError::Conflict("fleet_number already in use".into())),
        StatusCode::CONFLICT
    );
}

#[test]
fn list_query_deserializes_from_url_params() {
    let query: VehicleListQuery =
        serde_urlencoded_like(&[("category", "horse"), ("status", "active")]);
    assert_eq!(query.category.as_deref(), Some("horse"));
    assert_eq!(query.status.as_deref(), Some("active"));

    let empty: VehicleListQuery = serde_urlencoded_like(&[]);
    assert!(empty.category.is_none());
    assert!(empty.status.is_none());
}

fn serde_urlencoded_like<T: serde::de::DeserializeOwned>(pairs: &[(&str, &str)]) -> T {
    let map: serde_json::Map<String, serde_json::Value> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), serde_json::Value::String((*v).to_owned())))
        .collect();
    serde_json::from_value(serde_json::Value::Object(map)).expect("deserialize query")
}
