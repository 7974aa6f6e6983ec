use super::*;
use crate::state::test_helpers;

fn item(quantity: i64, min_quantity: i64) -> InventoryItem {
    InventoryItem {
        id: Uuid::new_v4(),
        name: "Brake pad set".into(),
        part_number: "BP-2210".into(),
        quantity,
        min_quantity,
        unit_cost_cents: 84_500,
        location: Some("shelf 4B".into()),
    }
}

#[test]
fn low_stock_at_or_below_minimum() {
    assert!(item(0, 2).is_low_stock());
    assert!(item(2, 2).is_low_stock());
    assert!(!item(3, 2).is_low_stock());
}

#[test]
fn item_serde_round_trip_preserves_fields() {
    let original = item(7, 2);
    let json = serde_json::to_string(&original).expect("serialize");
    let restored: InventoryItem = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(restored.id, original.id);
    assert_eq!(restored.part_number, "BP-2210");
    assert_eq!(restored.quantity, 7);
    assert_eq!(restored.min_quantity, 2);
    assert_eq!(restored.unit_cost_cents, 84_500);
    assert_eq!(restored.location.as_deref(), Some("shelf 4B"));
}

#[tokio::test]
async fn create_rejects_blank_part_number_before_touching_db() {
    let state = test_helpers::test_app_state();
    let new = NewInventoryItem {
        name: "Oil filter".into(),
        part_number: "  ".into(),
        quantity: None,
        min_quantity: None,
        unit_cost_cents: None,
        location: None,
    };
    let err = create_item(&state, new).await.expect_err("blank part number");
    assert!(matches!(err, InventoryError::Invalid(_)));
}

#[tokio::test]
async fn create_rejects_negative_quantity() {
    let state = test_helpers::test_app_state();
    let new = NewInventoryItem {
        name: "Oil filter".into(),
        part_number: "OF-100".into(),
        quantity: Some(-1),
        min_quantity: None,
        unit_cost_cents: None,
        location: None,
    };
    let err = create_item(&state, new).await.expect_err("negative quantity");
    assert!(matches!(err, InventoryError::Invalid(_)));
}
