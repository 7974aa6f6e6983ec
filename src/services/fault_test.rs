use super::*;
use crate::state::test_helpers;

#[test]
fn severity_and_status_round_trip() {
    for severity in FaultSeverity::ALL {
        assert_eq!(FaultSeverity::parse(severity.as_str()), Some(severity));
    }
    for status in FaultStatus::ALL {
        assert_eq!(FaultStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(FaultSeverity::parse("catastrophic"), None);
    assert_eq!(FaultStatus::parse("closed"), None);
}

#[test]
fn active_statuses() {
    assert!(FaultStatus::Open.is_active());
    assert!(FaultStatus::InProgress.is_active());
    assert!(!FaultStatus::Resolved.is_active());
}

#[test]
fn fault_serde_round_trip_preserves_links() {
    let fault = Fault {
        id: Uuid::new_v4(),
        vehicle_id: Uuid::new_v4(),
        inspection_id: Some(Uuid::new_v4()),
        job_card_id: None,
        title: "Coolant leak".into(),
        description: Some("visible under radiator".into()),
        severity: FaultSeverity::Major,
        status: FaultStatus::Open,
        reported_by: "J. Naidoo".into(),
        created_at: "2026-08-01 07:15:00".into(),
    };
    let json = serde_json::to_string(&fault).expect("serialize");
    let restored: Fault = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(restored.id, fault.id);
    assert_eq!(restored.inspection_id, fault.inspection_id);
    assert_eq!(restored.job_card_id, None);
    assert_eq!(restored.severity, FaultSeverity::Major);
    assert_eq!(restored.status, FaultStatus::Open);
    assert_eq!(restored.reported_by, "J. Naidoo");
}

#[test]
fn patch_distinguishes_unlink_from_untouched() {
    // Missing field leaves the link alone; explicit null clears it.
    let untouched = FaultPatch::default();
    assert!(untouched.job_card_id.is_none());

    let unlink = FaultPatch { job_card_id: Some(None), ..FaultPatch::default() };
    assert_eq!(unlink.job_card_id, Some(None));
}

#[tokio::test]
async fn create_rejects_blank_title_before_touching_db() {
    let state = test_helpers::test_app_state();
    let new = NewFault {
        vehicle_id: Uuid::new_v4(),
        inspection_id: None,
        title: " \t ".into(),
        description: None,
        severity: None,
        reported_by: "J. Naidoo".into(),
    };
    let err = create_fault(&state, new).await.expect_err("blank title");
    assert!(matches!(err, FaultError::Invalid(_)));
}
