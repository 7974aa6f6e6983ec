use super::*;
use crate::state::test_helpers;

#[test]
fn priority_and_status_round_trip() {
    for priority in JobCardPriority::ALL {
        assert_eq!(JobCardPriority::parse(priority.as_str()), Some(priority));
    }
    for status in JobCardStatus::ALL {
        assert_eq!(JobCardStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(JobCardPriority::parse("asap"), None);
    assert_eq!(JobCardStatus::parse("done"), None);
}

#[test]
fn open_and_closed_predicates() {
    assert!(JobCardStatus::Open.is_open());
    assert!(JobCardStatus::InProgress.is_open());
    assert!(!JobCardStatus::Completed.is_open());
    assert!(!JobCardStatus::Cancelled.is_open());

    assert!(JobCardStatus::Completed.is_closed());
    assert!(JobCardStatus::Cancelled.is_closed());
    assert!(!JobCardStatus::Open.is_closed());
    assert!(!JobCardStatus::InProgress.is_closed());
}

#[test]
fn job_card_serde_round_trip_preserves_fields() {
    let card = JobCard {
        id: Uuid::new_v4(),
        vehicle_id: Uuid::new_v4(),
        number: "JC-118".into(),
        title: "Replace clutch plate".into(),
        description: None,
        priority: JobCardPriority::High,
        status: JobCardStatus::InProgress,
        assigned_to: Some("P. van Wyk".into()),
        opened_on: "2026-08-03".into(),
        closed_on: None,
    };
    let json = serde_json::to_string(&card).expect("serialize");
    let restored: JobCard = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(restored.number, "JC-118");
    assert_eq!(restored.priority, JobCardPriority::High);
    assert_eq!(restored.status, JobCardStatus::InProgress);
    assert_eq!(restored.assigned_to.as_deref(), Some("P. van Wyk"));
    assert_eq!(restored.opened_on, "2026-08-03");
    assert_eq!(restored.closed_on, None);
}

#[tokio::test]
async fn create_rejects_blank_title_before_touching_db() {
    let state = test_helpers::test_app_state();
    let new = NewJobCard {
        vehicle_id: Uuid::new_v4(),
        title: "".into(),
        description: None,
        priority: None,
        assigned_to: None,
    };
    let err = create_job_card(&state, new).await.expect_err("blank title");
    assert!(matches!(err, JobCardError::Invalid(_)));
}
