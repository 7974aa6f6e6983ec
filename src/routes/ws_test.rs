use super::*;
use crate::frame::Status;
use crate::state::test_helpers;
use serde_json::json;
use tokio::time::{Duration, timeout};

async fn recv_event(rx: &mut mpsc::Receiver<Frame>) -> Frame {
    timeout(Duration::from_millis(200), rx.recv())
        .await
        .expect("event receive timed out")
        .expect("channel closed")
}

async fn assert_no_event(rx: &mut mpsc::Receiver<Frame>) {
    assert!(
        timeout(Duration::from_millis(80), rx.recv()).await.is_err(),
        "expected no event frame"
    );
}

fn request_json(syscall: &str, data: Data) -> String {
    serde_json::to_string(&Frame::request(syscall, data)).expect("serialize request")
}

#[tokio::test]
async fn invalid_json_yields_gateway_error() {
    let state = test_helpers::test_app_state();
    let replies = process_inbound_text(&state, Uuid::new_v4(), Uuid::new_v4(), "{not json").await;

    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].syscall, "gateway:error");
    assert!(
        replies[0]
            .data
            .get("message")
            .and_then(|v| v.as_str())
            .is_some_and(|m| m.starts_with("invalid json"))
    );
}

#[tokio::test]
async fn unknown_prefix_yields_error_reply() {
    let state = test_helpers::test_app_state();
    let text = request_json("drivers:list", Data::new());
    let replies = process_inbound_text(&state, Uuid::new_v4(), Uuid::new_v4(), &text).await;

    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].status, Status::Error);
}

#[tokio::test]
async fn subscribe_requires_table_field() {
    let state = test_helpers::test_app_state();
    let (client_id, _rx) = test_helpers::seed_subscriber(&state, Uuid::new_v4()).await;

    let text = request_json("feed:subscribe", Data::new());
    let replies = process_inbound_text(&state, client_id, Uuid::new_v4(), &text).await;

    assert_eq!(replies[0].status, Status::Error);
    assert_eq!(
        replies[0].data.get("message").and_then(|v| v.as_str()),
        Some("table required")
    );
}

#[tokio::test]
async fn subscribe_unknown_table_yields_coded_error() {
    let state = test_helpers::test_app_state();
    let (client_id, _rx) = test_helpers::seed_subscriber(&state, Uuid::new_v4()).await;

    let mut data = Data::new();
    data.insert("table".into(), json!("drivers"));
    let text = request_json("feed:subscribe", data);
    let replies = process_inbound_text(&state, client_id, Uuid::new_v4(), &text).await;

    assert_eq!(replies[0].status, Status::Error);
    assert_eq!(
        replies[0].data.get("code").and_then(|v| v.as_str()),
        Some("E_UNKNOWN_TABLE")
    );
}

#[tokio::test]
async fn subscribe_rejects_half_specified_filter() {
    let state = test_helpers::test_app_state();
    let (client_id, _rx) = test_helpers::seed_subscriber(&state, Uuid::new_v4()).await;

    let mut data = Data::new();
    data.insert("table".into(), json!("faults"));
    data.insert("column".into(), json!("vehicle_id"));
    let text = request_json("feed:subscribe", data);
    let replies = process_inbound_text(&state, client_id, Uuid::new_v4(), &text).await;

    assert_eq!(replies[0].status, Status::Error);
}

#[tokio::test]
async fn subscribe_then_publish_delivers_event() {
    let state = test_helpers::test_app_state();
    let (client_id, mut rx) = test_helpers::seed_subscriber(&state, Uuid::new_v4()).await;
    let vehicle_id = Uuid::new_v4();

    let mut data = Data::new();
    data.insert("table".into(), json!("faults"));
    data.insert("column".into(), json!("vehicle_id"));
    data.insert("value".into(), json!(vehicle_id));
    let text = request_json("feed:subscribe", data);
    let replies = process_inbound_text(&state, client_id, Uuid::new_v4(), &text).await;
    assert_eq!(replies[0].status, Status::Done);
    assert_eq!(replies[0].data.get("table").and_then(|v| v.as_str()), Some("faults"));

    let mut row = Data::new();
    row.insert("id".into(), json!(Uuid::new_v4()));
    row.insert("vehicle_id".into(), json!(vehicle_id));
    changefeed::publish(&state, "faults", changefeed::ChangeOp::Insert, row).await;

    let event = recv_event(&mut rx).await;
    assert_eq!(event.syscall, "faults:insert");

    // A row for a different vehicle stays filtered out.
    let mut other = Data::new();
    other.insert("vehicle_id".into(), json!(Uuid::new_v4()));
    changefeed::publish(&state, "faults", changefeed::ChangeOp::Insert, other).await;
    assert_no_event(&mut rx).await;
}

#[tokio::test]
async fn unsubscribe_replies_done() {
    let state = test_helpers::test_app_state();
    let (client_id, _rx) = test_helpers::seed_subscriber(&state, Uuid::new_v4()).await;

    let mut data = Data::new();
    data.insert("table".into(), json!("vehicles"));
    let text = request_json("feed:unsubscribe", data);
    let replies = process_inbound_text(&state, client_id, Uuid::new_v4(), &text).await;

    assert_eq!(replies[0].status, Status::Done);
}

#[tokio::test]
async fn tables_op_lists_feed_tables() {
    let state = test_helpers::test_app_state();
    let (client_id, _rx) = test_helpers::seed_subscriber(&state, Uuid::new_v4()).await;

    let text = request_json("feed:tables", Data::new());
    let replies = process_inbound_text(&state, client_id, Uuid::new_v4(), &text).await;

    assert_eq!(replies[0].status, Status::Done);
    let tables = replies[0]
        .data
        .get("tables")
        .and_then(|v| v.as_array())
        .expect("tables array");
    assert_eq!(tables.len(), changefeed::TABLES.len());
    assert!(tables.contains(&json!("vehicles")));
}

#[tokio::test]
async fn replies_correlate_to_request() {
    let state = test_helpers::test_app_state();
    let (client_id, _rx) = test_helpers::seed_subscriber(&state, Uuid::new_v4()).await;

    let req = Frame::request("feed:tables", Data::new());
    let text = serde_json::to_string(&req).expect("serialize");
    let replies = process_inbound_text(&state, client_id, Uuid::new_v4(), &text).await;

    assert_eq!(replies[0].parent_id, Some(req.id));
}
