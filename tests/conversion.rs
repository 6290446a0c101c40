use serde_json::json;

use sheet_orders::domain::document::{DocumentStatus, StatusUpdate};
use sheet_orders::repository::DocumentWriter;
use sheet_orders::services::ServiceError;
use sheet_orders::services::conversion::convert_order_to_delivery_note;
use sheet_orders::services::customers::MissingPhonePolicy;
use sheet_orders::services::dashboard::DashboardState;

mod common;

use common::{RecordingSleeper, Recorded, ScriptedTransport, order_row, rate_limited, success};

#[tokio::test]
async fn converted_order_shows_up_closed_with_its_delivery_note() {
    let transport = ScriptedTransport::new();
    let sleeper = RecordingSleeper::default();
    let dashboard = DashboardState::new(
        common::repository(&transport, &sleeper),
        MissingPhonePolicy::Skip,
    );

    transport
        .push_json(success(json!([order_row("620-0003", "Dana", "050-1", "חדש")])))
        .push_json(success(json!([])));
    let before = dashboard.reload().await.expect("initial load");
    assert!(!before.orders[0].status.is_closed());

    transport
        .push_json(success(json!(null)))
        .push_json(success(json!(null)));
    let outcome = convert_order_to_delivery_note(dashboard.repository(), &before, "620-0003")
        .await
        .expect("conversion should succeed");
    assert_eq!(outcome.order, "620-0003");
    assert_eq!(outcome.delivery_note, "671-0001");

    let requests = transport.requests();
    let Recorded::Post { body, .. } = &requests[2] else {
        panic!("expected a write, got {:?}", requests[2]);
    };
    assert_eq!(body["action"], "addDeliveryNote");
    assert_eq!(body["data"]["מספר מסמך"], "671-0001");
    assert_eq!(body["data"]["מספר הזמנה מקושר"], "620-0003");
    assert_eq!(body["data"]["סטטוס"], "הושלם");
    assert_eq!(body["data"]["שם לקוח"], "Dana");
    assert_eq!(requests[3].action().as_deref(), Some("updateOrderStatus"));

    let mut note = order_row("671-0001", "Dana", "050-1", "הושלם");
    note["סוג מסמך"] = json!("תעודת משלוח");
    note["מספר הזמנה מקושר"] = json!("620-0003");
    transport
        .push_json(success(json!([order_row("620-0003", "Dana", "050-1", "הושלם")])))
        .push_json(success(json!([note])));
    let after = dashboard.reload().await.expect("follow-up load");

    assert_eq!(after.orders[0].status, DocumentStatus::Closed);
    assert_eq!(after.delivery_notes.len(), 1);
    assert_eq!(
        after.delivery_notes[0].linked_order.as_deref(),
        Some("620-0003")
    );
    assert_eq!(after.kpis.closed_orders, 1);
    assert_eq!(after.customers.len(), 1);
    assert_eq!(after.customers[0].document_count, 2);
    assert_eq!(transport.remaining(), 0);
}

#[tokio::test]
async fn failed_status_update_leaves_the_delivery_note_behind() {
    let transport = ScriptedTransport::new();
    let sleeper = RecordingSleeper::default();
    let dashboard = DashboardState::new(
        common::repository(&transport, &sleeper),
        MissingPhonePolicy::Skip,
    );

    transport
        .push_json(success(json!([order_row("620-0003", "Dana", "050-1", "בטיפול")])))
        .push_json(success(json!([])));
    let snapshot = dashboard.reload().await.expect("initial load");

    transport
        .push_json(success(json!(null)))
        .push_json(json!({ "success": false, "message": "Sheet is locked" }));
    let err = convert_order_to_delivery_note(dashboard.repository(), &snapshot, "620-0003")
        .await
        .expect_err("status update should fail");

    match err {
        ServiceError::PartialConversion {
            order,
            delivery_note,
            message,
        } => {
            assert_eq!(order, "620-0003");
            assert_eq!(delivery_note, "671-0001");
            assert!(message.contains("Sheet is locked"));
        }
        other => panic!("expected partial conversion, got {other:?}"),
    }
    let actions: Vec<_> = transport
        .requests()
        .iter()
        .filter_map(Recorded::action)
        .collect();
    assert_eq!(
        actions,
        ["getOrders", "getDeliveryNotes", "addDeliveryNote", "updateOrderStatus"]
    );
}

#[tokio::test]
async fn rate_limited_write_surfaces_as_unavailable() {
    let transport = ScriptedTransport::new();
    for _ in 0..6 {
        transport.push_json(rate_limited());
    }
    let sleeper = RecordingSleeper::default();
    let repo = common::repository(&transport, &sleeper);

    let err = repo
        .update_order_status(&StatusUpdate::new("620-0001", DocumentStatus::Urgent))
        .await
        .map_err(ServiceError::from)
        .expect_err("quota never recovers");

    assert!(matches!(err, ServiceError::Unavailable(_)));
    assert_eq!(sleeper.delays(), vec![1, 2, 4, 8, 16]);
}

#[tokio::test]
async fn failed_reload_keeps_the_previous_snapshot() {
    let transport = ScriptedTransport::new();
    let sleeper = RecordingSleeper::default();
    let dashboard = DashboardState::new(
        common::repository(&transport, &sleeper),
        MissingPhonePolicy::Skip,
    );

    transport
        .push_json(success(json!([order_row("620-0001", "Avi", "052-9", "דחוף")])))
        .push_json(success(json!([])));
    let first = dashboard.reload().await.expect("initial load");

    transport
        .push_json(success(json!([])))
        .push_json(json!({ "success": false, "message": "Sheet missing" }));
    let err = dashboard.reload().await.expect_err("notes read fails");

    assert!(matches!(err, ServiceError::Remote(message) if message == "Sheet missing"));
    let current = dashboard.snapshot();
    assert_eq!(current.generation, first.generation);
    assert_eq!(current.orders.len(), 1);
    assert_eq!(current.kpis.urgent_orders, 1);
}
