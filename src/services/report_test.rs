use super::*;
use crate::services::fault::{FaultSeverity, FaultStatus};
use crate::services::job_card::JobCardStatus;
use crate::services::maintenance::MaintenanceStatus;

fn vehicle(category: VehicleCategory, status: VehicleStatus, odometer_km: i64) -> Vehicle {
    Vehicle {
        id: Uuid::new_v4(),
        fleet_number: format!("V-{}", Uuid::new_v4().simple()),
        registration: format!("R-{}", Uuid::new_v4().simple()),
        make: "Scania".into(),
        model: "R460".into(),
        year: Some(2020),
        category,
        status,
        odometer_km,
        created_at: "2026-01-01 00:00:00".into(),
    }
}

fn fault(severity: FaultSeverity, status: FaultStatus) -> Fault {
    Fault {
        id: Uuid::new_v4(),
        vehicle_id: Uuid::new_v4(),
        inspection_id: None,
        job_card_id: None,
        title: "fault".into(),
        description: None,
        severity,
        status,
        reported_by: "tester".into(),
        created_at: "2026-08-01 00:00:00".into(),
    }
}

fn card(priority: JobCardPriority, status: JobCardStatus) -> JobCard {
    JobCard {
        id: Uuid::new_v4(),
        vehicle_id: Uuid::new_v4(),
        number: "JC-1".into(),
        title: "card".into(),
        description: None,
        priority,
        status,
        assigned_to: None,
        opened_on: "2026-08-01".into(),
        closed_on: None,
    }
}

#[test]
fn vehicle_counts_cover_all_buckets_with_zeroes() {
    let vehicles = vec![
        vehicle(VehicleCategory::Horse, VehicleStatus::Active, 100),
        vehicle(VehicleCategory::Horse, VehicleStatus::InWorkshop, 200),
        vehicle(VehicleCategory::Bakkie, VehicleStatus::Active, 300),
    ];
    let counts = vehicle_counts(&vehicles);
    assert_eq!(counts.total, 3);
    assert_eq!(counts.by_category["horse"], 2);
    assert_eq!(counts.by_category["bakkie"], 1);
    assert_eq!(counts.by_category["reefer"], 0);
    assert_eq!(counts.by_category["interlink"], 0);
    assert_eq!(counts.by_category["ridget"], 0);
    assert_eq!(counts.by_status["active"], 2);
    assert_eq!(counts.by_status["in_workshop"], 1);
    assert_eq!(counts.by_status["decommissioned"], 0);
}

#[test]
fn fault_counts_only_include_active() {
    let faults = vec![
        fault(FaultSeverity::Critical, FaultStatus::Open),
        fault(FaultSeverity::Minor, FaultStatus::InProgress),
        fault(FaultSeverity::Critical, FaultStatus::Resolved),
    ];
    let counts = fault_counts(&faults);
    assert_eq!(counts.active, 2);
    assert_eq!(counts.active_by_severity["critical"], 1);
    assert_eq!(counts.active_by_severity["minor"], 1);
    assert_eq!(counts.active_by_severity["major"], 0);
}

#[test]
fn job_card_counts_only_include_open() {
    let cards = vec![
        card(JobCardPriority::Urgent, JobCardStatus::Open),
        card(JobCardPriority::Low, JobCardStatus::InProgress),
        card(JobCardPriority::Urgent, JobCardStatus::Completed),
        card(JobCardPriority::High, JobCardStatus::Cancelled),
    ];
    let counts = job_card_counts(&cards);
    assert_eq!(counts.open, 2);
    assert_eq!(counts.open_by_priority["urgent"], 1);
    assert_eq!(counts.open_by_priority["low"], 1);
    assert_eq!(counts.open_by_priority["high"], 0);
}

#[test]
fn low_stock_counts_items_at_or_below_minimum() {
    let item = |quantity, min_quantity| InventoryItem {
        id: Uuid::new_v4(),
        name: "part".into(),
        part_number: format!("P-{}", Uuid::new_v4().simple()),
        quantity,
        min_quantity,
        unit_cost_cents: 0,
        location: None,
    };
    let items = vec![item(0, 1), item(5, 5), item(6, 5)];
    assert_eq!(low_stock_count(&items), 2);
}

#[test]
fn due_maintenance_uses_vehicle_odometers() {
    let truck = Uuid::new_v4();
    let trailer = Uuid::new_v4();
    let entries = vec![
        ScheduledMaintenance {
            id: Uuid::new_v4(),
            vehicle_id: truck,
            task: "service".into(),
            due_on: None,
            due_odometer_km: Some(100_000),
            status: MaintenanceStatus::Scheduled,
            completed_on: None,
        },
        ScheduledMaintenance {
            id: Uuid::new_v4(),
            vehicle_id: trailer,
            task: "brake check".into(),
            due_on: Some("2026-09-01".into()),
            due_odometer_km: None,
            status: MaintenanceStatus::Scheduled,
            completed_on: None,
        },
    ];
    let odometers: HashMap<Uuid, i64> = [(truck, 120_000), (trailer, 10_000)].into();

    assert_eq!(due_maintenance_count(&entries, &odometers, "2026-08-07"), 1);
    assert_eq!(due_maintenance_count(&entries, &odometers, "2026-09-01"), 2);
}

#[test]
fn tyre_counts_by_status() {
    let tyre = |status| Tyre {
        id: Uuid::new_v4(),
        serial: format!("S-{}", Uuid::new_v4().simple()),
        brand: "b".into(),
        size: "s".into(),
        tread_depth_mm: None,
        status,
        created_at: "2026-01-01 00:00:00".into(),
    };
    let tyres = vec![
        tyre(TyreStatus::Fitted),
        tyre(TyreStatus::Fitted),
        tyre(TyreStatus::InStore),
        tyre(TyreStatus::Scrapped),
    ];
    let counts = tyre_counts(&tyres);
    assert_eq!(counts.fitted, 2);
    assert_eq!(counts.in_store, 1);
    assert_eq!(counts.scrapped, 1);
}

#[test]
fn dashboard_summary_serializes_stable_shape() {
    let summary = DashboardSummary {
        vehicles: vehicle_counts(&[]),
        faults: fault_counts(&[]),
        job_cards: job_card_counts(&[]),
        low_stock_items: 0,
        maintenance_due: 0,
        tyres: tyre_counts(&[]),
    };
    let json = serde_json::to_value(&summary).expect("serialize");
    assert_eq!(json["vehicles"]["total"], 0);
    assert_eq!(json["vehicles"]["by_category"].as_object().map(serde_json::Map::len), Some(5));
    assert_eq!(json["faults"]["active"], 0);
    assert_eq!(json["job_cards"]["open_by_priority"].as_object().map(serde_json::Map::len), Some(4));
}
