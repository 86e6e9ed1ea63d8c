/// dashboard - revenue against costs for a year loaded from a json snapshot
use chrono::{NaiveDate, TimeZone, Utc};
use dance_billing::{
    BillingConfig, Cost, CostCategory, DashboardView, InMemoryRepository, Money, SafeTimeProvider,
    SchoolState, TimeSource,
};
use tracing_subscriber::EnvFilter;

const SNAPSHOT: &str = r#"{
    "students": [
        { "id": "6f1c2a4e-0d7b-4c53-9a51-2f7a1f0e9b11", "name": "Lucía",
          "enrollmentDate": "2025-01-10", "monthlyFee": "19", "feeExceptions": { "2025-7": "0" } },
        { "id": "0b9e8f3c-5a8d-4f0c-8d7e-1c2b3a4d5e6f", "name": "Marta",
          "enrollmentDate": "15/09/2024", "deactivationDate": "2025-04-30", "monthlyFee": "30" }
    ],
    "payments": [
        { "id": "a3d1e8c7-6b5a-4f3e-9d2c-1b0a9f8e7d6c", "studentId": "6f1c2a4e-0d7b-4c53-9a51-2f7a1f0e9b11",
          "amount": "19", "date": "2025-01-04", "paymentMethod": "Transferencia", "concept": "Cuota Enero 2025" },
        { "id": "c4e2f9d8-7c6b-4a5f-8e3d-2c1b0a9f8e7d", "studentId": "6f1c2a4e-0d7b-4c53-9a51-2f7a1f0e9b11",
          "amount": "19", "date": "2025-02-03", "paymentMethod": "Bizum", "concept": "Cuota Febrero 2025" },
        { "id": "d5f3a0e9-8d7c-4b6a-9f4e-3d2c1b0a9f8e", "studentId": "0b9e8f3c-5a8d-4f0c-8d7e-1c2b3a4d5e6f",
          "amount": "30", "date": "2025-01-07", "paymentMethod": "Efectivo", "concept": "Cuota Enero 2025" }
    ]
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    println!("=== dashboard example ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
    ));

    let mut repo = InMemoryRepository::from_snapshot_json(SNAPSHOT)?;
    let mut state = SchoolState::load(&repo, BillingConfig::default())?;

    // studio rent every month of the year
    let rent = Cost::new(
        NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        CostCategory::Rent,
        Money::from_major(450),
        "Local Calle Mayor",
    )?;
    state.record_cost(&mut repo, rent, 11)?;

    let summary = state.dashboard(2025, &time);
    println!("active students: {}", summary.active_students);
    println!("revenue: {}  costs: {}  net: {}", summary.total_revenue, summary.total_costs, summary.net_result);
    println!("collection rate: {}", summary.collection_rate);

    let view = DashboardView::from_summary(&summary, state.config());
    println!("\n{}", view.to_json_pretty()?);

    Ok(())
}
