/// billing grid - roster state, clock control and the json view
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use dance_billing::{
    BillingConfig, BillingGridView, GridQuery, InMemoryRepository, Money, PaymentDraft,
    PaymentMethod, SafeTimeProvider, SchoolState, Student, TimeSource, YearMonth,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== billing grid example ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2025, 3, 15, 10, 0, 0).unwrap()
    ));
    let controller = time.test_control().unwrap();

    let ana = Student::builder()
        .name("Ana")
        .monthly_fee(Money::from_major(25))
        .enrolled_on(NaiveDate::from_ymd_opt(2024, 9, 1).unwrap())
        .build()?;
    let pablo = Student::builder()
        .name("Pablo")
        .monthly_fee(Money::from_major(19))
        .enrolled_on(NaiveDate::from_ymd_opt(2025, 2, 3).unwrap())
        .build()?;
    let (ana_id, pablo_id) = (ana.id, pablo.id);

    let mut repo = InMemoryRepository::with_students([ana, pablo]);
    let mut state = SchoolState::load(&repo, BillingConfig::default())?;

    // ana pays january in two goes, pablo skips february
    for (amount, day) in [(10, 8), (15, 22)] {
        let draft = PaymentDraft::monthly_fee(
            ana_id,
            Money::from_major(amount),
            NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            PaymentMethod::Cash,
            "Enero",
        );
        state.record_payment(&mut repo, draft, &time)?;
    }

    // pablo is exempt in august
    let august = YearMonth::new(2025, 7)?;
    state.set_fee_exception(&mut repo, pablo_id, august, Some(Money::ZERO))?;

    let query = GridQuery::year(2025);
    let summary = state.billing_summary(&query, &time);
    println!("pending on {}: {}", time.now().format("%Y-%m-%d"), summary.total_pending_debt);
    for debtor in &summary.debtors {
        println!("  {} owes {} over {} months", debtor.name, debtor.debt, debtor.open_months.len());
    }

    // a month later april joins the debt horizon
    controller.advance(Duration::days(31));
    let summary = state.billing_summary(&query, &time);
    println!("\npending on {}: {}", time.now().format("%Y-%m-%d"), summary.total_pending_debt);

    let view = BillingGridView::from_summary(&summary, state.config());
    println!("\n{}", view.to_json_pretty()?);

    for event in state.events.take_events() {
        println!("event: {:?}", event);
    }

    Ok(())
}
