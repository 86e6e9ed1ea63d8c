use chrono::{NaiveDate, TimeZone, Utc};
use dance_billing::billing::PaymentIndex;
use dance_billing::{
    format_currency, month_name, month_status, month_status_for, resolve_expected_fee, BillingConfig,
    GridQuery, InMemoryRepository, Money, MonthStatus, Payment, PaymentDraft, PaymentMethod,
    RosterAggregator, SafeTimeProvider, SchoolState, Student, TimeSource, YearMonth,
};
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn student(name: &str, fee: i64, enrolled: NaiveDate) -> Student {
    Student::builder()
        .name(name)
        .monthly_fee(Money::from_major(fee))
        .enrolled_on(enrolled)
        .build()
        .unwrap()
}

fn pay(student: &Student, amount: i64, on: NaiveDate) -> Payment {
    PaymentDraft {
        student_id: student.id,
        amount: Money::from_major(amount),
        date: on,
        payment_method: PaymentMethod::Cash,
        concept: "Cuota".to_string(),
        notes: None,
    }
    .into_payment()
}

#[test]
fn test_scenario_a_paid_month() {
    let s = student("Lucía", 19, date(2025, 1, 1));
    let payments = vec![pay(&s, 19, date(2025, 3, 12))];

    let status = month_status_for(&s, 2025, 2, &payments, date(2025, 6, 1)).unwrap();
    assert!(matches!(status, MonthStatus::Paid { .. }));
    assert_eq!(format_currency(Money::from_major(19), 2), "19,00€");
    assert_eq!(status.label(&BillingConfig::default()), "19,00€");
}

#[test]
fn test_scenario_b_exempt_month() {
    let s = Student::builder()
        .name("Lucía")
        .monthly_fee(Money::from_major(19))
        .enrolled_on(date(2025, 1, 1))
        .fee_exception(YearMonth::parse_key("2025-3").unwrap(), Money::ZERO)
        .build()
        .unwrap();

    let status = month_status_for(&s, 2025, 3, &[], date(2025, 6, 1)).unwrap();
    assert_eq!(status, MonthStatus::Exempt);
    assert_eq!(status.label(&BillingConfig::default()), "Exento");
}

#[test]
fn test_partial_payment_in_closed_month_owes_the_rest() {
    let s = student("Pablo", 25, date(2024, 9, 1));
    let payments = vec![pay(&s, 10, date(2025, 1, 9))];
    let today = date(2025, 3, 15);
    let january = YearMonth::new(2025, 0).unwrap();

    let status = month_status(&s, january, &payments, today);
    assert_eq!(
        status,
        MonthStatus::PartiallyPaid { paid: Money::from_major(10), expected: Money::from_major(25) }
    );
    assert_eq!(status.outstanding(), Money::from_major(15));

    let index = PaymentIndex::build(&payments);
    let owed = resolve_expected_fee(&s, january).saturating_sub(index.paid(s.id, january));
    assert_eq!(owed, Money::from_major(15));

    // january, february and march are due; only 10 of january is paid
    let debt = RosterAggregator::default().student_debt(&s, &payments, 2025, today);
    assert_eq!(debt, Money::from_major(65));
}

#[test]
fn test_closed_month_without_payment_is_unpaid() {
    let s = student("Pablo", 25, date(2024, 9, 1));
    let january = YearMonth::new(2025, 0).unwrap();

    let status = month_status(&s, january, &[], date(2025, 3, 15));
    assert_eq!(status, MonthStatus::Unpaid { expected: Money::from_major(25) });
    assert_eq!(status.label(&BillingConfig::default()), "Impagado");
}

#[test]
fn test_scenario_d_collection_rate() {
    let aggregator = RosterAggregator::default();
    let ana = student("Ana", 50, date(2025, 1, 1));
    let bea = student("Bea", 50, date(2025, 1, 1));

    // six months due for each: 600 expected, 500 received
    let mut payments = Vec::new();
    for month in 1..=5 {
        payments.push(pay(&ana, 50, date(2025, month, 2)));
        payments.push(pay(&bea, 50, date(2025, month, 2)));
    }

    let summary = aggregator.summarize(
        &[ana, bea],
        &payments,
        &GridQuery::year(2025),
        date(2025, 6, 20),
    );

    assert_eq!(summary.total_revenue, Money::from_major(500));
    assert_eq!(summary.total_pending_debt, Money::from_major(100));
    assert_eq!(summary.collection_rate.as_percentage().round_dp(1), dec!(83.3));
}

#[test]
fn test_scenario_e_deactivated_student() {
    let s = Student::builder()
        .name("Eva")
        .monthly_fee(Money::from_major(30))
        .enrolled_on(date(2024, 9, 1))
        .deactivated_on(date(2025, 6, 10))
        .build()
        .unwrap();
    assert!(!s.active);

    let payments = vec![pay(&s, 30, date(2025, 7, 3))];
    let status = month_status_for(&s, 2025, 6, &payments, date(2025, 9, 1)).unwrap();
    assert_eq!(status, MonthStatus::NotApplicable);
}

#[test]
fn test_grid_recomputed_after_payment() {
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2025, 4, 2, 9, 0, 0).unwrap(),
    ));
    let ana = student("Ana", 25, date(2025, 1, 1));
    let ana_id = ana.id;
    let mut repo = InMemoryRepository::with_students([ana]);
    let mut state = SchoolState::load(&repo, BillingConfig::default()).unwrap();

    let before = state.billing_summary(&GridQuery::year(2025), &time);
    assert_eq!(before.debtors.len(), 1);
    assert_eq!(before.total_pending_debt, Money::from_major(100));

    for month in 1..=4 {
        let draft = PaymentDraft::monthly_fee(
            ana_id,
            Money::from_major(25),
            date(2025, month, 1),
            PaymentMethod::DirectDebit,
            month_name(month - 1).unwrap(),
        );
        state.record_payment(&mut repo, draft, &time).unwrap();
    }

    let after = state.billing_summary(&GridQuery::year(2025), &time);
    assert!(after.debtors.is_empty());
    assert_eq!(after.collection_rate.as_percentage(), dec!(100));
    assert!(after.rows[0].cells[..4].iter().all(|c| c.status.is_settled()));
}

#[test]
fn test_snapshot_load_fails_closed_on_garbled_dates() {
    let json = r#"{
        "students": [
            { "id": "6f1c2a4e-0d7b-4c53-9a51-2f7a1f0e9b11", "name": "Lucía",
              "enrollmentDate": "2025-01-10", "monthlyFee": "19", "feeExceptions": { "2025-3": "0" } },
            { "id": "0b9e8f3c-5a8d-4f0c-8d7e-1c2b3a4d5e6f", "name": "Pablo",
              "enrollmentDate": "31/02/2025", "monthlyFee": "25" },
            { "id": "9c8b7a6d-5e4f-4a3b-8c2d-1e0f9a8b7c6d", "name": "Marta",
              "enrollmentDate": "2024-09-15", "deactivationDate": "30/02/2025", "monthlyFee": "30" }
        ],
        "payments": [
            { "id": "a3d1e8c7-6b5a-4f3e-9d2c-1b0a9f8e7d6c", "studentId": "6f1c2a4e-0d7b-4c53-9a51-2f7a1f0e9b11",
              "amount": "19", "date": "2025-01-04", "paymentMethod": "Transferencia", "concept": "Cuota Enero" }
        ]
    }"#;

    let repo = InMemoryRepository::from_snapshot_json(json).unwrap();
    let state = SchoolState::load(&repo, BillingConfig::default()).unwrap();
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2025, 5, 15, 0, 0, 0).unwrap(),
    ));

    let summary = state.billing_summary(&GridQuery::year(2025), &time);

    // pablo's garbled enrollment keeps him out of billing entirely
    let pablo = summary.rows.iter().find(|r| r.name == "Pablo").unwrap();
    assert!(pablo.cells.iter().all(|c| c.status == MonthStatus::NotApplicable));

    // a garbled deactivation date clears the enrollment as well
    let marta = state.students().iter().find(|s| s.name == "Marta").unwrap();
    assert!(marta.enrollment_date.is_none());
    let marta_row = summary.rows.iter().find(|r| r.name == "Marta").unwrap();
    assert!(marta_row.cells.iter().all(|c| c.status == MonthStatus::NotApplicable));

    // lucía: jan paid, feb/mar unpaid, apr exempt, may pending
    assert_eq!(summary.total_pending_debt, Money::from_major(57));
    assert_eq!(summary.debtors.len(), 1);
}
