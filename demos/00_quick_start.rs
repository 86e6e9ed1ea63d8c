/// quick start - one student, one payment, one status
use chrono::NaiveDate;
use dance_billing::{format_currency, month_status_for, BillingConfig, Money, PaymentDraft, PaymentMethod, Student};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = BillingConfig::default();

    // a student paying 19€ a month since january
    let lucia = Student::builder()
        .name("Lucía")
        .monthly_fee(Money::from_major(19))
        .enrolled_on(NaiveDate::from_ymd_opt(2025, 1, 10).unwrap())
        .build()?;

    // march fee paid by bizum
    let draft = PaymentDraft::monthly_fee(
        lucia.id,
        Money::from_major(19),
        NaiveDate::from_ymd_opt(2025, 3, 12).unwrap(),
        PaymentMethod::Bizum,
        "Marzo",
    );
    draft.validate()?;
    let payments = vec![draft.into_payment()];

    let today = NaiveDate::from_ymd_opt(2025, 5, 20).unwrap();
    for month_index in 0..6 {
        let status = month_status_for(&lucia, 2025, month_index, &payments, today)?;
        println!("month {:>2}: {:<10} {:?}", month_index, status.label(&config), status.tone());
    }

    println!("paid so far: {}", format_currency(payments[0].amount, 2));

    Ok(())
}
