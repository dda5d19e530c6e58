//! Integration tests for the credit ledgers.

use common::JobKey;
use ledger::{CreditLedger, CustomerId, DerivedCreditLedger, InMemoryCreditLedger, Money};

async fn assert_split<L: CreditLedger>(ledger: &L, customer: &str, total: f64, open: f64) {
    let id = CustomerId::parse(customer).unwrap();
    let total = Money::from_f64(total).unwrap();
    let result = ledger
        .deduct_credit(&id, total, JobKey::new(1))
        .await
        .unwrap();
    assert_eq!(result.open, Money::from_f64(open).unwrap());
    assert_eq!(result.deducted + result.open, total);
}

#[tokio::test]
async fn test_partial_credit_leaves_open_amount() {
    assert_split(&DerivedCreditLedger::new(), "customer-50", 70.0, 20.0).await;
    assert_split(&InMemoryCreditLedger::new(), "customer-50", 70.0, 20.0).await;
}

#[tokio::test]
async fn test_sufficient_credit_covers_order() {
    assert_split(&DerivedCreditLedger::new(), "customer-80", 70.0, 0.0).await;
    assert_split(&InMemoryCreditLedger::new(), "customer-80", 70.0, 0.0).await;
}

#[tokio::test]
async fn test_fractional_totals_split_exactly() {
    assert_split(&DerivedCreditLedger::new(), "customer-50", 70.1, 20.1).await;
    assert_split(&DerivedCreditLedger::new(), "customer-33", 0.3, 0.0).await;
}

#[tokio::test]
async fn test_ledgers_are_usable_as_trait_objects() {
    let ledgers: Vec<Box<dyn CreditLedger>> = vec![
        Box::new(DerivedCreditLedger::new()),
        Box::new(InMemoryCreditLedger::new()),
    ];
    let id = CustomerId::parse("customer-99").unwrap();

    for ledger in &ledgers {
        assert_eq!(
            ledger.customer_credit(&id).await.unwrap(),
            Money::from_units(99)
        );
    }
}

#[tokio::test]
async fn test_concurrent_redeliveries_deduct_once() {
    let ledger = InMemoryCreditLedger::new();
    let id = CustomerId::parse("customer-90").unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let ledger = ledger.clone();
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            ledger
                .deduct_credit(&id, Money::from_units(40), JobKey::new(11))
                .await
                .unwrap()
        }));
    }

    for handle in handles {
        let result = handle.await.unwrap();
        assert_eq!(result.deducted, Money::from_units(40));
    }
    assert_eq!(ledger.deduction_count().await, 1);
    assert_eq!(
        ledger.customer_credit(&id).await.unwrap(),
        Money::from_units(50)
    );
}
