//! Property-based tests for debt discharge.
//!
//! - Conservation: what the debts gain is exactly what the credit loses
//! - Balances move toward zero and never change sign
//! - Only the last touched debt may be left partially paid
//! - Debts after the stopping point are untouched

use ledgerline_shared::types::TransactionId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::discharge::allocate;
use super::types::OutstandingDebit;

/// Strategy to generate positive amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate an oldest-first list of outstanding debts.
fn debt_list() -> impl Strategy<Value = Vec<OutstandingDebit>> {
    prop::collection::vec(1i64..500_000i64, 0..12).prop_map(|cents| {
        cents
            .into_iter()
            .zip(1i64..)
            .map(|(c, id)| OutstandingDebit::new(TransactionId::new(id), Decimal::new(-c, 2)))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_discharge_conserves_money(
        credit in positive_amount(),
        debts in debt_list(),
    ) {
        let result = allocate(credit, &debts);

        let paid: Decimal = result
            .updates
            .iter()
            .zip(&debts)
            .map(|(update, debt)| update.balance - debt.balance)
            .sum();

        prop_assert_eq!(paid + result.remainder, credit);
        prop_assert!(result.remainder >= Decimal::ZERO);
    }

    #[test]
    fn prop_balances_move_toward_zero_without_flipping(
        credit in positive_amount(),
        debts in debt_list(),
    ) {
        let result = allocate(credit, &debts);

        for (update, debt) in result.updates.iter().zip(&debts) {
            prop_assert_eq!(update.id, debt.id);
            prop_assert!(update.balance <= Decimal::ZERO);
            prop_assert!(update.balance > debt.balance);
        }
    }

    #[test]
    fn prop_waterfall_shape(
        credit in positive_amount(),
        debts in debt_list(),
    ) {
        let result = allocate(credit, &debts);
        let touched = result.updates.len();

        // Every update but the last settles its debt completely.
        if touched > 1 {
            for update in &result.updates[..touched - 1] {
                prop_assert_eq!(update.balance, Decimal::ZERO);
            }
        }

        // A positive remainder means every debt was settled.
        if result.remainder > Decimal::ZERO {
            prop_assert_eq!(touched, debts.len());
            prop_assert!(result.updates.iter().all(|u| u.balance == Decimal::ZERO));
        }

        // A partially paid debt consumed the whole credit.
        if result.updates.last().is_some_and(|u| u.balance < Decimal::ZERO) {
            prop_assert_eq!(result.remainder, Decimal::ZERO);
        }
    }
}
