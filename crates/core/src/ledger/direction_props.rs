//! Property-based tests for direction validation.
//!
//! - Matching signs are always accepted, mismatched signs always rejected
//! - Unknown operation types are always rejected
//! - Validation is a pure function of its input

use ledgerline_shared::types::{Direction, OperationTypeId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::direction::OperationTypes;
use super::error::LedgerError;

/// Strategy to generate non-zero amounts in cents (-10,000.00 to 10,000.00).
fn nonzero_amount() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2)),
        (1i64..1_000_000i64).prop_map(|cents| Decimal::new(-cents, 2)),
    ]
}

/// Strategy to generate a known operation type ID from the standard table.
fn known_type() -> impl Strategy<Value = i32> {
    1i32..=4
}

/// Strategy to generate an operation type ID outside the standard table.
fn unknown_type() -> impl Strategy<Value = i32> {
    prop_oneof![i32::MIN..=0, 5i32..=i32::MAX]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Accepted iff the sign of the amount equals the declared direction.
    #[test]
    fn prop_sign_decides_acceptance(
        operation_type in known_type(),
        amount in nonzero_amount(),
    ) {
        let types = OperationTypes::standard();
        let id = OperationTypeId::new(operation_type);
        let declared = types.direction_of(id).unwrap();

        match types.validate(id, amount) {
            Ok(direction) => {
                prop_assert_eq!(direction, declared);
                prop_assert_eq!(Direction::of(amount), declared);
            }
            Err(LedgerError::DirectionMismatch { expected, .. }) => {
                prop_assert_eq!(expected, declared);
                prop_assert_ne!(Direction::of(amount), declared);
            }
            Err(other) => prop_assert!(false, "unexpected error {other:?}"),
        }
    }

    /// Unknown IDs fail regardless of amount.
    #[test]
    fn prop_unknown_type_rejected(
        operation_type in unknown_type(),
        amount in nonzero_amount(),
    ) {
        let types = OperationTypes::standard();
        let result = types.validate(OperationTypeId::new(operation_type), amount);
        prop_assert!(matches!(result, Err(LedgerError::UnknownOperationType(_))));
    }

    /// Two calls with identical input give identical results.
    #[test]
    fn prop_validation_is_idempotent(
        operation_type in -2i32..8,
        amount in nonzero_amount(),
    ) {
        let types = OperationTypes::standard();
        let id = OperationTypeId::new(operation_type);
        let first = types.validate(id, amount).map_err(|e| e.to_string());
        let second = types.validate(id, amount).map_err(|e| e.to_string());
        prop_assert_eq!(first, second);
    }
}
