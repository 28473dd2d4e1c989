//! Operation type table and direction validation.
//!
//! Every operation type declares the sign its amounts must carry. The table
//! is built once at startup (from configuration or [`OperationTypes::standard`])
//! and shared by reference; validation never touches the store.

use std::collections::HashMap;

use ledgerline_shared::{
    config::{OperationTypeConfig, default_operation_types},
    types::{Direction, OperationTypeId},
};
use rust_decimal::Decimal;

use super::error::LedgerError;

/// One known operation type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationType {
    /// Operation type ID.
    pub id: OperationTypeId,
    /// Human readable name.
    pub description: String,
    /// Required sign of amounts.
    pub direction: Direction,
}

/// Immutable mapping from operation type ID to its direction.
#[derive(Debug, Clone)]
pub struct OperationTypes {
    types: HashMap<OperationTypeId, OperationType>,
    debit_ids: Vec<OperationTypeId>,
}

impl OperationTypes {
    /// Builds a table from a list of operation types.
    ///
    /// A later entry with the same ID replaces an earlier one.
    #[must_use]
    pub fn new(types: impl IntoIterator<Item = OperationType>) -> Self {
        let types: HashMap<_, _> = types.into_iter().map(|t| (t.id, t)).collect();
        let mut debit_ids: Vec<_> = types
            .values()
            .filter(|t| t.direction == Direction::Debit)
            .map(|t| t.id)
            .collect();
        debit_ids.sort_unstable();

        Self { types, debit_ids }
    }

    /// The standard table: purchases and withdrawals debit, vouchers credit.
    #[must_use]
    pub fn standard() -> Self {
        Self::from_config(&default_operation_types())
    }

    /// Builds a table from configuration rows.
    #[must_use]
    pub fn from_config(rows: &[OperationTypeConfig]) -> Self {
        Self::new(rows.iter().map(|row| OperationType {
            id: OperationTypeId::new(row.id),
            description: row.description.clone(),
            direction: row.direction,
        }))
    }

    /// Looks up an operation type.
    #[must_use]
    pub fn get(&self, id: OperationTypeId) -> Option<&OperationType> {
        self.types.get(&id)
    }

    /// Returns the direction of an operation type.
    #[must_use]
    pub fn direction_of(&self, id: OperationTypeId) -> Option<Direction> {
        self.get(id).map(|t| t.direction)
    }

    /// IDs of all debit operation types, ascending.
    #[must_use]
    pub fn debit_type_ids(&self) -> &[OperationTypeId] {
        &self.debit_ids
    }

    /// Number of known operation types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Checks that `amount` carries the sign required by `operation_type`.
    ///
    /// Returns the operation type's direction on success.
    ///
    /// # Errors
    ///
    /// - `UnknownOperationType` if the ID is not in the table
    /// - `DirectionMismatch` if the sign of `amount` disagrees
    pub fn validate(
        &self,
        operation_type: OperationTypeId,
        amount: Decimal,
    ) -> Result<Direction, LedgerError> {
        let expected = self
            .direction_of(operation_type)
            .ok_or(LedgerError::UnknownOperationType(operation_type))?;

        if Direction::of(amount) != expected {
            return Err(LedgerError::DirectionMismatch {
                operation_type,
                amount,
                expected,
            });
        }

        Ok(expected)
    }
}

impl Default for OperationTypes {
    fn default() -> Self {
        Self::standard()
    }
}

/// Validates a transaction's direction against `types`.
///
/// Free-function form of [`OperationTypes::validate`].
///
/// # Errors
///
/// See [`OperationTypes::validate`].
pub fn validate_direction(
    types: &OperationTypes,
    operation_type: OperationTypeId,
    amount: Decimal,
) -> Result<Direction, LedgerError> {
    types.validate(operation_type, amount)
}
