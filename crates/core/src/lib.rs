//! Core ledger engine for Ledgerline.
//!
//! This crate contains the transaction engine with ZERO web or database
//! dependencies. Persistence is reached through the [`ledger::LedgerStore`]
//! trait, implemented by the db crate.
//!
//! # Modules
//!
//! - `ledger` - Direction validation, debt discharge, atomic writes, retries
//!   and the parallel write harness

pub mod ledger;
