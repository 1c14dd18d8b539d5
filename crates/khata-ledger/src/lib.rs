//! # khata-ledger
//!
//! The money ledger shared by business and private accounts: immutable
//! [`LedgerTransaction`] records with a one-way settle transition, and
//! pure aggregation folds for balances, debtor ranking, and totals.
//! All arithmetic is exact decimal.

#![deny(missing_docs)]

pub mod balance;
pub mod transaction;

pub use balance::{
    counterparty_balances, summary, top_debtors, CounterpartyBalance, LedgerSummary,
    TOP_DEBTORS_LIMIT,
};
pub use transaction::{
    LedgerError, LedgerTransaction, NewTransaction, TransactionKind, TransactionSource,
};
