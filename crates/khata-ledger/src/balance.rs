//! # Balance Aggregation
//!
//! Pure folds over transaction slices. Balances accumulate exact
//! decimals into per-name buckets; bucket order is first appearance in
//! the input, which doubles as the documented tie-break everywhere the
//! rows are ranked.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::transaction::LedgerTransaction;

/// How many rows [`top_debtors`] returns.
pub const TOP_DEBTORS_LIMIT: usize = 5;

/// Net position of one counterparty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterpartyBalance {
    /// Display name (counterparty, else merchant, else "Unknown").
    pub name: String,
    /// Sum of signed amounts. Positive: they owe the owner.
    pub balance: Decimal,
    /// Number of transactions in the bucket.
    pub transaction_count: usize,
}

/// Owner-level totals across a transaction set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerSummary {
    /// Sum of incoming amounts (CREDIT/LENT).
    pub total_receivable: Decimal,
    /// Sum of outgoing amounts (DEBIT/BORROWED).
    pub total_payable: Decimal,
    /// `total_receivable - total_payable`.
    pub net_balance: Decimal,
}

/// Accumulate per-counterparty net balances.
///
/// Every bucket is emitted, zero and negative included. With
/// `include_settled` false, settled transactions are skipped entirely.
pub fn counterparty_balances<'a, I>(transactions: I, include_settled: bool) -> Vec<CounterpartyBalance>
where
    I: IntoIterator<Item = &'a LedgerTransaction>,
{
    let mut rows: Vec<CounterpartyBalance> = Vec::new();
    for tx in transactions {
        if !include_settled && tx.is_settled() {
            continue;
        }
        let name = tx.display_name();
        match rows.iter_mut().find(|row| row.name == name) {
            Some(row) => {
                row.balance += tx.signed_amount();
                row.transaction_count += 1;
            }
            None => rows.push(CounterpartyBalance {
                name: name.to_owned(),
                balance: tx.signed_amount(),
                transaction_count: 1,
            }),
        }
    }
    rows
}

/// The five largest strictly-positive balances, descending. Stable
/// sort, so equal balances keep first-appearance order.
pub fn top_debtors<'a, I>(transactions: I) -> Vec<CounterpartyBalance>
where
    I: IntoIterator<Item = &'a LedgerTransaction>,
{
    let mut rows: Vec<CounterpartyBalance> = counterparty_balances(transactions, true)
        .into_iter()
        .filter(|row| row.balance > Decimal::ZERO)
        .collect();
    rows.sort_by(|a, b| b.balance.cmp(&a.balance));
    rows.truncate(TOP_DEBTORS_LIMIT);
    rows
}

/// Owner-level receivable/payable/net totals.
pub fn summary<'a, I>(transactions: I) -> LedgerSummary
where
    I: IntoIterator<Item = &'a LedgerTransaction>,
{
    let mut total_receivable = Decimal::ZERO;
    let mut total_payable = Decimal::ZERO;
    for tx in transactions {
        if tx.kind.is_incoming() {
            total_receivable += tx.amount;
        } else {
            total_payable += tx.amount;
        }
    }
    LedgerSummary {
        total_receivable,
        total_payable,
        net_balance: total_receivable - total_payable,
    }
}
