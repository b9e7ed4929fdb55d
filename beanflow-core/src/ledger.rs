//! Render normalized transactions as beancount-style ledger text.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};

use crate::classifier::Classifier;
use crate::statement::NormalizedTransaction;

/// Account used when no pattern matches a merchant. Grep for it later.
pub const DEFAULT_UNKNOWN_ACCOUNT: &str = "Expenses:TODO";

pub const DEFAULT_CURRENCY: &str = "AUD";

/// Turns a chronological transaction stream into ledger text, inserting a
/// balance assertion at every month boundary and after the final row.
///
/// Callers must supply transactions oldest-first; the assertions track the
/// last seen running balance and misreport it otherwise.
pub struct LedgerEmitter<'a> {
    classifier: &'a Classifier,
    bank_account: String,
    unknown_account: String,
    currency: String,
}

impl<'a> LedgerEmitter<'a> {
    pub fn new(classifier: &'a Classifier, bank_account: impl Into<String>) -> Self {
        LedgerEmitter {
            classifier,
            bank_account: bank_account.into(),
            unknown_account: DEFAULT_UNKNOWN_ACCOUNT.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    pub fn unknown_account(mut self, account: impl Into<String>) -> Self {
        self.unknown_account = account.into();
        self
    }

    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Render the whole stream. An empty stream renders to an empty string:
    /// no transactions, no balance assertions.
    pub fn emit(&self, transactions: &[NormalizedTransaction]) -> Result<String> {
        let mut out = String::new();
        let mut current_month: Option<(i32, u32)> = None;
        let mut held_balance: Option<String> = None;
        let mut last_date: Option<String> = None;

        for txn in transactions {
            let date = NaiveDate::parse_from_str(&txn.date, "%d/%m/%Y")
                .with_context(|| format!("bad transaction date `{}`", txn.date))?;
            let date_str = date.format("%Y-%m-%d").to_string();

            // On entering a new month, assert the closing balance of the
            // previous one, dated at the new month's first transaction.
            // The first month has no previous balance and gets no assertion.
            let month = (date.year(), date.month());
            if current_month != Some(month) {
                current_month = Some(month);
                if let Some(balance) = &held_balance {
                    out.push_str(&self.balance_entry(&date_str, balance));
                }
            }
            held_balance = Some(txn.balance.clone());

            out.push_str(&self.transaction_entry(&date_str, txn));
            last_date = Some(date_str);
        }

        // Terminal assertion: the state of the account after the whole run.
        if let (Some(date_str), Some(balance)) = (last_date, held_balance) {
            out.push_str(&self.balance_entry(&date_str, &balance));
        }

        Ok(out)
    }

    fn balance_entry(&self, date_str: &str, balance: &str) -> String {
        format!(
            "{} balance {}      {} {}\n\n",
            date_str, self.bank_account, balance, self.currency
        )
    }

    fn transaction_entry(&self, date_str: &str, txn: &NormalizedTransaction) -> String {
        let narration = [
            txn.merchant.as_str(),
            txn.location.as_str(),
            txn.transaction_type.as_str(),
            txn.effective_date.as_str(),
            txn.effective_time.as_str(),
        ]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        let account = self
            .classifier
            .match_account(&txn.merchant)
            .unwrap_or(self.unknown_account.as_str());

        let mut entry = format!("{} * \"{}\"\n", date_str, narration);
        if !txn.debit.is_empty() {
            // money out: the counter-account carries the amount, the bank
            // side is implied to balance
            entry.push_str(&format!("    {}\n", self.bank_account));
            entry.push_str(&self.posting(account, &txn.debit));
        } else {
            // money in: the bank side carries the amount
            entry.push_str(&self.posting(&self.bank_account, &txn.credit));
            entry.push_str(&format!("    {}\n", account));
        }
        entry.push('\n');
        entry
    }

    fn posting(&self, account: &str, amount: &str) -> String {
        let amount: f64 = amount.trim().parse().unwrap_or(0.0);
        format!("    {:<46} {:>10.2} {}\n", account, amount, self.currency)
    }
}
