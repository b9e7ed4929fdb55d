//! Normalized statement transaction (bank-agnostic output of the decoders).

use serde::{Deserialize, Serialize};

/// One decoded statement row.
///
/// Every field is carried as the bank exported it: the date stays
/// `DD/MM/YYYY`, amounts stay unparsed text (empty when the column was
/// empty). Decoders fill the last four fields only for transaction types
/// whose description follows a known sub-grammar; everything else passes
/// through with the raw description as the merchant and empty placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedTransaction {
    pub date: String,
    pub merchant: String,
    /// Money out of the account, as exported.
    pub debit: String,
    /// Money into the account, as exported.
    pub credit: String,
    /// Running balance after this transaction.
    pub balance: String,
    pub transaction_type: String,
    /// `DD/MM` fragment embedded in the description.
    pub effective_date: String,
    /// `HH:MM` fragment embedded in the description, when present.
    pub effective_time: String,
    pub location: String,
}
