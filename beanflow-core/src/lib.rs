//! beanflow-core: merchant rules, classifier, and ledger text emission

pub mod classifier;
pub mod ledger;
pub mod rules;
pub mod statement;

pub use classifier::Classifier;
pub use ledger::{LedgerEmitter, DEFAULT_CURRENCY, DEFAULT_UNKNOWN_ACCOUNT};
pub use rules::{ConfigError, RuleSet, ACCOUNT_SEPARATOR};
pub use statement::NormalizedTransaction;
