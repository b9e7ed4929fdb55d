//! beanflow-upbank: Up Bank API client and raw-transaction ledger rendering.

pub mod client;
pub mod ledger;
pub mod model;

pub use client::{month_range, UpClient, BASE_URL, PAGE_SIZE};
pub use ledger::{to_ledger, unknown_report};
pub use model::{Page, PageLinks, Transaction, TransactionStatus};
