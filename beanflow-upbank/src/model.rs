//! Typed subset of the Up Bank API payloads.
//!
//! Only the attributes the converter reads are modeled; the rest of the
//! payload is ignored on deserialize.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Held,
    Settled,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Held => "HELD",
            TransactionStatus::Settled => "SETTLED",
        }
    }
}

/// A monetary amount as the API reports it: a signed decimal string plus
/// integer base units. Spending is negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub currency_code: String,
    pub value: String,
    pub value_in_base_units: i64,
}

impl Money {
    /// Lenient decimal parse; malformed values count as zero.
    pub fn value_f64(&self) -> f64 {
        self.value.trim().parse().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionAttributes {
    pub status: TransactionStatus,
    pub raw_text: Option<String>,
    pub description: String,
    pub message: Option<String>,
    pub amount: Money,
    pub created_at: DateTime<FixedOffset>,
    pub settled_at: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationshipId {
    pub id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Relationship {
    pub data: Option<RelationshipId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationships {
    #[serde(default)]
    pub category: Relationship,
    #[serde(default)]
    pub parent_category: Relationship,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub attributes: TransactionAttributes,
    #[serde(default)]
    pub relationships: Relationships,
}

impl Transaction {
    /// `parent:child` category path, or empty when either side is missing.
    pub fn category_path(&self) -> String {
        match (
            &self.relationships.parent_category.data,
            &self.relationships.category.data,
        ) {
            (Some(parent), Some(child)) => format!("{}:{}", parent.id, child.id),
            _ => String::new(),
        }
    }
}

/// One page of a paginated listing; `links.next` carries the cursor.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub links: PageLinks,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageLinks {
    pub prev: Option<String>,
    pub next: Option<String>,
}
