//! St George Bank CSV statement decoder.
//!
//! Export columns: Date, Description, Debit, Credit, Balance, then reserved
//! columns. For a dozen transaction types the description column packs a
//! second layer of fields at fixed character offsets:
//!
//!   Eftpos Purchase              01/0114:32 Aldi 104
//!   |type, 30 chars             |date |time |merchant...
//!
//! When the time stamp is absent the merchant sits at 36..56 and the
//! remainder is a location. Everything else (direct debits, transfers) is
//! free-form and passes through untouched.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use regex::Regex;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use beanflow_core::statement::NormalizedTransaction;

// Character offsets inside the description column. These are part of the
// bank's export format; changing any of them silently corrupts the merchant
// and location fields for every structured transaction type.
const TYPE_END: usize = 30;
const EFFECTIVE_DATE_END: usize = 35;
const TIME_END: usize = 40;
const TIMED_MERCHANT_START: usize = 41;
const MERCHANT_START: usize = 36;
const MERCHANT_END: usize = 56;
const LOCATION_START: usize = 57;

/// Embedded time stamp probe: `14:32 A...` at the character after the
/// effective date.
const TIME_PATTERN: &str = r"^\d\d:\d\d\s\S";

/// Transaction types whose description carries the fixed-width sub-grammar.
const STRUCTURED_TYPES: [&str; 12] = [
    "Eftpos Purchase",
    "Visa Purchase",
    "Visa Purchase O/Seas",
    "Visa Cash Advance",
    "Visa Credit",
    "Internet Withdrawal",
    "Atm Withdrawal",
    "Atm Withdrawal -Wbc",
    "Tfr Wdl BPAY Internet",
    "Eftpos Refund",
    "Eftpos Debit",
    "Osko Withdrawal",
];

fn is_structured(transaction_type: &str) -> bool {
    STRUCTURED_TYPES
        .iter()
        .any(|t| t.eq_ignore_ascii_case(transaction_type))
}

/// Character-based slice with python-style clamping; the description is
/// space-padded text and may stop short of any offset.
fn slice_chars(s: &str, start: usize, end: Option<usize>) -> String {
    let chars = s.chars().skip(start);
    match end {
        Some(end) => chars.take(end.saturating_sub(start)).collect(),
        None => chars.collect(),
    }
}

/// The fields recovered from one packed description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptionFields {
    pub transaction_type: String,
    pub effective_date: String,
    pub effective_time: String,
    pub merchant: String,
    pub location: String,
}

/// Split one packed description into its components.
///
/// Unknown transaction types produce a default (all-empty) value: the caller
/// keeps the raw description as the merchant. A failed time probe is not an
/// error either; it selects the no-time branch of the grammar.
pub fn decode_description(description: &str) -> Result<DescriptionFields> {
    let time_re = Regex::new(TIME_PATTERN)?;
    Ok(decode_with(description, &time_re))
}

fn decode_with(description: &str, time_re: &Regex) -> DescriptionFields {
    let transaction_type = slice_chars(description, 0, Some(TYPE_END))
        .trim()
        .to_string();
    if !is_structured(&transaction_type) {
        return DescriptionFields::default();
    }

    let effective_date = slice_chars(description, TYPE_END, Some(EFFECTIVE_DATE_END));
    let probe = slice_chars(description, EFFECTIVE_DATE_END, None);

    if time_re.is_match(&probe) {
        DescriptionFields {
            transaction_type,
            effective_date,
            effective_time: slice_chars(description, EFFECTIVE_DATE_END, Some(TIME_END)),
            merchant: slice_chars(description, TIMED_MERCHANT_START, None)
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" "),
            location: String::new(),
        }
    } else {
        DescriptionFields {
            transaction_type,
            effective_date,
            effective_time: String::new(),
            merchant: slice_chars(description, MERCHANT_START, Some(MERCHANT_END))
                .trim()
                .to_string(),
            location: slice_chars(description, LOCATION_START, None),
        }
    }
}

fn decode_row(row: &StringRecord, time_re: &Regex) -> NormalizedTransaction {
    let date = row.get(0).unwrap_or("").to_string();
    let description = row.get(1).unwrap_or("");
    let debit = row.get(2).unwrap_or("").to_string();
    let credit = row.get(3).unwrap_or("").to_string();
    let balance = row.get(4).unwrap_or("").to_string();

    let fields = decode_with(description, time_re);
    let merchant = if fields.transaction_type.is_empty() {
        // unstructured row: raw description straight through
        description.to_string()
    } else {
        fields.merchant
    };

    NormalizedTransaction {
        date,
        merchant,
        debit,
        credit,
        balance,
        transaction_type: fields.transaction_type,
        effective_date: fields.effective_date,
        effective_time: fields.effective_time,
        location: fields.location,
    }
}

/// True when the field holds a statement date rather than a column heading.
fn looks_like_date(field: &str) -> bool {
    NaiveDate::parse_from_str(field.trim(), "%d/%m/%Y").is_ok()
}

/// Decode a St George CSV export.
///
/// The export lists newest first; the result is reversed to oldest-first so
/// downstream balance tracking runs chronologically. Blank rows are skipped,
/// and a header row is dropped when the first row's date column does not
/// parse as `DD/MM/YYYY`.
pub fn parse_stgeorge_csv(path: impl AsRef<Path>) -> Result<Vec<NormalizedTransaction>> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("opening {}", path.display()))?;
    parse_stgeorge_reader(file).with_context(|| format!("parsing {}", path.display()))
}

pub fn parse_stgeorge_reader<R: Read>(reader: R) -> Result<Vec<NormalizedTransaction>> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_reader(reader);

    let mut rows: Vec<StringRecord> = Vec::new();
    for result in rdr.records() {
        rows.push(result?);
    }

    let skip = match rows.first() {
        Some(first) if !looks_like_date(first.get(0).unwrap_or("")) => 1,
        _ => 0,
    };

    let time_re = Regex::new(TIME_PATTERN)?;
    let mut out = Vec::new();
    for row in rows[skip..].iter().rev() {
        if row.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        out.push(decode_row(row, &time_re));
    }
    Ok(out)
}
