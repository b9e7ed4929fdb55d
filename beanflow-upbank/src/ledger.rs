//! Render raw Up Bank transactions as ledger text, and report the merchants
//! the rule file does not cover yet.

use beanflow_core::Classifier;

use crate::model::Transaction;

// Up only operates in AUD.
const CURRENCY: &str = "AUD";

/// Render an archived transaction download as ledger entries.
///
/// The API lists newest first, so rendering walks the slice in reverse.
/// Amounts are negated: Up reports spending as negative, the ledger posts
/// the expense side positive. Closes with a balance line derived from
/// `closing_balance` (the account balance at download time) minus the total
/// rendered change. Empty input renders nothing.
pub fn to_ledger(
    transactions: &[Transaction],
    classifier: &Classifier,
    bank_account: &str,
    closing_balance: f64,
) -> String {
    let mut out = String::new();
    let mut change = 0.0;
    let mut last_date: Option<String> = None;

    for txn in transactions.iter().rev() {
        let date_str = txn.attributes.created_at.format("%Y-%m-%d").to_string();
        let raw_text = txn.attributes.raw_text.as_deref().unwrap_or("");
        let description = &txn.attributes.description;
        let value = -txn.attributes.amount.value_f64();

        let account = classifier
            .match_account(description)
            .or_else(|| classifier.match_account(raw_text))
            .map(str::to_string)
            .unwrap_or_else(|| format!("ACCOUNT_UNKNOWN [{}]", txn.category_path()));

        out.push_str(&format!("{} * \"{} [{}]\"\n", date_str, raw_text, description));
        out.push_str(&format!("    {}\n", bank_account));
        out.push_str(&format!("    {:<46} {:>10.2} {}\n\n", account, value, CURRENCY));

        change += value;
        last_date = Some(date_str);
    }

    if let Some(date_str) = last_date {
        let balance = closing_balance - change;
        out.push_str(&format!(
            "{} balance {:<36} {:.2} {}\n",
            date_str, bank_account, balance, CURRENCY
        ));
    }

    out
}

/// Group transactions the classifier cannot place, most frequent first, each
/// with the amounts seen; follow with the matched pairs for eyeballing.
///
/// A transaction counts as known when either its description or its raw text
/// matches a rule.
pub fn unknown_report(transactions: &[Transaction], classifier: &Classifier) -> String {
    let mut unknowns: Vec<(String, Vec<String>)> = Vec::new();
    let mut knowns: Vec<String> = Vec::new();

    for txn in transactions {
        let raw_text = txn.attributes.raw_text.as_deref().unwrap_or("");
        let description = &txn.attributes.description;
        let full_description = format!("{} \"{}\"", description, raw_text);

        let account = classifier
            .match_account(description)
            .or_else(|| classifier.match_account(raw_text));
        match account {
            Some(account) => {
                let line = format!("{:<50} -> {}", full_description, account);
                if !knowns.contains(&line) {
                    knowns.push(line);
                }
            }
            None => match unknowns.iter_mut().find(|(d, _)| d.as_str() == full_description) {
                Some((_, values)) => values.push(txn.attributes.amount.value.clone()),
                None => unknowns.push((full_description, vec![txn.attributes.amount.value.clone()])),
            },
        }
    }

    unknowns.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
    knowns.sort();

    let mut out = String::new();
    for (description, values) in &unknowns {
        out.push_str(&format!(
            "{} {} -> {}\n",
            values.len(),
            description,
            values.join(", ")
        ));
    }
    out.push('\n');
    for known in &knowns {
        out.push_str(known);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use beanflow_core::RuleSet;
    use chrono::DateTime;

    use crate::model::{Money, Relationships, TransactionAttributes, TransactionStatus};

    fn classifier() -> Classifier {
        let rules = RuleSet::from_json_str(
            r#"{"Expenses": {"Food": {"Groceries": ["Aldi.*"]}}}"#,
        )
        .unwrap();
        Classifier::new(rules)
    }

    fn txn(created_at: &str, raw_text: &str, description: &str, value: &str) -> Transaction {
        Transaction {
            id: format!("{raw_text}-{created_at}"),
            attributes: TransactionAttributes {
                status: TransactionStatus::Settled,
                raw_text: Some(raw_text.to_string()),
                description: description.to_string(),
                message: None,
                amount: Money {
                    currency_code: CURRENCY.to_string(),
                    value: value.to_string(),
                    value_in_base_units: (value.parse::<f64>().unwrap() * 100.0) as i64,
                },
                created_at: DateTime::parse_from_rfc3339(created_at).unwrap(),
                settled_at: None,
            },
            relationships: Relationships::default(),
        }
    }

    #[test]
    fn test_to_ledger_renders_oldest_first_and_negates() {
        let c = classifier();
        // newest first, as downloaded
        let txns = vec![
            txn("2021-02-04T10:00:00+11:00", "CAFE ONE SYDNEY", "Cafe One", "-4.50"),
            txn("2021-02-03T10:00:00+11:00", "ALDI 104 SYDNEY", "Aldi", "-42.50"),
        ];
        let out = to_ledger(&txns, &c, "Assets:Bank:Upbank", 100.00);

        let aldi = out.find("ALDI 104").unwrap();
        let cafe = out.find("CAFE ONE").unwrap();
        assert!(aldi < cafe, "oldest transaction should render first");

        assert!(out.contains("* \"ALDI 104 SYDNEY [Aldi]\""));
        assert!(out.contains("Expenses:Food:Groceries"));
        assert!(out.contains("42.50 AUD"));
        assert!(out.contains("ACCOUNT_UNKNOWN []"));
    }

    #[test]
    fn test_to_ledger_closing_balance_walks_backwards() {
        let c = classifier();
        let txns = vec![txn(
            "2021-02-03T10:00:00+11:00",
            "ALDI 104 SYDNEY",
            "Aldi",
            "-42.50",
        )];
        let out = to_ledger(&txns, &c, "Assets:Bank:Upbank", 100.00);
        // closing balance 100.00, one rendered change of +42.50
        assert!(out.contains("2021-02-03 balance"));
        assert!(out.trim_end().ends_with("57.50 AUD"));
    }

    #[test]
    fn test_to_ledger_empty_input_renders_nothing() {
        let c = classifier();
        assert_eq!(to_ledger(&[], &c, "Assets:Bank:Upbank", 100.00), "");
    }

    #[test]
    fn test_unknown_report_orders_by_frequency() {
        let c = classifier();
        let txns = vec![
            txn("2021-02-01T10:00:00+11:00", "CAFE ONE", "Cafe One", "-4.50"),
            txn("2021-02-02T10:00:00+11:00", "BOBS BAR", "Bobs bar", "-9.00"),
            txn("2021-02-03T10:00:00+11:00", "BOBS BAR", "Bobs bar", "-7.00"),
            txn("2021-02-04T10:00:00+11:00", "ALDI 104", "Aldi", "-42.50"),
        ];
        let report = unknown_report(&txns, &c);
        let lines: Vec<&str> = report.lines().collect();
        assert!(lines[0].starts_with("2 Bobs bar \"BOBS BAR\" -> -9.00, -7.00"));
        assert!(lines[1].starts_with("1 Cafe One \"CAFE ONE\""));
        assert!(report.contains("-> Expenses:Food:Groceries"));
    }

    #[test]
    fn test_unknown_report_matches_on_raw_text_too() {
        let c = classifier();
        // description unknown, raw text matches
        let txns = vec![txn(
            "2021-02-01T10:00:00+11:00",
            "Aldi Store 104",
            "Groceries run",
            "-10.00",
        )];
        let report = unknown_report(&txns, &c);
        assert!(report.contains("-> Expenses:Food:Groceries"));
        assert!(!report.contains("1 Groceries run"));
    }
}
