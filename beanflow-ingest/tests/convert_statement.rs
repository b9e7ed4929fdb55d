//! End to end: St George CSV text -> decoder -> classifier -> ledger text.

use beanflow_core::{Classifier, LedgerEmitter, RuleSet};
use beanflow_ingest::parse_stgeorge_reader;

fn packed(transaction_type: &str, rest: &str) -> String {
    format!("{:<30}{}", transaction_type, rest)
}

fn classifier() -> Classifier {
    let rules = RuleSet::from_json_str(
        r#"{
            "Expenses": {
                "Food": {"Groceries": ["Aldi.*", "Coles.*"]},
                "Transport": ["Phoenix Petroleum.*"]
            }
        }"#,
    )
    .unwrap();
    Classifier::new(rules)
}

fn sample_csv() -> String {
    // newest first, as the bank exports it; spans a month boundary
    let aldi = packed("Eftpos Purchase", "01/0214:32 Aldi 104                     ");
    let fuel = packed("Visa Purchase", "29/01 Phoenix Petroleum Pt    Marrickvil");
    format!(
        "Date,Description,Debit,Credit,Balance\n\
         02/02/2021,{aldi},12.50,,57.50\n\
         30/01/2021,{fuel},30.00,,70.00\n\
         29/01/2021,Direct Credit Acme Payroll,,100.00,100.00\n"
    )
}

#[test]
fn test_csv_to_ledger_text() {
    let transactions = parse_stgeorge_reader(sample_csv().as_bytes()).unwrap();
    assert_eq!(transactions.len(), 3);

    let classifier = classifier();
    let emitter = LedgerEmitter::new(&classifier, "Assets:Bank:Cheque");
    let out = emitter.emit(&transactions).unwrap();

    // oldest row first: the payroll credit opens the ledger
    assert!(out.starts_with("2021-01-29 * \"Direct Credit Acme Payroll\"\n"));

    // decoded merchants resolve through the rules
    assert!(out.contains("Expenses:Transport"));
    assert!(out.contains("Expenses:Food:Groceries"));

    // narration carries the decoded description parts
    assert!(out.contains("* \"Aldi 104 Eftpos Purchase 01/02 14:32\""));

    // one assertion at the month boundary (January's closing balance, dated
    // at February's first row) and one terminal assertion
    let assertions: Vec<&str> = out.lines().filter(|l| l.contains(" balance ")).collect();
    assert_eq!(
        assertions,
        vec![
            "2021-02-02 balance Assets:Bank:Cheque      70.00 AUD",
            "2021-02-02 balance Assets:Bank:Cheque      57.50 AUD",
        ]
    );
}

#[test]
fn test_round_trip_amounts() {
    let transactions = parse_stgeorge_reader(sample_csv().as_bytes()).unwrap();
    let classifier = classifier();
    let emitter = LedgerEmitter::new(&classifier, "Assets:Bank:Cheque");
    let out = emitter.emit(&transactions).unwrap();

    let re = regex::Regex::new(r"(-?\d+\.\d{2}) AUD$").unwrap();
    let amounts: Vec<f64> = out
        .lines()
        .filter(|l| !l.contains(" balance "))
        .filter_map(|l| re.captures(l))
        .map(|c| c[1].parse().unwrap())
        .collect();
    assert_eq!(amounts, vec![100.00, 30.00, 12.50]);
}
