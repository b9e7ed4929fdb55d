//! Merchant rule file: a nested category tree whose leaves list regex
//! patterns, flattened into an ordered pattern -> account index.
//!
//! Lookup is first-match in declaration order, so the index must keep the
//! order patterns appear in the file. The JSON loader runs with
//! `preserve_order` to guarantee that.

use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Path segments join into account names with this separator,
/// e.g. `Expenses:Food:Groceries`.
pub const ACCOUNT_SEPARATOR: &str = ":";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("rules file is not valid JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("account `{path}` must hold a list of patterns or a nested mapping, found {found}")]
    BadLeaf { path: String, found: &'static str },

    #[error("pattern `{pattern}` under `{account}` is not a valid regex")]
    BadPattern {
        pattern: String,
        account: String,
        #[source]
        source: Box<regex::Error>,
    },
}

/// One pattern -> account mapping with its compiled matcher.
#[derive(Debug)]
pub struct RuleEntry {
    pattern: String,
    account: String,
    regex: Regex,
}

impl RuleEntry {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    /// Case-insensitive prefix match: the pattern must match starting at the
    /// first character of the description, but need not consume all of it.
    pub fn is_match(&self, description: &str) -> bool {
        self.regex.is_match(description)
    }
}

/// The loaded rule file, flattened into its two derived views.
#[derive(Debug)]
pub struct RuleSet {
    /// Declaration-ordered pattern index. First match wins.
    entries: Vec<RuleEntry>,
    /// Account -> declared patterns, for listing and auditing.
    accounts: Vec<(String, Vec<String>)>,
}

impl RuleSet {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading rules file {}", path.display()))?;
        Ok(Self::from_json_str(&text)
            .with_context(|| format!("loading rules file {}", path.display()))?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let root: Value = serde_json::from_str(text)?;
        Self::from_value(&root)
    }

    /// Flatten the nested tree. Object keys extend the account path; an array
    /// terminates it and supplies that account's patterns. Anything else in
    /// leaf position aborts the load; there are no partial rule sets.
    pub fn from_value(root: &Value) -> Result<Self, ConfigError> {
        let mut accounts = Vec::new();
        let mut path = Vec::new();
        walk(&mut path, root, &mut accounts)?;

        let mut entries: Vec<RuleEntry> = Vec::new();
        for (account, patterns) in &accounts {
            for pattern in patterns {
                // A pattern declared under two accounts keeps its original
                // position in the scan order, but the later account wins.
                // Known ambiguity in the file format; kept as-is.
                if let Some(existing) = entries.iter_mut().find(|e| e.pattern == *pattern) {
                    existing.account = account.clone();
                    continue;
                }
                let regex = RegexBuilder::new(&format!("^(?:{pattern})"))
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| ConfigError::BadPattern {
                        pattern: pattern.clone(),
                        account: account.clone(),
                        source: Box::new(source),
                    })?;
                entries.push(RuleEntry {
                    pattern: pattern.clone(),
                    account: account.clone(),
                    regex,
                });
            }
        }

        Ok(RuleSet { entries, accounts })
    }

    /// Pattern -> account pairs in declaration order.
    pub fn accounts_by_pattern(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|e| (e.pattern(), e.account()))
    }

    /// Account -> declared patterns, in declaration order.
    pub fn patterns_by_account(&self) -> &[(String, Vec<String>)] {
        &self.accounts
    }

    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }
}

fn walk(
    path: &mut Vec<String>,
    node: &Value,
    out: &mut Vec<(String, Vec<String>)>,
) -> Result<(), ConfigError> {
    match node {
        Value::Object(children) => {
            for (key, child) in children {
                path.push(key.clone());
                walk(path, child, out)?;
                path.pop();
            }
            Ok(())
        }
        Value::Array(items) => {
            let account = path.join(ACCOUNT_SEPARATOR);
            let mut patterns = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) => patterns.push(s.clone()),
                    // bare numbers are legal patterns (e.g. an account number)
                    Value::Number(n) => patterns.push(n.to_string()),
                    other => {
                        return Err(ConfigError::BadLeaf {
                            path: account,
                            found: value_kind(other),
                        });
                    }
                }
            }
            out.push((account, patterns));
            Ok(())
        }
        other => Err(ConfigError::BadLeaf {
            path: path.join(ACCOUNT_SEPARATOR),
            found: value_kind(other),
        }),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
