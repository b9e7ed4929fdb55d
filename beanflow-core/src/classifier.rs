//! Resolve free-text transaction descriptions to account names.

use crate::rules::RuleSet;

/// Wraps a [`RuleSet`] and answers "which account is this merchant?".
///
/// Dispatch is an explicit sequential scan over the compiled patterns in
/// declaration order: the first pattern that matches wins, even when a later
/// pattern would match more of the description. Specificity never breaks
/// ties; the rule file's ordering does.
#[derive(Debug)]
pub struct Classifier {
    rules: RuleSet,
}

impl Classifier {
    pub fn new(rules: RuleSet) -> Self {
        Classifier { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Account for the first pattern matching `description`, or `None`.
    ///
    /// `None` is the common case for a fresh statement, not a failure.
    pub fn match_account(&self, description: &str) -> Option<&str> {
        self.rules
            .entries()
            .iter()
            .find(|entry| entry.is_match(description))
            .map(|entry| entry.account())
    }

    /// The descriptions with no matching pattern, deduplicated, most frequent
    /// first. Ties keep first-occurrence order.
    pub fn find_unknown<'a, I>(&self, descriptions: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for description in descriptions {
            if self.match_account(description).is_some() {
                continue;
            }
            match counts.iter_mut().find(|(d, _)| d.as_str() == description) {
                Some((_, n)) => *n += 1,
                None => counts.push((description.to_string(), 1)),
            }
        }
        // stable sort preserves first-occurrence order among equal counts
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.into_iter().map(|(d, _)| d).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Classifier {
        let rules = RuleSet::from_json_str(
            r#"{
                "Expenses": {
                    "Food": {
                        "Groceries": ["Aldi.*", "Coles.*"],
                        "Dining": ["4.*", "Ivanhoe"]
                    },
                    "Household": ["Aldi Special.*"]
                }
            }"#,
        )
        .unwrap();
        Classifier::new(rules)
    }

    #[test]
    fn test_match_is_prefix_not_full_string() {
        let c = classifier();
        assert_eq!(c.match_account("Aldi 104"), Some("Expenses:Food:Groceries"));
        // pattern must match from the first character
        assert_eq!(c.match_account("xAldi 104"), None);
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let c = classifier();
        assert_eq!(c.match_account("ALDI 104"), Some("Expenses:Food:Groceries"));
        assert_eq!(c.match_account("coles 0423"), Some("Expenses:Food:Groceries"));
    }

    #[test]
    fn test_first_declared_pattern_wins() {
        let c = classifier();
        // both "Aldi.*" and "Aldi Special.*" match; the first declared wins
        assert_eq!(
            c.match_account("Aldi Special Buys"),
            Some("Expenses:Food:Groceries")
        );
    }

    #[test]
    fn test_regex_patterns_match() {
        let c = classifier();
        assert_eq!(c.match_account("4 Pines Brewing"), Some("Expenses:Food:Dining"));
    }

    #[test]
    fn test_no_match_is_none() {
        let c = classifier();
        assert_eq!(c.match_account("Completely Unknown Pty Ltd"), None);
    }

    #[test]
    fn test_find_unknown_frequency_order() {
        let c = classifier();
        let unknown = c.find_unknown(
            ["Bobs bar", "Sallys", "Bobs bar", "Ivanhoe"]
                .iter()
                .copied(),
        );
        // "Ivanhoe" is a declared pattern, so only the two strangers remain,
        // most frequent first
        assert_eq!(unknown, vec!["Bobs bar", "Sallys"]);
    }

    #[test]
    fn test_find_unknown_ties_keep_first_occurrence() {
        let c = classifier();
        let unknown = c.find_unknown(["Zebra", "Apple Pty", "Zebra", "Apple Pty"].iter().copied());
        assert_eq!(unknown, vec!["Zebra", "Apple Pty"]);
    }
}
