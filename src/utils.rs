//! Utility functions shared by callers of the resolver

use std::cmp::Ordering;

// case-insensitive first, raw text breaks ties so the order is total
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compares_without_case() {
        assert_eq!(locale_compare("alice", "Bob"), Ordering::Less);
        assert_eq!(locale_compare("Bob", "alice"), Ordering::Greater);
        assert_eq!(locale_compare("Bob", "bob"), Ordering::Less);
        assert_eq!(locale_compare("bob", "bob"), Ordering::Equal);
    }
}
