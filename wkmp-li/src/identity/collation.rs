//! Locale-aware collation keys
//!
//! Keys strip a leading English article ("the", "an", "a") and compare with
//! a primary-strength ICU collator, so case and accents do not affect order.

use icu_collator::{Collator, CollatorOptions, Strength};
use std::cmp::Ordering;

thread_local! {
    static COLLATOR: Option<Collator> = make_collator();
}

fn make_collator() -> Option<Collator> {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Primary);
    match Collator::try_new(&Default::default(), options) {
        Ok(collator) => Some(collator),
        Err(e) => {
            tracing::warn!(error = ?e, "Collator unavailable, falling back to lowercase ordering");
            None
        }
    }
}

const ARTICLES: [&str; 3] = ["the ", "an ", "a "];

/// Sortable key derived from a node's sort name (or raw name)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollationKey {
    key: String,
}

impl CollationKey {
    /// Build from the sort name, falling back to the raw name
    pub fn new(name: &str, sort_name: Option<&str>) -> Self {
        let source = sort_name.filter(|s| !s.trim().is_empty()).unwrap_or(name).trim();
        Self {
            key: strip_article(source).to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }
}

fn strip_article(name: &str) -> &str {
    for article in ARTICLES {
        let Some(prefix) = name.get(..article.len()) else {
            continue;
        };
        if prefix.eq_ignore_ascii_case(article) {
            let rest = name[article.len()..].trim_start();
            if !rest.is_empty() {
                return rest;
            }
        }
    }
    name
}

impl Ord for CollationKey {
    fn cmp(&self, other: &Self) -> Ordering {
        let primary = COLLATOR.with(|collator| match collator {
            Some(collator) => collator.compare(&self.key, &other.key),
            None => self.key.to_lowercase().cmp(&other.key.to_lowercase()),
        });
        // Primary strength ties ("a" vs "A") fall back to code point order
        primary.then_with(|| self.key.cmp(&other.key))
    }
}

impl PartialOrd for CollationKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
