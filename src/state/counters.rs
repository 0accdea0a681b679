use std::collections::BTreeMap;
use std::fmt;

use crate::errors::{CounterError, Result};

/// The three independently persisted counters kept per blog post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterKind {
    Like,
    View,
    Share,
}

impl CounterKind {
    pub const ALL: [CounterKind; 3] = [CounterKind::Like, CounterKind::View, CounterKind::Share];

    /// Plural name used both as the JSON response field and the file stem.
    pub fn name(self) -> &'static str {
        match self {
            CounterKind::Like => "likes",
            CounterKind::View => "views",
            CounterKind::Share => "shares",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.json", self.name())
    }

    pub(crate) fn index(self) -> usize {
        match self {
            CounterKind::Like => 0,
            CounterKind::View => 1,
            CounterKind::Share => 2,
        }
    }
}

impl fmt::Display for CounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Opaque, non-empty identifier of a blog post.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(String);

impl ItemId {
    /// Rejects empty and whitespace-only identifiers. Anything else is kept verbatim.
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(CounterError::InvalidIdentifier);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub type Count = u64;

/// Item identifier to count. A missing key reads as zero.
pub type CounterMapping = BTreeMap<String, Count>;

pub fn count_of(mapping: &CounterMapping, id: &ItemId) -> Count {
    mapping.get(id.as_str()).copied().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_match_routes_and_files() {
        assert_eq!(CounterKind::Like.name(), "likes");
        assert_eq!(CounterKind::View.file_name(), "views.json");
        assert_eq!(CounterKind::Share.to_string(), "shares");
    }

    #[test]
    fn kinds_have_distinct_slots() {
        let mut slots: Vec<usize> = CounterKind::ALL.iter().map(|k| k.index()).collect();
        slots.sort_unstable();
        assert_eq!(slots, vec![0, 1, 2]);
    }

    #[test]
    fn item_id_rejects_blank() {
        assert!(matches!(ItemId::parse(""), Err(CounterError::InvalidIdentifier)));
        assert!(matches!(ItemId::parse("  \t"), Err(CounterError::InvalidIdentifier)));
        assert_eq!(ItemId::parse("42").unwrap().as_str(), "42");
        assert_eq!(ItemId::parse(" a b ").unwrap().as_str(), " a b ");
    }

    #[test]
    fn missing_key_counts_as_zero() {
        let mut mapping = CounterMapping::new();
        let x = ItemId::parse("x").unwrap();
        assert_eq!(count_of(&mapping, &x), 0);
        mapping.insert("x".into(), 0);
        assert_eq!(count_of(&mapping, &x), 0);
        mapping.insert("x".into(), 7);
        assert_eq!(count_of(&mapping, &x), 7);
    }
}
