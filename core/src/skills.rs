//! Skill normalisation.
//!
//! A worker's skill listing arrives either as delimited text
//! (`"python, SQL ,react"`) or as a JSON list/mapping serialised as text
//! (`["python","sql"]`, `{"python": 5, "sql": 3}`). Both shapes collapse
//! into one set of lowercase, trimmed tokens. Normalisation never fails:
//! malformed structured input falls back to comma-splitting, and empty
//! input yields an empty set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which parse path produced a [`SkillSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillSource {
    Empty,
    Delimited,
    StructuredList,
    StructuredMap,
    /// Looked structured but did not parse; comma-split instead.
    MalformedFallback,
}

/// Canonical set of lowercase skill tokens for one worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillSet {
    tokens: BTreeSet<String>,
    source: SkillSource,
}

impl SkillSet {
    pub fn empty() -> Self {
        Self { tokens: BTreeSet::new(), source: SkillSource::Empty }
    }

    /// Parse a raw skill listing.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::empty();
        }

        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            match serde_json::from_str::<serde_json::Value>(trimmed) {
                Ok(serde_json::Value::Array(items)) => {
                    let tokens = items.iter().filter_map(scalar_token).collect();
                    return Self::from_tokens(tokens, SkillSource::StructuredList);
                }
                Ok(serde_json::Value::Object(map)) => {
                    let tokens = map.keys().filter_map(|k| clean(k)).collect();
                    return Self::from_tokens(tokens, SkillSource::StructuredMap);
                }
                Ok(_) | Err(_) => {
                    log::debug!("skill listing is not a JSON list or map, splitting on commas");
                    return Self::from_tokens(split_delimited(trimmed), SkillSource::MalformedFallback);
                }
            }
        }

        Self::from_tokens(split_delimited(trimmed), SkillSource::Delimited)
    }

    fn from_tokens(tokens: BTreeSet<String>, source: SkillSource) -> Self {
        if tokens.is_empty() {
            return Self { tokens, source: SkillSource::Empty };
        }
        Self { tokens, source }
    }

    pub fn source(&self) -> SkillSource {
        self.source
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(&token.to_lowercase())
    }

    /// True when any token contains `needle` as a case-insensitive substring.
    pub fn any_contains(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return false;
        }
        self.tokens.iter().any(|t| t.contains(&needle))
    }
}

fn clean(token: &str) -> Option<String> {
    let t = token.trim().to_lowercase();
    (!t.is_empty()).then_some(t)
}

fn scalar_token(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => clean(s),
        serde_json::Value::Number(n) => clean(&n.to_string()),
        serde_json::Value::Bool(b) => clean(&b.to_string()),
        // Nested lists/maps and nulls carry no usable skill name.
        _ => None,
    }
}

fn split_delimited(raw: &str) -> BTreeSet<String> {
    raw.split(',').filter_map(clean).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_lowercases_delimited_text() {
        let set = SkillSet::parse(" JavaScript, react ,, CSS ");
        assert_eq!(set.source(), SkillSource::Delimited);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["css", "javascript", "react"]);
    }

    #[test]
    fn parses_json_list_elements() {
        let set = SkillSet::parse(r#"["Python", " SQL ", "", 42, null]"#);
        assert_eq!(set.source(), SkillSource::StructuredList);
        assert!(set.contains("python"));
        assert!(set.contains("sql"));
        assert!(set.contains("42"));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn parses_json_map_keys() {
        let set = SkillSet::parse(r#"{"Docker": 4, "kubernetes": {"years": 2}}"#);
        assert_eq!(set.source(), SkillSource::StructuredMap);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["docker", "kubernetes"]);
    }

    #[test]
    fn malformed_structure_falls_back_to_commas() {
        let set = SkillSet::parse("[rust, go");
        assert_eq!(set.source(), SkillSource::MalformedFallback);
        assert!(set.contains("[rust"));
        assert!(set.contains("go"));
    }

    #[test]
    fn empty_input_yields_empty_set() {
        assert!(SkillSet::parse("").is_empty());
        assert!(SkillSet::parse("  , ,").is_empty());
        assert!(SkillSet::parse("[]").is_empty());
        assert_eq!(SkillSet::parse("{}").source(), SkillSource::Empty);
    }

    #[test]
    fn substring_lookup_is_case_insensitive() {
        let set = SkillSet::parse("ui design,React Native");
        assert!(set.any_contains("UI"));
        assert!(set.any_contains("react"));
        assert!(!set.any_contains("vue"));
        assert!(!set.any_contains("  "));
    }
}
