//! Ordering of segments in the final mix.

use serde::{Deserialize, Serialize};

/// Sort key for the final mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    /// By detected tempo.
    #[default]
    Tempo,
    /// As listed in the index. No analysis is run.
    Index,
}

impl std::str::FromStr for OrderBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tempo" => Ok(Self::Tempo),
            "index" => Ok(Self::Index),
            other => Err(format!("unknown order: {other}")),
        }
    }
}

/// Sorts items by a precomputed tempo.
///
/// The sort is stable: items with equal tempo keep their relative input
/// order, in both directions.
pub fn order_by_tempo<T>(mut items: Vec<(T, f64)>, descending: bool) -> Vec<T> {
    if descending {
        items.sort_by(|a, b| b.1.total_cmp(&a.1));
    } else {
        items.sort_by(|a, b| a.1.total_cmp(&b.1));
    }
    items.into_iter().map(|(item, _)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascending() {
        let items = vec![("a", 120.0), ("b", 90.0), ("c", 150.0)];
        assert_eq!(order_by_tempo(items, false), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_descending() {
        let items = vec![("a", 120.0), ("b", 90.0), ("c", 150.0)];
        assert_eq!(order_by_tempo(items, true), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let items = vec![("first", 100.0), ("second", 100.0), ("slow", 80.0)];
        assert_eq!(
            order_by_tempo(items.clone(), false),
            vec!["slow", "first", "second"]
        );
        assert_eq!(order_by_tempo(items, true), vec!["first", "second", "slow"]);
    }

    #[test]
    fn test_parse_order() {
        assert_eq!("Tempo".parse::<OrderBy>().unwrap(), OrderBy::Tempo);
        assert_eq!("index".parse::<OrderBy>().unwrap(), OrderBy::Index);
        assert!("random".parse::<OrderBy>().is_err());
    }
}
