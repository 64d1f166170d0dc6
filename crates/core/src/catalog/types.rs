//! Matching rules for the file catalog.

use serde::{Deserialize, Serialize};

use crate::index::is_id_char;

/// How a source id is recognised inside a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    /// The id must appear as a whole token: the characters around it must
    /// not be id characters. `abc` matches `Song [abc].m4a` but not
    /// `Song [abcd].m4a`.
    #[default]
    Token,
    /// The id may appear anywhere in the name. `abc` matches both
    /// `Song [abc].m4a` and `Song [xabcx].m4a`, so with short ids several
    /// files can match one source, which is fatal.
    Substring,
}

impl MatchRule {
    /// Whether `file_name` is tagged with `id` under this rule.
    pub fn matches(&self, file_name: &str, id: &str) -> bool {
        if id.is_empty() {
            return false;
        }
        match self {
            Self::Substring => file_name.contains(id),
            Self::Token => file_name.match_indices(id).any(|(start, _)| {
                let before = file_name[..start].chars().next_back();
                let after = file_name[start + id.len()..].chars().next();
                !before.is_some_and(is_id_char) && !after.is_some_and(is_id_char)
            }),
        }
    }
}

impl std::str::FromStr for MatchRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "token" => Ok(Self::Token),
            "substring" => Ok(Self::Substring),
            other => Err(format!("unknown match rule: {other}")),
        }
    }
}
