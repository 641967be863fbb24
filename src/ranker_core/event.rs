//! Hashtag events as delivered by the host

use crate::config::InputFormat;
use serde::{Deserialize, Serialize};

/// One record: the ordered hashtags of a single upstream item
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HashtagEvent {
    pub hashtags: Vec<String>,
}

impl HashtagEvent {
    pub fn new<I, S>(hashtags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hashtags: hashtags.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse an event from a JSONL line
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }

    /// Build an event from free text by pulling out its `#tags`
    pub fn from_text(text: &str) -> Self {
        Self {
            hashtags: extract_hashtags(text),
        }
    }

    /// Parse a line in the given wire format
    pub fn parse(line: &str, format: InputFormat) -> Result<Self, serde_json::Error> {
        match format {
            InputFormat::Jsonl => Self::from_jsonl(line),
            InputFormat::Text => Ok(Self::from_text(line)),
        }
    }

    pub fn len(&self) -> usize {
        self.hashtags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashtags.is_empty()
    }
}

/// Extract hashtags from free text
///
/// A hashtag is a `#` at the start of a whitespace-separated word followed by
/// letters, digits or underscores. Case is preserved.
pub fn extract_hashtags(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter_map(|word| word.strip_prefix('#'))
        .map(|rest| {
            rest.chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .collect::<String>()
        })
        .filter(|tag| !tag.is_empty())
        .collect()
}
