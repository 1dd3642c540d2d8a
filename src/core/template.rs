/// Headline/body templates with a closed set of named slots.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template parse error: {0}")]
    Parse(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// A segment of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Segment {
    /// Literal text, emitted as-is.
    Literal(String),
    /// `{playerName}`
    PlayerName,
    /// `{teamName}`
    TeamName,
    /// `{metadata.key}`
    Metadata(String),
}

/// Values substituted into a template's slots.
#[derive(Debug, Clone, Copy)]
pub struct Slots<'a> {
    pub player_name: &'a str,
    pub team_name: &'a str,
    pub metadata: &'a HashMap<String, String>,
}

/// A parsed template: a sequence of literal and slot segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub segments: Vec<Segment>,
}

impl Template {
    /// Parse a template string.
    ///
    /// Syntax:
    /// - `{playerName}`, `{teamName}` → named slots
    /// - `{metadata.key}` → caller-supplied value
    /// - `{{` / `}}` → literal braces
    /// - anything else inside braces is an error
    pub fn parse(input: &str) -> Result<Template, TemplateError> {
        let mut segments = Vec::new();
        let mut literal_buf = String::new();
        let chars: Vec<char> = input.chars().collect();
        let len = chars.len();
        let mut i = 0;

        while i < len {
            match chars[i] {
                '{' if i + 1 < len && chars[i + 1] == '{' => {
                    literal_buf.push('{');
                    i += 2;
                }
                '{' => {
                    if !literal_buf.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal_buf)));
                    }

                    let start = i + 1;
                    let mut end = start;
                    while end < len && chars[end] != '}' {
                        if chars[end] == '{' {
                            return Err(TemplateError::Parse("nested braces are not allowed".to_string()));
                        }
                        end += 1;
                    }
                    if end == len {
                        return Err(TemplateError::Parse("unclosed brace".to_string()));
                    }

                    let content: String = chars[start..end].iter().collect();
                    segments.push(Self::parse_slot(&content)?);
                    i = end + 1;
                }
                '}' if i + 1 < len && chars[i + 1] == '}' => {
                    literal_buf.push('}');
                    i += 2;
                }
                '}' => {
                    return Err(TemplateError::Parse("unmatched closing brace".to_string()));
                }
                c => {
                    literal_buf.push(c);
                    i += 1;
                }
            }
        }

        if !literal_buf.is_empty() {
            segments.push(Segment::Literal(literal_buf));
        }

        Ok(Template { segments })
    }

    fn parse_slot(content: &str) -> Result<Segment, TemplateError> {
        match content {
            "" => Err(TemplateError::Parse("empty braces".to_string())),
            "playerName" => Ok(Segment::PlayerName),
            "teamName" => Ok(Segment::TeamName),
            _ => match content.strip_prefix("metadata.") {
                Some("") => Err(TemplateError::Parse("empty metadata key".to_string())),
                Some(key) => Ok(Segment::Metadata(key.to_string())),
                None => Err(TemplateError::Parse(format!("unknown slot '{}'", content))),
            },
        }
    }

    /// Substitutes slots. Missing metadata keys render as nothing.
    pub fn render(&self, slots: &Slots<'_>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::PlayerName => out.push_str(slots.player_name),
                Segment::TeamName => out.push_str(slots.team_name),
                Segment::Metadata(key) => match slots.metadata.get(key) {
                    Some(value) => out.push_str(value),
                    None => log::warn!("template references missing metadata key '{}'", key),
                },
            }
        }
        out
    }

    /// Literal text only, with slots dropped. Used for content checks.
    pub fn literal_text(&self) -> String {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Literal(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Metadata keys this template reads.
    pub fn metadata_keys(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Metadata(key) => Some(key.as_str()),
            _ => None,
        })
    }
}
