//! Front-matter parsing
//!
//! A post may start with a block of `key: value` lines fenced by `---`
//! lines. Values are strings, except `tags`, which may be written as a
//! bracketed list. Parsing never fails: anything that does not look like a
//! front-matter block is treated as body text.

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::helpers::parse_date;

lazy_static! {
    /// Opening fence, lazily matched block, closing fence, remaining body.
    static ref FRONT_MATTER_RE: Regex =
        Regex::new(r"(?s)\A---\r?\n(.*?)\r?\n---\r?\n(.*)\z").expect("front-matter pattern");
}

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Key whose bracketed value is read as a list
const TAGS_KEY: &str = "tags";

/// A single front-matter value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetaValue {
    Text(String),
    List(Vec<String>),
}

impl MetaValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) => Some(s),
            MetaValue::List(_) => None,
        }
    }
}

/// Front-matter data from a post, in the order keys first appeared
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FrontMatter {
    entries: IndexMap<String, MetaValue>,
}

/// A post split into its metadata and the markdown that follows it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedPost {
    pub metadata: FrontMatter,
    pub body: String,
}

impl FrontMatter {
    /// Split a raw document into front-matter and body.
    ///
    /// Without a well-formed leading block the whole document (minus a
    /// byte-order mark) becomes the body and the metadata is empty.
    pub fn parse(raw: &str) -> ParsedPost {
        let raw = raw.strip_prefix(BYTE_ORDER_MARK).unwrap_or(raw);

        let Some(caps) = FRONT_MATTER_RE.captures(raw) else {
            return ParsedPost {
                metadata: FrontMatter::default(),
                body: raw.to_string(),
            };
        };

        let block = caps.get(1).map_or("", |m| m.as_str());
        let body = caps.get(2).map_or("", |m| m.as_str());

        let mut metadata = FrontMatter::default();
        for line in block.lines() {
            match parse_line(line) {
                Some((key, value)) => metadata.insert(key, value),
                None => tracing::trace!("Skipping front-matter line: {:?}", line),
            }
        }

        ParsedPost {
            metadata,
            body: body.to_string(),
        }
    }

    /// Insert a value; a repeated key keeps its first position but takes the new value
    pub fn insert(&mut self, key: impl Into<String>, value: MetaValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries.get(key)
    }

    /// String value for `key`; list values are not coerced
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(MetaValue::as_text)
    }

    pub fn title(&self) -> Option<&str> {
        self.text("title")
    }

    pub fn date(&self) -> Option<&str> {
        self.text("date")
    }

    pub fn category(&self) -> Option<&str> {
        self.text("category")
    }

    /// Tags as a list. A plain string value counts as one tag.
    pub fn tags(&self) -> Vec<String> {
        match self.get(TAGS_KEY) {
            Some(MetaValue::List(items)) => items.clone(),
            Some(MetaValue::Text(s)) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    /// Parse the `date` value
    pub fn parse_date(&self) -> Option<NaiveDateTime> {
        self.date().and_then(parse_date)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Parse one `key: value` line. Lines without a colon, or starting with one, yield nothing.
fn parse_line(line: &str) -> Option<(String, MetaValue)> {
    let colon = line.find(':').filter(|&pos| pos > 0)?;
    let key = line[..colon].trim();
    let value = strip_wrapping_quotes(line[colon + 1..].trim());

    if key == TAGS_KEY && value.starts_with('[') && value.ends_with(']') {
        return Some((key.to_string(), MetaValue::List(parse_tag_list(value))));
    }

    Some((key.to_string(), MetaValue::Text(value.to_string())))
}

/// Remove one matching pair of surrounding `"` or `'`
fn strip_wrapping_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.starts_with(quote) && value.ends_with(quote) {
            // A lone quote character is both the opener and the closer.
            return value.get(1..value.len() - 1).unwrap_or("");
        }
    }
    value
}

/// Read a bracketed tag list, as JSON when possible and by splitting on commas otherwise
fn parse_tag_list(value: &str) -> Vec<String> {
    if let Ok(tags) = serde_json::from_str::<Vec<String>>(value) {
        return tags;
    }

    let inner = value.get(1..value.len().saturating_sub(1)).unwrap_or("");
    inner
        .split(',')
        .map(|piece| strip_one_quote_each_side(piece.trim()).to_string())
        .collect()
}

/// Strip at most one leading and one trailing quote, matched or not
fn strip_one_quote_each_side(piece: &str) -> &str {
    let piece = piece.strip_prefix(['"', '\'']).unwrap_or(piece);
    piece.strip_suffix(['"', '\'']).unwrap_or(piece)
}
