//! Frontmatter extraction and parsing.
//!
//! A post source must begin with the literal fence `---\n`; the YAML block
//! runs until the next `\n---\n`, and everything after that fence is the
//! markdown body.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

const START_FENCE: &[u8] = b"---\n";
const END_FENCE: &[u8] = b"\n---\n";

/// Post metadata decoded from the YAML block.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Frontmatter {
    #[serde(rename = "Title", default)]
    pub title: String,

    #[serde(rename = "Author", default)]
    pub author: String,

    /// Publication day, `YYYY-MM-DD`.
    #[serde(rename = "Date")]
    pub date: NaiveDate,

    /// Tag labels, lowercased on decode.
    #[serde(rename = "Tags", default, deserialize_with = "lowercased")]
    pub tags: Vec<String>,
}

fn lowercased<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let tags = Vec::<String>::deserialize(deserializer)?;
    Ok(tags.into_iter().map(|tag| tag.to_lowercase()).collect())
}

/// Errors from splitting or decoding a post source.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("scanning frontmatter: missing start fence")]
    MissingStartFence,

    #[error("scanning frontmatter: missing end fence")]
    MissingEndFence,

    #[error("decoding frontmatter: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("post body is not valid utf-8: {0}")]
    BodyUtf8(#[from] std::str::Utf8Error),
}

/// Splits `data` into decoded frontmatter and the markdown body.
pub fn split(data: &[u8]) -> Result<(Frontmatter, &str), FrontmatterError> {
    if !data.starts_with(START_FENCE) {
        return Err(FrontmatterError::MissingStartFence);
    }
    let rest = &data[START_FENCE.len()..];
    let end = find(rest, END_FENCE).ok_or(FrontmatterError::MissingEndFence)?;
    let frontmatter = serde_yaml::from_slice(&rest[..end])?;
    let body = std::str::from_utf8(&rest[end + END_FENCE.len()..])?;
    Ok((frontmatter, body))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_frontmatter_and_body() {
        let source = b"---\nTitle: Hello\nAuthor: A\nDate: 2020-01-01\nTags: [Go, rust]\n---\nHi.";
        let (fm, body) = split(source).unwrap();
        assert_eq!(fm.title, "Hello");
        assert_eq!(fm.author, "A");
        assert_eq!(fm.date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(fm.tags, vec!["go", "rust"]);
        assert_eq!(body, "Hi.");
    }

    #[test]
    fn empty_frontmatter_block_is_an_empty_mapping() {
        // serde_yaml decodes an empty document as null, which cannot fill
        // the Date field.
        let err = split(b"---\n\n---\nbody").unwrap_err();
        assert!(matches!(err, FrontmatterError::InvalidYaml(_)));
    }

    #[test]
    fn missing_start_fence() {
        let err = split(b"Title: Hello\n---\n").unwrap_err();
        assert!(matches!(err, FrontmatterError::MissingStartFence));
    }

    #[test]
    fn missing_end_fence() {
        let err = split(b"---\nTitle: Hello\n").unwrap_err();
        assert!(matches!(err, FrontmatterError::MissingEndFence));
    }

    #[test]
    fn end_fence_search_starts_after_the_start_fence() {
        // `---\n---\n...` looks like it contains `\n---\n` at offset 3, but
        // that occurrence overlaps the start fence and must not count.
        let err = split(b"---\n---\nbody").unwrap_err();
        assert!(matches!(err, FrontmatterError::MissingEndFence));
    }

    #[test]
    fn body_may_be_empty() {
        let (fm, body) = split(b"---\nTitle: T\nDate: 2021-06-05\n---\n").unwrap();
        assert_eq!(fm.title, "T");
        assert_eq!(body, "");
    }

    #[test]
    fn tags_default_to_empty() {
        let (fm, _) = split(b"---\nTitle: T\nDate: 2020-02-02\n---\n").unwrap();
        assert!(fm.tags.is_empty());
    }
}
