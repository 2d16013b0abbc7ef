//! Search result schema / 搜索结果结构定义

use serde::{Deserialize, Serialize};

/// Verse reference - identifies one retrievable unit / 经文引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerseReference {
    pub doc_set: String,
    pub collection: String,
    pub book_code: String,
    pub chapter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verses: Option<String>,
}

impl VerseReference {
    /// Build a reference from a `chapter[:verse]` key / 从章节键构建引用
    pub fn from_key(doc_set: &str, collection: &str, book_code: &str, key: &str) -> Self {
        let (chapter, verses) = match key.split_once(':') {
            Some((chapter, verses)) => (chapter, Some(verses.to_string())),
            None => (key, None),
        };
        Self {
            doc_set: doc_set.to_string(),
            collection: collection.to_string(),
            book_code: book_code.to_string(),
            chapter: chapter.to_string(),
            verses,
        }
    }
}

/// Search candidate - one verse of text returned by a provider / 搜索候选
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCandidate {
    pub reference: VerseReference,
    pub text: String,
}

/// Search result - a candidate confirmed by local matching / 搜索结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub reference: VerseReference,
    pub text: String,
    /// Byte ranges of matched text, sorted and merged / 匹配区间（字节偏移）
    pub matches: Vec<(usize, usize)>,
}

impl SearchResult {
    /// Matched substrings, for highlighting / 匹配片段
    pub fn highlights(&self) -> Vec<&str> {
        self.matches
            .iter()
            .filter_map(|&(start, end)| self.text.get(start..end))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_from_key_with_verse() {
        let r = VerseReference::from_key("DS1", "C01", "MAT", "1:1");
        assert_eq!(r.chapter, "1");
        assert_eq!(r.verses.as_deref(), Some("1"));
    }

    #[test]
    fn test_reference_from_key_chapter_only() {
        let r = VerseReference::from_key("DS1", "C01", "MAT", "5");
        assert_eq!(r.chapter, "5");
        assert!(r.verses.is_none());
    }

    #[test]
    fn test_reference_serializes_camel_case() {
        let r = VerseReference::from_key("DS1", "C01", "MAT", "1:2-3");
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["docSet"], "DS1");
        assert_eq!(json["bookCode"], "MAT");
        assert_eq!(json["verses"], "2-3");

        let restored: VerseReference = serde_json::from_value(json).unwrap();
        assert_eq!(restored, r);
    }

    #[test]
    fn test_result_highlights() {
        let result = SearchResult {
            reference: VerseReference::from_key("DS1", "C01", "MAT", "1:1"),
            text: "In the beginning".to_string(),
            matches: vec![(7, 12)],
        };
        assert_eq!(result.highlights(), vec!["begin"]);
    }
}
