//! Tokenizer - splits text into code points and search phrases into words / 分词器
//!
//! Supports / 支持：
//! - Code point units (astral-plane characters count once) / 按码点切分
//! - Whitespace word split for search phrases / 按空白切分搜索词

use std::str::Chars;

/// Split text into character units / 将文本切分为字符单元
///
/// One unit per Unicode code point, so a character outside the BMP is a single
/// unit even though it takes two UTF-16 code units. No normalization is done.
/// The returned iterator is `Clone`, calling `tokenize` again restarts it.
pub fn tokenize(text: &str) -> Chars<'_> {
    text.chars()
}

/// Split a search phrase into words / 将搜索短语切分为单词
pub fn words_of(phrase: &str) -> Vec<String> {
    phrase.split_whitespace().map(str::to_string).collect()
}
