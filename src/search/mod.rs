//! Search module - pattern building and verse retrieval / 搜索模块
//!
//! Architecture principles / 架构原则：
//! - Pattern builder turns a word into a store-side filter and a local regex
//! - Verse provider walks the store book by book, it never filters locally
//! - Search query confirms candidates locally and records highlight spans
//! - Call direction: Search → Store (unidirectional) / 调用方向
//!
//! Matching features / 匹配特性：
//! - Equivalent characters (`e>é`) match each other at any position
//! - Ignored characters (accents) may appear anywhere inside a word
//! - Works per Unicode code point, including astral-plane characters

pub mod buffered_reader;
pub mod directives;
pub mod pattern;
pub mod query;
pub mod schema;
pub mod tokenizer;
pub mod verse_provider;

pub use buffered_reader::{BatchProducer, BufferedReader};
pub use directives::SearchDirectives;
pub use pattern::{
    group_for, make_groups, make_regex, make_regex_pattern, make_regex_string, Flavor, RegexGroup,
    RegexOptions, RegexString, RegexToken,
};
pub use query::{SearchOptions, SearchQuery};
pub use schema::{SearchCandidate, SearchResult, VerseReference};
pub use tokenizer::{tokenize, words_of};
pub use verse_provider::{verse_stream, StoreVerseProvider, VerseProvider, VerseSearch};
