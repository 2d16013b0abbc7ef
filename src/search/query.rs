//! Search query - local confirmation and highlighting of candidates / 搜索查询
//!
//! The store filters by pattern, but only per block. Every candidate verse is
//! re-checked here against all words, and the matched byte spans are recorded.

use std::collections::VecDeque;

use regex::Regex;

use super::directives::SearchDirectives;
use super::pattern::{make_regex, RegexOptions};
use super::schema::{SearchCandidate, SearchResult};
use super::tokenizer::words_of;
use super::verse_provider::VerseProvider;
use crate::error::Result;

const DEFAULT_PAGE_SIZE: usize = 20;

/// Search options / 搜索选项
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub whole_words: bool,
    pub directives: SearchDirectives,
}

/// Paged search over a verse provider / 分页搜索
pub struct SearchQuery<V: VerseProvider> {
    provider: V,
    words: Vec<String>,
    matchers: Vec<Regex>,
    whole_words: bool,
    page_size: usize,
    pending: VecDeque<SearchResult>,
    exhausted: bool,
}

impl<V: VerseProvider> SearchQuery<V> {
    pub fn new(phrase: &str, provider: V, options: SearchOptions) -> Result<Self> {
        let words = words_of(phrase);
        let regex_options = RegexOptions {
            equivalent: options.directives.equivalent(),
            ignore: options.directives.ignore.clone(),
            whole_line: false,
            capture: true,
        };
        let matchers = words
            .iter()
            .map(|word| make_regex(word, &regex_options))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            provider,
            words,
            matchers,
            whole_words: options.whole_words,
            page_size: DEFAULT_PAGE_SIZE,
            pending: VecDeque::new(),
            exhausted: false,
        })
    }

    /// Candidates pulled from the provider per round trip / 每次拉取条数
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn provider(&self) -> &V {
        &self.provider
    }

    /// Confirm one candidate, returning it with merged match spans / 本地匹配
    pub fn match_candidate(&self, candidate: SearchCandidate) -> Option<SearchResult> {
        if self.matchers.is_empty() {
            return None;
        }

        let mut spans = Vec::new();
        for matcher in &self.matchers {
            let found = self.find_spans(matcher, &candidate.text);
            if found.is_empty() {
                return None;
            }
            spans.extend(found);
        }

        Some(SearchResult {
            reference: candidate.reference,
            text: candidate.text,
            matches: merge_spans(spans),
        })
    }

    /// Accepted spans of one word. A rejected match does not hide a later one
    /// starting inside it: the search resumes one char past the rejected start.
    fn find_spans(&self, matcher: &Regex, text: &str) -> Vec<(usize, usize)> {
        let mut spans = Vec::new();
        let mut at = 0;
        while at <= text.len() {
            let Some(m) = matcher.captures_at(text, at).and_then(|caps| caps.get(1)) else {
                break;
            };
            if !m.is_empty() && (!self.whole_words || is_word_bounded(text, m.start(), m.end())) {
                spans.push((m.start(), m.end()));
                at = m.end();
            } else {
                at = m.start() + text[m.start()..].chars().next().map_or(1, char::len_utf8);
            }
        }
        spans
    }

    /// Next `limit` results; `0` returns everything left / 获取结果
    pub async fn get_results(&mut self, limit: usize) -> Result<Vec<SearchResult>> {
        if self.matchers.is_empty() {
            return Ok(Vec::new());
        }

        while (limit == 0 || self.pending.len() < limit) && !self.exhausted {
            let page = self.provider.get_verses(self.page_size).await?;
            if page.is_empty() {
                self.exhausted = true;
                break;
            }
            let scanned = page.len();
            let results: Vec<SearchResult> = page
                .into_iter()
                .filter_map(|candidate| self.match_candidate(candidate))
                .collect();
            tracing::debug!("Confirmed {} of {} candidates", results.len(), scanned);
            self.pending.extend(results);
        }

        let take = if limit == 0 {
            self.pending.len()
        } else {
            limit.min(self.pending.len())
        };
        Ok(self.pending.drain(..take).collect())
    }
}

fn is_word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

/// Sort spans and merge overlapping or touching ones
fn merge_spans(mut spans: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    spans.sort_unstable();
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}
