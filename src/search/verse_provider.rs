//! Verse provider - walks a remote document store one book at a time / 经文提供者
//!
//! Two-phase querying / 两阶段查询：
//! 1. Book discovery: documents of the docSet matching every search word
//! 2. Per-book block fetch: tokens tagged with `chapter/` and `verses/` scopes,
//!    stitched back into verse text
//!
//! Books are fetched strictly in sequence through a `BufferedReader`, so only one
//! book's tokens are held at a time.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use futures::stream::{self, Stream, TryStreamExt};

use super::buffered_reader::{BatchProducer, BufferedReader};
use super::directives::SearchDirectives;
use super::pattern::{make_regex_pattern, RegexOptions};
use super::schema::{SearchCandidate, VerseReference};
use super::tokenizer::words_of;
use crate::error::{Result, SearchError};
use crate::store::query::{blocks_query, books_query, matching_chars_filter};
use crate::store::types::GqlDocument;
use crate::store::{DocumentStore, GqlBlockToken, GqlBlocks, GqlBooks};

/// Verse provider capability / 经文提供能力
#[async_trait]
pub trait VerseProvider: Send {
    /// Next `limit` candidates in document order; `0` returns everything left / 获取经文
    async fn get_verses(&mut self, limit: usize) -> Result<Vec<SearchCandidate>>;
}

/// Search request parameters / 搜索请求参数
#[derive(Debug, Clone, Default)]
pub struct VerseSearch {
    pub phrase: String,
    pub whole_words: bool,
    pub directives: SearchDirectives,
    pub doc_set: String,
    pub collection: String,
}

/// Store-side pattern for one search word / 单词转为存储端正则
pub fn keyword_to_regex(word: &str, whole_words: bool, directives: &SearchDirectives) -> String {
    let options = RegexOptions {
        equivalent: directives.equivalent(),
        ignore: directives.ignore.clone(),
        whole_line: whole_words,
        capture: false,
    };
    make_regex_pattern(word, &options)
}

/// `withMatchingChars` filter for all search words / 构建查询过滤参数
pub fn search_params(keywords: &[String], whole_words: bool, directives: &SearchDirectives) -> String {
    let terms: Vec<String> = keywords
        .iter()
        .map(|word| keyword_to_regex(word, whole_words, directives))
        .collect();
    matching_chars_filter(&terms)
}

/// Get a `chapter:verse` key from token scopes / 从作用域获取章节键
///
/// Missing tags are not an error: no verse tag gives a chapter-only key, no
/// chapter tag gives an empty chapter.
pub fn chapter_verse_from_scopes<S: AsRef<str>>(scopes: &[S]) -> String {
    let mut chapter = None;
    let mut verse = None;
    for scope in scopes {
        let scope = scope.as_ref();
        if let Some(rest) = scope.strip_prefix("chapter/") {
            chapter = rest.split('/').next();
        } else if let Some(rest) = scope.strip_prefix("verses/") {
            verse = rest.split('/').next();
        }
    }

    let mut key = chapter.unwrap_or_default().to_string();
    if let Some(verse) = verse.filter(|v| !v.is_empty()) {
        key.push(':');
        key.push_str(verse);
    }
    key
}

/// Concatenate payloads per verse key, keys in first-appearance order
fn collect_verse_texts(tokens: impl IntoIterator<Item = GqlBlockToken>) -> Vec<(String, String)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut verses: Vec<(String, String)> = Vec::new();
    for token in tokens {
        let key = chapter_verse_from_scopes(&token.scopes);
        match index.get(&key) {
            Some(&i) => verses[i].1.push_str(&token.payload),
            None => {
                index.insert(key.clone(), verses.len());
                verses.push((key, token.payload));
            }
        }
    }
    verses
}

/// Book list state / 书卷列表状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookState {
    Uninitialized,
    Resolved { books: Vec<String>, next_book: usize },
}

/// Producer yielding the verses of one book per pull / 按书卷产出经文
pub struct BookQueue {
    store: Arc<dyn DocumentStore>,
    search_params: String,
    doc_set: String,
    collection: String,
    state: BookState,
}

impl BookQueue {
    pub fn state(&self) -> &BookState {
        &self.state
    }

    async fn ensure_books_set(&mut self) -> Result<()> {
        if self.state == BookState::Uninitialized {
            self.set_books().await?;
        }
        Ok(())
    }

    async fn set_books(&mut self) -> Result<()> {
        let query = books_query(&self.doc_set, &self.search_params);
        let value = self
            .store
            .gql_query(&query)
            .await
            .map_err(SearchError::retrieval)?;
        let response: GqlBooks = serde_json::from_value(value).map_err(SearchError::retrieval)?;
        let doc_set = response
            .data
            .doc_set
            .ok_or_else(|| SearchError::retrieval(anyhow!("docSet {} not found", self.doc_set)))?;

        let books: Vec<String> = doc_set
            .documents
            .into_iter()
            .filter(GqlDocument::is_book)
            .map(|doc| doc.id)
            .collect();

        tracing::debug!(
            "Resolved {} matching books in docSet {} via {}",
            books.len(),
            self.doc_set,
            self.store.name()
        );
        self.state = BookState::Resolved { books, next_book: 0 };
        Ok(())
    }

    /// Fetch the verses of the next unvisited book / 读取下一卷
    ///
    /// The cursor advances before the fetch, so a book whose fetch fails is not retried.
    pub async fn query_next_book(&mut self) -> Result<Vec<SearchCandidate>> {
        self.ensure_books_set().await?;
        let book = match &mut self.state {
            BookState::Resolved { books, next_book } if *next_book < books.len() => {
                let book = books[*next_book].clone();
                *next_book += 1;
                book
            }
            _ => return Ok(Vec::new()),
        };
        self.verses_of_book(&book).await
    }

    async fn verses_of_book(&self, book_id: &str) -> Result<Vec<SearchCandidate>> {
        let query = blocks_query(book_id, &self.search_params);
        let value = self
            .store
            .gql_query(&query)
            .await
            .map_err(SearchError::retrieval)?;
        let response: GqlBlocks = serde_json::from_value(value).map_err(SearchError::retrieval)?;
        let document = response
            .data
            .document
            .ok_or_else(|| SearchError::retrieval(anyhow!("document {} not found", book_id)))?;

        let book_code = document.book_code.clone();
        let verses = self.verses_from_tokens(document.tokens(), &book_code);
        tracing::debug!("Book {} ({}): {} matching verses", book_code, book_id, verses.len());
        Ok(verses)
    }

    fn verses_from_tokens(
        &self,
        tokens: impl IntoIterator<Item = GqlBlockToken>,
        book_code: &str,
    ) -> Vec<SearchCandidate> {
        collect_verse_texts(tokens)
            .into_iter()
            .map(|(key, text)| SearchCandidate {
                reference: VerseReference::from_key(&self.doc_set, &self.collection, book_code, &key),
                text,
            })
            .collect()
    }
}

#[async_trait]
impl BatchProducer for BookQueue {
    type Item = SearchCandidate;
    type Error = SearchError;

    async fn read(&mut self) -> Result<Vec<SearchCandidate>> {
        self.query_next_book().await
    }

    fn done(&self) -> bool {
        match &self.state {
            BookState::Uninitialized => false,
            BookState::Resolved { books, next_book } => *next_book >= books.len(),
        }
    }
}

/// Verse provider backed by a document store / 基于文档存储的经文提供者
pub struct StoreVerseProvider {
    search_is_blank: bool,
    reader: BufferedReader<BookQueue>,
}

impl StoreVerseProvider {
    pub fn new(store: Arc<dyn DocumentStore>, search: VerseSearch) -> Self {
        let words = words_of(&search.phrase);
        let search_params = search_params(&words, search.whole_words, &search.directives);

        Self {
            search_is_blank: words.is_empty(),
            reader: BufferedReader::new(BookQueue {
                store,
                search_params,
                doc_set: search.doc_set,
                collection: search.collection,
                state: BookState::Uninitialized,
            }),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.search_is_blank
    }

    /// Filter sent with both queries / 查询过滤参数
    pub fn search_params(&self) -> &str {
        &self.reader.producer().search_params
    }

    pub fn state(&self) -> &BookState {
        self.reader.producer().state()
    }

    /// Fetch the next book directly, bypassing the page buffer / 直接读取下一卷
    pub async fn query_next_book(&mut self) -> Result<Vec<SearchCandidate>> {
        if self.search_is_blank {
            return Ok(Vec::new());
        }
        self.reader.producer_mut().query_next_book().await
    }
}

#[async_trait]
impl VerseProvider for StoreVerseProvider {
    async fn get_verses(&mut self, limit: usize) -> Result<Vec<SearchCandidate>> {
        if self.search_is_blank {
            return Ok(Vec::new());
        }
        self.reader.producer_mut().ensure_books_set().await?;
        self.reader.read(limit).await
    }
}

/// Lazy stream over any provider, `page_size` verses per pull / 转为经文流
pub fn verse_stream<V: VerseProvider>(
    provider: V,
    page_size: usize,
) -> impl Stream<Item = Result<SearchCandidate>> {
    let page_size = page_size.max(1);
    stream::try_unfold(provider, move |mut provider| async move {
        let page = provider.get_verses(page_size).await?;
        if page.is_empty() {
            return Ok::<_, SearchError>(None);
        }
        Ok(Some((
            stream::iter(page.into_iter().map(Ok::<SearchCandidate, SearchError>)),
            provider,
        )))
    })
    .try_flatten()
}
