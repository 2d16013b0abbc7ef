//! Error types / 错误类型

use thiserror::Error;

/// Search error / 搜索错误
#[derive(Debug, Error)]
pub enum SearchError {
    /// Remote store query failed or answered with an unexpected shape / 远程查询失败
    #[error("retrieval failed: {0:#}")]
    Retrieval(anyhow::Error),

    /// Local pattern failed to compile / 正则编译失败
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Search directive could not be parsed / 搜索指令解析失败
    #[error("invalid search directive `{directive}`: {reason}")]
    Directive { directive: String, reason: String },
}

impl SearchError {
    pub fn retrieval(err: impl Into<anyhow::Error>) -> Self {
        SearchError::Retrieval(err.into())
    }

    pub(crate) fn directive(directive: &str, reason: impl Into<String>) -> Self {
        SearchError::Directive {
            directive: directive.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = SearchError> = std::result::Result<T, E>;
