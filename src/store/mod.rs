//! Document store - remote scripture store interface / 文档存储接口
//!
//! Architecture principles / 架构原则：
//! - The store only executes GraphQL queries, it does not control pagination
//! - The verse provider decides what to ask for and in which order
//! - Call direction: Search → Store (unidirectional) / 调用方向

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

pub mod http;
pub mod query;
pub mod types;

pub use http::HttpStore;
pub use types::{GqlBlockToken, GqlBlocks, GqlBooks};

/// Document store driver (only executes queries) / 文档存储驱动
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Driver name / 驱动名称
    fn name(&self) -> &str;

    /// Run a GraphQL query, returning the full response body (`{"data": …}`) / 执行查询
    async fn gql_query(&self, query: &str) -> Result<Value>;
}
