//! HTTP GraphQL store driver / HTTP GraphQL 存储驱动

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use super::DocumentStore;
use crate::config::StoreConfig;

/// GraphQL endpoint reached over HTTP / 通过 HTTP 访问的 GraphQL 端点
pub struct HttpStore {
    endpoint: String,
    client: Client,
}

impl HttpStore {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let mut builder = Client::builder().timeout(Duration::from_secs(config.timeout_secs));

        // 配置代理
        if let Some(ref proxy_url) = config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| anyhow!("Invalid proxy URL: {} - {}", proxy_url, e))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl DocumentStore for HttpStore {
    fn name(&self) -> &str {
        "http"
    }

    async fn gql_query(&self, query: &str) -> Result<Value> {
        tracing::debug!("GraphQL query to {}: {}", self.endpoint, query);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "query": query }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Store returned {}: {}", status, body));
        }

        let body: Value = response.json().await?;
        check_errors(&body)?;
        Ok(body)
    }
}

/// Turn a non-empty GraphQL `errors` array into an error / 检查 GraphQL 错误
fn check_errors(body: &Value) -> Result<()> {
    let Some(errors) = body.get("errors").and_then(Value::as_array) else {
        return Ok(());
    };
    if errors.is_empty() {
        return Ok(());
    }
    let messages: Vec<&str> = errors
        .iter()
        .map(|e| e.get("message").and_then(Value::as_str).unwrap_or("unknown error"))
        .collect();
    Err(anyhow!("GraphQL errors: {}", messages.join("; ")))
}
