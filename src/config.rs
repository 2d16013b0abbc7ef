//! Application configuration module / 应用配置模块
//!
//! Manages application configuration loaded from config.json
//! Creates default config file on first run / 首次运行时创建默认配置文件
//!
//! Nothing here is global: the loaded config is passed explicitly to the store
//! and to the verse provider.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::search::SearchDirectives;

/// Application configuration / 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Document store configuration / 文档存储配置
    pub store: StoreConfig,
    /// Search configuration / 搜索配置
    pub search: SearchConfig,
    /// Default scripture selection / 默认经文集
    pub scripture: ScriptureConfig,
}

/// Document store configuration / 文档存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// GraphQL endpoint URL / GraphQL 端点
    pub endpoint: String,
    /// Request timeout (seconds) / 请求超时
    pub timeout_secs: u64,
    /// Optional HTTP proxy / 代理
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
}

/// Search configuration / 搜索配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Accent directives, e.g. `\u0300-\u036F e>é` / 去音调指令
    pub accents_to_remove: String,
    /// Match whole words only by default / 默认全词匹配
    pub whole_words: bool,
    /// Verses pulled per page / 每页读取条数
    pub page_size: usize,
}

/// Scripture selection / 经文集选择
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptureConfig {
    pub doc_set: String,
    pub collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:4000/graphql".to_string(),
            timeout_secs: 30,
            proxy: None,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            accents_to_remove: String::new(),
            whole_words: false,
            page_size: 20,
        }
    }
}

impl Default for ScriptureConfig {
    fn default() -> Self {
        Self {
            doc_set: "eng_C01".to_string(),
            collection: "C01".to_string(),
        }
    }
}

impl AppConfig {
    /// Parsed search directives / 解析搜索指令
    pub fn directives(&self) -> Result<SearchDirectives, String> {
        SearchDirectives::parse(&self.search.accents_to_remove).map_err(|e| e.to_string())
    }

    /// Fail fast on values that would only break mid-search / 校验配置
    pub fn validate(&self) -> Result<(), String> {
        url::Url::parse(&self.store.endpoint)
            .map_err(|e| format!("Invalid store endpoint {}: {}", self.store.endpoint, e))?;
        if self.store.timeout_secs == 0 {
            return Err("store.timeout_secs must be greater than 0".to_string());
        }
        if self.search.page_size == 0 {
            return Err("search.page_size must be greater than 0".to_string());
        }
        self.directives()?;
        Ok(())
    }
}

/// Get the default config file path / 获取配置文件路径
pub fn default_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.json")
}

/// Load configuration from file, or create default if not exists / 加载配置文件，不存在则创建默认配置
pub fn load_config(config_path: &Path) -> Result<AppConfig, String> {
    let config = if config_path.exists() {
        // Load existing config / 加载现有配置
        let content = std::fs::read_to_string(config_path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        tracing::info!("Loaded configuration from {:?}", config_path);
        config
    } else {
        // Create default config / 创建默认配置
        let config = AppConfig::default();
        save_config(&config, config_path)?;
        tracing::info!("Created default configuration at {:?}", config_path);
        config
    };

    config.validate()?;
    Ok(config)
}

/// Save configuration to file / 保存配置到文件
pub fn save_config(config: &AppConfig, config_path: &Path) -> Result<(), String> {
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    std::fs::write(config_path, content)
        .map_err(|e| format!("Failed to write config file: {}", e))?;

    Ok(())
}
