use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use std::fs;
use std::path::Path;

use crate::cfg::TypeOptions;
use crate::dump::core::ExportMode;

/// 导出工具配置
///
/// ```yaml
/// client:
///   type: RedisStoreClient
///   options:
///     host: 127.0.0.1
///     port: 6379
///     password: secret
/// format: json
/// output: /tmp/dump.json
/// pretty: true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, SmartDefault)]
#[serde(default)]
pub struct DumpConfig {
    /// 存储客户端配置，默认连接本机 Redis
    #[default(default_client())]
    pub client: TypeOptions,

    /// 导出格式："redis" 或 "json"
    pub format: ExportMode,

    /// 输出文件，未设置时写到标准输出
    pub output: Option<String>,

    /// json 格式是否美化输出
    pub pretty: bool,
}

fn default_client() -> TypeOptions {
    TypeOptions {
        type_name: "RedisStoreClient".to_string(),
        options: serde_json::json!({}),
    }
}

impl DumpConfig {
    /// 从文件加载配置，按扩展名选择 JSON5 / YAML / TOML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let config = match extension.as_str() {
            "json" | "json5" => json5::from_str(&content).map_err(anyhow::Error::from),
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(anyhow::Error::from),
            "toml" => toml::from_str(&content).map_err(anyhow::Error::from),
            other => Err(anyhow!("Unsupported config format: '{}'", other)),
        };

        config.with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}
