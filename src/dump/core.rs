use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// 导出过程中的错误类型
///
/// 存储侧的任何失败（列出键、查询类型、读取值、查询分数）都归为 `StoreRead`，
/// 原样携带客户端给出的错误信息，不做二次解释。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DumpError {
    #[error("Store read failed: {0}")]
    StoreRead(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Encoding failed: {0}")]
    Encoding(String),
}

/// 把存储返回的原始字节转成文本
///
/// 合法 UTF-8 原样保留，不产生拷贝；非法字节序列替换为 U+FFFD，
/// 保证二进制值也能导出，而不是让整次导出失败。
pub fn text_from_bytes(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// 存储声明的值类型
///
/// `Other` 收纳 hash、stream、none 等不在导出范围内的类型，走默认的标量读取路径。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Set,
    ZSet,
    List,
    Other(String),
}

impl ValueType {
    /// 解析 TYPE 命令的返回值
    pub fn parse(name: &str) -> Self {
        match name {
            "string" => ValueType::String,
            "set" => ValueType::Set,
            "zset" => ValueType::ZSet,
            "list" => ValueType::List,
            other => ValueType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ValueType::String => "string",
            ValueType::Set => "set",
            ValueType::ZSet => "zset",
            ValueType::List => "list",
            ValueType::Other(name) => name,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 复合值中的一个元素，只有 zset 的元素带分数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub score: Option<String>,
    pub member: String,
}

impl Entry {
    pub fn member(member: impl Into<String>) -> Self {
        Self {
            score: None,
            member: member.into(),
        }
    }

    pub fn scored(score: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            score: Some(score.into()),
            member: member.into(),
        }
    }

    /// 分数是否可用（空字符串与缺失同样视为无分数）
    pub fn has_score(&self) -> bool {
        self.score.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// 归一化后的值：标量，或有序的元素序列
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedValue {
    Scalar(Option<String>),
    Entries(Vec<Entry>),
}

impl NormalizedValue {
    pub fn len(&self) -> usize {
        match self {
            NormalizedValue::Scalar(_) => 1,
            NormalizedValue::Entries(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, NormalizedValue::Entries(entries) if entries.is_empty())
    }
}

/// 导出模式，每次导出选定一次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    /// 重放命令文本（SET / SADD / ZADD / RPUSH）
    #[default]
    Redis,
    /// 键到值的结构化文档
    Json,
}

impl ExportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportMode::Redis => "redis",
            ExportMode::Json => "json",
        }
    }
}

impl fmt::Display for ExportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExportMode {
    type Err = DumpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "redis" => Ok(ExportMode::Redis),
            "json" => Ok(ExportMode::Json),
            other => Err(DumpError::InvalidConfig(format!(
                "Unknown export type '{}', expected 'redis' or 'json'",
                other
            ))),
        }
    }
}

/// 文档模式下单个键的值（不含分数）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentValue {
    Scalar(Option<String>),
    Members(Vec<String>),
}

/// 文档模式的累加器
pub type Document = BTreeMap<String, DocumentValue>;

/// 一次导出的完整结果
#[derive(Debug, Clone, PartialEq)]
pub enum DumpOutput {
    Replay(String),
    Document(Document),
}

impl DumpOutput {
    /// 渲染为文本：重放模式原样输出，文档模式输出 JSON
    pub fn to_text(&self, pretty: bool) -> Result<String, DumpError> {
        match self {
            DumpOutput::Replay(text) => Ok(text.clone()),
            DumpOutput::Document(document) => {
                let rendered = if pretty {
                    serde_json::to_string_pretty(document)
                } else {
                    serde_json::to_string(document)
                };
                rendered.map_err(|e| DumpError::Encoding(e.to_string()))
            }
        }
    }

    pub fn as_replay(&self) -> Option<&str> {
        match self {
            DumpOutput::Replay(text) => Some(text),
            DumpOutput::Document(_) => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            DumpOutput::Replay(_) => None,
            DumpOutput::Document(document) => Some(document),
        }
    }
}
