//! 导出模块
//!
//! 列出存储中的全部键，按类型读取并归一化，再序列化为重放命令文本或结构化文档。

pub mod client;
pub mod config;
pub mod core;
pub mod exporter;
pub mod reader;
pub mod replay;
pub mod score;
pub mod serializer;

#[cfg(test)]
mod test_support;

// 重新导出核心类型
pub use self::core::{
    text_from_bytes, Document, DocumentValue, DumpError, DumpOutput, Entry, ExportMode, NormalizedValue,
    ValueType,
};

pub use client::{
    create_store_client, store_client_registry, MemoryStoreClient, MemoryStoreClientConfig, MemoryValue,
    RedisStoreClient, RedisStoreClientConfig, StoreClient,
};
pub use config::DumpConfig;
pub use exporter::{export, export_key, export_with, ExportCallback, ExportParams, RedisDump};
pub use reader::{read_value, ReadOperation};
pub use replay::{restore, ReplayCommand, ReplayError};
pub use score::attach_scores;
pub use serializer::{DocumentSerializer, DumpSerializer, ReplaySerializer};
