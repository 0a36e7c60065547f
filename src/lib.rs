//! redis-dump - Redis 数据导出工具库
//!
//! 把键值存储的全部内容导出为重建命令文本，或者导出为一个键到值的 JSON 文档。
//!
//! ## 模块
//!
//! - **cfg**: 配置管理（TypeOptions、按名字创建 trait 实现的 Registry）
//! - **dump**: 导出流程（存储客户端、值读取、分数补齐、序列化、导出编排、重放）
//!
//! ## 示例
//!
//! ```ignore
//! use redis_dump::{ExportMode, RedisDump, RedisStoreClientConfig};
//!
//! let dump = RedisDump::connect(RedisStoreClientConfig::default()).await?;
//! let output = dump.dump(ExportMode::Redis).await?;
//! print!("{}", output.to_text(false)?);
//! ```

pub mod cfg;
pub mod dump;

// 重新导出主要的公共 API
pub use cfg::{Registry, TypeOptions};

pub use dump::{
    create_store_client, export, DumpConfig, DumpError, DumpOutput, ExportMode, ExportParams,
    MemoryStoreClient, RedisDump, RedisStoreClient, RedisStoreClientConfig, StoreClient,
};
