//! StoreClient 实现的注册表
//!
//! 配置里的 `{"type": ..., "options": ...}` 经由这里选择并创建存储客户端

use anyhow::Result;
use once_cell::sync::Lazy;

use crate::cfg::{Registry, TypeOptions};

use super::{
    MemoryStoreClient, MemoryStoreClientConfig, RedisStoreClient, RedisStoreClientConfig,
    StoreClient,
};

static STORE_CLIENTS: Lazy<Registry<dyn StoreClient>> = Lazy::new(|| {
    Registry::new()
        .with::<RedisStoreClient, RedisStoreClientConfig>("RedisStoreClient")
        .with::<MemoryStoreClient, MemoryStoreClientConfig>("MemoryStoreClient")
});

/// 全局的存储客户端注册表
///
/// # 内置类型
/// - `RedisStoreClient` - Redis 服务端
/// - `MemoryStoreClient` - 进程内存储
///
/// 其他实现可以在运行时通过 [`Registry::register`] 追加。
pub fn store_client_registry() -> &'static Registry<dyn StoreClient> {
    &STORE_CLIENTS
}

/// 按 TypeOptions 创建存储客户端，不建立连接
///
/// # 示例
/// ```ignore
/// use redis_dump::cfg::TypeOptions;
/// use redis_dump::dump::create_store_client;
///
/// let opts = TypeOptions::from_json(r#"{
///     "type": "RedisStoreClient",
///     "options": { "host": "localhost", "port": 6379 }
/// }"#)?;
///
/// let client = create_store_client(&opts)?;
/// ```
pub fn create_store_client(type_options: &TypeOptions) -> Result<Box<dyn StoreClient>> {
    STORE_CLIENTS.create(type_options)
}
