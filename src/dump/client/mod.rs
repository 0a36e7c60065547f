pub mod core;
pub mod memory_client;
pub mod redis_client;
pub mod register;

// 重新导出核心 trait
pub use self::core::StoreClient;

// 重新导出具体实现
pub use memory_client::{MemoryStoreClient, MemoryStoreClientConfig, MemoryValue, ScoredMember};
pub use redis_client::{RedisStoreClient, RedisStoreClientConfig};

// 重新导出注册函数
pub use register::{create_store_client, store_client_registry};
