use async_trait::async_trait;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use tokio::sync::OnceCell;

use super::core::StoreClient;
use crate::dump::core::{text_from_bytes, DumpError, ValueType};

/// Redis 客户端配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, SmartDefault)]
#[serde(default)]
pub struct RedisStoreClientConfig {
    /// host:port 地址（如 "localhost:6379"），设置后忽略 host/port
    pub endpoint: Option<String>,

    /// 主机名
    #[default = "127.0.0.1"]
    pub host: String,

    /// 端口
    #[default = 6379]
    pub port: u16,

    /// Redis 6.0+ ACL 用户名
    pub username: Option<String>,

    /// 密码，非空时通过连接 URL 认证
    pub password: Option<String>,

    /// 数据库编号
    #[default = 0]
    pub db: i64,
}

impl RedisStoreClientConfig {
    /// 实际连接的 host:port
    pub fn address(&self) -> String {
        match self.endpoint.as_deref() {
            Some(endpoint) if !endpoint.is_empty() => endpoint.to_string(),
            _ => format!("{}:{}", self.host, self.port),
        }
    }

    /// 构建 Redis 连接 URL
    pub fn url(&self) -> String {
        let address = self.address();
        match self.password.as_deref() {
            Some(password) if !password.is_empty() => {
                let username = self.username.as_deref().unwrap_or("default");
                format!(
                    "redis://{}:{}@{}/{}",
                    urlencoding::encode(username),
                    urlencoding::encode(password),
                    address,
                    self.db
                )
            }
            _ => format!("redis://{}/{}", address, self.db),
        }
    }
}

/// 基于 redis crate 的存储客户端
///
/// 连接在第一次读取时建立，之后所有请求复用同一个 `ConnectionManager`
/// （多路复用，可被并发的导出调用共享）。
///
/// # 示例
/// ```ignore
/// use redis_dump::dump::{export, ExportMode, RedisStoreClient, RedisStoreClientConfig};
///
/// let client = RedisStoreClient::connect(RedisStoreClientConfig {
///     host: "localhost".to_string(),
///     password: Some("secret".to_string()),
///     ..Default::default()
/// })
/// .await?;
///
/// let output = export(&client, ExportMode::Redis).await?;
/// ```
pub struct RedisStoreClient {
    config: RedisStoreClientConfig,
    connection: OnceCell<ConnectionManager>,
}

impl RedisStoreClient {
    /// 创建客户端，不立即连接
    pub fn new(config: RedisStoreClientConfig) -> Self {
        Self {
            config,
            connection: OnceCell::new(),
        }
    }

    /// 创建客户端并立即连接，用 PING 验证连通性
    pub async fn connect(config: RedisStoreClientConfig) -> Result<Self, DumpError> {
        let client = Self::new(config);
        let mut con = client.connection().await.map_err(|e| match e {
            DumpError::StoreRead(msg) => DumpError::ConnectionFailed(msg),
            other => other,
        })?;

        let _: String = redis::cmd("PING")
            .query_async(&mut con)
            .await
            .map_err(|e| DumpError::ConnectionFailed(format!("PING failed: {}", e)))?;

        Ok(client)
    }

    pub fn config(&self) -> &RedisStoreClientConfig {
        &self.config
    }

    async fn connection(&self) -> Result<ConnectionManager, DumpError> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                let client = redis::Client::open(self.config.url()).map_err(|e| {
                    DumpError::StoreRead(format!("Invalid connection URL: {}", e))
                })?;
                tracing::debug!(address = %self.config.address(), db = self.config.db, "connecting to redis");
                ConnectionManager::new(client)
                    .await
                    .map_err(|e| DumpError::StoreRead(format!("Failed to get connection: {}", e)))
            })
            .await?;

        Ok(manager.clone())
    }
}

fn texts_from_bytes(items: Vec<Vec<u8>>) -> Vec<String> {
    items.into_iter().map(text_from_bytes).collect()
}

// 回复一律按字节读取再转文本：值可能是压缩或序列化后的二进制数据，
// 直接按 String 解析会让整次导出失败
#[async_trait]
impl StoreClient for RedisStoreClient {
    async fn list_keys(&self) -> Result<Vec<String>, DumpError> {
        let mut con = self.connection().await?;
        let keys: Vec<Vec<u8>> = redis::cmd("KEYS")
            .arg("*")
            .query_async(&mut con)
            .await
            .map_err(|e| DumpError::StoreRead(format!("KEYS failed: {}", e)))?;

        Ok(texts_from_bytes(keys))
    }

    async fn type_of(&self, key: &str) -> Result<ValueType, DumpError> {
        let mut con = self.connection().await?;
        let name: String = redis::cmd("TYPE")
            .arg(key)
            .query_async(&mut con)
            .await
            .map_err(|e| DumpError::StoreRead(format!("TYPE failed: {}", e)))?;

        Ok(ValueType::parse(&name))
    }

    async fn get(&self, key: &str) -> Result<Option<String>, DumpError> {
        let mut con = self.connection().await?;
        let value: Option<Vec<u8>> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut con)
            .await
            .map_err(|e| DumpError::StoreRead(format!("GET failed: {}", e)))?;

        Ok(value.map(text_from_bytes))
    }

    async fn members(&self, key: &str) -> Result<Vec<String>, DumpError> {
        let mut con = self.connection().await?;
        let members: Vec<Vec<u8>> = redis::cmd("SMEMBERS")
            .arg(key)
            .query_async(&mut con)
            .await
            .map_err(|e| DumpError::StoreRead(format!("SMEMBERS failed: {}", e)))?;

        Ok(texts_from_bytes(members))
    }

    async fn zrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>, DumpError> {
        let mut con = self.connection().await?;
        let members: Vec<Vec<u8>> = redis::cmd("ZRANGE")
            .arg(key)
            .arg(start)
            .arg(stop)
            .query_async(&mut con)
            .await
            .map_err(|e| DumpError::StoreRead(format!("ZRANGE failed: {}", e)))?;

        Ok(texts_from_bytes(members))
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>, DumpError> {
        let mut con = self.connection().await?;
        let elements: Vec<Vec<u8>> = redis::cmd("LRANGE")
            .arg(key)
            .arg(start)
            .arg(stop)
            .query_async(&mut con)
            .await
            .map_err(|e| DumpError::StoreRead(format!("LRANGE failed: {}", e)))?;

        Ok(texts_from_bytes(elements))
    }

    async fn score_of(&self, key: &str, member: &str) -> Result<Option<String>, DumpError> {
        let mut con = self.connection().await?;
        let score: Option<Vec<u8>> = redis::cmd("ZSCORE")
            .arg(key)
            .arg(member)
            .query_async(&mut con)
            .await
            .map_err(|e| DumpError::StoreRead(format!("ZSCORE failed: {}", e)))?;

        Ok(score.map(text_from_bytes))
    }
}

// 实现 cfg 模块要求的 From trait
impl From<RedisStoreClientConfig> for RedisStoreClient {
    fn from(config: RedisStoreClientConfig) -> Self {
        RedisStoreClient::new(config)
    }
}

impl From<Box<RedisStoreClient>> for Box<dyn StoreClient> {
    fn from(source: Box<RedisStoreClient>) -> Self {
        source as Box<dyn StoreClient>
    }
}
