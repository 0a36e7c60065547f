use async_trait::async_trait;

use crate::dump::core::{DumpError, ValueType};

/// 存储客户端门面
///
/// 导出流程只消费这组只读操作，连接与认证由具体实现负责。
/// 所有失败都以 `DumpError::StoreRead` 返回。
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// 列出全部键（KEYS *）
    async fn list_keys(&self) -> Result<Vec<String>, DumpError>;

    /// 查询键的类型（TYPE）
    async fn type_of(&self, key: &str) -> Result<ValueType, DumpError>;

    /// 读取标量值（GET），键不存在时返回 None
    async fn get(&self, key: &str) -> Result<Option<String>, DumpError>;

    /// 读取集合成员（SMEMBERS），顺序不保证
    async fn members(&self, key: &str) -> Result<Vec<String>, DumpError>;

    /// 按分数升序读取有序集合成员（ZRANGE）
    async fn zrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>, DumpError>;

    /// 读取列表元素（LRANGE）
    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>, DumpError>;

    /// 查询有序集合成员的分数（ZSCORE），成员不存在时返回 None
    async fn score_of(&self, key: &str, member: &str) -> Result<Option<String>, DumpError>;
}
