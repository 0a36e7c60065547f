use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Range;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::core::StoreClient;
use crate::dump::core::{DumpError, ValueType};

const WRONGTYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";

/// MemoryStoreClient 配置结构体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MemoryStoreClientConfig {
    /// 初始容量（可选）
    #[serde(default)]
    pub initial_capacity: Option<usize>,
}

/// 有序集合中的一个成员
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMember {
    pub member: String,
    pub score: f64,
}

/// 内存中保存的值
#[derive(Debug, Clone, PartialEq)]
pub enum MemoryValue {
    String(String),
    /// 按插入顺序保存，成员唯一
    Set(Vec<String>),
    /// 按 (score, member) 升序保存，与 Redis ZRANGE 的顺序一致
    ZSet(Vec<ScoredMember>),
    List(Vec<String>),
}

impl MemoryValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            MemoryValue::String(_) => ValueType::String,
            MemoryValue::Set(_) => ValueType::Set,
            MemoryValue::ZSet(_) => ValueType::ZSet,
            MemoryValue::List(_) => ValueType::List,
        }
    }
}

/// 基于内存 HashMap 的存储客户端
///
/// 行为尽量贴近 Redis：不存在的键类型为 `none`，读取时返回 nil 或空列表；
/// 对错误类型的键读写返回 WRONGTYPE 错误。除了 `StoreClient` 的只读接口，
/// 还提供 SET / SADD / ZADD / RPUSH 等写操作，供测试与重放使用。
pub struct MemoryStoreClient {
    map: RwLock<HashMap<String, MemoryValue>>,
}

impl MemoryStoreClient {
    pub fn new() -> Self {
        Self {
            map: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_config(config: MemoryStoreClientConfig) -> Self {
        let initial_map = match config.initial_capacity {
            Some(capacity) => HashMap::with_capacity(capacity),
            None => HashMap::new(),
        };

        Self {
            map: RwLock::new(initial_map),
        }
    }

    fn read_map(&self) -> Result<RwLockReadGuard<'_, HashMap<String, MemoryValue>>, DumpError> {
        self.map
            .read()
            .map_err(|_| DumpError::StoreRead("Failed to acquire read lock".to_string()))
    }

    fn write_map(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, MemoryValue>>, DumpError> {
        self.map
            .write()
            .map_err(|_| DumpError::StoreRead("Failed to acquire write lock".to_string()))
    }

    /// SET key value
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) -> Result<(), DumpError> {
        let mut map = self.write_map()?;
        map.insert(key.into(), MemoryValue::String(value.into()));
        Ok(())
    }

    /// SADD key member，返回新增的成员数
    pub fn sadd(&self, key: impl Into<String>, member: impl Into<String>) -> Result<usize, DumpError> {
        let mut map = self.write_map()?;
        let entry = map
            .entry(key.into())
            .or_insert_with(|| MemoryValue::Set(Vec::new()));
        let MemoryValue::Set(members) = entry else {
            return Err(DumpError::StoreRead(WRONGTYPE.to_string()));
        };

        let member = member.into();
        if members.contains(&member) {
            return Ok(0);
        }
        members.push(member);
        Ok(1)
    }

    /// ZADD key score member，已存在的成员更新分数
    pub fn zadd(
        &self,
        key: impl Into<String>,
        score: f64,
        member: impl Into<String>,
    ) -> Result<usize, DumpError> {
        if score.is_nan() {
            return Err(DumpError::StoreRead("ERR value is not a valid float".to_string()));
        }

        let mut map = self.write_map()?;
        let entry = map
            .entry(key.into())
            .or_insert_with(|| MemoryValue::ZSet(Vec::new()));
        let MemoryValue::ZSet(members) = entry else {
            return Err(DumpError::StoreRead(WRONGTYPE.to_string()));
        };

        let member = member.into();
        let added = match members.iter().position(|m| m.member == member) {
            Some(index) => {
                members.remove(index);
                0
            }
            None => 1,
        };

        let index = members.partition_point(|m| {
            m.score < score || (m.score == score && m.member < member)
        });
        members.insert(index, ScoredMember { member, score });
        Ok(added)
    }

    /// RPUSH key element，返回列表长度
    pub fn rpush(&self, key: impl Into<String>, element: impl Into<String>) -> Result<usize, DumpError> {
        let mut map = self.write_map()?;
        let entry = map
            .entry(key.into())
            .or_insert_with(|| MemoryValue::List(Vec::new()));
        let MemoryValue::List(elements) = entry else {
            return Err(DumpError::StoreRead(WRONGTYPE.to_string()));
        };

        elements.push(element.into());
        Ok(elements.len())
    }

    /// DEL key，返回是否删除了键
    pub fn del(&self, key: &str) -> Result<bool, DumpError> {
        let mut map = self.write_map()?;
        Ok(map.remove(key).is_some())
    }

    /// 直接读取内存中的值（测试比对用）
    pub fn value(&self, key: &str) -> Result<Option<MemoryValue>, DumpError> {
        let map = self.read_map()?;
        Ok(map.get(key).cloned())
    }

    pub fn len(&self) -> Result<usize, DumpError> {
        Ok(self.read_map()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, DumpError> {
        Ok(self.read_map()?.is_empty())
    }

    pub fn clear(&self) -> Result<(), DumpError> {
        self.write_map()?.clear();
        Ok(())
    }
}

impl Default for MemoryStoreClient {
    fn default() -> Self {
        Self::new()
    }
}

/// 按 Redis 规则把 [start, stop]（支持负数下标）换算成切片范围
fn index_range(len: usize, start: isize, stop: isize) -> Range<usize> {
    let len = len as isize;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };

    if start > stop || start >= len {
        return 0..0;
    }
    start as usize..(stop + 1) as usize
}

#[async_trait]
impl StoreClient for MemoryStoreClient {
    async fn list_keys(&self) -> Result<Vec<String>, DumpError> {
        let map = self.read_map()?;
        Ok(map.keys().cloned().collect())
    }

    async fn type_of(&self, key: &str) -> Result<ValueType, DumpError> {
        let map = self.read_map()?;
        Ok(map
            .get(key)
            .map(MemoryValue::value_type)
            .unwrap_or_else(|| ValueType::Other("none".to_string())))
    }

    async fn get(&self, key: &str) -> Result<Option<String>, DumpError> {
        let map = self.read_map()?;
        match map.get(key) {
            None => Ok(None),
            Some(MemoryValue::String(value)) => Ok(Some(value.clone())),
            Some(_) => Err(DumpError::StoreRead(WRONGTYPE.to_string())),
        }
    }

    async fn members(&self, key: &str) -> Result<Vec<String>, DumpError> {
        let map = self.read_map()?;
        match map.get(key) {
            None => Ok(Vec::new()),
            Some(MemoryValue::Set(members)) => Ok(members.clone()),
            Some(_) => Err(DumpError::StoreRead(WRONGTYPE.to_string())),
        }
    }

    async fn zrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>, DumpError> {
        let map = self.read_map()?;
        match map.get(key) {
            None => Ok(Vec::new()),
            Some(MemoryValue::ZSet(members)) => Ok(members[index_range(members.len(), start, stop)]
                .iter()
                .map(|m| m.member.clone())
                .collect()),
            Some(_) => Err(DumpError::StoreRead(WRONGTYPE.to_string())),
        }
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>, DumpError> {
        let map = self.read_map()?;
        match map.get(key) {
            None => Ok(Vec::new()),
            Some(MemoryValue::List(elements)) => {
                Ok(elements[index_range(elements.len(), start, stop)].to_vec())
            }
            Some(_) => Err(DumpError::StoreRead(WRONGTYPE.to_string())),
        }
    }

    async fn score_of(&self, key: &str, member: &str) -> Result<Option<String>, DumpError> {
        let map = self.read_map()?;
        match map.get(key) {
            None => Ok(None),
            Some(MemoryValue::ZSet(members)) => Ok(members
                .iter()
                .find(|m| m.member == member)
                .map(|m| m.score.to_string())),
            Some(_) => Err(DumpError::StoreRead(WRONGTYPE.to_string())),
        }
    }
}

impl From<MemoryStoreClientConfig> for MemoryStoreClient {
    fn from(config: MemoryStoreClientConfig) -> Self {
        MemoryStoreClient::with_config(config)
    }
}

impl From<Box<MemoryStoreClient>> for Box<dyn StoreClient> {
    fn from(source: Box<MemoryStoreClient>) -> Self {
        source as Box<dyn StoreClient>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_range() {
        assert_eq!(index_range(5, 0, -1), 0..5);
        assert_eq!(index_range(5, 1, 2), 1..3);
        assert_eq!(index_range(5, -2, -1), 3..5);
        assert_eq!(index_range(5, 0, 100), 0..5);
        assert_eq!(index_range(5, -100, 1), 0..2);
        assert_eq!(index_range(5, 3, 1), 0..0);
        assert_eq!(index_range(0, 0, -1), 0..0);
    }

    #[tokio::test]
    async fn test_string_operations() {
        let client = MemoryStoreClient::new();
        client.set("k", "v").unwrap();

        assert_eq!(client.type_of("k").await.unwrap(), ValueType::String);
        assert_eq!(client.get("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(client.get("missing").await.unwrap(), None);
        assert_eq!(
            client.type_of("missing").await.unwrap(),
            ValueType::Other("none".to_string())
        );
    }

    #[tokio::test]
    async fn test_set_operations() {
        let client = MemoryStoreClient::new();
        assert_eq!(client.sadd("s", "a").unwrap(), 1);
        assert_eq!(client.sadd("s", "b").unwrap(), 1);
        assert_eq!(client.sadd("s", "a").unwrap(), 0);

        assert_eq!(client.type_of("s").await.unwrap(), ValueType::Set);
        assert_eq!(client.members("s").await.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_zset_keeps_redis_order() {
        let client = MemoryStoreClient::new();
        client.zadd("z", 3.0, "c").unwrap();
        client.zadd("z", 1.0, "b").unwrap();
        client.zadd("z", 1.0, "a").unwrap();
        client.zadd("z", 2.5, "d").unwrap();

        assert_eq!(client.zrange("z", 0, -1).await.unwrap(), vec!["a", "b", "d", "c"]);
        assert_eq!(client.score_of("z", "d").await.unwrap().as_deref(), Some("2.5"));
        assert_eq!(client.score_of("z", "c").await.unwrap().as_deref(), Some("3"));
        assert_eq!(client.score_of("z", "x").await.unwrap(), None);

        // 更新分数会调整位置
        assert_eq!(client.zadd("z", 0.0, "c").unwrap(), 0);
        assert_eq!(client.zrange("z", 0, -1).await.unwrap(), vec!["c", "a", "b", "d"]);
        assert_eq!(client.zrange("z", 1, 2).await.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_list_operations() {
        let client = MemoryStoreClient::new();
        client.rpush("l", "x").unwrap();
        client.rpush("l", "y").unwrap();
        assert_eq!(client.rpush("l", "x").unwrap(), 3);

        assert_eq!(client.type_of("l").await.unwrap(), ValueType::List);
        assert_eq!(client.lrange("l", 0, -1).await.unwrap(), vec!["x", "y", "x"]);
        assert_eq!(client.lrange("l", -1, -1).await.unwrap(), vec!["x"]);
    }

    #[tokio::test]
    async fn test_wrong_type() {
        let client = MemoryStoreClient::new();
        client.rpush("l", "x").unwrap();

        assert!(matches!(client.get("l").await, Err(DumpError::StoreRead(_))));
        assert!(matches!(client.members("l").await, Err(DumpError::StoreRead(_))));
        assert!(matches!(client.zrange("l", 0, -1).await, Err(DumpError::StoreRead(_))));
        assert!(client.sadd("l", "a").is_err());
        assert!(client.zadd("l", 1.0, "a").is_err());
    }

    #[tokio::test]
    async fn test_del_and_clear() {
        let client = MemoryStoreClient::with_config(MemoryStoreClientConfig {
            initial_capacity: Some(4),
        });
        client.set("a", "1").unwrap();
        client.set("b", "2").unwrap();
        assert_eq!(client.len().unwrap(), 2);

        assert!(client.del("a").unwrap());
        assert!(!client.del("a").unwrap());
        assert_eq!(client.list_keys().await.unwrap(), vec!["b"]);

        client.clear().unwrap();
        assert!(client.is_empty().unwrap());
    }
}
