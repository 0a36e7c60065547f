//! 单元测试用的存储客户端包装：记录调用并按需注入失败

use async_trait::async_trait;
use std::sync::Mutex;

use super::client::{MemoryStoreClient, StoreClient};
use super::core::{DumpError, ValueType};

/// 在指定操作上失败的包装客户端
#[derive(Default)]
pub struct FlakyClient {
    pub inner: MemoryStoreClient,
    pub fail_list_keys: bool,
    pub fail_type_of: Option<String>,
    pub fail_read: Option<String>,
    /// (key, member)：对该成员的 ZSCORE 失败
    pub fail_score: Option<(String, String)>,
    pub calls: Mutex<Vec<String>>,
}

impl FlakyClient {
    pub fn new(inner: MemoryStoreClient) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    fn check_read(&self, key: &str) -> Result<(), DumpError> {
        if self.fail_read.as_deref() == Some(key) {
            return Err(DumpError::StoreRead(format!("read {} refused", key)));
        }
        Ok(())
    }
}

#[async_trait]
impl StoreClient for FlakyClient {
    async fn list_keys(&self) -> Result<Vec<String>, DumpError> {
        self.record("KEYS".to_string());
        if self.fail_list_keys {
            return Err(DumpError::StoreRead("KEYS refused".to_string()));
        }
        let mut keys = self.inner.list_keys().await?;
        // 固定顺序，便于断言
        keys.sort();
        Ok(keys)
    }

    async fn type_of(&self, key: &str) -> Result<ValueType, DumpError> {
        self.record(format!("TYPE {}", key));
        if self.fail_type_of.as_deref() == Some(key) {
            return Err(DumpError::StoreRead(format!("TYPE {} refused", key)));
        }
        self.inner.type_of(key).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, DumpError> {
        self.record(format!("GET {}", key));
        self.check_read(key)?;
        self.inner.get(key).await
    }

    async fn members(&self, key: &str) -> Result<Vec<String>, DumpError> {
        self.record(format!("SMEMBERS {}", key));
        self.check_read(key)?;
        self.inner.members(key).await
    }

    async fn zrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>, DumpError> {
        self.record(format!("ZRANGE {} {} {}", key, start, stop));
        self.check_read(key)?;
        self.inner.zrange(key, start, stop).await
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>, DumpError> {
        self.record(format!("LRANGE {} {} {}", key, start, stop));
        self.check_read(key)?;
        self.inner.lrange(key, start, stop).await
    }

    async fn score_of(&self, key: &str, member: &str) -> Result<Option<String>, DumpError> {
        self.record(format!("ZSCORE {} {}", key, member));
        if let Some((fail_key, fail_member)) = &self.fail_score {
            if fail_key == key && fail_member == member {
                return Err(DumpError::StoreRead(format!("ZSCORE {} {} refused", key, member)));
            }
        }
        self.inner.score_of(key, member).await
    }
}
