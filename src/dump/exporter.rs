use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cfg::TypeOptions;
use crate::dump::client::{create_store_client, RedisStoreClient, RedisStoreClientConfig, StoreClient};
use crate::dump::core::{DumpError, DumpOutput, ExportMode, ValueType};
use crate::dump::reader::read_value;
use crate::dump::serializer::{DocumentSerializer, DumpSerializer, ReplaySerializer};

/// 导出完成回调，每次导出恰好调用一次
pub type ExportCallback = Box<dyn FnOnce(Result<DumpOutput, DumpError>) + Send>;

/// 导出参数
pub struct ExportParams {
    /// "redis" 输出重放命令，"json" 输出文档
    pub mode: ExportMode,
    /// 完成回调，未设置时结果被丢弃
    pub callback: Option<ExportCallback>,
}

impl ExportParams {
    pub fn new(mode: ExportMode) -> Self {
        Self {
            mode,
            callback: None,
        }
    }

    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(Result<DumpOutput, DumpError>) + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }
}

/// 导出单个键：查询类型、读取、序列化进累加器
pub async fn export_key<C, S>(
    client: &C,
    serializer: &S,
    key: &str,
    acc: S::Output,
) -> Result<S::Output, DumpError>
where
    C: StoreClient + ?Sized,
    S: DumpSerializer,
{
    let value_type = client.type_of(key).await?;
    if let ValueType::Other(name) = &value_type {
        warn!(key, value_type = %name, "unsupported type, dumping as scalar");
    }

    let value = read_value(client, key, &value_type).await?;
    debug!(key, value_type = %value_type, entries = value.len(), "key exported");

    Ok(serializer.serialize(key, &value_type, value, acc))
}

/// 按给定序列化器导出全部键
///
/// 先一次性列出所有键，再逐个处理：上一个键的类型查询、读取、分数补齐、
/// 序列化全部完成后才开始下一个键。任何一步失败都立即返回该错误，
/// 不产生部分结果。
pub async fn export_with<C, S>(client: &C, serializer: &S) -> Result<S::Output, DumpError>
where
    C: StoreClient + ?Sized,
    S: DumpSerializer,
{
    let mut pending = client.list_keys().await?;
    info!(keys = pending.len(), mode = %serializer.mode(), "export started");

    let mut acc = S::Output::default();
    while let Some(key) = pending.pop() {
        acc = export_key(client, serializer, &key, acc).await?;
    }

    info!(mode = %serializer.mode(), "export finished");
    Ok(acc)
}

/// 按导出模式导出全部键
pub async fn export<C>(client: &C, mode: ExportMode) -> Result<DumpOutput, DumpError>
where
    C: StoreClient + ?Sized,
{
    let result = match mode {
        ExportMode::Redis => export_with(client, &ReplaySerializer::new())
            .await
            .map(DumpOutput::Replay),
        ExportMode::Json => export_with(client, &DocumentSerializer::new())
            .await
            .map(DumpOutput::Document),
    };

    if let Err(e) = &result {
        warn!(error = %e, mode = %mode, "export aborted");
    }
    result
}

/// 导出入口
///
/// 持有一个存储客户端，可以直接注入，也可以按连接参数创建。
/// 客户端通过 `Arc` 共享，同一个实例上可以并发发起多次导出，
/// 每次导出使用独立的累加器。
///
/// # 示例
/// ```ignore
/// use redis_dump::dump::{ExportMode, ExportParams, RedisDump, RedisStoreClientConfig};
///
/// let dump = RedisDump::connect(RedisStoreClientConfig::default()).await?;
/// dump.export(ExportParams::new(ExportMode::Redis).with_callback(|result| {
///     match result {
///         Ok(output) => print!("{}", output.to_text(false).unwrap_or_default()),
///         Err(e) => eprintln!("dump failed: {}", e),
///     }
/// }))
/// .await;
/// ```
#[derive(Clone)]
pub struct RedisDump {
    client: Arc<dyn StoreClient>,
    connect_params: Option<RedisStoreClientConfig>,
}

impl RedisDump {
    /// 使用已有客户端
    pub fn new<C>(client: C) -> Self
    where
        C: StoreClient + 'static,
    {
        Self {
            client: Arc::new(client),
            connect_params: None,
        }
    }

    pub fn from_boxed(client: Box<dyn StoreClient>) -> Self {
        Self {
            client: Arc::from(client),
            connect_params: None,
        }
    }

    /// 按连接参数连接 Redis（带密码时自动认证）
    pub async fn connect(config: RedisStoreClientConfig) -> Result<Self, DumpError> {
        info!(address = %config.address(), db = config.db, "connecting");
        let client = RedisStoreClient::connect(config.clone()).await?;
        Ok(Self {
            client: Arc::new(client),
            connect_params: Some(config),
        })
    }

    /// 按 TypeOptions 创建客户端（如 `{"type": "RedisStoreClient", "options": {...}}`）
    pub fn from_type_options(type_options: &TypeOptions) -> anyhow::Result<Self> {
        let client = create_store_client(type_options)?;

        let connect_params = if type_options.type_name == "RedisStoreClient" {
            Some(serde_json::from_value(type_options.options.clone())?)
        } else {
            None
        };

        Ok(Self {
            client: Arc::from(client),
            connect_params,
        })
    }

    /// 库版本
    pub fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    pub fn client(&self) -> &dyn StoreClient {
        self.client.as_ref()
    }

    /// 连接参数，注入客户端时为 None
    pub fn connect_params(&self) -> Option<&RedisStoreClientConfig> {
        self.connect_params.as_ref()
    }

    /// 导出并返回结果
    pub async fn dump(&self, mode: ExportMode) -> Result<DumpOutput, DumpError> {
        export(self.client.as_ref(), mode).await
    }

    /// 导出并把结果交给回调，回调恰好调用一次
    pub async fn export(&self, params: ExportParams) {
        let result = self.dump(params.mode).await;
        let callback: ExportCallback = params
            .callback
            .unwrap_or_else(|| Box::new(|_: Result<DumpOutput, DumpError>| {}));
        callback(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump::client::MemoryStoreClient;
    use crate::dump::core::{Document, DocumentValue};
    use crate::dump::test_support::FlakyClient;
    use std::sync::Mutex;

    fn sample_store() -> MemoryStoreClient {
        let store = MemoryStoreClient::new();
        store.set("a:str", "hello").unwrap();
        store.sadd("b:set", "x").unwrap();
        store.zadd("c:zset", 1.0, "m1").unwrap();
        store.zadd("c:zset", 2.0, "m2").unwrap();
        store.zadd("c:zset", 3.0, "m3").unwrap();
        store.rpush("d:list", "first").unwrap();
        store.rpush("d:list", "second").unwrap();
        store
    }

    #[tokio::test]
    async fn test_export_empty_store() {
        let client = MemoryStoreClient::new();

        let output = export(&client, ExportMode::Redis).await.unwrap();
        assert_eq!(output, DumpOutput::Replay(String::new()));

        let output = export(&client, ExportMode::Json).await.unwrap();
        assert_eq!(output, DumpOutput::Document(Document::new()));
    }

    #[tokio::test]
    async fn test_export_replay_processes_keys_from_tail() {
        // FlakyClient 按字典序列出键，导出从列表尾部开始
        let client = FlakyClient::new(sample_store());
        let output = export(&client, ExportMode::Redis).await.unwrap();

        assert_eq!(
            output.as_replay().unwrap(),
            "RPUSH d:list \"first\"\n\
             RPUSH d:list \"second\"\n\
             ZADD c:zset 1 \"m1\"\n\
             ZADD c:zset 2 \"m2\"\n\
             ZADD c:zset 3 \"m3\"\n\
             SADD b:set \"x\"\n\
             SET a:str \"hello\"\n"
        );
    }

    #[tokio::test]
    async fn test_export_key_pipeline_is_sequential() {
        let client = FlakyClient::new(sample_store());
        export(&client, ExportMode::Json).await.unwrap();

        assert_eq!(
            client.calls(),
            vec![
                "KEYS",
                "TYPE d:list",
                "LRANGE d:list 0 -1",
                "TYPE c:zset",
                "ZRANGE c:zset 0 -1",
                "ZSCORE c:zset m1",
                "ZSCORE c:zset m2",
                "ZSCORE c:zset m3",
                "TYPE b:set",
                "SMEMBERS b:set",
                "TYPE a:str",
                "GET a:str",
            ]
        );
    }

    #[tokio::test]
    async fn test_export_document() {
        let client = sample_store();
        let output = export(&client, ExportMode::Json).await.unwrap();
        let document = output.as_document().unwrap();

        assert_eq!(document.len(), 4);
        assert_eq!(
            document.get("a:str"),
            Some(&DocumentValue::Scalar(Some("hello".to_string())))
        );
        assert_eq!(
            document.get("c:zset"),
            Some(&DocumentValue::Members(vec![
                "m1".to_string(),
                "m2".to_string(),
                "m3".to_string()
            ]))
        );
        assert_eq!(
            document.get("d:list"),
            Some(&DocumentValue::Members(vec!["first".to_string(), "second".to_string()]))
        );
    }

    #[tokio::test]
    async fn test_export_list_keys_failure() {
        let mut client = FlakyClient::new(sample_store());
        client.fail_list_keys = true;

        let result = export(&client, ExportMode::Redis).await;
        assert_eq!(result, Err(DumpError::StoreRead("KEYS refused".to_string())));
        assert_eq!(client.calls(), vec!["KEYS"]);
    }

    #[tokio::test]
    async fn test_export_type_failure_stops_traversal() {
        let mut client = FlakyClient::new(sample_store());
        client.fail_type_of = Some("c:zset".to_string());

        let result = export(&client, ExportMode::Json).await;
        assert!(matches!(result, Err(DumpError::StoreRead(_))));
        // b:set 与 a:str 不再处理
        assert!(client.calls_starting_with("TYPE b:set").is_empty());
        assert!(client.calls_starting_with("TYPE a:str").is_empty());
    }

    #[tokio::test]
    async fn test_export_score_failure_stops_lookups() {
        let mut client = FlakyClient::new(sample_store());
        client.fail_score = Some(("c:zset".to_string(), "m2".to_string()));

        let result = export(&client, ExportMode::Redis).await;
        assert!(matches!(result, Err(DumpError::StoreRead(_))));
        assert_eq!(
            client.calls_starting_with("ZSCORE"),
            vec!["ZSCORE c:zset m1", "ZSCORE c:zset m2"]
        );
        assert!(client.calls_starting_with("TYPE b:set").is_empty());
    }

    #[tokio::test]
    async fn test_redis_dump_callback_fires_once() {
        let dump = RedisDump::new(sample_store());
        let results = Arc::new(Mutex::new(Vec::new()));

        let sink = results.clone();
        dump.export(ExportParams::new(ExportMode::Json).with_callback(move |result| {
            sink.lock().unwrap().push(result);
        }))
        .await;

        let results = results.lock().unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].as_ref().unwrap().as_document().is_some());
    }

    #[tokio::test]
    async fn test_redis_dump_callback_receives_error() {
        let mut client = FlakyClient::new(sample_store());
        client.fail_read = Some("d:list".to_string());
        let dump = RedisDump::new(client);
        let results = Arc::new(Mutex::new(Vec::new()));

        let sink = results.clone();
        dump.export(ExportParams::new(ExportMode::Redis).with_callback(move |result| {
            sink.lock().unwrap().push(result);
        }))
        .await;

        let results = results.lock().unwrap();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(DumpError::StoreRead(_))));
    }

    #[tokio::test]
    async fn test_redis_dump_without_callback() {
        let dump = RedisDump::new(sample_store());
        dump.export(ExportParams::new(ExportMode::Redis)).await;
        assert!(dump.connect_params().is_none());
        assert_eq!(RedisDump::version(), env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_redis_dump_from_type_options() {
        let opts = TypeOptions::from_json(r#"{"type": "MemoryStoreClient", "options": {}}"#).unwrap();
        let dump = RedisDump::from_type_options(&opts).unwrap();
        assert!(dump.connect_params().is_none());
        assert_eq!(
            dump.dump(ExportMode::Redis).await.unwrap(),
            DumpOutput::Replay(String::new())
        );

        let opts = TypeOptions::from_json(
            r#"{"type": "RedisStoreClient", "options": {"host": "cache", "port": 6380}}"#,
        )
        .unwrap();
        let dump = RedisDump::from_type_options(&opts).unwrap();
        let params = dump.connect_params().unwrap();
        assert_eq!(params.address(), "cache:6380");
    }

    #[tokio::test]
    async fn test_concurrent_exports_use_independent_accumulators() {
        let dump = RedisDump::new(sample_store());
        let (a, b) = tokio::join!(dump.dump(ExportMode::Redis), dump.dump(ExportMode::Redis));
        assert_eq!(a.unwrap(), b.unwrap());
    }
}
