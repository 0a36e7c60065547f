// 按名字构造 trait object 的注册表

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::type_options::TypeOptions;

type Constructor<Trait> = Box<dyn Fn(JsonValue) -> Result<Box<Trait>> + Send + Sync>;

/// 一个 trait 的全部已注册实现
///
/// 每个注册表只服务一个 trait（`Trait` 取 `dyn StoreClient` 这样的形式），
/// 构造函数直接产出 `Box<Trait>`。
///
/// # 示例
/// ```ignore
/// let registry = Registry::<dyn StoreClient>::new()
///     .with::<MemoryStoreClient, MemoryStoreClientConfig>("MemoryStoreClient");
///
/// let client = registry.create(&TypeOptions::from_json(r#"{"type": "MemoryStoreClient"}"#)?)?;
/// ```
pub struct Registry<Trait: ?Sized> {
    constructors: RwLock<HashMap<String, Constructor<Trait>>>,
}

impl<Trait: ?Sized + 'static> Registry<Trait> {
    pub fn new() -> Self {
        Self {
            constructors: RwLock::new(HashMap::new()),
        }
    }

    /// 构建阶段注册实现，用于静态注册表的初始化
    pub fn with<T, Config>(mut self, type_name: &str) -> Self
    where
        T: From<Config> + 'static,
        Config: DeserializeOwned + 'static,
        Box<T>: Into<Box<Trait>>,
    {
        self.constructors
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(type_name.to_string(), Self::constructor::<T, Config>());
        self
    }

    /// 注册实现 `T`，其配置类型 `Config` 从 `TypeOptions::options` 反序列化
    ///
    /// 同名重复注册时覆盖旧的构造函数。
    pub fn register<T, Config>(&self, type_name: &str) -> Result<()>
    where
        T: From<Config> + 'static,
        Config: DeserializeOwned + 'static,
        Box<T>: Into<Box<Trait>>,
    {
        self.constructors
            .write()
            .map_err(|_| anyhow!("Failed to acquire write lock"))?
            .insert(type_name.to_string(), Self::constructor::<T, Config>());
        Ok(())
    }

    /// 已注册的类型名，按字母序
    pub fn type_names(&self) -> Vec<String> {
        let constructors = self
            .constructors
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = constructors.keys().cloned().collect();
        names.sort();
        names
    }

    /// 按 `type` 选择实现，用 `options` 构造
    pub fn create(&self, type_options: &TypeOptions) -> Result<Box<Trait>> {
        let constructors = self
            .constructors
            .read()
            .map_err(|_| anyhow!("Failed to acquire read lock"))?;

        let Some(constructor) = constructors.get(&type_options.type_name) else {
            let mut known: Vec<&str> = constructors.keys().map(String::as_str).collect();
            known.sort_unstable();
            return Err(anyhow!(
                "Type '{}' is not registered (known: {})",
                type_options.type_name,
                known.join(", ")
            ));
        };

        constructor(type_options.options.clone())
            .with_context(|| format!("Invalid options for '{}'", type_options.type_name))
    }

    fn constructor<T, Config>() -> Constructor<Trait>
    where
        T: From<Config> + 'static,
        Config: DeserializeOwned + 'static,
        Box<T>: Into<Box<Trait>>,
    {
        Box::new(|options: JsonValue| -> Result<Box<Trait>> {
            let config: Config = serde_json::from_value(options)?;
            Ok(Box::new(T::from(config)).into())
        })
    }
}

impl<Trait: ?Sized + 'static> Default for Registry<Trait> {
    fn default() -> Self {
        Self::new()
    }
}
