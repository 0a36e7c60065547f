use crate::dump::client::StoreClient;
use crate::dump::core::{DumpError, Entry, NormalizedValue, ValueType};
use crate::dump::score::attach_scores;

/// 按值类型选择的读取操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOperation {
    /// SMEMBERS
    Members,
    /// ZRANGE key start stop
    ZRange { start: isize, stop: isize },
    /// LRANGE key start stop
    LRange { start: isize, stop: isize },
    /// GET
    Get,
}

impl ReadOperation {
    /// 类型到读取操作的映射，未识别的类型一律走 GET
    pub fn for_type(value_type: &ValueType) -> Self {
        match value_type {
            ValueType::Set => ReadOperation::Members,
            ValueType::ZSet => ReadOperation::ZRange { start: 0, stop: -1 },
            ValueType::List => ReadOperation::LRange { start: 0, stop: -1 },
            ValueType::String | ValueType::Other(_) => ReadOperation::Get,
        }
    }

    pub fn is_range(&self) -> bool {
        matches!(self, ReadOperation::ZRange { .. } | ReadOperation::LRange { .. })
    }
}

/// 读取一个键的值并归一化
///
/// zset 的范围读取结果会交给 [`attach_scores`] 补齐分数；
/// set / list 的每个成员包装成不带分数的元素；其余类型返回标量。
pub async fn read_value<C>(
    client: &C,
    key: &str,
    value_type: &ValueType,
) -> Result<NormalizedValue, DumpError>
where
    C: StoreClient + ?Sized,
{
    let operation = ReadOperation::for_type(value_type);

    let members = match operation {
        ReadOperation::Members => client.members(key).await?,
        ReadOperation::ZRange { start, stop } => client.zrange(key, start, stop).await?,
        ReadOperation::LRange { start, stop } => client.lrange(key, start, stop).await?,
        ReadOperation::Get => return Ok(NormalizedValue::Scalar(client.get(key).await?)),
    };

    if operation.is_range() && *value_type == ValueType::ZSet {
        return Ok(NormalizedValue::Entries(attach_scores(client, key, members).await?));
    }

    Ok(NormalizedValue::Entries(
        members.into_iter().map(Entry::member).collect(),
    ))
}
