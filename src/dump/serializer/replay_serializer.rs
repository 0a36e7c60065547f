use super::core::DumpSerializer;
use super::quote::{format_key, quote};
use crate::dump::core::{ExportMode, NormalizedValue, ValueType};

/// 类型对应的重建命令
///
/// 标量路径读取的其他类型按字符串处理。
pub fn command_for(value_type: &ValueType) -> &'static str {
    match value_type {
        ValueType::String => "SET",
        ValueType::Set => "SADD",
        ValueType::ZSet => "ZADD",
        ValueType::List => "RPUSH",
        ValueType::Other(_) => "SET",
    }
}

/// 重放命令序列化器
///
/// 每个键输出一行或多行命令：
/// - 标量：`SET key "value"`，缺失的值输出空字符串
/// - 集合 / 列表：每个成员一行 `SADD key "member"` / `RPUSH key "member"`
/// - 有序集合：`ZADD key score "member"`，分数为空时省略分数
#[derive(Debug, Clone, Default)]
pub struct ReplaySerializer;

impl ReplaySerializer {
    pub fn new() -> Self {
        Self
    }
}

impl DumpSerializer for ReplaySerializer {
    type Output = String;

    fn mode(&self) -> ExportMode {
        ExportMode::Redis
    }

    fn serialize(
        &self,
        key: &str,
        value_type: &ValueType,
        value: NormalizedValue,
        mut acc: String,
    ) -> String {
        let command = command_for(value_type);
        let key = format_key(key);

        match value {
            NormalizedValue::Scalar(value) => {
                let value = value.unwrap_or_default();
                acc.push_str(&format!("{} {} {}\n", command, key, quote(&value)));
            }
            NormalizedValue::Entries(entries) => {
                for entry in entries {
                    match entry.score.as_deref() {
                        Some(score) if *value_type == ValueType::ZSet && !score.is_empty() => {
                            acc.push_str(&format!(
                                "{} {} {} {}\n",
                                command,
                                key,
                                score,
                                quote(&entry.member)
                            ));
                        }
                        _ => {
                            acc.push_str(&format!("{} {} {}\n", command, key, quote(&entry.member)));
                        }
                    }
                }
            }
        }

        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump::core::Entry;

    #[test]
    fn test_serialize_scalar() {
        let serializer = ReplaySerializer::new();
        let acc = serializer.serialize(
            "greeting",
            &ValueType::String,
            NormalizedValue::Scalar(Some("hello".to_string())),
            String::new(),
        );
        assert_eq!(acc, "SET greeting \"hello\"\n");
    }

    #[test]
    fn test_serialize_missing_scalar_as_empty() {
        let serializer = ReplaySerializer::new();
        let acc = serializer.serialize(
            "gone",
            &ValueType::Other("none".to_string()),
            NormalizedValue::Scalar(None),
            String::new(),
        );
        assert_eq!(acc, "SET gone \"\"\n");
    }

    #[test]
    fn test_serialize_appends_to_accumulator() {
        let serializer = ReplaySerializer::new();
        let acc = serializer.serialize(
            "tags",
            &ValueType::Set,
            NormalizedValue::Entries(vec![Entry::member("a"), Entry::member("b")]),
            "SET x \"1\"\n".to_string(),
        );
        assert_eq!(acc, "SET x \"1\"\nSADD tags \"a\"\nSADD tags \"b\"\n");
    }

    #[test]
    fn test_serialize_list() {
        let serializer = ReplaySerializer::new();
        let acc = serializer.serialize(
            "queue",
            &ValueType::List,
            NormalizedValue::Entries(vec![Entry::member("first"), Entry::member("second")]),
            String::new(),
        );
        assert_eq!(acc, "RPUSH queue \"first\"\nRPUSH queue \"second\"\n");
    }

    #[test]
    fn test_serialize_zset() {
        let serializer = ReplaySerializer::new();
        let acc = serializer.serialize(
            "rank",
            &ValueType::ZSet,
            NormalizedValue::Entries(vec![
                Entry::scored("1", "m1"),
                Entry::scored("", "m2"),
                Entry::member("m3"),
                Entry::scored("0", "m4"),
            ]),
            String::new(),
        );
        assert_eq!(
            acc,
            "ZADD rank 1 \"m1\"\nZADD rank \"m2\"\nZADD rank \"m3\"\nZADD rank 0 \"m4\"\n"
        );
    }

    #[test]
    fn test_serialize_escapes_quotes() {
        let serializer = ReplaySerializer::new();
        let acc = serializer.serialize(
            "my key",
            &ValueType::String,
            NormalizedValue::Scalar(Some("say \"hi\"".to_string())),
            String::new(),
        );
        assert_eq!(acc, "SET \"my key\" \"say \\\"hi\\\"\"\n");
    }
}
