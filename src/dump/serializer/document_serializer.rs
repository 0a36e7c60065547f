use super::core::DumpSerializer;
use crate::dump::core::{Document, DocumentValue, ExportMode, NormalizedValue, ValueType};

/// 文档序列化器
///
/// 标量原样保存；复合值去掉分数，只保留有序成员列表。
/// 同一个键再次写入时覆盖旧值。
#[derive(Debug, Clone, Default)]
pub struct DocumentSerializer;

impl DocumentSerializer {
    pub fn new() -> Self {
        Self
    }
}

impl DumpSerializer for DocumentSerializer {
    type Output = Document;

    fn mode(&self) -> ExportMode {
        ExportMode::Json
    }

    fn serialize(
        &self,
        key: &str,
        _value_type: &ValueType,
        value: NormalizedValue,
        mut acc: Document,
    ) -> Document {
        let value = match value {
            NormalizedValue::Scalar(value) => DocumentValue::Scalar(value),
            NormalizedValue::Entries(entries) => {
                DocumentValue::Members(entries.into_iter().map(|e| e.member).collect())
            }
        };

        acc.insert(key.to_string(), value);
        acc
    }
}
