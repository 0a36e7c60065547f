use crate::dump::core::{ExportMode, NormalizedValue, ValueType};

/// 导出序列化器
///
/// 累加器显式传入、显式返回，单个键的序列化可以脱离导出流程独立测试。
/// 纯转换，没有失败路径。
pub trait DumpSerializer: Send + Sync {
    /// 累加器类型，导出开始时以 `Default` 创建
    type Output: Default + Send;

    /// 对应的导出模式
    fn mode(&self) -> ExportMode;

    /// 把一个键的值写入累加器，返回更新后的累加器
    fn serialize(
        &self,
        key: &str,
        value_type: &ValueType,
        value: NormalizedValue,
        acc: Self::Output,
    ) -> Self::Output;
}
