//! cfg 模块 - 配置管理
//!
//! 通过 `TypeOptions` 与 `Registry` 按名字创建 trait 实现，配置可以来自 JSON5 / YAML / TOML

pub mod registry;
pub mod type_options;

// 重新导出公共 API
pub use registry::Registry;
pub use type_options::TypeOptions;
