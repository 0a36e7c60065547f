pub mod core;
pub mod document_serializer;
pub mod quote;
pub mod replay_serializer;

// 重新导出核心 trait
pub use self::core::DumpSerializer;

// 重新导出具体的序列化器
pub use document_serializer::DocumentSerializer;
pub use replay_serializer::{command_for, ReplaySerializer};
