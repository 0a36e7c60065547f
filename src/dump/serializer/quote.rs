//! 重放文本的引号与转义
//!
//! 转义规则与 redis-cli 解析参数时的规则一致，生成的文本可以直接交给 redis-cli 执行。

use std::fmt::Write;

/// 用双引号包裹并转义
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{7}' => out.push_str("\\a"),
            '\u{8}' => out.push_str("\\b"),
            c if c.is_ascii_control() => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// 键不需要引号时原样输出
pub fn format_key(key: &str) -> String {
    if needs_quote(key) {
        quote(key)
    } else {
        key.to_string()
    }
}

fn needs_quote(key: &str) -> bool {
    key.is_empty()
        || key
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '\'' || c == '\\' || c.is_control())
}
