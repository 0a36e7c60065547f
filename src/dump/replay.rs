//! 重放文本的解析与回放
//!
//! 解析重放模式生成的命令文本，并把命令应用到 [`MemoryStoreClient`]，
//! 用于校验导出结果能够重建原始数据。

use thiserror::Error;

use crate::dump::client::MemoryStoreClient;
use crate::dump::core::{text_from_bytes, DumpError};

/// 重放相关错误
#[derive(Error, Debug, PartialEq)]
pub enum ReplayError {
    #[error("Syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("Unknown command at line {line}: {command}")]
    UnknownCommand { line: usize, command: String },

    #[error(transparent)]
    Store(#[from] DumpError),
}

/// 一条重建命令
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayCommand {
    Set { key: String, value: String },
    Sadd { key: String, member: String },
    /// 分数缺失时为 None
    Zadd { key: String, score: Option<f64>, member: String },
    Rpush { key: String, element: String },
}

/// 按 redis-cli 的规则切分一行参数
///
/// `\xHH` 转义得到的是原始字节，参数先按字节累积，闭合后再整体解码，
/// 因此 `"\xc3\xa9"` 还原为 `é`。
pub fn split_args(line: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        let Some(&first) = chars.peek() else {
            return Ok(args);
        };

        let mut arg: Vec<u8> = Vec::new();
        match first {
            '"' => {
                chars.next();
                loop {
                    match chars.next() {
                        None => return Err("unbalanced quotes".to_string()),
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            None => return Err("unbalanced quotes".to_string()),
                            Some('n') => arg.push(b'\n'),
                            Some('r') => arg.push(b'\r'),
                            Some('t') => arg.push(b'\t'),
                            Some('b') => arg.push(0x08),
                            Some('a') => arg.push(0x07),
                            Some('x') => {
                                let hex: String = chars.by_ref().take(2).collect();
                                let byte = u8::from_str_radix(&hex, 16)
                                    .map_err(|_| format!("invalid escape \\x{}", hex))?;
                                arg.push(byte);
                            }
                            Some(other) => push_char(&mut arg, other),
                        },
                        Some(c) => push_char(&mut arg, c),
                    }
                }
            }
            '\'' => {
                chars.next();
                loop {
                    match chars.next() {
                        None => return Err("unbalanced quotes".to_string()),
                        Some('\'') => break,
                        Some('\\') if chars.peek() == Some(&'\'') => {
                            chars.next();
                            arg.push(b'\'');
                        }
                        Some(c) => push_char(&mut arg, c),
                    }
                }
            }
            _ => {
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() {
                        break;
                    }
                    push_char(&mut arg, c);
                    chars.next();
                }
                args.push(text_from_bytes(arg));
                continue;
            }
        }

        // 闭合引号后必须是空白或行尾
        if chars.peek().is_some_and(|c| !c.is_whitespace()) {
            return Err("closing quote must be followed by a space".to_string());
        }
        args.push(text_from_bytes(arg));
    }
}

fn push_char(buf: &mut Vec<u8>, c: char) {
    let mut utf8 = [0u8; 4];
    buf.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
}

/// 解析重放文本，空行忽略
pub fn parse(text: &str) -> Result<Vec<ReplayCommand>, ReplayError> {
    let mut commands = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let args = split_args(line).map_err(|message| ReplayError::Syntax {
            line: line_no,
            message,
        })?;
        if args.is_empty() {
            continue;
        }

        let syntax = |message: &str| ReplayError::Syntax {
            line: line_no,
            message: message.to_string(),
        };

        let command = match (args[0].to_ascii_uppercase().as_str(), args.len()) {
            ("SET", 3) => ReplayCommand::Set {
                key: args[1].clone(),
                value: args[2].clone(),
            },
            ("SADD", 3) => ReplayCommand::Sadd {
                key: args[1].clone(),
                member: args[2].clone(),
            },
            ("RPUSH", 3) => ReplayCommand::Rpush {
                key: args[1].clone(),
                element: args[2].clone(),
            },
            ("ZADD", 3) => ReplayCommand::Zadd {
                key: args[1].clone(),
                score: None,
                member: args[2].clone(),
            },
            ("ZADD", 4) => ReplayCommand::Zadd {
                key: args[1].clone(),
                score: Some(
                    args[2]
                        .parse::<f64>()
                        .map_err(|_| syntax("score is not a valid float"))?,
                ),
                member: args[3].clone(),
            },
            ("SET" | "SADD" | "RPUSH" | "ZADD", _) => {
                return Err(syntax("wrong number of arguments"));
            }
            (other, _) => {
                return Err(ReplayError::UnknownCommand {
                    line: line_no,
                    command: other.to_string(),
                });
            }
        };
        commands.push(command);
    }

    Ok(commands)
}

/// 把一条命令应用到内存存储；缺失的 zset 分数按 0 写入
pub fn apply(client: &MemoryStoreClient, command: ReplayCommand) -> Result<(), DumpError> {
    match command {
        ReplayCommand::Set { key, value } => client.set(key, value),
        ReplayCommand::Sadd { key, member } => client.sadd(key, member).map(|_| ()),
        ReplayCommand::Zadd { key, score, member } => {
            client.zadd(key, score.unwrap_or(0.0), member).map(|_| ())
        }
        ReplayCommand::Rpush { key, element } => client.rpush(key, element).map(|_| ()),
    }
}

/// 解析并回放整段文本，返回执行的命令数
pub fn restore(client: &MemoryStoreClient, text: &str) -> Result<usize, ReplayError> {
    let commands = parse(text)?;
    let count = commands.len();
    for command in commands {
        apply(client, command)?;
    }

    tracing::debug!(commands = count, "replay restored");
    Ok(count)
}
