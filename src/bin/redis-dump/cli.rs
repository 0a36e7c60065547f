// CLI argument definitions using clap

use clap::{ArgAction, Parser};
use redis_dump::ExportMode;

#[derive(Parser, Debug)]
#[command(name = "redis-dump")]
#[command(version)]
#[command(about = "Dump all keys of a Redis database as replay commands or JSON", long_about = None)]
#[command(disable_help_flag = true)]
pub struct Cli {
    /// Server hostname (default: 127.0.0.1)
    #[arg(short = 'h', long)]
    pub host: Option<String>,

    /// Server port (default: 6379)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Password used to authenticate
    #[arg(short = 'a', long, env = "REDIS_DUMP_PASSWORD")]
    pub password: Option<String>,

    /// ACL username (Redis 6.0+)
    #[arg(long)]
    pub username: Option<String>,

    /// Database number
    #[arg(short = 'n', long)]
    pub db: Option<i64>,

    /// Output format
    #[arg(short, long, value_parser = parse_format)]
    pub format: Option<ExportMode>,

    /// Write the dump to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Path to config file (default: ~/.redis-dump/config.yaml if present)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

impl Cli {
    /// 是否在命令行上指定了任何连接参数
    pub fn has_connection_overrides(&self) -> bool {
        self.host.is_some()
            || self.port.is_some()
            || self.password.is_some()
            || self.username.is_some()
            || self.db.is_some()
    }
}

fn parse_format(s: &str) -> Result<ExportMode, String> {
    s.parse::<ExportMode>().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_connection_flags() {
        let cli = Cli::parse_from([
            "redis-dump", "-h", "cache", "-p", "6380", "-a", "secret", "-n", "2", "-f", "json",
        ]);
        assert_eq!(cli.host.as_deref(), Some("cache"));
        assert_eq!(cli.port, Some(6380));
        assert_eq!(cli.password.as_deref(), Some("secret"));
        assert_eq!(cli.db, Some(2));
        assert_eq!(cli.format, Some(ExportMode::Json));
        assert!(cli.has_connection_overrides());
    }

    #[test]
    fn test_parse_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["redis-dump", "-f", "xml"]).is_err());
    }
}
