//! Echobot setup wizard.
//!
//! Prompts for the Telegram bot token, an optional allow-list of user IDs and
//! the log level, then writes `config.toml` to the project root
//! (`ECHOBOT_ROOT`, falling back to the current directory).

use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

// ── Config formatting ──────────────────────────────────────────────────────────

struct ConfigParams<'a> {
    tg_token: &'a str,
    user_ids: &'a [u64],
    log_level: &'a str,
}

/// Parse "111, 222 333" into numeric Telegram user IDs.
fn parse_user_ids(input: &str) -> Result<Vec<u64>> {
    input
        .split([',', ' '])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>()
                .with_context(|| format!("'{s}' is not a numeric Telegram user ID"))
        })
        .collect()
}

/// Produces a valid config.toml string. Extracted so it can be unit-tested.
fn format_config(p: &ConfigParams<'_>) -> String {
    let ids_line = if p.user_ids.is_empty() {
        "# allowed_user_ids = [123456789]  # empty: anyone may use the bot".to_owned()
    } else {
        let ids: Vec<String> = p.user_ids.iter().map(u64::to_string).collect();
        format!("allowed_user_ids = [{}]", ids.join(", "))
    };

    let tg_token = p.tg_token;
    let log_level = p.log_level;

    format!(
        r#"[telegram]
bot_token = "{tg_token}"
{ids_line}

[logging]
level = "{log_level}"
"#
    )
}

// ── CLI wizard ─────────────────────────────────────────────────────────────────

fn run_cli(project_root: &Path) -> Result<()> {
    println!("=== Echobot Setup ===\n");

    let read_line = |prompt: &str| -> Result<String> {
        print!("{prompt}");
        io::stdout().flush()?;
        let mut buf = String::new();
        io::stdin().read_line(&mut buf)?;
        Ok(buf.trim().to_owned())
    };

    let or_default = |s: String, default: &str| {
        if s.is_empty() {
            default.to_owned()
        } else {
            s
        }
    };

    let tg_token = read_line("Telegram bot token (from @BotFather): ")?;
    let user_ids = loop {
        let input = read_line("Allowed user IDs (comma-separated, blank for everyone): ")?;
        match parse_user_ids(&input) {
            Ok(ids) => break ids,
            Err(e) => println!("  {e:#}. User IDs are numbers, e.g. 123456789."),
        }
    };
    let log_level = or_default(read_line("Log level [info]: ")?, "info");

    let config = format_config(&ConfigParams {
        tg_token: &tg_token,
        user_ids: &user_ids,
        log_level: &log_level,
    });

    let config_path = project_root.join("config.toml");
    std::fs::write(&config_path, &config)
        .with_context(|| format!("Could not write {}", config_path.display()))?;

    println!("\n✓  config.toml saved to {}", config_path.display());
    println!("   Run the bot with:  cargo run");
    Ok(())
}

fn main() -> Result<()> {
    let project_root =
        PathBuf::from(std::env::var("ECHOBOT_ROOT").unwrap_or_else(|_| ".".to_string()));
    run_cli(&project_root)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    // Same shape as the bot's `Config`, which lives in the main binary.
    #[derive(Deserialize)]
    struct WrittenConfig {
        telegram: WrittenTelegram,
        logging: WrittenLogging,
    }

    #[derive(Deserialize)]
    struct WrittenTelegram {
        bot_token: String,
        #[serde(default)]
        allowed_user_ids: Vec<u64>,
    }

    #[derive(Deserialize)]
    struct WrittenLogging {
        level: String,
    }

    fn cfg(tg_token: &str, user_ids: &str, log_level: &str) -> String {
        let ids = parse_user_ids(user_ids).unwrap();
        format_config(&ConfigParams {
            tg_token,
            user_ids: &ids,
            log_level,
        })
    }

    #[test]
    fn test_telegram_section_present() {
        let out = cfg("mytoken", "123456", "info");
        assert!(out.contains("[telegram]"));
        assert!(out.contains(r#"bot_token = "mytoken""#));
        assert!(out.contains("allowed_user_ids = [123456]"));
    }

    #[test]
    fn test_multiple_user_ids_comma_separated() {
        let out = cfg("t", "111, 222 333", "info");
        assert!(out.contains("allowed_user_ids = [111, 222, 333]"));
    }

    #[test]
    fn test_allow_list_commented_when_empty() {
        let out = cfg("t", "", "info");
        assert!(out.contains("# allowed_user_ids ="));
        assert!(!out.contains("\nallowed_user_ids = "));
    }

    #[test]
    fn test_non_numeric_user_id_rejected() {
        let err = parse_user_ids("123, @alice").unwrap_err();
        assert!(err.to_string().contains("@alice"));
        assert!(parse_user_ids("-5").is_err());
        assert!(parse_user_ids("12.5").is_err());
    }

    #[test]
    fn test_parse_user_ids_skips_blanks() {
        assert_eq!(parse_user_ids(" 1,,2 ,  3").unwrap(), vec![1, 2, 3]);
        assert!(parse_user_ids("   ").unwrap().is_empty());
    }

    #[test]
    fn test_logging_section_present() {
        let out = cfg("t", "1", "debug");
        assert!(out.contains("[logging]"));
        assert!(out.contains(r#"level = "debug""#));
    }

    #[test]
    fn test_output_loads_as_config() {
        let written: WrittenConfig = toml::from_str(&cfg("123:abc", "1, 2", "warn")).unwrap();
        assert_eq!(written.telegram.bot_token, "123:abc");
        assert_eq!(written.telegram.allowed_user_ids, vec![1, 2]);
        assert_eq!(written.logging.level, "warn");

        let open: WrittenConfig = toml::from_str(&cfg("t", "", "info")).unwrap();
        assert!(open.telegram.allowed_user_ids.is_empty());
    }
}
