//! External configuration loader.
//!
//! Reads `config.toml` from the executable's directory, then the CWD, unless
//! a path is given on the command line. Missing keys fall back to defaults
//! and CLI flags override whatever the file says.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::LevelFilter;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::game::GameRules;
use crate::story::StoryId;

#[derive(Debug, Parser)]
#[command(version, about = "Media-literacy adventure in your terminal")]
pub struct Cli {
    /// Path to config.toml
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Backend base address, e.g. http://127.0.0.1:8000/api
    #[arg(long)]
    pub api_url: Option<String>,
    #[arg(long)]
    pub story: Option<StoryId>,
    /// Play a story pack from disk instead of fetching it
    #[arg(long)]
    pub stories_dir: Option<PathBuf>,
    /// Invite token to compare scores against
    #[arg(long)]
    pub invite: Option<String>,
    #[arg(long)]
    pub lives: Option<u32>,
    /// Debug logging to fact-quest.log
    #[arg(long)]
    pub debug: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub timeout: Duration,
    pub story_id: StoryId,
    pub rules: GameRules,
    pub data_dir: PathBuf,
    pub stories_dir: Option<PathBuf>,
    pub invite: Option<String>,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

// ── TOML Schema ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    api: TomlApi,
    #[serde(default)]
    game: TomlGame,
    #[serde(default)]
    storage: TomlStorage,
    #[serde(default)]
    logging: TomlLogging,
}

#[derive(Deserialize, Debug)]
struct TomlApi {
    #[serde(default = "default_base_url")]
    base_url: String,
    #[serde(default = "default_timeout")]
    timeout_secs: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGame {
    #[serde(default = "default_story")]
    story_id: StoryId,
    #[serde(default = "default_lives")]
    initial_lives: u32,
}

#[derive(Deserialize, Debug)]
struct TomlStorage {
    #[serde(default = "default_data_dir")]
    data_dir: String,
}

#[derive(Deserialize, Debug)]
struct TomlLogging {
    #[serde(default = "default_level")]
    level: String,
    #[serde(default)]
    file: Option<String>,
}

fn default_base_url() -> String { "http://127.0.0.1:8000/api".into() }
fn default_timeout() -> u64 { 10 }
fn default_story() -> StoryId { 1 }
fn default_lives() -> u32 { 3 }
fn default_data_dir() -> String { ".fact-quest".into() }
fn default_level() -> String { "info".into() }

impl Default for TomlApi {
    fn default() -> Self {
        TomlApi {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for TomlGame {
    fn default() -> Self {
        TomlGame {
            story_id: default_story(),
            initial_lives: default_lives(),
        }
    }
}

impl Default for TomlStorage {
    fn default() -> Self {
        TomlStorage {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for TomlLogging {
    fn default() -> Self {
        TomlLogging {
            level: default_level(),
            file: None,
        }
    }
}

// ── Loading ──

impl Config {
    pub fn load(cli: &Cli) -> Result<Self> {
        let toml_cfg = match &cli.config {
            Some(path) => read_toml(path)?,
            None => candidate_dirs()
                .iter()
                .map(|d| d.join("config.toml"))
                .find(|p| p.exists())
                .map(|p| read_toml(&p))
                .transpose()?
                .unwrap_or_default(),
        };
        Config::resolve(toml_cfg, cli)
    }

    fn resolve(toml_cfg: TomlConfig, cli: &Cli) -> Result<Self> {
        let log_level = if cli.debug {
            LevelFilter::Debug
        } else {
            toml_cfg
                .logging
                .level
                .parse()
                .map_err(|_| anyhow!("unknown log level {:?}", toml_cfg.logging.level))?
        };
        let log_file = match toml_cfg.logging.file {
            Some(f) => Some(PathBuf::from(f)),
            None if cli.debug => Some(PathBuf::from("fact-quest.log")),
            None => None,
        };
        let initial_lives = cli.lives.unwrap_or(toml_cfg.game.initial_lives).max(1);

        Ok(Config {
            api_url: cli.api_url.clone().unwrap_or(toml_cfg.api.base_url),
            timeout: Duration::from_secs(toml_cfg.api.timeout_secs.max(1)),
            story_id: cli.story.unwrap_or(toml_cfg.game.story_id),
            rules: GameRules { initial_lives },
            data_dir: PathBuf::from(toml_cfg.storage.data_dir),
            stories_dir: cli.stories_dir.clone(),
            invite: cli.invite.clone(),
            log_level,
            log_file,
        })
    }
}

fn read_toml(path: &Path) -> Result<TomlConfig> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Executable directory, then CWD.
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("fact-quest").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_without_file() {
        let config = Config::resolve(TomlConfig::default(), &cli(&[])).unwrap();
        assert_eq!(config.api_url, "http://127.0.0.1:8000/api");
        assert_eq!(config.story_id, 1);
        assert_eq!(config.rules.initial_lives, 3);
        assert_eq!(config.log_level, LevelFilter::Info);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let toml_cfg: TomlConfig = toml::from_str(
            r#"
[game]
initial_lives = 5

[logging]
level = "warn"
file = "game.log"
"#,
        )
        .unwrap();
        let config = Config::resolve(toml_cfg, &cli(&[])).unwrap();
        assert_eq!(config.rules.initial_lives, 5);
        assert_eq!(config.story_id, 1);
        assert_eq!(config.log_level, LevelFilter::Warn);
        assert_eq!(config.log_file, Some(PathBuf::from("game.log")));
    }

    #[test]
    fn cli_overrides_file() {
        let toml_cfg: TomlConfig =
            toml::from_str("[api]\nbase_url = \"http://file:1\"\n[game]\nstory_id = 2").unwrap();
        let config = Config::resolve(
            toml_cfg,
            &cli(&["--api-url", "http://cli:2", "--story", "9", "--lives", "0", "--debug"]),
        )
        .unwrap();
        assert_eq!(config.api_url, "http://cli:2");
        assert_eq!(config.story_id, 9);
        assert_eq!(config.rules.initial_lives, 1);
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.log_file, Some(PathBuf::from("fact-quest.log")));
    }

    #[test]
    fn bad_log_level_is_reported() {
        let toml_cfg: TomlConfig = toml::from_str("[logging]\nlevel = \"loud\"").unwrap();
        assert!(Config::resolve(toml_cfg, &cli(&[])).is_err());
    }

    #[test]
    fn explicit_config_path_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[storage]\ndata_dir = \"/tmp/fq\"").unwrap();

        let config = Config::load(&cli(&["--config", path.to_str().unwrap()])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/fq"));
    }
}
