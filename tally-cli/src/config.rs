use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tally_finance::StoreConfig;
use tally_ingest::diagnostics::DEFAULT_DIAGNOSTIC_LINES;

pub const ENV_STORE_URL: &str = "TALLY_STORE_URL";
pub const ENV_STORE_API_KEY: &str = "TALLY_STORE_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub parser: ParserSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserSection {
    /// How many statement lines to dump to the log when nothing parses.
    pub diagnostic_lines: usize,
}

impl Default for ParserSection {
    fn default() -> Self {
        Self {
            diagnostic_lines: DEFAULT_DIAGNOSTIC_LINES,
        }
    }
}

impl Config {
    /// Environment wins over the file so the key never has to be written to disk.
    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(ENV_STORE_URL) {
            if !url.trim().is_empty() {
                self.store.base_url = url;
            }
        }
        if let Ok(key) = std::env::var(ENV_STORE_API_KEY) {
            if !key.trim().is_empty() {
                self.store.api_key = Some(key);
            }
        }
    }

    /// Copy safe to print.
    pub fn redacted(&self) -> Self {
        let mut cfg = self.clone();
        if let Some(key) = cfg.store.api_key.as_mut() {
            *key = redact(key);
        }
        cfg
    }
}

fn redact(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

pub fn tally_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".tally"))
}

pub fn ensure_tally_home() -> Result<PathBuf> {
    let dir = tally_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(tally_home()?.join("config.toml"))
}

fn read_config_file() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

/// File (or defaults) with environment overrides applied.
pub fn load_config() -> Result<Config> {
    let mut cfg = read_config_file()?;
    cfg.apply_env();
    Ok(cfg)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = ensure_tally_home()?.join("config.toml");
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let cfg = load_config()?.redacted();
    println!("# {}", config_path()?.display());
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(())
}
