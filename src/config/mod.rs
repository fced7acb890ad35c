use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::api::DEFAULT_BASE_URL;
use crate::report::Rating;

pub const API_URL_ENV: &str = "SCREVIEW_API_URL";
pub const USER_ENV: &str = "SCREVIEW_USER";

/// `[api]` block from config.toml.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct ApiConfig {
    pub base_url: Option<String>,
}

/// `[user]` block from config.toml.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct UserConfig {
    pub id: Option<String>,
}

/// `[review]` block from config.toml.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct ReviewConfig {
    pub target_rating: Option<String>,
}

/// Top-level screview config file structure.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default)]
    pub review: ReviewConfig,
}

impl Config {
    /// Load config from ~/.screview/config.toml. Returns default if file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config.toml")?;
        Ok(config)
    }

    /// Analysis service URL: CLI flag > env var > config file > built-in default.
    pub fn resolve_base_url(&self, cli_flag: Option<&str>) -> String {
        first_non_empty([
            cli_flag.map(str::to_string),
            std::env::var(API_URL_ENV).ok(),
            self.api.base_url.clone(),
        ])
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Acting user: env var > config file > login name > "local".
    pub fn resolve_user(&self) -> String {
        first_non_empty([
            std::env::var(USER_ENV).ok(),
            self.user.id.clone(),
            std::env::var("USER").ok(),
        ])
        .unwrap_or_else(|| "local".to_string())
    }

    /// Target rating from `[review] target_rating`, `12+` when unset.
    pub fn target_rating(&self) -> Result<Rating> {
        match self.review.target_rating.as_deref() {
            Some(label) => parse_target(label).context("Invalid [review] target_rating in config.toml"),
            None => Ok(Rating::Twelve),
        }
    }

    /// Effective settings, with env vars and defaults applied.
    pub fn display(&self) -> Result<String> {
        let mut lines = Vec::new();
        lines.push("[api]".to_string());
        lines.push(format!("  base_url = \"{}\"", self.resolve_base_url(None)));
        lines.push("[user]".to_string());
        lines.push(format!("  id = \"{}\"", self.resolve_user()));
        lines.push("[review]".to_string());
        lines.push(format!("  target_rating = \"{}\"", self.target_rating()?));
        Ok(lines.join("\n"))
    }
}

/// Parse a rating label that must be one of the known age brackets.
pub fn parse_target(s: &str) -> Result<Rating> {
    let rating = Rating::parse(s);
    if rating.min_age().is_none() {
        let known: Vec<&str> = Rating::ALL.iter().map(|r| r.label()).collect();
        bail!("Unknown rating: {s}. Use one of: {}", known.join(", "));
    }
    Ok(rating)
}

fn first_non_empty<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
}

/// Path to the config file: ~/.screview/config.toml
pub fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".screview").join("config.toml"))
}

/// Default config template content.
pub fn default_config_template() -> &'static str {
    r#"# ~/.screview/config.toml
# API URL resolution order: --api-url > SCREVIEW_API_URL > api.base_url > built-in default

[api]
# base_url = "http://158.160.98.70:8000"

[user]
# id = "your-user-id"

[review]
# Recommendations are offered while the overall rating exceeds this.
# target_rating = "12+"
"#
}

/// Create the default config file if it doesn't already exist.
pub fn init_config() -> Result<bool> {
    let path = config_path()?;
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, default_config_template())?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses_to_defaults() {
        let config: Config = toml::from_str(default_config_template()).unwrap();
        assert!(config.api.base_url.is_none());
        assert_eq!(config.target_rating().unwrap(), Rating::Twelve);
    }

    #[test]
    fn cli_flag_wins_over_config() {
        let config: Config = toml::from_str(
            "[api]\nbase_url = \"http://config:1\"\n[review]\ntarget_rating = \"6+\"\n",
        )
        .unwrap();
        assert_eq!(config.resolve_base_url(Some("http://flag:2")), "http://flag:2");
        assert_eq!(config.target_rating().unwrap(), Rating::Six);
    }

    #[test]
    fn unknown_target_rating_is_rejected() {
        let config: Config = toml::from_str("[review]\ntarget_rating = \"PG-13\"\n").unwrap();
        let err = format!("{:#}", config.target_rating().unwrap_err());
        assert!(err.contains("Unknown rating: PG-13"));
        assert!(config.display().is_err());
        assert!(parse_target("16+").is_ok());
    }

    #[test]
    fn display_shows_resolved_base_url() {
        let config = Config::default();
        let shown = config.display().unwrap();
        assert!(shown.contains(&format!("base_url = \"{}\"", config.resolve_base_url(None))));
        assert!(shown.contains("target_rating = \"12+\""));
    }

    #[test]
    fn blank_values_are_skipped() {
        assert_eq!(
            first_non_empty([Some("  ".to_string()), None, Some("x".to_string())]),
            Some("x".to_string())
        );
        assert_eq!(first_non_empty::<1>([None]), None);
    }

    #[test]
    fn missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert!(config.user.id.is_none());
    }
}
