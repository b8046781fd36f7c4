//! Layered configuration for quire.
//!
//! Layers are merged lowest to highest priority:
//!
//! 1. built-in defaults,
//! 2. `config.toml` in the user's configuration directory,
//! 3. an explicitly requested file (TOML, YAML or JSON, by extension),
//! 4. `QUIRE_`-prefixed environment variables, nested with `__`
//!    (e.g. `QUIRE_CHAPTERS__TOTAL=30`).

pub mod error;
mod models;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
pub use crate::models::{CacheConfig, ChaptersConfig, Config, SanitizationConfig, SourceConfig};
use std::path::{Path, PathBuf};
use tracing::instrument;

pub const ENV_PREFIX: &str = "QUIRE_";
const FILE_NAME: &str = "config.toml";
const MAX_WIDTH: usize = 9;

/// Location of the per-user configuration file, if the platform has one.
pub fn user_config_file() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "quire").map(|dirs| dirs.config_dir().join(FILE_NAME))
}

impl Config {
    /// Load configuration from every layer and validate the result.
    #[instrument]
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let user = user_config_file();
        let config: Self = Self::figment(user.as_deref(), explicit)?.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        tracing::debug!(?config, "Loaded configuration");
        Ok(config)
    }

    /// Build the merged provider without extracting it.
    ///
    /// A missing user file is silently skipped; a missing explicit file is an
    /// error.
    pub fn figment(user: Option<&Path>, explicit: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(user) = user {
            figment = figment.merge(Toml::file(user));
        }
        if let Some(path) = explicit {
            if !path.is_file() {
                exn::bail!(ErrorKind::Invalid(format!("config file not found: {}", path.display())));
            }
            let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
            figment = match extension.as_deref() {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => exn::bail!(ErrorKind::Invalid(format!("unsupported config format: {}", path.display()))),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn validate(&self) -> Result<()> {
        if self.chapters.total == 0 {
            exn::bail!(ErrorKind::Invalid("chapters.total must be at least 1".to_string()));
        }
        if !(1..=MAX_WIDTH).contains(&self.chapters.width) {
            exn::bail!(ErrorKind::Invalid(format!("chapters.width must be between 1 and {MAX_WIDTH}")));
        }
        if self.sanitization.allowed_tags.as_ref().is_some_and(Vec::is_empty) {
            exn::bail!(ErrorKind::Invalid("sanitization.allowed_tags must not be empty".to_string()));
        }
        if self.source.root.is_some() && self.source.url.is_some() {
            exn::bail!(ErrorKind::Invalid("source.root and source.url are mutually exclusive".to_string()));
        }
        // The chapter path template has to resolve inside the source.
        self.chapters
            .paths()
            .resolve(1)
            .or_raise(|| ErrorKind::Invalid("chapter paths escape the source root".to_string()))?;
        Ok(())
    }
}
