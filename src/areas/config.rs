//! Repository configuration (`.git/config`)
//!
//! The file is read as INI through the `config` crate. Only plain
//! `section.key` lookups are exposed; names are matched case-insensitively.

use crate::errors::TwigError;
use anyhow::Context;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Config {
    values: ::config::Config,
}

impl Config {
    /// Read the config file at `path`; a missing file is an empty config.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file");
                String::new()
            }
            Err(e) => return Err(TwigError::file_read(path, e).into()),
        };

        Self::parse(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let values = ::config::Config::builder()
            .add_source(::config::File::from_str(content, ::config::FileFormat::Ini))
            .build()?;

        Ok(Config { values })
    }

    pub fn get(&self, section: &str, key: &str) -> Option<String> {
        let path = format!("{}.{}", section.to_lowercase(), key.to_lowercase());

        self.values
            .get_string(&path)
            .ok()
            .map(|value| Self::unquote(&value).to_string())
    }

    fn unquote(value: &str) -> &str {
        let value = value.trim();
        value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value)
    }
}
