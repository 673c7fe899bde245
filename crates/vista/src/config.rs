// File: src/config.rs
// Purpose: Configuration parsing from vista.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::options::Options;
use crate::store::DirStore;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub templates: TemplatesConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Template manager configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplatesConfig {
    /// Directory containing templates (default: "templates")
    #[serde(default = "default_templates_dir")]
    pub dir: String,

    /// Keep compiled templates in memory
    #[serde(default = "default_false")]
    pub cache: bool,

    /// Execute templates straight into the response
    #[serde(default = "default_false")]
    pub stream: bool,

    /// Compile every template at startup (only useful with `cache`)
    #[serde(default = "default_false")]
    pub warm_up: bool,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

// Default values
fn default_templates_dir() -> String {
    "templates".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_false() -> bool {
    false
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            dir: default_templates_dir(),
            cache: false,
            stream: false,
            warm_up: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // A missing or empty file means defaults
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::parse(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load configuration from default path (./vista.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("vista.toml")
    }

    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(toml::from_str(content)?)
    }

    /// Manager options for the `[templates]` section
    pub fn options(&self) -> Options {
        Options::new()
            .with_cache(self.templates.cache)
            .with_stream(self.templates.stream)
    }

    pub fn store(&self) -> DirStore {
        DirStore::new(&self.templates.dir)
    }

    /// `host:port` to bind
    pub fn addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
