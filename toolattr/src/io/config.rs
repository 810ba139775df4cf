//! Tool configuration stored as TOML (conventionally `toolattr.toml`).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::io::encoding::Encoding;

/// Default config file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "toolattr.toml";

/// Raw, human-edited configuration.
///
/// Values here are not normalized; they become trustworthy only after being
/// applied through [`Settings::from_config`](crate::settings::Settings::from_config).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolConfig {
    /// Directory holding the module sources.
    pub source_dir: String,

    /// Modules to import.
    pub modules: Vec<String>,

    /// Modules to leave out even if something depends on them.
    pub avoids: Vec<String>,

    /// Extra include directories, searched in order.
    pub include_dirs: Vec<String>,

    pub tests: bool,
    pub obsolete: bool,
    pub cxx_tests: bool,
    pub longrunning_tests: bool,

    /// External programs by name (e.g. `autoconf`, `m4`).
    pub tools: BTreeMap<String, ToolEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolEntry {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            source_dir: ".".to_string(),
            modules: Vec::new(),
            avoids: Vec::new(),
            include_dirs: Vec::new(),
            tests: false,
            obsolete: false,
            cxx_tests: false,
            longrunning_tests: false,
            tools: BTreeMap::new(),
        }
    }
}

impl ToolConfig {
    pub fn validate(&self) -> Result<()> {
        if self.source_dir.trim().is_empty() {
            return Err(anyhow!("source_dir must be non-empty"));
        }
        for (name, tool) in &self.tools {
            if tool.path.trim().is_empty() {
                return Err(anyhow!("tools.{name}.path must be non-empty"));
            }
            if let Some(label) = &tool.encoding {
                label
                    .parse::<Encoding>()
                    .with_context(|| format!("tools.{name}.encoding"))?;
            }
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ToolConfig::default()`.
pub fn load_config(path: &Path) -> Result<ToolConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "config missing, using defaults");
        let cfg = ToolConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ToolConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    debug!(path = %path.display(), modules = cfg.modules.len(), tools = cfg.tools.len(), "config loaded");
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &ToolConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
