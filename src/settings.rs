//! Converter settings with persistence
//!
//! Settings are read from `~/.config/packport/settings.toml` unless a path
//! is given on the command line.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use packport_assets::{ResolverConfig, DEFAULT_ALIAS_HOPS, DEFAULT_MAX_DEPTH};
use packport_core::BUILTIN_NAMESPACE;
use packport_geometry::DEFAULT_TEXTURE_SIZE;

/// All converter settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub paths: PathSettings,
    pub conversion: ConversionSettings,
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("packport"))
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load from an explicit path (errors are fatal) or from the default
    /// location (errors fall back to defaults).
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => Ok(Self::load_default()),
        }
    }

    /// Load a settings file that must exist and parse
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))?;
        info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Load settings from the config directory, or return defaults if not found
    pub fn load_default() -> Self {
        match Self::settings_path() {
            Some(path) if path.exists() => Self::load_or_default(&path),
            Some(_) => {
                info!("No settings file found, using defaults");
                Self::default()
            }
            None => {
                warn!("Could not determine config directory");
                Self::default()
            }
        }
    }

    /// Load `path`, keeping defaults when it cannot be read or parsed
    fn load_or_default(path: &Path) -> Self {
        Self::load_from(path).unwrap_or_else(|e| {
            warn!("{:#}, using defaults", e);
            Self::default()
        })
    }

    /// Save settings to `path`, creating its directory if needed
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Save settings to the config directory
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let Some(path) = Self::settings_path() else {
            anyhow::bail!("Could not determine config directory");
        };
        self.save_to(&path)?;
        Ok(path)
    }

    /// Where the resolver looks for assets
    pub fn resolver_config(&self) -> ResolverConfig {
        let mut config = ResolverConfig::with_root(&self.paths.content_root);
        if let Some(archive) = &self.paths.archive {
            config.archive = Some(archive.clone());
        }
        if let Some(cache_dir) = &self.paths.cache_dir {
            config.cache_dir = cache_dir.clone();
        }
        config
    }
}

/// Input and output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Directory holding `content/` and `output/`
    pub content_root: PathBuf,
    /// Where converted packs are written
    pub output_dir: PathBuf,
    /// Generated archive (defaults to `output/resourcepack.zip` under root)
    pub archive: Option<PathBuf>,
    /// Extraction cache (defaults to `output/.cache/archive` under root)
    pub cache_dir: Option<PathBuf>,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            content_root: PathBuf::from("."),
            output_dir: PathBuf::from("output/bedrock"),
            archive: None,
            cache_dir: None,
        }
    }
}

/// Conversion limits and defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionSettings {
    /// Namespace for bare model names given on the command line
    pub default_namespace: String,
    /// Models read along one parent chain
    pub max_parent_depth: usize,
    /// Alias indirections followed per slot
    pub alias_hop_limit: usize,
    /// Canvas edge when no texture header is readable
    pub default_texture_size: u32,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            default_namespace: BUILTIN_NAMESPACE.to_string(),
            max_parent_depth: DEFAULT_MAX_DEPTH,
            alias_hop_limit: DEFAULT_ALIAS_HOPS,
            default_texture_size: DEFAULT_TEXTURE_SIZE,
        }
    }
}
