use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MediascopeError, Result};
use crate::models::TitlePriority;

/// Tuning knobs for import matching, loaded from `~/.config/mediascope/matching.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Minimum similarity percent (0..=100) a fuzzy candidate needs.
    pub fuzzy_similarity_threshold: f64,
    /// Shared-prefix length that makes two keys a strict match.
    pub strict_prefix_length: usize,
    /// Least trusted corpus field an exact title match may auto-merge on.
    pub auto_merge_max_priority: TitlePriority,
    /// Characters splitting a packed alternate-titles field.
    pub alternate_separators: String,
    /// Skip corpus records whose category differs from the incoming hint.
    pub category_prefilter: bool,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            fuzzy_similarity_threshold: 75.0,
            strict_prefix_length: 5,
            auto_merge_max_priority: TitlePriority::Display,
            alternate_separators: "/|\n;,".to_string(),
            category_prefilter: true,
        }
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl MatchConfig {
    /// Standard config file path: `~/.config/mediascope/matching.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("MEDIASCOPE_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("mediascope")
            .join("matching.toml")
    }

    /// Load config from disk, falling back to defaults if file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.fuzzy_similarity_threshold) {
            return Err(MediascopeError::InvalidConfig(format!(
                "fuzzy_similarity_threshold must be within 0..=100, got {}",
                self.fuzzy_similarity_threshold
            )));
        }
        if self.strict_prefix_length == 0 {
            return Err(MediascopeError::InvalidConfig(
                "strict_prefix_length must be at least 1".to_string(),
            ));
        }
        if self.alternate_separators.is_empty() {
            return Err(MediascopeError::InvalidConfig(
                "alternate_separators must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether an exact agreement on a field of `priority` may auto-merge.
    pub fn auto_merges_on(&self, priority: TitlePriority) -> bool {
        priority <= self.auto_merge_max_priority && priority.allows_auto_merge()
    }

    pub fn is_alternate_separator(&self, c: char) -> bool {
        self.alternate_separators.contains(c)
    }
}
