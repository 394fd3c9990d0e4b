//! Layered editor configuration
//!
//! Config is loaded with three layers of precedence (highest wins):
//! 1. Environment variables: `ROADNET_HISTORY_DEPTH`, `ROADNET_MAX_CROSSINGS`,
//!    `ROADNET_NEIGHBOR_RATIO`
//! 2. Project-local: `.roadnet/config.toml`
//! 3. Global: `~/.roadnet/config.toml`

use roadnet_core::{Result, RoadError};
use roadnet_curve::{CurveConfig, CurveEngine, RepairConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    crate::stack::DEFAULT_MAX_DEPTH
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Roads refreshed per `pump` slice when no explicit budget is given
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_batch_size() -> usize {
    32
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

/// Top-level config file structure. Every section and field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub curve: CurveConfig,
    #[serde(default)]
    pub repair: RepairConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// A config file as written, so layers only override what they set.
#[derive(Debug, Default, Deserialize)]
struct ConfigLayer {
    curve: Option<toml::Table>,
    repair: Option<toml::Table>,
    history: Option<toml::Table>,
    scheduler: Option<toml::Table>,
}

impl EditorConfig {
    /// Load config with layered precedence: global < project < env vars
    pub fn load() -> Result<Self> {
        Self::load_layers(Self::global_config_path(), Some(PathBuf::from(".roadnet/config.toml")))
    }

    /// Load config from a specific file path only (for testing and `--config`)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        Self::load_layers(None, Some(path.to_path_buf()))
    }

    fn load_layers(global: Option<PathBuf>, project: Option<PathBuf>) -> Result<Self> {
        let mut merged = toml::Table::new();
        for path in [global, project].into_iter().flatten() {
            if path.exists() {
                let layer = Self::load_file(&path)?;
                Self::merge_into(&mut merged, layer);
                tracing::debug!(path = %path.display(), "loaded config layer");
            }
        }

        let mut config: EditorConfig = toml::Value::Table(merged).try_into()?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".roadnet").join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<ConfigLayer> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            RoadError::Config(format!("Failed to parse config {}: {}", path.display(), e))
        })
    }

    fn merge_into(base: &mut toml::Table, overlay: ConfigLayer) {
        let sections = [
            ("curve", overlay.curve),
            ("repair", overlay.repair),
            ("history", overlay.history),
            ("scheduler", overlay.scheduler),
        ];
        for (name, table) in sections {
            let Some(table) = table else { continue };
            let entry = base
                .entry(name)
                .or_insert_with(|| toml::Value::Table(toml::Table::new()));
            if let toml::Value::Table(section) = entry {
                section.extend(table);
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(depth) = env_value::<usize>("ROADNET_HISTORY_DEPTH")? {
            self.history.max_depth = depth;
        }
        if let Some(crossings) = env_value::<usize>("ROADNET_MAX_CROSSINGS")? {
            self.repair.max_crossings = crossings;
        }
        if let Some(ratio) = env_value::<f64>("ROADNET_NEIGHBOR_RATIO")? {
            self.curve.neighbor_ratio = ratio;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.curve.validate()?;
        self.repair.validate()?;
        if self.history.max_depth == 0 {
            return Err(RoadError::Config("history.max_depth must be at least 1".into()));
        }
        if self.scheduler.batch_size == 0 {
            return Err(RoadError::Config("scheduler.batch_size must be at least 1".into()));
        }
        Ok(())
    }

    /// The curve engine configured by the `[curve]` and `[repair]` sections.
    pub fn engine(&self) -> Result<CurveEngine> {
        CurveEngine::new(self.curve.clone(), self.repair.clone())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn env_value<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| RoadError::Config(format!("{} is not a valid value: {:?}", name, raw))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_config(content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("roadnet_config_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    fn cleanup(path: &Path) {
        std::fs::remove_file(path).ok();
        std::fs::remove_dir(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_load_config_from_file() {
        let path = temp_config(
            r#"
[curve]
far_points_per_unit = 3

[scheduler]
batch_size = 4
"#,
        );
        let config = EditorConfig::load_from_file(&path).unwrap();
        assert_eq!(config.curve.far_points_per_unit, 3);
        assert_eq!(config.scheduler.batch_size, 4);
        assert_eq!(config.curve.step_table, CurveConfig::default().step_table);
        cleanup(&path);
    }

    #[test]
    fn test_later_layers_override_field_by_field() {
        let global = temp_config(
            r#"
[curve]
far_points_per_unit = 5

[scheduler]
batch_size = 8
"#,
        );
        let project = temp_config(
            r#"
[scheduler]
batch_size = 2
"#,
        );
        let config = EditorConfig::load_layers(Some(global.clone()), Some(project.clone())).unwrap();
        assert_eq!(config.curve.far_points_per_unit, 5);
        assert_eq!(config.scheduler.batch_size, 2);
        cleanup(&global);
        cleanup(&project);
    }

    #[test]
    fn test_missing_files_give_defaults() {
        let missing = std::env::temp_dir().join(format!("roadnet_missing_{}.toml", uuid::Uuid::new_v4()));
        let config = EditorConfig::load_layers(None, Some(missing)).unwrap();
        assert_eq!(config.scheduler, SchedulerConfig::default());
        assert_eq!(config.curve, CurveConfig::default());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let path = temp_config(
            r#"
[curve]
neighbor_ratio = -1.0
"#,
        );
        assert!(EditorConfig::load_from_file(&path).is_err());
        cleanup(&path);

        let config = EditorConfig {
            scheduler: SchedulerConfig { batch_size: 0 },
            ..EditorConfig::default()
        };
        assert!(matches!(config.validate(), Err(RoadError::Config(_))));
    }

    #[test]
    fn test_round_trips_through_toml() {
        let text = EditorConfig::default().to_toml().unwrap();
        let parsed: EditorConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, EditorConfig::default());
    }
}
