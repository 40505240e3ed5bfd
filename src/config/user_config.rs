use crate::adapters::opendota::DEFAULT_API_ENDPOINT;
use crate::config::steam;
use crate::core::grid::DEFAULT_GRID_NAME;
use crate::core::template;
use crate::domain::model::{Bracket, SortOrder};
use crate::utils::error::{GridError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = ".odhg";
const CONFIG_FILE: &str = "config.toml";

/// Defaults persisted between runs in `~/.odhg/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    /// Full path of `hero_grid_config.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub brackets: Vec<Bracket>,
    pub layout: String,
    pub config_name: String,
    pub sort: SortOrder,
    pub api_endpoint: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            path: None,
            brackets: vec![Bracket::default()],
            layout: template::TemplateKind::Mainstat.name().to_string(),
            config_name: DEFAULT_GRID_NAME.to_string(),
            sort: SortOrder::Descending,
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
        }
    }
}

/// Result of loading a config file whose keys may not match the current schema.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub config: UserConfig,
    pub removed_keys: Vec<String>,
    pub added_keys: Vec<String>,
}

impl LoadedConfig {
    pub fn was_repaired(&self) -> bool {
        !self.removed_keys.is_empty() || !self.added_keys.is_empty()
    }
}

impl UserConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Parses a config, dropping unknown keys and filling missing ones from defaults.
    pub fn from_toml_str(content: &str) -> Result<LoadedConfig> {
        let processed = Self::substitute_env_vars(content)?;

        let mut table: toml::Table = toml::from_str(&processed).map_err(|e| {
            GridError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            }
        })?;
        let defaults: toml::Table = toml::from_str(&to_toml(&Self::default())?).map_err(|e| {
            GridError::ConfigError {
                message: format!("Default config does not round-trip: {}", e),
            }
        })?;

        let removed_keys: Vec<String> = table
            .keys()
            .filter(|key| key.as_str() != "path" && !defaults.contains_key(key.as_str()))
            .cloned()
            .collect();
        for key in &removed_keys {
            table.remove(key);
        }

        let mut added_keys = Vec::new();
        for (key, value) in &defaults {
            if !table.contains_key(key) {
                table.insert(key.clone(), value.clone());
                added_keys.push(key.clone());
            }
        }

        let config: UserConfig = toml::from_str(&to_toml(&table)?).map_err(|e| {
            GridError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("Invalid config value: {}", e),
            }
        })?;

        Ok(LoadedConfig {
            config,
            removed_keys,
            added_keys,
        })
    }

    /// Replaces `${VAR}` with the environment variable's value, leaving unknown
    /// variables untouched.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| GridError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<LoadedConfig> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Loads the config at `path`, creating it with detected defaults when it
    /// does not exist and saving it back when it had to be repaired.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::info!("🆕 No config found, creating {}", path.display());
            let config = Self {
                path: steam::default_grid_path().map(|p| p.to_string_lossy().into_owned()),
                ..Self::default()
            };
            config.save(path)?;
            return Ok(config);
        }

        let loaded = Self::from_file(path)?;
        if loaded.was_repaired() {
            if !loaded.removed_keys.is_empty() {
                tracing::warn!("Removed unknown config keys: {}", loaded.removed_keys.join(", "));
            }
            if !loaded.added_keys.is_empty() {
                tracing::warn!("Added missing config keys with defaults: {}", loaded.added_keys.join(", "));
            }
            loaded.config.save(path)?;
        }

        Ok(loaded.config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, to_toml(self)?)?;
        tracing::debug!("Config saved to {}", path.display());
        Ok(())
    }
}

fn to_toml<T: Serialize>(value: &T) -> Result<String> {
    toml::to_string_pretty(value).map_err(|e| GridError::ConfigError {
        message: format!("Failed to serialize config: {}", e),
    })
}

impl Validate for UserConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api_endpoint", &self.api_endpoint)?;
        validation::validate_non_empty_string("config_name", &self.config_name)?;
        validation::validate_non_empty_list("brackets", &self.brackets)?;
        template::lookup(&self.layout)?;

        if let Some(path) = &self.path {
            validation::validate_path("path", path)?;
            validation::validate_file_extension("path", path, &["json"])?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let content = r#"
path = "/steam/userdata/42/570/remote/cfg/hero_grid_config.json"
brackets = ["divine", "immortal"]
layout = "role"
config_name = "Ranked"
sort = "ascending"
api_endpoint = "https://api.opendota.com/api"
"#;
        let loaded = UserConfig::from_toml_str(content).unwrap();

        assert!(!loaded.was_repaired());
        assert_eq!(loaded.config.brackets, vec![Bracket::Divine, Bracket::Immortal]);
        assert_eq!(loaded.config.sort, SortOrder::Ascending);
        assert_eq!(loaded.config.layout, "role");
        assert!(loaded.config.validate().is_ok());
    }

    #[test]
    fn test_repair_unknown_and_missing_keys() {
        let content = r#"
brackets = ["8"]
grouping = 1
"#;
        let loaded = UserConfig::from_toml_str(content).unwrap();

        assert!(loaded.was_repaired());
        assert_eq!(loaded.removed_keys, vec!["grouping".to_string()]);
        assert!(loaded.added_keys.contains(&"config_name".to_string()));
        assert!(!loaded.added_keys.contains(&"path".to_string()));
        assert_eq!(loaded.config.brackets, vec![Bracket::Immortal]);
        assert_eq!(loaded.config.config_name, DEFAULT_GRID_NAME);
        assert_eq!(loaded.config.path, None);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("ODHG_TEST_GRID_NAME", "From Env");

        let loaded = UserConfig::from_toml_str("config_name = \"${ODHG_TEST_GRID_NAME}\"").unwrap();
        assert_eq!(loaded.config.config_name, "From Env");

        std::env::remove_var("ODHG_TEST_GRID_NAME");
    }

    #[test]
    fn test_invalid_values() {
        let bad_bracket = UserConfig::from_toml_str("brackets = [\"mythic\"]");
        assert!(matches!(bad_bracket, Err(GridError::ConfigValidationError { .. })));

        let bad_layout = UserConfig {
            layout: "lanes".to_string(),
            ..UserConfig::default()
        };
        assert!(matches!(bad_layout.validate(), Err(GridError::UnknownTemplate { .. })));

        let bad_path = UserConfig {
            path: Some("/tmp/grid.yml".to_string()),
            ..UserConfig::default()
        };
        assert!(bad_path.validate().is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = UserConfig {
            path: Some("/x/hero_grid_config.json".to_string()),
            brackets: vec![Bracket::All],
            ..UserConfig::default()
        };
        config.save(&path).unwrap();

        assert_eq!(UserConfig::load_or_create(&path).unwrap(), config);
    }

    #[test]
    fn test_load_repairs_file_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "sort = \"ascending\"\nobsolete = true\n").unwrap();

        let config = UserConfig::load_or_create(&path).unwrap();
        assert_eq!(config.sort, SortOrder::Ascending);

        let reloaded = UserConfig::from_file(&path).unwrap();
        assert!(!reloaded.was_repaired());
        assert_eq!(reloaded.config, config);
    }
}
