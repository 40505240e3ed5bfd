pub mod cli;
pub mod steam;
pub mod user_config;

use crate::core::ConfigProvider;
use crate::core::template;
use crate::domain::model::{Bracket, GridTarget, SortOrder};
use crate::utils::error::{GridError, Result};
use crate::utils::validation::{self, Validate};
use std::path::{Path, PathBuf};
#[cfg(feature = "cli")]
use user_config::UserConfig;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Serialize, Deserialize, Parser)]
#[command(name = "odhg")]
#[command(about = "Sort Dota 2 hero grids by win-rate from OpenDota stats")]
pub struct CliConfig {
    /// Skill brackets (herald..immortal, pro, all, or 0-9), comma separated
    #[arg(short, long, value_delimiter = ',')]
    pub brackets: Vec<Bracket>,

    /// Generate a grid from a layout template (mainstat, attack, role, single)
    #[arg(short, long, conflicts_with = "grid")]
    pub layout: Option<String>,

    /// Re-sort an existing hero grid by name instead of generating one
    #[arg(short, long)]
    pub grid: Option<String>,

    /// Lowest win-rate first
    #[arg(short, long, conflicts_with = "descending")]
    pub ascending: bool,

    /// Highest win-rate first
    #[arg(short, long)]
    pub descending: bool,

    /// Name of the generated grid
    #[arg(short, long)]
    pub name: Option<String>,

    /// Path to hero_grid_config.json
    #[arg(short, long)]
    pub path: Option<String>,

    #[arg(long)]
    pub api_endpoint: Option<String>,

    /// User config file (default: ~/.odhg/config.toml)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Store the given options as the new defaults
    #[arg(long)]
    pub save: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn config_path(&self) -> Result<PathBuf> {
        let path = self
            .config
            .as_ref()
            .map(PathBuf::from)
            .or_else(UserConfig::default_path);
        validation::validate_required_field("config", &path).cloned()
    }

    fn sort_order(&self) -> Option<SortOrder> {
        (self.ascending || self.descending).then(|| SortOrder::from_ascending(self.ascending))
    }

    /// Command line values win over the persisted defaults.
    pub fn resolve(&self, user: &UserConfig) -> Result<RunOptions> {
        let brackets = if self.brackets.is_empty() {
            user.brackets.clone()
        } else {
            self.brackets.clone()
        };

        let target = match (&self.grid, &self.layout) {
            (Some(grid), _) => GridTarget::Existing(grid.clone()),
            (None, Some(layout)) => GridTarget::Layout(layout.clone()),
            (None, None) => GridTarget::Layout(user.layout.clone()),
        };

        let path = self
            .path
            .clone()
            .or_else(|| user.path.clone())
            .or_else(|| steam::default_grid_path().map(|p| p.to_string_lossy().into_owned()));
        let path = validation::validate_required_field("path", &path)?.clone();

        RunOptions::new(
            brackets,
            target,
            self.sort_order().unwrap_or(user.sort),
            self.name.clone().unwrap_or_else(|| user.config_name.clone()),
            path,
        )
    }

    /// The stats endpoint to query, checked whichever side it came from.
    pub fn api_endpoint<'a>(&'a self, user: &'a UserConfig) -> Result<&'a str> {
        let endpoint = self.api_endpoint.as_deref().unwrap_or(&user.api_endpoint);
        validation::validate_url("api_endpoint", endpoint)?;
        Ok(endpoint)
    }

    /// Copies the options given on the command line into `user`.
    pub fn apply_to(&self, user: &mut UserConfig) {
        if !self.brackets.is_empty() {
            user.brackets = self.brackets.clone();
        }
        if let Some(layout) = &self.layout {
            user.layout = layout.clone();
        }
        if let Some(sort) = self.sort_order() {
            user.sort = sort;
        }
        if let Some(name) = &self.name {
            user.config_name = name.clone();
        }
        if let Some(path) = &self.path {
            user.path = Some(path.clone());
        }
        if let Some(endpoint) = &self.api_endpoint {
            user.api_endpoint = endpoint.clone();
        }
    }
}

/// Fully resolved options for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub brackets: Vec<Bracket>,
    pub target: GridTarget,
    pub sort: SortOrder,
    pub config_name: String,
    pub grid_path: PathBuf,
    storage_root: PathBuf,
    grid_file: String,
}

impl RunOptions {
    /// Requested brackets are deduplicated, keeping their first position.
    pub fn new(
        brackets: Vec<Bracket>,
        target: GridTarget,
        sort: SortOrder,
        config_name: String,
        grid_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        let grid_path = grid_path.into();
        let grid_file = grid_path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| GridError::InvalidConfigValueError {
                field: "path".to_string(),
                value: grid_path.display().to_string(),
                reason: "Path must end in a file name".to_string(),
            })?;
        let storage_root = grid_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let mut unique = Vec::with_capacity(brackets.len());
        for bracket in brackets {
            if !unique.contains(&bracket) {
                unique.push(bracket);
            }
        }

        Ok(Self {
            brackets: unique,
            target,
            sort,
            config_name,
            grid_path,
            storage_root,
            grid_file,
        })
    }

    /// Directory containing the grid file; the root for `LocalStorage`.
    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }
}

impl ConfigProvider for RunOptions {
    fn brackets(&self) -> &[Bracket] {
        &self.brackets
    }

    fn target(&self) -> &GridTarget {
        &self.target
    }

    fn sort_order(&self) -> SortOrder {
        self.sort
    }

    fn config_name(&self) -> &str {
        &self.config_name
    }

    fn grid_file(&self) -> &str {
        &self.grid_file
    }
}

impl Validate for RunOptions {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_list("brackets", &self.brackets)?;
        validation::validate_non_empty_string("config_name", &self.config_name)?;

        let path = self.grid_path.to_string_lossy();
        validation::validate_path("path", &path)?;
        validation::validate_file_extension("path", &path, &["json"])?;

        match &self.target {
            GridTarget::Layout(name) => {
                template::lookup(name)?;
            }
            GridTarget::Existing(name) => validation::validate_non_empty_string("grid", name)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "cli")]
    fn user() -> UserConfig {
        UserConfig {
            path: Some("/steam/42/570/remote/cfg/hero_grid_config.json".to_string()),
            brackets: vec![Bracket::Divine],
            layout: "attack".to_string(),
            config_name: "Saved".to_string(),
            sort: SortOrder::Ascending,
            ..UserConfig::default()
        }
    }

    #[test]
    fn test_run_options_split_path() {
        let options = RunOptions::new(
            vec![Bracket::Herald, Bracket::Divine, Bracket::Herald],
            GridTarget::Layout("mainstat".to_string()),
            SortOrder::Descending,
            "ODHG".to_string(),
            "/a/b/hero_grid_config.json",
        )
        .unwrap();

        assert_eq!(options.grid_file(), "hero_grid_config.json");
        assert_eq!(options.storage_root(), Path::new("/a/b"));
        assert_eq!(options.brackets(), &[Bracket::Herald, Bracket::Divine]);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_run_options_validation() {
        let unknown_layout = RunOptions::new(
            vec![Bracket::Herald],
            GridTarget::Layout("lanes".to_string()),
            SortOrder::Descending,
            "ODHG".to_string(),
            "/a/hero_grid_config.json",
        )
        .unwrap();
        assert!(matches!(
            unknown_layout.validate(),
            Err(GridError::UnknownTemplate { .. })
        ));

        let no_brackets = RunOptions::new(
            vec![],
            GridTarget::Existing("Mine".to_string()),
            SortOrder::Descending,
            "ODHG".to_string(),
            "/a/hero_grid_config.json",
        )
        .unwrap();
        assert!(no_brackets.validate().is_err());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_defaults_come_from_user_config() {
        let cli = CliConfig::parse_from(["odhg"]);
        let options = cli.resolve(&user()).unwrap();

        assert_eq!(options.brackets, vec![Bracket::Divine]);
        assert_eq!(options.target, GridTarget::Layout("attack".to_string()));
        assert_eq!(options.sort, SortOrder::Ascending);
        assert_eq!(options.config_name, "Saved");
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_overrides() {
        let cli = CliConfig::parse_from([
            "odhg", "-b", "herald,all", "-g", "My Grid", "-d", "-p", "/tmp/x/hero_grid_config.json",
        ]);
        let options = cli.resolve(&user()).unwrap();

        assert_eq!(options.brackets, vec![Bracket::Herald, Bracket::All]);
        assert_eq!(options.target, GridTarget::Existing("My Grid".to_string()));
        assert_eq!(options.sort, SortOrder::Descending);
        assert_eq!(options.grid_path, PathBuf::from("/tmp/x/hero_grid_config.json"));
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_rejects_conflicts_and_bad_brackets() {
        assert!(CliConfig::try_parse_from(["odhg", "-l", "role", "-g", "Mine"]).is_err());
        assert!(CliConfig::try_parse_from(["odhg", "-a", "-d"]).is_err());
        assert!(CliConfig::try_parse_from(["odhg", "-b", "mythic"]).is_err());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_api_endpoint_is_validated() {
        let user = user();
        let default = CliConfig::parse_from(["odhg"]);
        assert_eq!(default.api_endpoint(&user).unwrap(), user.api_endpoint);

        let local = CliConfig::parse_from(["odhg", "--api-endpoint", "http://localhost:8080/api"]);
        assert_eq!(local.api_endpoint(&user).unwrap(), "http://localhost:8080/api");

        let bad = CliConfig::parse_from(["odhg", "--api-endpoint", "ftp://example.com"]);
        assert!(matches!(
            bad.api_endpoint(&user),
            Err(GridError::InvalidConfigValueError { .. })
        ));
        assert!(CliConfig::parse_from(["odhg", "--api-endpoint", "not a url"])
            .api_endpoint(&user)
            .is_err());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_apply_to_user_config() {
        let cli = CliConfig::parse_from(["odhg", "-l", "role", "-a", "-n", "Roles"]);
        let mut saved = UserConfig::default();
        cli.apply_to(&mut saved);

        assert_eq!(saved.layout, "role");
        assert_eq!(saved.sort, SortOrder::Ascending);
        assert_eq!(saved.config_name, "Roles");
        assert_eq!(saved.brackets, UserConfig::default().brackets);
    }
}
