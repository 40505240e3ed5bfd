pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, user_config::UserConfig, RunOptions};

pub use crate::adapters::opendota::OpenDotaSource;
pub use crate::core::{
    engine::{GridEngine, RunSummary},
    grid::{Category, Grid, HeroGridFile},
    layout::GridLayoutBuilder,
    merge::GridMerger,
    stats::{StatsEntry, StatsSnapshot, StatsTable},
    template::CategoryTemplate,
};
pub use crate::utils::error::{GridError, Result};
