use crate::core::grid::{Grid, HeroGridFile};
use crate::core::layout::GridLayoutBuilder;
use crate::core::merge::GridMerger;
use crate::core::template::{self, CategoryTemplate};
use crate::core::{ConfigProvider, StatsSource, Storage};
use crate::domain::model::{Bracket, GridTarget};
use crate::utils::error::{GridError, Result};

/// What one run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub grid_file: String,
    pub grids: Vec<String>,
}

enum Plan {
    Build(CategoryTemplate),
    Merge(Grid),
}

/// Drives one invocation: retrieve stats, build or merge one grid per
/// bracket, then write the grid file once.
pub struct GridEngine<S: StatsSource, St: Storage> {
    source: S,
    storage: St,
}

impl<S: StatsSource, St: Storage> GridEngine<S, St> {
    pub fn new(source: S, storage: St) -> Self {
        Self { source, storage }
    }

    pub async fn run<C: ConfigProvider>(&self, config: &C) -> Result<RunSummary> {
        tracing::info!("🚀 Starting hero grid update");

        // Resolve everything that can fail on user input before touching the network.
        let mut file = self.load_file(config).await?;
        let plan = match config.target() {
            GridTarget::Layout(name) => Plan::Build(template::lookup(name)?),
            GridTarget::Existing(name) => Plan::Merge(
                file.find(name)
                    .cloned()
                    .ok_or_else(|| GridError::GridNotFound {
                        name: name.clone(),
                        path: config.grid_file().to_string(),
                    })?,
            ),
        };

        let brackets = config.brackets();
        tracing::info!("📡 Fetching stats for {}", bracket_list(brackets));
        let snapshot = self.source.fetch(brackets).await?;
        tracing::info!("📥 Stats loaded for {} heroes", snapshot.catalog.len());

        let multiple = brackets.len() > 1;
        let mut written = Vec::with_capacity(brackets.len());

        for &bracket in brackets {
            let table = snapshot.table(bracket)?;
            tracing::debug!("{}: {} heroes with stats", bracket, table.len());

            let grid = match &plan {
                Plan::Build(template) => {
                    let name = grid_name(config.config_name(), bracket, multiple);
                    GridLayoutBuilder::new(&snapshot.catalog).build(
                        &name,
                        template,
                        &table,
                        config.sort_order(),
                    )?
                }
                Plan::Merge(existing) => {
                    let mut merged = GridMerger::merge(existing, &table, config.sort_order())?;
                    merged.config_name = grid_name(&existing.config_name, bracket, multiple);
                    merged
                }
            };

            let name = grid.config_name.clone();
            if file.upsert(grid) {
                tracing::info!("♻️  Updated grid '{}'", name);
            } else {
                tracing::info!("✨ Added grid '{}'", name);
            }
            written.push(name);
        }

        let data = file.to_json()?;
        tracing::debug!("Writing {} bytes to {}", data.len(), config.grid_file());
        self.storage.write_file(config.grid_file(), &data).await?;

        Ok(RunSummary {
            grid_file: config.grid_file().to_string(),
            grids: written,
        })
    }

    /// A missing grid file is an empty one when generating, and an error when
    /// re-sorting since the grid to re-sort cannot exist.
    async fn load_file<C: ConfigProvider>(&self, config: &C) -> Result<HeroGridFile> {
        match self.storage.read_file(config.grid_file()).await {
            Ok(data) => HeroGridFile::from_json(&data),
            Err(GridError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                match config.target() {
                    GridTarget::Layout(_) => {
                        tracing::info!("🆕 {} does not exist yet, creating it", config.grid_file());
                        Ok(HeroGridFile::default())
                    }
                    GridTarget::Existing(name) => Err(GridError::GridNotFound {
                        name: name.clone(),
                        path: config.grid_file().to_string(),
                    }),
                }
            }
            Err(e) => Err(e),
        }
    }
}

/// With several brackets each grid is suffixed by its bracket so they can coexist.
pub fn grid_name(base: &str, bracket: Bracket, multiple: bool) -> String {
    if multiple {
        format!("{} ({})", base, bracket)
    } else {
        base.to_string()
    }
}

fn bracket_list(brackets: &[Bracket]) -> String {
    brackets
        .iter()
        .map(Bracket::name)
        .collect::<Vec<_>>()
        .join(", ")
}
