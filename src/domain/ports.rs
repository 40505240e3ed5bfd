use crate::core::stats::StatsSnapshot;
use crate::domain::model::{Bracket, GridTarget, SortOrder};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Options for one invocation, however they were gathered.
pub trait ConfigProvider: Send + Sync {
    fn brackets(&self) -> &[Bracket];
    fn target(&self) -> &GridTarget;
    fn sort_order(&self) -> SortOrder;
    /// Name given to generated grids.
    fn config_name(&self) -> &str;
    /// Location of `hero_grid_config.json`, relative to the storage root.
    fn grid_file(&self) -> &str;
}

/// Retrieval of hero attributes and per-bracket win-rates.
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn fetch(&self, brackets: &[Bracket]) -> Result<StatsSnapshot>;
}
