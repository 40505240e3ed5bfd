use crate::core::grid::{Category, Grid};
use crate::core::stats::{compare_win_rates, StatsTable};
use crate::domain::model::{HeroId, SortOrder};
use crate::utils::error::Result;

/// Re-sorts the heroes of an existing grid without touching its boxes.
pub struct GridMerger;

impl GridMerger {
    /// Returns a copy of `existing` where each box's heroes are ordered by
    /// win-rate. Box names, geometry and membership are unchanged.
    ///
    /// Heroes without stats keep their relative order and are grouped where
    /// the lowest win-rates go: at the end when descending, at the start when
    /// ascending.
    pub fn merge(existing: &Grid, table: &StatsTable, order: SortOrder) -> Result<Grid> {
        table.ensure_not_empty(&existing.config_name)?;

        let categories = existing
            .categories
            .iter()
            .map(|category| Category {
                hero_ids: Self::sort_box(&category.hero_ids, table, order),
                ..category.clone()
            })
            .collect();

        Ok(Grid::new(existing.config_name.clone(), categories))
    }

    fn sort_box(hero_ids: &[HeroId], table: &StatsTable, order: SortOrder) -> Vec<HeroId> {
        let mut ranked: Vec<(HeroId, f64)> = Vec::with_capacity(hero_ids.len());
        let mut unranked: Vec<HeroId> = Vec::new();

        for &id in hero_ids {
            match table.win_rate(id) {
                Some(rate) => ranked.push((id, rate)),
                None => unranked.push(id),
            }
        }

        ranked.sort_by(|a, b| compare_win_rates(a.1, b.1, order));
        let ranked = ranked.into_iter().map(|(id, _)| id);

        match order {
            SortOrder::Descending => ranked.chain(unranked).collect(),
            SortOrder::Ascending => unranked.into_iter().chain(ranked).collect(),
        }
    }
}
