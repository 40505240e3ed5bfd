use crate::core::grid::Grid;
use crate::core::stats::{compare_win_rates, StatsEntry, StatsTable};
use crate::core::template::CategoryTemplate;
use crate::domain::model::{HeroCatalog, SortOrder};
use crate::utils::error::Result;

/// Synthesizes a fresh grid from a category template and one stats table.
pub struct GridLayoutBuilder<'a> {
    catalog: &'a HeroCatalog,
}

impl<'a> GridLayoutBuilder<'a> {
    pub fn new(catalog: &'a HeroCatalog) -> Self {
        Self { catalog }
    }

    /// Every hero with stats is placed in each box whose predicate it
    /// satisfies, and boxes are ordered by win-rate. Equal rates keep the
    /// table's order because the sort is stable.
    pub fn build(
        &self,
        config_name: &str,
        template: &CategoryTemplate,
        table: &StatsTable,
        order: SortOrder,
    ) -> Result<Grid> {
        table.ensure_not_empty(template.name())?;

        let mut members: Vec<Vec<&StatsEntry>> = vec![Vec::new(); template.categories.len()];
        for entry in table.entries() {
            let hero = self.catalog.get(entry.hero_id);
            for index in template.categorize(hero) {
                members[index].push(entry);
            }
        }

        let categories = template
            .categories
            .iter()
            .zip(members)
            .map(|(definition, mut entries)| {
                entries.sort_by(|a, b| compare_win_rates(a.win_rate, b.win_rate, order));

                let mut category = definition.empty_box();
                category.hero_ids = entries.iter().map(|e| e.hero_id).collect();
                category
            })
            .collect();

        Ok(Grid::new(config_name, categories))
    }
}
