use crate::domain::model::{Bracket, HeroCatalog, HeroId, SortOrder};
use crate::utils::error::{GridError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// One hero's win-rate within a bracket.
///
/// `matches` is carried for logging and for weighting the `All` aggregate;
/// it never influences the sort order directly. `wins` is set when the rate
/// was derived from raw counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatsEntry {
    pub hero_id: HeroId,
    pub win_rate: f64,
    pub matches: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wins: Option<u64>,
}

impl StatsEntry {
    pub fn new(hero_id: HeroId, win_rate: f64, matches: u64) -> Self {
        Self {
            hero_id,
            win_rate,
            matches,
            wins: None,
        }
    }

    /// An entry for `wins` out of `matches` games. `matches` must be non-zero.
    pub fn from_counts(hero_id: HeroId, wins: u64, matches: u64) -> Self {
        Self {
            hero_id,
            win_rate: wins as f64 / matches as f64,
            matches,
            wins: Some(wins),
        }
    }
}

/// Win-rates for a single bracket, keeping the order the stats source
/// delivered them in. That order is the tie-break for equal win-rates.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsTable {
    bracket: Bracket,
    entries: Vec<StatsEntry>,
    index: HashMap<HeroId, usize>,
}

impl StatsTable {
    /// Builds a table from deduplicated records.
    ///
    /// Duplicate hero ids and non-finite or negative win-rates are contract
    /// violations of the retrieval layer and are rejected, not repaired.
    pub fn from_records<I>(bracket: Bracket, records: I) -> Result<Self>
    where
        I: IntoIterator<Item = StatsEntry>,
    {
        let mut entries = Vec::new();
        let mut index = HashMap::new();

        for entry in records {
            if !entry.win_rate.is_finite() || entry.win_rate < 0.0 {
                return Err(GridError::MalformedStatsInput {
                    bracket,
                    reason: format!(
                        "hero {} has invalid win-rate {}",
                        entry.hero_id, entry.win_rate
                    ),
                });
            }
            if index.insert(entry.hero_id, entries.len()).is_some() {
                return Err(GridError::MalformedStatsInput {
                    bracket,
                    reason: format!("hero {} appears more than once", entry.hero_id),
                });
            }
            entries.push(entry);
        }

        Ok(Self {
            bracket,
            entries,
            index,
        })
    }

    pub fn bracket(&self) -> Bracket {
        self.bracket
    }

    pub fn entries(&self) -> &[StatsEntry] {
        &self.entries
    }

    pub fn get(&self, hero_id: HeroId) -> Option<&StatsEntry> {
        self.index.get(&hero_id).map(|&i| &self.entries[i])
    }

    pub fn win_rate(&self, hero_id: HeroId) -> Option<f64> {
        self.get(hero_id).map(|e| e.win_rate)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fails with `EmptyStatsTable` when there is nothing to sort by.
    pub fn ensure_not_empty(&self, target: &str) -> Result<()> {
        if self.is_empty() {
            return Err(GridError::EmptyStatsTable {
                bracket: self.bracket,
                target: target.to_string(),
            });
        }
        Ok(())
    }
}

/// Everything the stats source delivered for one run: the hero catalog and
/// raw per-bracket records in source order.
#[derive(Debug, Clone, Default)]
pub struct StatsSnapshot {
    pub catalog: HeroCatalog,
    pub records: HashMap<Bracket, Vec<StatsEntry>>,
}

impl StatsSnapshot {
    /// The table to sort by for `bracket`, aggregating for `Bracket::All`.
    /// A bracket the source returned nothing for yields an empty table.
    pub fn table(&self, bracket: Bracket) -> Result<StatsTable> {
        match bracket {
            Bracket::All => {
                let tables = Bracket::All
                    .sources()
                    .into_iter()
                    .map(|source| self.single_table(source))
                    .collect::<Result<Vec<_>>>()?;
                aggregate(&tables)
            }
            other => self.single_table(other),
        }
    }

    fn single_table(&self, bracket: Bracket) -> Result<StatsTable> {
        let records = self.records.get(&bracket).cloned().unwrap_or_default();
        StatsTable::from_records(bracket, records)
    }
}

/// Orders two win-rates for the given direction.
pub fn compare_win_rates(a: f64, b: f64, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Descending => b.total_cmp(&a),
        SortOrder::Ascending => a.total_cmp(&b),
    }
}

/// Combines per-bracket tables into one synthetic `All` table.
///
/// A hero's rate is the match-weighted mean of its per-bracket rates; when none
/// of its entries carry a match count the plain mean is used instead. Entries
/// built from raw counts are summed as integers and divided once, so equal
/// totals give bit-identical rates. Heroes keep the order of their first
/// appearance across `tables`.
pub fn aggregate(tables: &[StatsTable]) -> Result<StatsTable> {
    struct Accumulator {
        weighted_sum: f64,
        weight: u64,
        wins: Option<u64>,
        plain_sum: f64,
        samples: u32,
    }

    let mut order: Vec<HeroId> = Vec::new();
    let mut totals: HashMap<HeroId, Accumulator> = HashMap::new();

    for table in tables {
        for entry in table.entries() {
            let acc = totals.entry(entry.hero_id).or_insert_with(|| {
                order.push(entry.hero_id);
                Accumulator {
                    weighted_sum: 0.0,
                    weight: 0,
                    wins: Some(0),
                    plain_sum: 0.0,
                    samples: 0,
                }
            });
            acc.weighted_sum += entry.win_rate * entry.matches as f64;
            acc.weight += entry.matches;
            acc.wins = acc.wins.zip(entry.wins).map(|(total, wins)| total + wins);
            acc.plain_sum += entry.win_rate;
            acc.samples += 1;
        }
    }

    let records = order.into_iter().filter_map(|hero_id| {
        let acc = totals.get(&hero_id)?;
        let entry = match acc.wins {
            Some(wins) if acc.weight > 0 => StatsEntry::from_counts(hero_id, wins, acc.weight),
            _ if acc.weight > 0 => {
                StatsEntry::new(hero_id, acc.weighted_sum / acc.weight as f64, acc.weight)
            }
            _ => StatsEntry::new(hero_id, acc.plain_sum / f64::from(acc.samples), 0),
        };
        Some(entry)
    });

    StatsTable::from_records(Bracket::All, records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(bracket: Bracket, rows: &[(HeroId, f64, u64)]) -> StatsTable {
        StatsTable::from_records(
            bracket,
            rows.iter().map(|&(id, rate, matches)| StatsEntry::new(id, rate, matches)),
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_keeps_source_order() {
        let t = table(Bracket::Herald, &[(5, 0.5, 10), (2, 0.4, 20), (9, 0.6, 5)]);
        let ids: Vec<HeroId> = t.entries().iter().map(|e| e.hero_id).collect();
        assert_eq!(ids, vec![5, 2, 9]);
        assert_eq!(t.win_rate(2), Some(0.4));
        assert_eq!(t.win_rate(3), None);
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn test_duplicate_hero_is_rejected() {
        let result = StatsTable::from_records(
            Bracket::Divine,
            vec![StatsEntry::new(1, 0.5, 1), StatsEntry::new(1, 0.6, 1)],
        );
        match result {
            Err(GridError::MalformedStatsInput { bracket, reason }) => {
                assert_eq!(bracket, Bracket::Divine);
                assert!(reason.contains("hero 1"));
            }
            other => panic!("expected MalformedStatsInput, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_rate_is_rejected() {
        let nan = StatsTable::from_records(Bracket::Pro, vec![StatsEntry::new(1, f64::NAN, 1)]);
        assert!(matches!(nan, Err(GridError::MalformedStatsInput { .. })));

        let negative = StatsTable::from_records(Bracket::Pro, vec![StatsEntry::new(1, -0.1, 1)]);
        assert!(matches!(negative, Err(GridError::MalformedStatsInput { .. })));
    }

    #[test]
    fn test_empty_table_check() {
        let t = table(Bracket::Legend, &[]);
        match t.ensure_not_empty("mainstat") {
            Err(GridError::EmptyStatsTable { bracket, target }) => {
                assert_eq!(bracket, Bracket::Legend);
                assert_eq!(target, "mainstat");
            }
            other => panic!("expected EmptyStatsTable, got {:?}", other),
        }
    }

    #[test]
    fn test_aggregate_equal_weights_is_mean() {
        let a = table(Bracket::Herald, &[(1, 0.40, 100)]);
        let b = table(Bracket::Guardian, &[(1, 0.60, 100)]);
        let all = aggregate(&[a, b]).unwrap();

        assert_eq!(all.bracket(), Bracket::All);
        assert!((all.win_rate(1).unwrap() - 0.50).abs() < 1e-12);
        assert_eq!(all.get(1).unwrap().matches, 200);
    }

    #[test]
    fn test_aggregate_weighted_by_matches() {
        let a = table(Bracket::Herald, &[(1, 0.40, 300)]);
        let b = table(Bracket::Guardian, &[(1, 0.60, 100)]);
        let all = aggregate(&[a, b]).unwrap();

        assert!((all.win_rate(1).unwrap() - 0.45).abs() < 1e-12);
    }

    #[test]
    fn test_aggregate_without_match_counts_is_unweighted() {
        let a = table(Bracket::Herald, &[(1, 0.30, 0), (2, 0.50, 0)]);
        let b = table(Bracket::Guardian, &[(1, 0.50, 0)]);
        let all = aggregate(&[a, b]).unwrap();

        assert!((all.win_rate(1).unwrap() - 0.40).abs() < 1e-12);
        assert!((all.win_rate(2).unwrap() - 0.50).abs() < 1e-12);
    }

    #[test]
    fn test_aggregate_counts_are_exact() {
        // Both heroes total 302 wins out of 510 games.
        let herald = StatsTable::from_records(
            Bracket::Herald,
            vec![StatsEntry::from_counts(1, 194, 300), StatsEntry::from_counts(2, 269, 300)],
        )
        .unwrap();
        let guardian = StatsTable::from_records(
            Bracket::Guardian,
            vec![StatsEntry::from_counts(1, 108, 210), StatsEntry::from_counts(2, 33, 210)],
        )
        .unwrap();
        let all = aggregate(&[herald, guardian]).unwrap();

        assert_eq!(all.win_rate(1), Some(302.0 / 510.0));
        assert_eq!(all.win_rate(1), all.win_rate(2));
        assert_eq!(all.get(2).unwrap().wins, Some(302));
        assert_eq!(all.get(2).unwrap().matches, 510);
    }

    #[test]
    fn test_aggregate_order_is_first_appearance() {
        let a = table(Bracket::Herald, &[(3, 0.5, 1)]);
        let b = table(Bracket::Guardian, &[(1, 0.5, 1), (3, 0.5, 1), (2, 0.5, 1)]);
        let all = aggregate(&[a, b]).unwrap();
        let ids: Vec<HeroId> = all.entries().iter().map(|e| e.hero_id).collect();

        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_snapshot_tables() {
        let mut snapshot = StatsSnapshot::default();
        snapshot
            .records
            .insert(Bracket::Herald, vec![StatsEntry::new(1, 0.2, 10)]);
        snapshot
            .records
            .insert(Bracket::Immortal, vec![StatsEntry::new(1, 0.6, 10), StatsEntry::new(2, 0.5, 4)]);
        snapshot.records.insert(Bracket::Pro, vec![StatsEntry::new(1, 1.0, 1000)]);

        assert_eq!(snapshot.table(Bracket::Immortal).unwrap().len(), 2);
        assert!(snapshot.table(Bracket::Divine).unwrap().is_empty());

        // Pro games are not part of the ranked aggregate.
        let all = snapshot.table(Bracket::All).unwrap();
        assert!((all.win_rate(1).unwrap() - 0.4).abs() < 1e-12);
        assert_eq!(all.win_rate(2), Some(0.5));
    }

    #[test]
    fn test_compare_directions() {
        assert_eq!(compare_win_rates(0.6, 0.4, SortOrder::Descending), Ordering::Less);
        assert_eq!(compare_win_rates(0.6, 0.4, SortOrder::Ascending), Ordering::Greater);
        assert_eq!(compare_win_rates(0.5, 0.5, SortOrder::Descending), Ordering::Equal);
    }
}
