use crate::core::stats::{StatsEntry, StatsSnapshot};
use crate::domain::model::{AttackType, Bracket, Hero, HeroCatalog, HeroId, PrimaryAttribute, Role};
use crate::domain::ports::StatsSource;
use crate::utils::error::Result;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;

pub const DEFAULT_API_ENDPOINT: &str = "https://api.opendota.com/api";

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Static part of one `heroStats` row. Per-bracket counters are read from the
/// raw object since their keys depend on the bracket.
#[derive(Debug, Deserialize)]
struct HeroStatsRow {
    id: HeroId,
    #[serde(default)]
    localized_name: String,
    #[serde(default)]
    primary_attr: Option<String>,
    #[serde(default)]
    attack_type: Option<String>,
    #[serde(default)]
    roles: Vec<String>,
}

/// Stats source backed by the OpenDota `heroStats` endpoint.
pub struct OpenDotaSource {
    client: Client,
    endpoint: String,
}

impl OpenDotaSource {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    fn hero_stats_url(&self) -> String {
        format!("{}/heroStats", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl StatsSource for OpenDotaSource {
    async fn fetch(&self, brackets: &[Bracket]) -> Result<StatsSnapshot> {
        let url = self.hero_stats_url();
        tracing::debug!("Making API request to: {}", url);

        let response = self.client.get(&url).send().await?;
        tracing::debug!("API response status: {}", response.status());

        let rows: Vec<Value> = response.error_for_status()?.json().await?;
        tracing::info!("📡 Received stats for {} heroes", rows.len());

        parse_hero_stats(rows, brackets)
    }
}

/// Turns a `heroStats` payload into a snapshot covering `brackets`.
///
/// Rows repeating a hero id are dropped after the first. A hero with no picks
/// in a bracket gets no entry for that bracket.
pub fn parse_hero_stats(rows: Vec<Value>, brackets: &[Bracket]) -> Result<StatsSnapshot> {
    let mut sources: Vec<Bracket> = brackets.iter().flat_map(|b| b.sources()).collect();
    sources.sort();
    sources.dedup();

    let mut snapshot = StatsSnapshot::default();
    let mut heroes = Vec::with_capacity(rows.len());
    let mut seen = HashSet::new();

    for row in rows {
        let hero: HeroStatsRow = serde_json::from_value(row.clone())?;
        if !seen.insert(hero.id) {
            tracing::warn!("Duplicate stats row for hero {}, keeping the first", hero.id);
            continue;
        }

        for &bracket in &sources {
            let Some(prefix) = bracket.stats_prefix() else {
                continue;
            };
            let picks = counter(&row, &format!("{}_pick", prefix));
            let wins = counter(&row, &format!("{}_win", prefix));
            if picks == 0 {
                continue;
            }
            snapshot
                .records
                .entry(bracket)
                .or_default()
                .push(StatsEntry::from_counts(hero.id, wins, picks));
        }

        heroes.push(to_hero(hero));
    }

    snapshot.catalog = HeroCatalog::new(heroes);
    Ok(snapshot)
}

fn counter(row: &Value, key: &str) -> u64 {
    row.get(key).and_then(Value::as_u64).unwrap_or(0)
}

fn to_hero(row: HeroStatsRow) -> Hero {
    let roles = row
        .roles
        .iter()
        .filter_map(|name| {
            let role = Role::from_name(name);
            if role.is_none() {
                tracing::debug!("Ignoring unknown role '{}' for hero {}", name, row.id);
            }
            role
        })
        .collect();

    Hero {
        id: row.id,
        name: row.localized_name,
        primary_attribute: row.primary_attr.as_deref().and_then(PrimaryAttribute::from_code),
        attack_type: row.attack_type.as_deref().and_then(AttackType::from_code),
        roles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::GridError;
    use httpmock::prelude::*;
    use serde_json::json;

    fn payload() -> Value {
        json!([
            {
                "id": 1, "localized_name": "Anti-Mage", "primary_attr": "agi",
                "attack_type": "Melee", "roles": ["Carry", "Escape", "Nuker"],
                "1_pick": 200, "1_win": 90, "8_pick": 100, "8_win": 55,
                "pro_pick": 10, "pro_win": 4
            },
            {
                "id": 2, "localized_name": "Axe", "primary_attr": "str",
                "attack_type": "Melee", "roles": ["Initiator", "Durable", "Disabler"],
                "1_pick": 300, "1_win": 160, "8_pick": 0, "8_win": 0
            },
            {
                "id": 5, "localized_name": "Crystal Maiden", "primary_attr": "int",
                "attack_type": "Ranged", "roles": ["Support", "Disabler", "Nuker", "Jungler"],
                "1_pick": 100, "1_win": 50, "8_pick": 80, "8_win": 40
            }
        ])
    }

    fn rows() -> Vec<Value> {
        match payload() {
            Value::Array(rows) => rows,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_parse_catalog() {
        let snapshot = parse_hero_stats(rows(), &[Bracket::Immortal]).unwrap();
        let am = snapshot.catalog.get(1).unwrap();

        assert_eq!(snapshot.catalog.len(), 3);
        assert_eq!(am.name, "Anti-Mage");
        assert_eq!(am.primary_attribute, Some(PrimaryAttribute::Agility));
        assert_eq!(am.attack_type, Some(AttackType::Melee));
        assert_eq!(am.roles, vec![Role::Carry, Role::Escape, Role::Nuker]);
    }

    #[test]
    fn test_zero_picks_are_absent() {
        let snapshot = parse_hero_stats(rows(), &[Bracket::Immortal]).unwrap();
        let immortal = snapshot.table(Bracket::Immortal).unwrap();

        assert_eq!(immortal.len(), 2);
        assert_eq!(immortal.win_rate(1), Some(0.55));
        assert_eq!(immortal.win_rate(2), None);
        assert_eq!(immortal.get(5).unwrap().matches, 80);
    }

    #[test]
    fn test_only_requested_brackets_are_collected() {
        let snapshot = parse_hero_stats(rows(), &[Bracket::Pro]).unwrap();
        assert_eq!(snapshot.records.len(), 1);
        assert_eq!(snapshot.table(Bracket::Pro).unwrap().win_rate(1), Some(0.4));
    }

    #[test]
    fn test_all_collects_ranked_brackets() {
        let snapshot = parse_hero_stats(rows(), &[Bracket::All]).unwrap();
        let all = snapshot.table(Bracket::All).unwrap();

        // (90 + 55) / (200 + 100)
        assert!((all.win_rate(1).unwrap() - 145.0 / 300.0).abs() < 1e-12);
        assert!(!snapshot.records.contains_key(&Bracket::Pro));
    }

    #[test]
    fn test_duplicate_rows_are_deduplicated() {
        let mut rows = rows();
        rows.push(json!({"id": 1, "8_pick": 10, "8_win": 10}));

        let snapshot = parse_hero_stats(rows, &[Bracket::Immortal]).unwrap();
        assert_eq!(snapshot.table(Bracket::Immortal).unwrap().win_rate(1), Some(0.55));
    }

    #[test]
    fn test_row_without_id_is_rejected() {
        let result = parse_hero_stats(vec![json!({"localized_name": "Nobody"})], &[Bracket::Herald]);
        assert!(matches!(result, Err(GridError::SerializationError(_))));
    }

    #[tokio::test]
    async fn test_fetch_from_service() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/api/heroStats");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(payload());
        });

        let source = OpenDotaSource::new(server.url("/api/")).unwrap();
        let snapshot = source.fetch(&[Bracket::Herald]).await.unwrap();

        api_mock.assert();
        assert_eq!(snapshot.table(Bracket::Herald).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_server_error() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/heroStats");
            then.status(500);
        });

        let source = OpenDotaSource::new(server.url("")).unwrap();
        let result = source.fetch(&[Bracket::Herald]).await;

        api_mock.assert();
        assert!(matches!(result, Err(GridError::ApiError(_))));
    }
}
