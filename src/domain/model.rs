use crate::utils::error::{GridError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Hero identifier as used by the stats service and by `hero_ids` in the grid file.
pub type HeroId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimaryAttribute {
    Strength,
    Agility,
    Intelligence,
    Universal,
}

impl PrimaryAttribute {
    /// Parses the short codes used by the stats service (`str`, `agi`, `int`, `all`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "str" | "strength" => Some(Self::Strength),
            "agi" | "agility" => Some(Self::Agility),
            "int" | "intelligence" => Some(Self::Intelligence),
            "all" | "universal" => Some(Self::Universal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackType {
    Melee,
    Ranged,
}

impl AttackType {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "melee" => Some(Self::Melee),
            "ranged" => Some(Self::Ranged),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Carry,
    Support,
    Nuker,
    Disabler,
    Jungler,
    Durable,
    Escape,
    Pusher,
    Initiator,
}

impl Role {
    /// Every known role, in the order the role template lays its boxes out.
    pub const ALL: [Role; 9] = [
        Role::Carry,
        Role::Support,
        Role::Nuker,
        Role::Disabler,
        Role::Jungler,
        Role::Durable,
        Role::Escape,
        Role::Pusher,
        Role::Initiator,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|role| role.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Role::Carry => "Carry",
            Role::Support => "Support",
            Role::Nuker => "Nuker",
            Role::Disabler => "Disabler",
            Role::Jungler => "Jungler",
            Role::Durable => "Durable",
            Role::Escape => "Escape",
            Role::Pusher => "Pusher",
            Role::Initiator => "Initiator",
        }
    }
}

/// Static hero attributes consumed by category templates.
///
/// `primary_attribute` and `attack_type` are optional because the catalog is
/// built from third-party data; a hero lacking one is simply left out of the
/// template boxes that depend on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hero {
    pub id: HeroId,
    pub name: String,
    pub primary_attribute: Option<PrimaryAttribute>,
    pub attack_type: Option<AttackType>,
    pub roles: Vec<Role>,
}

impl Hero {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Read-only hero attribute lookup, loaded once per run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeroCatalog {
    heroes: HashMap<HeroId, Hero>,
}

impl HeroCatalog {
    pub fn new<I: IntoIterator<Item = Hero>>(heroes: I) -> Self {
        Self {
            heroes: heroes.into_iter().map(|h| (h.id, h)).collect(),
        }
    }

    pub fn get(&self, id: HeroId) -> Option<&Hero> {
        self.heroes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.heroes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heroes.is_empty()
    }
}

/// Skill bracket over which win-rates are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Bracket {
    All,
    Herald,
    Guardian,
    Crusader,
    Archon,
    Legend,
    Ancient,
    Divine,
    #[default]
    Immortal,
    Pro,
}

impl Bracket {
    /// Public ranked brackets, in ascending skill order. `All` aggregates these.
    pub const RANKED: [Bracket; 8] = [
        Bracket::Herald,
        Bracket::Guardian,
        Bracket::Crusader,
        Bracket::Archon,
        Bracket::Legend,
        Bracket::Ancient,
        Bracket::Divine,
        Bracket::Immortal,
    ];

    pub fn number(&self) -> u8 {
        match self {
            Bracket::All => 0,
            Bracket::Herald => 1,
            Bracket::Guardian => 2,
            Bracket::Crusader => 3,
            Bracket::Archon => 4,
            Bracket::Legend => 5,
            Bracket::Ancient => 6,
            Bracket::Divine => 7,
            Bracket::Immortal => 8,
            Bracket::Pro => 9,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Bracket::All => "All",
            Bracket::Herald => "Herald",
            Bracket::Guardian => "Guardian",
            Bracket::Crusader => "Crusader",
            Bracket::Archon => "Archon",
            Bracket::Legend => "Legend",
            Bracket::Ancient => "Ancient",
            Bracket::Divine => "Divine",
            Bracket::Immortal => "Immortal",
            Bracket::Pro => "Pro",
        }
    }

    /// Prefix of the `{prefix}_pick` / `{prefix}_win` counters in the stats payload.
    /// `All` has no counters of its own.
    pub fn stats_prefix(&self) -> Option<String> {
        match self {
            Bracket::All => None,
            Bracket::Pro => Some("pro".to_string()),
            ranked => Some(ranked.number().to_string()),
        }
    }

    /// Brackets whose tables must be retrieved to serve this bracket.
    pub fn sources(&self) -> Vec<Bracket> {
        match self {
            Bracket::All => Self::RANKED.to_vec(),
            other => vec![*other],
        }
    }
}

impl fmt::Display for Bracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Bracket {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim();
        let all = [Bracket::All, Bracket::Pro]
            .into_iter()
            .chain(Bracket::RANKED);

        for bracket in all {
            if value.eq_ignore_ascii_case(bracket.name()) || value == bracket.number().to_string() {
                return Ok(bracket);
            }
        }

        Err(GridError::UnknownBracket {
            value: value.to_string(),
        })
    }
}

impl Serialize for Bracket {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name().to_ascii_lowercase())
    }
}

impl<'de> Deserialize<'de> for Bracket {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Direction in which heroes are ordered by win-rate inside a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Highest win-rate first.
    #[default]
    Descending,
    Ascending,
}

impl SortOrder {
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            SortOrder::Ascending
        } else {
            SortOrder::Descending
        }
    }
}

/// What an invocation writes: a fresh grid from a template, or a re-sort of
/// an existing grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridTarget {
    Layout(String),
    Existing(String),
}
