use crate::domain::model::HeroId;
use crate::utils::error::Result;
use serde::de::{DeserializeOwned, Error as _};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Number, Value};

/// Schema version written by the game client.
pub const GRID_FILE_VERSION: u32 = 3;

pub const DEFAULT_GRID_NAME: &str = "ODHeroGrid";

/// Identity of a box inside a grid: its name and position, never its index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoxKey {
    pub name: String,
    pub x_position: Number,
    pub y_position: Number,
}

/// A named, positioned box of heroes.
///
/// Geometry is kept as raw JSON numbers so values read from the client's file
/// are written back exactly as they were.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Category {
    pub category_name: String,
    pub x_position: Number,
    pub y_position: Number,
    pub width: Number,
    pub height: Number,
    pub hero_ids: Vec<HeroId>,
    /// Keys this model does not know, written back untouched.
    pub extra: Map<String, Value>,
}

impl Category {
    pub fn new(name: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            category_name: name.into(),
            x_position: coordinate(x),
            y_position: coordinate(y),
            width: coordinate(width),
            height: coordinate(height),
            hero_ids: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn key(&self) -> BoxKey {
        BoxKey {
            name: self.category_name.clone(),
            x_position: self.x_position.clone(),
            y_position: self.y_position.clone(),
        }
    }
}

// Negative or non-finite values are not meaningful to the client.
fn coordinate(value: f64) -> Number {
    Number::from_f64(value.abs()).unwrap_or_else(|| Number::from(0u32))
}

impl TryFrom<Map<String, Value>> for Category {
    type Error = serde_json::Error;

    fn try_from(mut map: Map<String, Value>) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            category_name: required(&mut map, "category_name")?,
            x_position: required(&mut map, "x_position")?,
            y_position: required(&mut map, "y_position")?,
            width: required(&mut map, "width")?,
            height: required(&mut map, "height")?,
            hero_ids: optional(&mut map, "hero_ids")?.unwrap_or_default(),
            extra: map,
        })
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(6 + self.extra.len()))?;
        map.serialize_entry("category_name", &self.category_name)?;
        map.serialize_entry("x_position", &self.x_position)?;
        map.serialize_entry("y_position", &self.y_position)?;
        map.serialize_entry("width", &self.width)?;
        map.serialize_entry("height", &self.height)?;
        map.serialize_entry("hero_ids", &self.hero_ids)?;
        for (key, value) in &self.extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// One hero grid ("config") as shown in the client's grid picker.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Grid {
    pub config_name: String,
    pub categories: Vec<Category>,
    pub extra: Map<String, Value>,
}

impl Grid {
    pub fn new(config_name: impl Into<String>, categories: Vec<Category>) -> Self {
        Self {
            config_name: config_name.into(),
            categories,
            extra: Map::new(),
        }
    }

    pub fn box_keys(&self) -> Vec<BoxKey> {
        self.categories.iter().map(Category::key).collect()
    }

    pub fn category(&self, key: &BoxKey) -> Option<&Category> {
        self.categories.iter().find(|c| &c.key() == key)
    }
}

impl TryFrom<Map<String, Value>> for Grid {
    type Error = serde_json::Error;

    fn try_from(mut map: Map<String, Value>) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            config_name: required(&mut map, "config_name")?,
            categories: optional(&mut map, "categories")?.unwrap_or_default(),
            extra: map,
        })
    }
}

impl Serialize for Grid {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2 + self.extra.len()))?;
        map.serialize_entry("config_name", &self.config_name)?;
        map.serialize_entry("categories", &self.categories)?;
        for (key, value) in &self.extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Contents of `hero_grid_config.json`.
///
/// Keys outside the version-3 schema are carried through a rewrite at every
/// level: file, grid and category.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct HeroGridFile {
    pub version: u32,
    pub configs: Vec<Grid>,
    pub extra: Map<String, Value>,
}

impl Default for HeroGridFile {
    fn default() -> Self {
        Self {
            version: GRID_FILE_VERSION,
            configs: Vec::new(),
            extra: Map::new(),
        }
    }
}

impl TryFrom<Map<String, Value>> for HeroGridFile {
    type Error = serde_json::Error;

    fn try_from(mut map: Map<String, Value>) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            version: optional(&mut map, "version")?.unwrap_or(GRID_FILE_VERSION),
            configs: optional(&mut map, "configs")?.unwrap_or_default(),
            extra: map,
        })
    }
}

impl Serialize for HeroGridFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2 + self.extra.len()))?;
        map.serialize_entry("version", &self.version)?;
        map.serialize_entry("configs", &self.configs)?;
        for (key, value) in &self.extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

fn optional<T: DeserializeOwned>(
    map: &mut Map<String, Value>,
    key: &str,
) -> serde_json::Result<Option<T>> {
    map.remove(key).map(serde_json::from_value).transpose()
}

fn required<T: DeserializeOwned>(map: &mut Map<String, Value>, key: &str) -> serde_json::Result<T> {
    optional(map, key)?.ok_or_else(|| serde_json::Error::custom(format!("missing field `{}`", key)))
}

impl HeroGridFile {
    pub fn from_json(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn find(&self, config_name: &str) -> Option<&Grid> {
        self.configs.iter().find(|g| g.config_name == config_name)
    }

    /// Replaces the grid with the same name, or appends it. Returns `true` on replace.
    pub fn upsert(&mut self, grid: Grid) -> bool {
        match self
            .configs
            .iter_mut()
            .find(|g| g.config_name == grid.config_name)
        {
            Some(existing) => {
                *existing = grid;
                true
            }
            None => {
                self.configs.push(grid);
                false
            }
        }
    }
}
