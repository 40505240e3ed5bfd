use crate::core::grid::Category;
use crate::domain::model::{AttackType, Hero, PrimaryAttribute, Role};
use crate::utils::error::{GridError, Result};

pub const BOX_WIDTH: f64 = 1180.0;
pub const BOX_HEIGHT: f64 = 180.0;
pub const BOX_SPACING: f64 = 200.0;

/// Membership predicate of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Attribute(PrimaryAttribute),
    Attack(AttackType),
    Role(Role),
    /// Heroes whose role tags are missing from the catalog data.
    NoRole,
    Everyone,
}

impl Membership {
    /// `hero` is `None` when the catalog has no entry for a hero that does
    /// have stats; only the catch-all category accepts those.
    pub fn matches(&self, hero: Option<&Hero>) -> bool {
        match (self, hero) {
            (Membership::Everyone, _) => true,
            (_, None) => false,
            (Membership::Attribute(attr), Some(h)) => h.primary_attribute == Some(*attr),
            (Membership::Attack(attack), Some(h)) => h.attack_type == Some(*attack),
            (Membership::Role(role), Some(h)) => h.has_role(*role),
            (Membership::NoRole, Some(h)) => h.roles.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDefinition {
    pub name: String,
    pub x_position: f64,
    pub y_position: f64,
    pub width: f64,
    pub height: f64,
    pub membership: Membership,
}

impl CategoryDefinition {
    /// An empty box carrying this definition's name and geometry.
    pub fn empty_box(&self) -> Category {
        Category::new(
            self.name.clone(),
            self.x_position,
            self.y_position,
            self.width,
            self.height,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Mainstat,
    Attack,
    Role,
    Single,
}

impl TemplateKind {
    pub fn name(&self) -> &'static str {
        match self {
            TemplateKind::Mainstat => "mainstat",
            TemplateKind::Attack => "attack",
            TemplateKind::Role => "role",
            TemplateKind::Single => "single",
        }
    }

    /// Whether every hero with the relevant attribute lands in exactly one box.
    pub fn is_partition(&self) -> bool {
        matches!(self, TemplateKind::Mainstat | TemplateKind::Attack)
    }
}

/// A named, ordered set of category definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTemplate {
    pub kind: TemplateKind,
    pub categories: Vec<CategoryDefinition>,
}

impl CategoryTemplate {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Indices of the categories `hero` belongs to.
    pub fn categorize(&self, hero: Option<&Hero>) -> Vec<usize> {
        self.categories
            .iter()
            .enumerate()
            .filter(|(_, def)| def.membership.matches(hero))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Looks up a built-in template by name, alias or grouping number.
pub fn lookup(name: &str) -> Result<CategoryTemplate> {
    let kind = match name.trim().to_ascii_lowercase().as_str() {
        "mainstat" | "main" | "attribute" | "attr" | "1" => TemplateKind::Mainstat,
        "attack" | "attack_type" | "2" => TemplateKind::Attack,
        "role" | "roles" | "3" => TemplateKind::Role,
        "single" | "none" | "all" | "0" => TemplateKind::Single,
        _ => {
            return Err(GridError::UnknownTemplate {
                name: name.to_string(),
            })
        }
    };

    Ok(template(kind))
}

pub fn template(kind: TemplateKind) -> CategoryTemplate {
    let memberships: Vec<(String, Membership)> = match kind {
        TemplateKind::Mainstat => [
            ("Strength", PrimaryAttribute::Strength),
            ("Agility", PrimaryAttribute::Agility),
            ("Intelligence", PrimaryAttribute::Intelligence),
            ("Universal", PrimaryAttribute::Universal),
        ]
        .into_iter()
        .map(|(name, attr)| (name.to_string(), Membership::Attribute(attr)))
        .collect(),
        TemplateKind::Attack => vec![
            ("Melee".to_string(), Membership::Attack(AttackType::Melee)),
            ("Ranged".to_string(), Membership::Attack(AttackType::Ranged)),
        ],
        TemplateKind::Role => Role::ALL
            .iter()
            .map(|role| (role.name().to_string(), Membership::Role(*role)))
            .chain(std::iter::once(("Unknown".to_string(), Membership::NoRole)))
            .collect(),
        TemplateKind::Single => vec![("Heroes".to_string(), Membership::Everyone)],
    };

    let categories = memberships
        .into_iter()
        .enumerate()
        .map(|(i, (name, membership))| CategoryDefinition {
            name,
            x_position: 0.0,
            y_position: i as f64 * BOX_SPACING,
            width: BOX_WIDTH,
            height: BOX_HEIGHT,
            membership,
        })
        .collect();

    CategoryTemplate { kind, categories }
}
