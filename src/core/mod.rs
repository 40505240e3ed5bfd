pub mod engine;
pub mod grid;
pub mod layout;
pub mod merge;
pub mod stats;
pub mod template;

pub use crate::domain::model::{Bracket, GridTarget, Hero, HeroCatalog, HeroId, SortOrder};
pub use crate::domain::ports::{ConfigProvider, StatsSource, Storage};
pub use crate::utils::error::Result;
