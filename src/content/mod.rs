pub mod catalog;
pub mod loader;
pub mod shuffle;
pub mod types;

pub use catalog::Catalog;
pub use loader::{load_catalog, load_table, parse_table, table_paths};
pub use shuffle::{draw_from_pool, shuffle_choices};
pub use types::{Answer, Badge, Choice, ContentTable, Family, GameRules, LevelEntry, TableMeta};
