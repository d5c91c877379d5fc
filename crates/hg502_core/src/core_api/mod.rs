mod engine;
mod error;
pub mod facets;
mod item_catalog;
mod types;

pub use engine::{
    Engine, FoundItems, MAX_SOCKET_DEPTH, SocketDepthExceeded, UserCollection, calc_percentage,
    common_stat, load_user_items, remaining_ids,
};
pub use error::{CoreError, CoreErrorCode};
pub use item_catalog::{ItemCatalog, SET_ITEMS_TABLE, UNIQUE_ITEMS_TABLE};
pub use types::{ItemCategory, Progress, StatBlock, TotalStat};
