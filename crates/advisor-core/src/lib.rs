pub mod assistant;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod selection;
pub mod storage;
pub mod types;

pub use assistant::AssistantClient;
pub use catalog::CatalogLoader;
pub use config::AppConfig;
pub use error::AdvisorError;
pub use filter::{filter_products, FilterState};
pub use selection::{SelectionChange, SelectionStore};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
pub use types::{Product, ProductId, Sender, Transcript};
