pub mod app_config;
pub mod memory;
pub mod seed;
pub mod store;

pub use app_config::AppConfig;
pub use memory::Collection;
pub use seed::Seed;
pub use store::{Store, FEATURED_LIMIT};
