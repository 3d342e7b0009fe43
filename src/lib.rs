pub mod config;
pub mod error;
pub mod global;
pub mod properties;
pub mod resource;
pub mod store;

pub use error::ConfigError;
pub use global::{get, LoadSource, LoadStatus};
pub use resource::Resources;
pub use store::ConfigStore;
