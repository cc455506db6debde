pub mod config;
pub mod error;
pub mod types;

pub use config::{load_config, ApiConfig, EngineConfig};
pub use error::{EngageError, Result};
pub use types::{SectionId, Side, UnitId};
