pub mod client;
pub mod records;

pub use client::{ApiClient, EngagementApi};
pub use records::{EngagementRecord, TacticsRecord, UnitRecord};
