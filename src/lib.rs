//! Wargame Engagement - Combat Engagement Resolution Engine

pub mod api;
pub mod core;
pub mod engagement;
pub mod session;
