//! Combat engagement resolution engine
//!
//! Base stats -> modifier pipeline -> engagement math, driven by the round
//! state machine, with finished rounds handed to the outcome reporter.

pub mod constants;
pub mod math;
pub mod modifiers;
pub mod report;
pub mod round;
pub mod tactics;
pub mod unit_type;

// Re-exports for convenient access
pub use constants::*;
pub use math::{
    accuracy_falloff, detection_probability, expected_damage, first_strike, hit_probability,
    resolve_exchange, safe_divisor, Combatant, EngagementData, ExchangeResult, FactorSource,
    FirstStrike, FirstStrikePolicy, FixedFactor, MathParams, SeededFactor, SideExchange,
};
pub use modifiers::{
    apply_accuracy, apply_categorical, apply_detection, apply_engagement, apply_situational,
    resolve, ForceMobility, ForcePosture, ForceReadiness, ForceSkill, ResolvedStats, RoleType,
    SituationalFlags, UnitModifiers, UnitSize,
};
pub use report::{report, HealthDelta, OutcomeContext, RoundOutcome};
pub use round::{Phase, Round, RoundAction, SideState, UnitProfile};
pub use tactics::TacticsAnswers;
pub use unit_type::{lookup, lookup_name, BaseStats, UnitType};
