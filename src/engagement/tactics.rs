//! Tactics answers: the seven yes/no questions each side answers per round
//!
//! The enemy side's answers are preset on the unit and fetched; the friendly
//! side's answers are given by the player as the round progresses.

use serde::{Deserialize, Deserializer, Serialize};

use crate::engagement::modifiers::SituationalFlags;

/// One side's answers. On the wire each answer is 0/1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TacticsAnswers {
    /// ISR was performed on the opponent
    #[serde(deserialize_with = "flag", serialize_with = "as_int")]
    pub awareness: bool,
    /// Defending a critical asset or supply node
    #[serde(deserialize_with = "flag", serialize_with = "as_int")]
    pub logistics: bool,
    /// Close air support available
    #[serde(deserialize_with = "flag", serialize_with = "as_int")]
    pub coverage: bool,
    /// GPS is being jammed
    #[serde(deserialize_with = "flag", serialize_with = "as_int")]
    pub gps: bool,
    /// Communications are good
    #[serde(deserialize_with = "flag", serialize_with = "as_int")]
    pub comms: bool,
    /// Fires coordinated against a manoeuvring target. Scored only.
    #[serde(deserialize_with = "flag", serialize_with = "as_int")]
    pub fire: bool,
    /// Target sits in the outer sphere of influence
    #[serde(deserialize_with = "flag", serialize_with = "as_int")]
    pub pattern: bool,
}

impl TacticsAnswers {
    pub fn from_flags(flags: &SituationalFlags, fire: bool) -> Self {
        Self {
            awareness: flags.did_isr,
            logistics: flags.defending_critical,
            coverage: flags.has_cas,
            gps: flags.gps_jammed,
            comms: flags.comms_good,
            fire,
            pattern: flags.target_in_outer_soi,
        }
    }

    pub fn to_flags(&self) -> SituationalFlags {
        SituationalFlags {
            did_isr: self.awareness,
            comms_good: self.comms,
            has_cas: self.coverage,
            gps_jammed: self.gps,
            defending_critical: self.logistics,
            target_in_outer_soi: self.pattern,
        }
    }

    /// Count of favourable answers. A jammed GPS is the one unfavourable "yes".
    pub fn score(&self) -> u32 {
        [
            self.awareness,
            self.logistics,
            self.coverage,
            !self.gps,
            self.comms,
            self.fire,
            self.pattern,
        ]
        .iter()
        .filter(|&&favourable| favourable)
        .count() as u32
    }
}

/// Accept 0/1 numbers, booleans, or "0"/"1" strings
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
        Float(f64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Bool(b) => b,
        Raw::Int(i) => i != 0,
        Raw::Float(f) => f != 0.0,
        Raw::Text(s) => matches!(s.trim(), "1" | "true" | "yes" | "Yes"),
    })
}

fn as_int<S: serde::Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}
