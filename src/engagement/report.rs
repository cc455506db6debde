//! Outcome reporter: package a finished round for the AAR backend
//!
//! Health values are snapshots of what the backend told us at round start.
//! The outcome reports deltas; it never claims to own unit health.

use serde::{Deserialize, Serialize};

use crate::api::client::EngagementApi;
use crate::api::records::{EngagementRecord, TacticsRecord};
use crate::core::error::{EngageError, Result};
use crate::core::types::{SectionId, UnitId};
use crate::engagement::math::{EngagementData, FirstStrike};
use crate::engagement::round::{Phase, Round};
use crate::engagement::tactics::TacticsAnswers;

/// Who the round is reported for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutcomeContext {
    pub section_id: Option<SectionId>,
}

/// Health change of one unit over a round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthDelta {
    pub unit_id: UnitId,
    pub before: f64,
    pub after: f64,
}

impl HealthDelta {
    /// Health lost, floored at zero
    pub fn loss(&self) -> f64 {
        (self.before - self.after).max(0.0)
    }

    fn check(&self) -> Result<()> {
        if !(self.after >= 0.0 && self.after <= self.before) {
            return Err(EngageError::InvariantViolation(format!(
                "unit {} health went from {} to {}",
                self.unit_id, self.before, self.after
            )));
        }
        Ok(())
    }
}

/// Scored result of one round
#[derive(Debug, Clone, PartialEq)]
pub struct RoundOutcome {
    pub section_id: Option<SectionId>,
    pub round_number: u32,
    pub friendly_id: UnitId,
    pub enemy_id: UnitId,
    pub friendly: EngagementData,
    pub enemy: EngagementData,
    pub friendly_tactics: TacticsAnswers,
    pub enemy_tactics: TacticsAnswers,
    pub first_strike: Option<FirstStrike>,
    pub friendly_health: HealthDelta,
    pub enemy_health: HealthDelta,
}

impl RoundOutcome {
    /// Capture the outcome of a round sitting in Summary
    pub fn from_round(round: &Round, context: &OutcomeContext) -> Result<Self> {
        if round.phase() != Phase::Summary {
            return Err(EngageError::RoundIncomplete);
        }
        let friendly = round.friendly();
        let enemy = round.enemy().ok_or(EngageError::NoEnemySelected)?;

        if !friendly.data.satisfies_invariants(&enemy.data) || !enemy.data.satisfies_invariants(&friendly.data) {
            return Err(EngageError::InvariantViolation(format!(
                "round {} engagement data out of bounds",
                round.round_number()
            )));
        }

        let outcome = Self {
            section_id: context.section_id,
            round_number: round.round_number(),
            friendly_id: friendly.unit.id,
            enemy_id: enemy.unit.id,
            friendly: friendly.data,
            enemy: enemy.data,
            friendly_tactics: friendly.answers,
            enemy_tactics: enemy.answers,
            first_strike: round.first_strike(),
            friendly_health: HealthDelta {
                unit_id: friendly.unit.id,
                before: friendly.data.f_i,
                after: friendly.data.f_n,
            },
            enemy_health: HealthDelta {
                unit_id: enemy.unit.id,
                before: enemy.data.f_i,
                after: enemy.data.f_n,
            },
        };
        outcome.friendly_health.check()?;
        outcome.enemy_health.check()?;
        Ok(outcome)
    }

    /// Remaining health, rounded
    pub fn friendly_base_score(&self) -> u32 {
        self.friendly.f_n.round().max(0.0) as u32
    }

    pub fn enemy_base_score(&self) -> u32 {
        self.enemy.f_n.round().max(0.0) as u32
    }

    pub fn friendly_total_score(&self) -> u32 {
        self.friendly_base_score() + self.friendly_tactics.score()
    }

    pub fn enemy_total_score(&self) -> u32 {
        self.enemy_base_score() + self.enemy_tactics.score()
    }

    pub fn is_win(&self) -> bool {
        self.friendly_total_score() > self.enemy_total_score()
    }

    /// Build the `POST engagements` body, rejecting missing fields
    pub fn engagement_record(&self) -> Result<EngagementRecord> {
        let section_id = self.require_ids()?;
        Ok(EngagementRecord {
            section_id,
            friendly_id: self.friendly_id,
            enemy_id: self.enemy_id,
            friendly_base_score: self.friendly_base_score(),
            enemy_base_score: self.enemy_base_score(),
            friendly_tactics_score: self.friendly_tactics.score(),
            enemy_tactics_score: self.enemy_tactics.score(),
            friendly_total_score: self.friendly_total_score(),
            enemy_total_score: self.enemy_total_score(),
            is_win: self.is_win(),
        })
    }

    /// Build the `POST tactics` body, rejecting missing fields
    pub fn tactics_record(&self) -> Result<TacticsRecord> {
        let section_id = self.require_ids()?;
        Ok(TacticsRecord::new(
            section_id,
            self.friendly_id,
            self.enemy_id,
            &self.friendly_tactics,
            &self.enemy_tactics,
        ))
    }

    fn require_ids(&self) -> Result<SectionId> {
        let section_id = self.section_id.ok_or(EngageError::MissingField("SectionID"))?;
        if self.friendly_id.0 == 0 {
            return Err(EngageError::MissingField("FriendlyID"));
        }
        if self.enemy_id.0 == 0 {
            return Err(EngageError::MissingField("EnemyID"));
        }
        Ok(section_id)
    }
}

/// Submit the outcome and tactics records, in that order.
///
/// Both records are validated before any request is made. A transport
/// failure is logged and returned; the caller's round state stands.
pub async fn report<A: EngagementApi>(api: &A, outcome: &RoundOutcome) -> Result<()> {
    let engagement = outcome.engagement_record()?;
    let tactics = outcome.tactics_record()?;

    if let Err(e) = api.post_engagement(&engagement).await {
        tracing::error!(error = %e, friendly = %outcome.friendly_id, enemy = %outcome.enemy_id, "failed to submit engagement outcome");
        return Err(e);
    }
    if let Err(e) = api.post_tactics(&tactics).await {
        tracing::error!(error = %e, friendly = %outcome.friendly_id, enemy = %outcome.enemy_id, "failed to submit tactics answers");
        return Err(e);
    }

    tracing::info!(
        section = %engagement.section_id,
        friendly = %outcome.friendly_id,
        enemy = %outcome.enemy_id,
        friendly_total = engagement.friendly_total_score,
        enemy_total = engagement.enemy_total_score,
        win = engagement.is_win,
        "engagement outcome submitted"
    );
    Ok(())
}
