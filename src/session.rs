//! Engagement session: one player, one round at a time
//!
//! The session owns the REST client and the current `Round`. Network calls
//! (roster load, enemy tactics fetch, outcome submission) are awaited one at
//! a time; round transitions in between are synchronous.

use crate::api::client::EngagementApi;
use crate::core::config::EngineConfig;
use crate::core::error::{EngageError, Result};
use crate::core::types::{SectionId, UnitId};
use crate::engagement::math::{FactorSource, MathParams};
use crate::engagement::report::{report, HealthDelta, OutcomeContext, RoundOutcome};
use crate::engagement::round::{Phase, Round, RoundAction, UnitProfile};

/// Result of acknowledging a round summary
#[derive(Debug, Clone, PartialEq)]
pub enum ContinueOutcome {
    /// Both units still stand; a new round is waiting in Setup
    NextRound,
    /// Engagement over and reported. `submit_error` holds the transport or
    /// validation failure if the report could not be delivered.
    Ended {
        outcome: RoundOutcome,
        submit_error: Option<String>,
    },
}

pub struct EngagementSession<A: EngagementApi, F: FactorSource> {
    api: A,
    config: EngineConfig,
    factors: F,
    section: Option<SectionId>,
    friendly_units: Vec<UnitProfile>,
    enemy_units: Vec<UnitProfile>,
    round: Option<Round>,
}

impl<A: EngagementApi, F: FactorSource> EngagementSession<A, F> {
    pub fn new(api: A, config: EngineConfig, factors: F) -> Self {
        Self {
            api,
            config,
            factors,
            section: None,
            friendly_units: Vec::new(),
            enemy_units: Vec::new(),
            round: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn section(&self) -> Option<SectionId> {
        self.section
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn friendly_units(&self) -> &[UnitProfile] {
        &self.friendly_units
    }

    /// Opposing units with health remaining
    pub fn enemy_roster(&self) -> Vec<&UnitProfile> {
        self.enemy_units.iter().filter(|u| u.is_alive()).collect()
    }

    /// Fetch both rosters for a section. Discards any round in progress.
    pub async fn load_section(&mut self, section: SectionId) -> Result<()> {
        let friendly = self.api.friendly_units(section).await?;
        let enemy = self.api.enemy_units(section).await?;

        self.friendly_units = friendly.iter().map(|r| r.to_profile()).collect();
        self.enemy_units = enemy.iter().map(|r| r.to_profile()).collect();
        self.section = Some(section);
        self.round = None;

        tracing::info!(
            %section,
            friendly = self.friendly_units.len(),
            enemy = self.enemy_units.len(),
            "rosters loaded"
        );
        Ok(())
    }

    /// Open a round in Setup for one of our units
    pub fn open(&mut self, friendly_id: UnitId) -> Result<&Round> {
        let friendly = self
            .friendly_units
            .iter()
            .find(|u| u.id == friendly_id)
            .cloned()
            .ok_or(EngageError::UnknownUnit(friendly_id))?;

        let round = Round::new(
            friendly,
            self.enemy_units.clone(),
            self.config.first_strike_policy,
            MathParams::from(&self.config),
        )?;
        Ok(&*self.round.insert(round))
    }

    /// Select an opposing unit, fetching its preset tactics first
    pub async fn select_enemy(&mut self, enemy_id: UnitId) -> Result<&Round> {
        let round = self.round.as_ref().ok_or(EngageError::NoActiveRound)?;
        if round.phase() != Phase::Setup {
            return Err(EngageError::InvalidTransition {
                phase: round.phase().name(),
                action: "SelectEnemy",
            });
        }
        if !round.roster().iter().any(|u| u.id == enemy_id) {
            return Err(EngageError::UnknownUnit(enemy_id));
        }

        let tactics = self.api.unit_tactics(enemy_id).await?;
        self.act(RoundAction::SelectEnemy {
            unit_id: enemy_id,
            tactics,
        })
    }

    /// Apply a synchronous round action
    pub fn act(&mut self, action: RoundAction) -> Result<&Round> {
        let current = self.round.as_ref().ok_or(EngageError::NoActiveRound)?;
        let next = current.apply(action, &mut self.factors)?;
        Ok(&*self.round.insert(next))
    }

    /// Abandon the current round. Nothing is sent to the backend.
    pub fn exit(&mut self) {
        if let Some(round) = self.round.take() {
            tracing::info!(round = round.round_number(), phase = round.phase().name(), "round discarded");
        }
    }

    /// Acknowledge the summary: start the next round, or end and report.
    ///
    /// Health updates are applied to the cached rosters before reporting and
    /// are not rolled back if submission fails.
    pub async fn continue_round(&mut self) -> Result<ContinueOutcome> {
        let current = self.round.as_ref().ok_or(EngageError::NoActiveRound)?;
        let context = OutcomeContext {
            section_id: self.section,
        };
        let outcome = RoundOutcome::from_round(current, &context)?;
        let next = current.apply(RoundAction::Continue, &mut self.factors)?;

        record_health(&mut self.friendly_units, &outcome.friendly_health);
        record_health(&mut self.enemy_units, &outcome.enemy_health);

        if !next.is_finished() {
            self.round = Some(next);
            return Ok(ContinueOutcome::NextRound);
        }

        self.round = None;
        let submit_error = match report(&self.api, &outcome).await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(error = %e, "engagement outcome not persisted");
                Some(e.to_string())
            }
        };
        Ok(ContinueOutcome::Ended { outcome, submit_error })
    }
}

fn record_health(units: &mut [UnitProfile], delta: &HealthDelta) {
    for unit in units.iter_mut().filter(|u| u.id == delta.unit_id) {
        unit.health = delta.after;
    }
}
