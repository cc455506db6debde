//! Round state machine
//!
//! Setup -> Detection -> Engagement -> Accuracy -> Summary
//!
//! Transitions are pure: `Round::apply` takes the current round and an
//! action and returns the next round, leaving the input untouched. The only
//! outside dependency is the random factor source used when accuracy is
//! calculated.

use serde::{Deserialize, Serialize};

use crate::core::error::{EngageError, Result};
use crate::core::types::UnitId;
use crate::engagement::constants::PHASE_COUNT;
use crate::engagement::math::{
    accuracy_falloff, detection_probability, hit_probability, resolve_exchange, Combatant,
    EngagementData, FactorSource, FirstStrike, FirstStrikePolicy, MathParams,
};
use crate::engagement::modifiers::{
    apply_accuracy, apply_categorical, apply_detection, apply_engagement, ResolvedStats,
    UnitModifiers,
};
use crate::engagement::tactics::TacticsAnswers;
use crate::engagement::unit_type::{BaseStats, UnitType};

/// Round phases, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Setup,
    Detection,
    Engagement,
    Accuracy,
    Summary,
}

impl Phase {
    pub const ALL: [Phase; PHASE_COUNT] = [
        Phase::Setup,
        Phase::Detection,
        Phase::Engagement,
        Phase::Accuracy,
        Phase::Summary,
    ];

    pub fn index(&self) -> usize {
        match self {
            Phase::Setup => 0,
            Phase::Detection => 1,
            Phase::Engagement => 2,
            Phase::Accuracy => 3,
            Phase::Summary => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Phase> {
        Phase::ALL.get(index).copied()
    }

    pub fn next(&self) -> Option<Phase> {
        Phase::from_index(self.index() + 1)
    }

    pub fn prev(&self) -> Option<Phase> {
        self.index().checked_sub(1).and_then(Phase::from_index)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Setup => "Setup",
            Phase::Detection => "Detection",
            Phase::Engagement => "Engagement",
            Phase::Accuracy => "Accuracy",
            Phase::Summary => "Summary",
        }
    }
}

/// What the engine needs to know about a unit from the roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitProfile {
    pub id: UnitId,
    pub name: String,
    pub unit_type: UnitType,
    pub modifiers: UnitModifiers,
    pub health: f64,
}

impl UnitProfile {
    /// Profile at the unit type's default health with baseline modifiers
    pub fn new(id: UnitId, name: impl Into<String>, unit_type: UnitType) -> Self {
        Self {
            id,
            name: name.into(),
            unit_type,
            modifiers: UnitModifiers::default(),
            health: unit_type.base_stats().h,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn base_stats(&self) -> BaseStats {
        self.unit_type.base_stats()
    }
}

/// Player input driving the round
#[derive(Debug, Clone, PartialEq)]
pub enum RoundAction {
    /// Pick an opposing unit; its preset tactics come along with it
    SelectEnemy { unit_id: UnitId, tactics: TacticsAnswers },
    StartEngagement,
    AnswerDetection { did_isr: bool, comms_good: bool },
    AnswerEngagement {
        has_cas: bool,
        gps_jammed: bool,
        defending_critical: bool,
    },
    CalculateEngagement,
    AnswerAccuracy { target_in_outer_soi: bool, fire: bool },
    CalculateAccuracy,
    Next,
    Back,
    /// From Summary: next round, or end the engagement
    Continue,
    /// Abandon the round. Nothing is persisted.
    Exit,
}

impl RoundAction {
    pub fn name(&self) -> &'static str {
        match self {
            RoundAction::SelectEnemy { .. } => "SelectEnemy",
            RoundAction::StartEngagement => "StartEngagement",
            RoundAction::AnswerDetection { .. } => "AnswerDetection",
            RoundAction::AnswerEngagement { .. } => "AnswerEngagement",
            RoundAction::CalculateEngagement => "CalculateEngagement",
            RoundAction::AnswerAccuracy { .. } => "AnswerAccuracy",
            RoundAction::CalculateAccuracy => "CalculateAccuracy",
            RoundAction::Next => "Next",
            RoundAction::Back => "Back",
            RoundAction::Continue => "Continue",
            RoundAction::Exit => "Exit",
        }
    }
}

/// One side's working state for the current round
#[derive(Debug, Clone, PartialEq)]
pub struct SideState {
    pub unit: UnitProfile,
    pub answers: TacticsAnswers,
    /// After role/size/posture/mobility/readiness/skill
    pub categorical: ResolvedStats,
    /// After the detection answers; fixed once Detection is left
    pub detected: ResolvedStats,
    /// After the engagement answers
    pub engaged: ResolvedStats,
    pub data: EngagementData,
}

impl SideState {
    fn enter(unit: UnitProfile, answers: TacticsAnswers) -> Self {
        let categorical = apply_categorical(unit.base_stats(), &unit.modifiers);
        let data = EngagementData::neutral(unit.health);
        Self {
            unit,
            answers,
            categorical,
            detected: categorical,
            engaged: categorical,
            data,
        }
    }

    fn detect(&mut self) {
        self.detected = apply_detection(self.categorical, &self.answers.to_flags());
        self.engaged = self.detected;
        self.data = EngagementData::neutral(self.unit.health);
        self.data.load_stats(&self.detected);
    }

    fn engage(&mut self, params: &MathParams) {
        self.engaged = apply_engagement(self.detected, &self.answers.to_flags());
        let mut data = EngagementData::neutral(self.unit.health);
        data.load_stats(&self.engaged);
        data.p = detection_probability(data.w, data.t, data.a, params.epsilon);
        data.ph = hit_probability(data.r, data.sigma, params.epsilon);
        self.data = data;
    }

    fn aim(&mut self, params: &MathParams) {
        let stats = apply_accuracy(self.engaged, &self.answers.to_flags());
        self.data.load_stats(&stats);
        self.data.d_r = accuracy_falloff(self.data.r, self.data.b, params.epsilon);
    }

    fn clear_damage(&mut self) {
        self.data.d = 0.0;
        self.data.d_r = 0.0;
        self.data.first_strike_taken = 0.0;
        self.data.random_factor = 0.0;
        self.data.f_n = self.data.f_i;
    }
}

/// The mutable unit of engagement state, owned by one session
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    phase: Phase,
    round_number: u32,
    /// Rounds fought against the current opponent, 1-based
    engagement_round: u32,
    in_engagement: bool,
    finished: bool,
    policy: FirstStrikePolicy,
    params: MathParams,
    roster: Vec<UnitProfile>,
    friendly: SideState,
    enemy: Option<SideState>,
    first_strike: Option<FirstStrike>,
    engagement_calculated: bool,
    accuracy_calculated: bool,
}

impl Round {
    /// Open a round in Setup. Units without health are dropped from the roster.
    pub fn new(
        friendly: UnitProfile,
        enemy_roster: Vec<UnitProfile>,
        policy: FirstStrikePolicy,
        params: MathParams,
    ) -> Result<Self> {
        if !friendly.is_alive() {
            return Err(EngageError::UnitOutOfAction(friendly.id));
        }

        let roster: Vec<UnitProfile> = enemy_roster.into_iter().filter(UnitProfile::is_alive).collect();
        if roster.is_empty() {
            return Err(EngageError::EmptyRoster);
        }

        Ok(Self {
            phase: Phase::Setup,
            round_number: 1,
            engagement_round: 1,
            in_engagement: false,
            finished: false,
            policy,
            params,
            roster,
            friendly: SideState::enter(friendly, TacticsAnswers::default()),
            enemy: None,
            first_strike: None,
            engagement_calculated: false,
            accuracy_calculated: false,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn phase_index(&self) -> usize {
        self.phase.index()
    }

    /// 1-based, increases with every completed round of the engagement
    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    /// Round number within the current pairing; resets when a different
    /// opponent is selected
    pub fn engagement_round(&self) -> u32 {
        self.engagement_round
    }

    pub fn in_engagement(&self) -> bool {
        self.in_engagement
    }

    /// Either side reached zero health and the summary was acknowledged, or
    /// the round was closed because nothing is left to fight. Only Exit is
    /// accepted.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn policy(&self) -> FirstStrikePolicy {
        self.policy
    }

    /// Opposing units still able to fight
    pub fn roster(&self) -> &[UnitProfile] {
        &self.roster
    }

    pub fn friendly(&self) -> &SideState {
        &self.friendly
    }

    pub fn enemy(&self) -> Option<&SideState> {
        self.enemy.as_ref()
    }

    pub fn first_strike(&self) -> Option<FirstStrike> {
        self.first_strike
    }

    pub fn can_start(&self) -> bool {
        self.phase == Phase::Setup && self.enemy.is_some() && !self.finished
    }

    /// Apply an action, returning the next round state
    pub fn apply<F: FactorSource + ?Sized>(&self, action: RoundAction, factors: &mut F) -> Result<Round> {
        if matches!(action, RoundAction::Exit) {
            tracing::debug!(round = self.round_number, phase = self.phase.name(), "round abandoned");
            let mut friendly = self.friendly.unit.clone();
            if self.finished {
                friendly.health = self.friendly.data.f_n;
            }
            return match Round::new(friendly.clone(), self.roster.clone(), self.policy, self.params) {
                Ok(round) => Ok(round),
                Err(e) => {
                    tracing::debug!(error = %e, "nothing left to engage, round closed");
                    Ok(self.closed(friendly))
                }
            };
        }

        if self.finished {
            return Err(self.invalid(&action));
        }

        let mut next = self.clone();
        next.step(action, factors)?;
        Ok(next)
    }

    /// A finished round in Setup with no opponent, for when a fresh round
    /// cannot be opened
    fn closed(&self, friendly: UnitProfile) -> Round {
        Round {
            phase: Phase::Setup,
            round_number: 1,
            engagement_round: 1,
            in_engagement: false,
            finished: true,
            policy: self.policy,
            params: self.params,
            roster: self.roster.iter().filter(|u| u.is_alive()).cloned().collect(),
            friendly: SideState::enter(friendly, TacticsAnswers::default()),
            enemy: None,
            first_strike: None,
            engagement_calculated: false,
            accuracy_calculated: false,
        }
    }

    fn invalid(&self, action: &RoundAction) -> EngageError {
        EngageError::InvalidTransition {
            phase: self.phase.name(),
            action: action.name(),
        }
    }

    fn enemy_mut(&mut self) -> Result<&mut SideState> {
        self.enemy.as_mut().ok_or(EngageError::NoEnemySelected)
    }

    fn step<F: FactorSource + ?Sized>(&mut self, action: RoundAction, factors: &mut F) -> Result<()> {
        match (self.phase, action) {
            (Phase::Setup, RoundAction::SelectEnemy { unit_id, tactics }) => {
                let unit = self
                    .roster
                    .iter()
                    .find(|u| u.id == unit_id)
                    .cloned()
                    .ok_or(EngageError::UnknownUnit(unit_id))?;
                tracing::debug!(enemy = %unit.id, unit_type = unit.unit_type.name(), "enemy selected");
                if self.enemy.as_ref().map(|e| e.unit.id) != Some(unit_id) {
                    self.engagement_round = 1;
                }
                self.enemy = Some(SideState::enter(unit, tactics));
                self.friendly = SideState::enter(self.friendly.unit.clone(), self.friendly.answers);
            }

            (Phase::Setup, RoundAction::StartEngagement | RoundAction::Next) => {
                if self.enemy.is_none() {
                    return Err(EngageError::NoEnemySelected);
                }
                self.in_engagement = true;
                self.move_to(Phase::Detection);
            }

            (Phase::Detection, RoundAction::AnswerDetection { did_isr, comms_good }) => {
                self.friendly.answers.awareness = did_isr;
                self.friendly.answers.comms = comms_good;
            }

            (Phase::Detection, RoundAction::Next) => {
                self.friendly.detect();
                self.enemy_mut()?.detect();
                self.engagement_calculated = false;
                self.move_to(Phase::Engagement);
            }

            (Phase::Detection, RoundAction::Back) => {
                self.in_engagement = false;
                self.move_to(Phase::Setup);
            }

            (
                Phase::Engagement,
                RoundAction::AnswerEngagement {
                    has_cas,
                    gps_jammed,
                    defending_critical,
                },
            ) => {
                self.friendly.answers.coverage = has_cas;
                self.friendly.answers.gps = gps_jammed;
                self.friendly.answers.logistics = defending_critical;
                self.engagement_calculated = false;
            }

            (Phase::Engagement, RoundAction::CalculateEngagement) => {
                let params = self.params;
                self.friendly.engage(&params);
                self.enemy_mut()?.engage(&params);
                self.engagement_calculated = true;
                tracing::debug!(
                    friendly_p = self.friendly.data.p,
                    friendly_ph = self.friendly.data.ph,
                    "engagement calculated"
                );
            }

            (Phase::Engagement, RoundAction::Next) => {
                if !self.engagement_calculated {
                    return Err(EngageError::CalculationPending("Engagement"));
                }
                self.accuracy_calculated = false;
                self.move_to(Phase::Accuracy);
            }

            (Phase::Engagement, RoundAction::Back) => {
                self.engagement_calculated = false;
                self.move_to(Phase::Detection);
            }

            (
                Phase::Accuracy,
                RoundAction::AnswerAccuracy {
                    target_in_outer_soi,
                    fire,
                },
            ) => {
                self.friendly.answers.pattern = target_in_outer_soi;
                self.friendly.answers.fire = fire;
                self.reset_accuracy();
            }

            (Phase::Accuracy, RoundAction::CalculateAccuracy) => {
                self.calculate_accuracy(factors)?;
            }

            (Phase::Accuracy, RoundAction::Next) => {
                if !self.accuracy_calculated {
                    return Err(EngageError::CalculationPending("Accuracy"));
                }
                self.move_to(Phase::Summary);
            }

            (Phase::Accuracy, RoundAction::Back) => {
                self.reset_accuracy();
                self.move_to(Phase::Engagement);
            }

            (Phase::Summary, RoundAction::Continue) => {
                self.conclude()?;
            }

            (_, action) => return Err(self.invalid(&action)),
        }

        Ok(())
    }

    fn move_to(&mut self, phase: Phase) {
        tracing::debug!(round = self.round_number, from = self.phase.name(), to = phase.name(), "phase transition");
        self.phase = phase;
    }

    fn reset_accuracy(&mut self) {
        self.accuracy_calculated = false;
        self.first_strike = None;
        self.friendly.clear_damage();
        if let Some(enemy) = self.enemy.as_mut() {
            enemy.clear_damage();
        }
    }

    fn calculate_accuracy<F: FactorSource + ?Sized>(&mut self, factors: &mut F) -> Result<()> {
        let params = self.params;
        let with_first_strike = self.policy.applies(self.engagement_round);

        self.friendly.aim(&params);
        let enemy = self.enemy.as_mut().ok_or(EngageError::NoEnemySelected)?;
        enemy.aim(&params);

        let result = resolve_exchange(
            &Combatant::from_data(&self.friendly.data),
            &Combatant::from_data(&enemy.data),
            with_first_strike,
            &params,
            factors,
        );

        for (side, exchange) in [(&mut self.friendly, result.friendly), (enemy, result.enemy)] {
            side.data.first_strike_taken = exchange.first_strike_taken;
            side.data.random_factor = exchange.random_factor;
            side.data.d = exchange.damage_dealt;
            side.data.f_n = exchange.final_health;
        }

        if let Some(strike) = result.first_strike {
            tracing::debug!(striker = ?strike.striker, damage = strike.damage, "first strike");
        }
        tracing::debug!(
            round = self.round_number,
            friendly_damage = result.friendly.damage_dealt,
            enemy_damage = result.enemy.damage_dealt,
            "damage exchanged"
        );

        self.first_strike = result.first_strike;
        self.accuracy_calculated = true;
        Ok(())
    }

    fn conclude(&mut self) -> Result<()> {
        let enemy = self.enemy.as_ref().ok_or(EngageError::NoEnemySelected)?;
        let friendly_health = self.friendly.data.f_n;
        let enemy_health = enemy.data.f_n;
        let enemy_id = enemy.unit.id;
        let enemy_tactics = enemy.answers;

        for unit in self.roster.iter_mut().filter(|u| u.id == enemy_id) {
            unit.health = enemy_health;
        }

        if friendly_health <= 0.0 || enemy_health <= 0.0 {
            tracing::info!(round = self.round_number, friendly_health, enemy_health, "engagement ended");
            self.finished = true;
            self.in_engagement = false;
            return Ok(());
        }

        let mut friendly_unit = self.friendly.unit.clone();
        friendly_unit.health = friendly_health;
        self.friendly = SideState::enter(friendly_unit, TacticsAnswers::default());

        let mut enemy_unit = enemy.unit.clone();
        enemy_unit.health = enemy_health;
        self.enemy = Some(SideState::enter(enemy_unit, enemy_tactics));

        self.round_number += 1;
        self.engagement_round += 1;
        self.in_engagement = false;
        self.first_strike = None;
        self.engagement_calculated = false;
        self.accuracy_calculated = false;
        self.move_to(Phase::Setup);
        Ok(())
    }
}
