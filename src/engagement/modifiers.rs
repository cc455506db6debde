//! Modifier pipeline: base stats -> resolved stats
//!
//! Adjustments run in a fixed order because several of them multiply the
//! same field:
//! role -> size -> posture -> mobility -> readiness -> skill -> situational.
//!
//! The situational step is split by phase (detection, engagement, accuracy)
//! so the round can apply each part when its answers are known. Each part
//! touches disjoint fields, so applying them piecewise gives the same
//! result as `resolve`.

use serde::{Deserialize, Serialize};

use crate::engagement::constants::FIXED_DETECTABLE_AREA;
use crate::engagement::unit_type::BaseStats;

/// Organisational role of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RoleType {
    #[default]
    Combat,
    Headquarters,
    Support,
    #[serde(rename = "Supply Materials")]
    SupplyMaterials,
    Facility,
}

/// Echelon of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UnitSize {
    #[serde(rename = "Squad/Team")]
    SquadTeam,
    Platoon,
    Company,
    #[default]
    Battalion,
    #[serde(rename = "Brigade/Regiment")]
    BrigadeRegiment,
    Division,
    Corps,
}

impl UnitSize {
    /// Scale applied to maximum inflictable damage. Battalion is the baseline.
    pub fn damage_factor(&self) -> f64 {
        match self {
            UnitSize::SquadTeam => 0.25,
            UnitSize::Platoon => 0.5,
            UnitSize::Company => 0.75,
            UnitSize::Battalion => 1.0,
            UnitSize::BrigadeRegiment => 1.25,
            UnitSize::Division => 1.5,
            UnitSize::Corps => 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ForcePosture {
    #[default]
    #[serde(rename = "Offensive Only")]
    OffensiveOnly,
    #[serde(rename = "Defensive Only")]
    DefensiveOnly,
    #[serde(rename = "Offensive and Defensive")]
    OffensiveAndDefensive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ForceMobility {
    Fixed,
    #[default]
    #[serde(rename = "Mobile (foot)")]
    MobileFoot,
    #[serde(rename = "Mobile (wheeled)")]
    MobileWheeled,
    #[serde(rename = "Mobile (track)")]
    MobileTrack,
    #[serde(rename = "Mobile (air)")]
    MobileAir,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ForceReadiness {
    Low,
    Medium,
    #[default]
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ForceSkill {
    Untrained,
    #[default]
    Basic,
    Advanced,
    Elite,
}

/// Yes/no tactical conditions for one side in one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SituationalFlags {
    #[serde(rename = "didISR")]
    pub did_isr: bool,
    pub comms_good: bool,
    #[serde(rename = "hasCAS")]
    pub has_cas: bool,
    pub gps_jammed: bool,
    pub defending_critical: bool,
    #[serde(rename = "targetInOuterSOI")]
    pub target_in_outer_soi: bool,
}

/// Per-side, per-round modifier input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UnitModifiers {
    pub role_type: RoleType,
    pub unit_size: UnitSize,
    pub force_posture: ForcePosture,
    pub force_mobility: ForceMobility,
    pub force_readiness: ForceReadiness,
    pub force_skill: ForceSkill,
    #[serde(flatten)]
    pub situational: SituationalFlags,
}

/// Base stats after modifiers. Never stored beyond a round.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResolvedStats {
    pub w: f64,
    pub a: f64,
    pub t: f64,
    pub r: f64,
    pub v: f64,
    pub rho: f64,
    pub b: f64,
    pub h: f64,
    pub d_mi: f64,
}

impl From<BaseStats> for ResolvedStats {
    fn from(base: BaseStats) -> Self {
        Self {
            w: base.w,
            a: base.a,
            t: base.t,
            r: base.r,
            v: base.v,
            rho: base.rho,
            b: base.b,
            h: base.h,
            d_mi: base.d_mi,
        }
    }
}

impl ResolvedStats {
    fn non_negative(self) -> Self {
        Self {
            w: self.w.max(0.0),
            a: self.a.max(0.0),
            t: self.t.max(0.0),
            r: self.r.max(0.0),
            v: self.v.max(0.0),
            rho: self.rho.max(0.0),
            b: self.b.max(0.0),
            h: self.h.max(0.0),
            d_mi: self.d_mi.max(0.0),
        }
    }
}

/// Steps 1-6: everything that depends only on the unit's categorical profile
pub fn apply_categorical(base: BaseStats, mods: &UnitModifiers) -> ResolvedStats {
    let mut s = ResolvedStats::from(base);

    match mods.role_type {
        RoleType::Headquarters => {
            s.a *= 0.5;
            s.w *= 1.25;
        }
        RoleType::Support => s.d_mi *= 0.5,
        RoleType::SupplyMaterials => s.d_mi = 0.0,
        RoleType::Facility => {
            s.w *= 1.3;
            s.a *= 0.75;
        }
        RoleType::Combat => {}
    }

    s.d_mi *= mods.unit_size.damage_factor();

    match mods.force_posture {
        ForcePosture::DefensiveOnly => s.d_mi *= 0.5,
        ForcePosture::OffensiveOnly | ForcePosture::OffensiveAndDefensive => {}
    }

    // Fixed sites present a known footprint: replaced, not scaled
    match mods.force_mobility {
        ForceMobility::Fixed => s.a = FIXED_DETECTABLE_AREA,
        ForceMobility::MobileFoot
        | ForceMobility::MobileWheeled
        | ForceMobility::MobileTrack
        | ForceMobility::MobileAir => {}
    }

    match mods.force_readiness {
        ForceReadiness::Low => {
            s.t *= 0.5;
            s.rho *= 0.5;
        }
        ForceReadiness::Medium => {
            s.t *= 0.85;
            s.rho *= 0.85;
        }
        ForceReadiness::High => {}
    }

    match mods.force_skill {
        ForceSkill::Untrained => s.d_mi *= 0.4,
        ForceSkill::Advanced => s.d_mi *= 1.15,
        ForceSkill::Elite => s.d_mi *= 1.25,
        ForceSkill::Basic => {}
    }

    s.non_negative()
}

/// Step 7a: ISR and comms both always apply, compounding on `t`
pub fn apply_detection(stats: ResolvedStats, flags: &SituationalFlags) -> ResolvedStats {
    let mut s = stats;
    s.t *= if flags.did_isr { 1.25 } else { 0.75 };
    s.t *= if flags.comms_good { 1.25 } else { 0.75 };
    s.non_negative()
}

/// Step 7b: air support, GPS and defended-asset conditions
pub fn apply_engagement(stats: ResolvedStats, flags: &SituationalFlags) -> ResolvedStats {
    let mut s = stats;
    if flags.has_cas {
        s.rho *= 1.1;
    }
    if flags.gps_jammed {
        s.rho *= 0.7;
    }
    if flags.defending_critical {
        s.r *= 1.25;
    }
    s.non_negative()
}

/// Step 7c: target at the outer edge of the sphere of influence
pub fn apply_accuracy(stats: ResolvedStats, flags: &SituationalFlags) -> ResolvedStats {
    let mut s = stats;
    if flags.target_in_outer_soi {
        s.b *= 0.75;
    }
    s.non_negative()
}

/// Step 7 in full
pub fn apply_situational(stats: ResolvedStats, flags: &SituationalFlags) -> ResolvedStats {
    apply_accuracy(apply_engagement(apply_detection(stats, flags), flags), flags)
}

/// Run the whole pipeline. Pure: identical inputs give identical output.
pub fn resolve(base: BaseStats, mods: &UnitModifiers) -> ResolvedStats {
    apply_situational(apply_categorical(base, mods), &mods.situational)
}
