//! Unit type catalog and base combat constants
//!
//! Each unit type maps to one fixed `BaseStats` record. Types that arrive
//! from the roster with a name outside the catalog become `UnitType::Other`
//! and resolve to the inert all-zero record.

use serde::{Deserialize, Serialize};

/// Type of unit, keyed by its catalog name on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    // Manoeuvre
    Infantry,
    #[serde(rename = "Light Infantry")]
    LightInfantry,
    #[serde(rename = "Mechanized Infantry")]
    MechanizedInfantry,
    #[serde(rename = "Armored Mechanized")]
    ArmoredMechanized,
    Armor,
    #[serde(rename = "Special Operations Forces")]
    SpecialOperationsForces,
    Sniper,

    // Fires and air
    #[serde(rename = "Field Artillery")]
    FieldArtillery,
    #[serde(rename = "Air Defense")]
    AirDefense,
    #[serde(rename = "Missile Defense")]
    MissileDefense,
    #[serde(rename = "Attack Aviation")]
    AttackAviation,
    #[serde(rename = "Unmanned Aerial Systems")]
    UnmannedAerialSystems,
    #[serde(rename = "Naval Surface")]
    NavalSurface,

    // Enablers
    Reconnaissance,
    #[serde(rename = "Combat Engineer")]
    CombatEngineer,
    Signal,
    #[serde(rename = "Electronic Warfare")]
    ElectronicWarfare,
    #[serde(rename = "Command and Control")]
    CommandAndControl,
    #[serde(rename = "Military Police")]
    MilitaryPolice,
    #[serde(rename = "CBRN")]
    Cbrn,

    // Sustainment
    Medical,
    Supply,
    Transportation,
    Maintenance,

    /// Anything not in the catalog
    #[serde(other)]
    Other,
}

/// Base combat constants for a unit type
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BaseStats {
    /// Field of view
    pub w: f64,
    /// Detectable area
    pub a: f64,
    /// Time available to detect
    pub t: f64,
    /// Detection radius
    pub r: f64,
    /// Accuracy constant (sigma)
    pub v: f64,
    /// Reserve coefficient, scaled by readiness and air/GPS conditions
    pub rho: f64,
    /// Engagement range
    pub b: f64,
    /// Default health
    pub h: f64,
    /// Maximum inflictable damage
    pub d_mi: f64,
}

impl BaseStats {
    /// The inert record: no detection, no damage
    pub const ZERO: BaseStats = BaseStats {
        w: 0.0,
        a: 0.0,
        t: 0.0,
        r: 0.0,
        v: 0.0,
        rho: 0.0,
        b: 0.0,
        h: 0.0,
        d_mi: 0.0,
    };

    #[allow(clippy::too_many_arguments)]
    const fn new(w: f64, a: f64, t: f64, r: f64, v: f64, rho: f64, b: f64, h: f64, d_mi: f64) -> Self {
        Self { w, a, t, r, v, rho, b, h, d_mi }
    }
}

impl UnitType {
    /// Every catalogued type, in display order
    pub const ALL: [UnitType; 24] = [
        UnitType::Infantry,
        UnitType::LightInfantry,
        UnitType::MechanizedInfantry,
        UnitType::ArmoredMechanized,
        UnitType::Armor,
        UnitType::SpecialOperationsForces,
        UnitType::Sniper,
        UnitType::FieldArtillery,
        UnitType::AirDefense,
        UnitType::MissileDefense,
        UnitType::AttackAviation,
        UnitType::UnmannedAerialSystems,
        UnitType::NavalSurface,
        UnitType::Reconnaissance,
        UnitType::CombatEngineer,
        UnitType::Signal,
        UnitType::ElectronicWarfare,
        UnitType::CommandAndControl,
        UnitType::MilitaryPolice,
        UnitType::Cbrn,
        UnitType::Medical,
        UnitType::Supply,
        UnitType::Transportation,
        UnitType::Maintenance,
    ];

    /// Base stats for this unit type
    pub fn base_stats(&self) -> BaseStats {
        //                            w      A     t     r     v    rho    b      H     D_mi
        match self {
            UnitType::Infantry => BaseStats::new(12.0, 45.0, 1.0, 8.0, 1.0, 0.5, 10.0, 100.0, 25.0),
            UnitType::LightInfantry => BaseStats::new(14.0, 40.0, 1.0, 7.0, 1.0, 0.5, 9.0, 80.0, 20.0),
            UnitType::MechanizedInfantry => BaseStats::new(11.0, 50.0, 1.0, 10.0, 1.2, 0.5, 12.0, 130.0, 35.0),
            UnitType::ArmoredMechanized => BaseStats::new(10.0, 60.0, 1.0, 12.0, 1.5, 0.6, 15.0, 150.0, 45.0),
            UnitType::Armor => BaseStats::new(9.0, 55.0, 1.0, 12.0, 1.2, 0.6, 14.0, 180.0, 50.0),
            UnitType::SpecialOperationsForces => BaseStats::new(16.0, 35.0, 1.3, 9.0, 0.8, 0.9, 11.0, 90.0, 40.0),
            UnitType::Sniper => BaseStats::new(16.0, 25.0, 1.2, 10.0, 0.6, 0.9, 14.0, 40.0, 30.0),
            UnitType::FieldArtillery => BaseStats::new(8.0, 70.0, 1.5, 25.0, 3.0, 0.5, 30.0, 90.0, 60.0),
            UnitType::AirDefense => BaseStats::new(20.0, 80.0, 1.2, 20.0, 2.0, 0.7, 25.0, 100.0, 35.0),
            UnitType::MissileDefense => BaseStats::new(20.0, 100.0, 1.2, 30.0, 3.0, 0.7, 35.0, 100.0, 45.0),
            UnitType::AttackAviation => BaseStats::new(18.0, 90.0, 0.8, 18.0, 2.0, 0.8, 20.0, 80.0, 55.0),
            UnitType::UnmannedAerialSystems => BaseStats::new(25.0, 70.0, 1.5, 15.0, 2.0, 0.7, 18.0, 50.0, 20.0),
            UnitType::NavalSurface => BaseStats::new(14.0, 120.0, 1.0, 25.0, 2.5, 0.6, 30.0, 200.0, 65.0),
            UnitType::Reconnaissance => BaseStats::new(22.0, 60.0, 1.5, 10.0, 1.5, 0.6, 12.0, 70.0, 10.0),
            UnitType::CombatEngineer => BaseStats::new(10.0, 40.0, 1.0, 6.0, 1.0, 0.4, 8.0, 100.0, 15.0),
            UnitType::Signal => BaseStats::new(6.0, 30.0, 0.8, 4.0, 1.0, 0.3, 5.0, 60.0, 5.0),
            UnitType::ElectronicWarfare => BaseStats::new(15.0, 50.0, 1.2, 15.0, 2.0, 0.6, 18.0, 60.0, 10.0),
            UnitType::CommandAndControl => BaseStats::new(12.0, 40.0, 1.0, 6.0, 1.0, 0.5, 8.0, 80.0, 8.0),
            UnitType::MilitaryPolice => BaseStats::new(10.0, 35.0, 1.0, 6.0, 1.0, 0.4, 7.0, 80.0, 12.0),
            UnitType::Cbrn => BaseStats::new(8.0, 40.0, 1.0, 5.0, 1.0, 0.4, 6.0, 70.0, 8.0),
            UnitType::Medical => BaseStats::new(5.0, 30.0, 0.5, 3.0, 1.0, 0.2, 4.0, 60.0, 0.0),
            UnitType::Supply => BaseStats::new(5.0, 40.0, 0.5, 3.0, 1.0, 0.2, 4.0, 70.0, 2.0),
            UnitType::Transportation => BaseStats::new(6.0, 45.0, 0.5, 4.0, 1.0, 0.2, 5.0, 70.0, 3.0),
            UnitType::Maintenance => BaseStats::new(5.0, 35.0, 0.5, 3.0, 1.0, 0.2, 4.0, 70.0, 2.0),
            UnitType::Other => BaseStats::ZERO,
        }
    }

    /// Catalog name as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            UnitType::Infantry => "Infantry",
            UnitType::LightInfantry => "Light Infantry",
            UnitType::MechanizedInfantry => "Mechanized Infantry",
            UnitType::ArmoredMechanized => "Armored Mechanized",
            UnitType::Armor => "Armor",
            UnitType::SpecialOperationsForces => "Special Operations Forces",
            UnitType::Sniper => "Sniper",
            UnitType::FieldArtillery => "Field Artillery",
            UnitType::AirDefense => "Air Defense",
            UnitType::MissileDefense => "Missile Defense",
            UnitType::AttackAviation => "Attack Aviation",
            UnitType::UnmannedAerialSystems => "Unmanned Aerial Systems",
            UnitType::NavalSurface => "Naval Surface",
            UnitType::Reconnaissance => "Reconnaissance",
            UnitType::CombatEngineer => "Combat Engineer",
            UnitType::Signal => "Signal",
            UnitType::ElectronicWarfare => "Electronic Warfare",
            UnitType::CommandAndControl => "Command and Control",
            UnitType::MilitaryPolice => "Military Police",
            UnitType::Cbrn => "CBRN",
            UnitType::Medical => "Medical",
            UnitType::Supply => "Supply",
            UnitType::Transportation => "Transportation",
            UnitType::Maintenance => "Maintenance",
            UnitType::Other => "Other",
        }
    }

    /// Parse a catalog name; anything unrecognised becomes `Other`
    pub fn from_name(name: &str) -> UnitType {
        UnitType::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(name.trim()))
            .unwrap_or(UnitType::Other)
    }
}

/// Look up base stats by unit type. Total: never fails.
pub fn lookup(unit_type: UnitType) -> BaseStats {
    unit_type.base_stats()
}

/// Look up base stats by catalog name. Unknown names yield the zero record.
pub fn lookup_name(name: &str) -> BaseStats {
    UnitType::from_name(name).base_stats()
}
