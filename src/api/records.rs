//! Wire records exchanged with the unit hierarchy / AAR backend
//!
//! Field names are the stable contract and must not change.

use serde::{Deserialize, Serialize};

use crate::core::types::{SectionId, UnitId};
use crate::engagement::modifiers::{
    ForceMobility, ForcePosture, ForceReadiness, ForceSkill, RoleType, UnitModifiers, UnitSize,
};
use crate::engagement::round::UnitProfile;
use crate::engagement::tactics::TacticsAnswers;
use crate::engagement::unit_type::UnitType;

/// One unit as returned by the roster endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRecord {
    #[serde(rename = "ID", alias = "id")]
    pub id: UnitId,
    #[serde(rename = "Name", alias = "name", default)]
    pub name: String,
    #[serde(rename = "UnitType", alias = "unitType")]
    pub unit_type: UnitType,
    #[serde(rename = "RoleType", alias = "roleType", default)]
    pub role_type: RoleType,
    #[serde(rename = "UnitSize", alias = "unitSize", default)]
    pub unit_size: UnitSize,
    #[serde(rename = "ForcePosture", alias = "forcePosture", default)]
    pub force_posture: ForcePosture,
    #[serde(rename = "ForceMobility", alias = "forceMobility", default)]
    pub force_mobility: ForceMobility,
    #[serde(rename = "ForceReadiness", alias = "forceReadiness", default)]
    pub force_readiness: ForceReadiness,
    #[serde(rename = "ForceSkill", alias = "forceSkill", default)]
    pub force_skill: ForceSkill,
    /// Missing health means the unit type's default
    #[serde(rename = "Health", alias = "health", default)]
    pub health: Option<f64>,
}

impl UnitRecord {
    pub fn to_profile(&self) -> UnitProfile {
        UnitProfile {
            id: self.id,
            name: self.name.clone(),
            unit_type: self.unit_type,
            modifiers: UnitModifiers {
                role_type: self.role_type,
                unit_size: self.unit_size,
                force_posture: self.force_posture,
                force_mobility: self.force_mobility,
                force_readiness: self.force_readiness,
                force_skill: self.force_skill,
                situational: Default::default(),
            },
            health: self
                .health
                .unwrap_or_else(|| self.unit_type.base_stats().h)
                .max(0.0),
        }
    }
}

/// Round outcome, `POST engagements`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementRecord {
    #[serde(rename = "SectionID")]
    pub section_id: SectionId,
    #[serde(rename = "FriendlyID")]
    pub friendly_id: UnitId,
    #[serde(rename = "EnemyID")]
    pub enemy_id: UnitId,
    #[serde(rename = "FriendlyBaseScore")]
    pub friendly_base_score: u32,
    #[serde(rename = "EnemyBaseScore")]
    pub enemy_base_score: u32,
    #[serde(rename = "FriendlyTacticsScore")]
    pub friendly_tactics_score: u32,
    #[serde(rename = "EnemyTacticsScore")]
    pub enemy_tactics_score: u32,
    #[serde(rename = "FriendlyTotalScore")]
    pub friendly_total_score: u32,
    #[serde(rename = "EnemyTotalScore")]
    pub enemy_total_score: u32,
    #[serde(rename = "isWin")]
    pub is_win: bool,
}

/// The 14 yes/no answers behind a round's score, `POST tactics`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TacticsRecord {
    #[serde(rename = "SectionID")]
    pub section_id: SectionId,
    #[serde(rename = "FriendlyID")]
    pub friendly_id: UnitId,
    #[serde(rename = "EnemyID")]
    pub enemy_id: UnitId,
    #[serde(rename = "FriendlyAwareness")]
    pub friendly_awareness: bool,
    #[serde(rename = "FriendlyLogistics")]
    pub friendly_logistics: bool,
    #[serde(rename = "FriendlyCoverage")]
    pub friendly_coverage: bool,
    #[serde(rename = "FriendlyGPS")]
    pub friendly_gps: bool,
    #[serde(rename = "FriendlyComms")]
    pub friendly_comms: bool,
    #[serde(rename = "FriendlyFire")]
    pub friendly_fire: bool,
    #[serde(rename = "FriendlyPattern")]
    pub friendly_pattern: bool,
    #[serde(rename = "EnemyAwareness")]
    pub enemy_awareness: bool,
    #[serde(rename = "EnemyLogistics")]
    pub enemy_logistics: bool,
    #[serde(rename = "EnemyCoverage")]
    pub enemy_coverage: bool,
    #[serde(rename = "EnemyGPS")]
    pub enemy_gps: bool,
    #[serde(rename = "EnemyComms")]
    pub enemy_comms: bool,
    #[serde(rename = "EnemyFire")]
    pub enemy_fire: bool,
    #[serde(rename = "EnemyPattern")]
    pub enemy_pattern: bool,
}

impl TacticsRecord {
    pub fn new(
        section_id: SectionId,
        friendly_id: UnitId,
        enemy_id: UnitId,
        friendly: &TacticsAnswers,
        enemy: &TacticsAnswers,
    ) -> Self {
        Self {
            section_id,
            friendly_id,
            enemy_id,
            friendly_awareness: friendly.awareness,
            friendly_logistics: friendly.logistics,
            friendly_coverage: friendly.coverage,
            friendly_gps: friendly.gps,
            friendly_comms: friendly.comms,
            friendly_fire: friendly.fire,
            friendly_pattern: friendly.pattern,
            enemy_awareness: enemy.awareness,
            enemy_logistics: enemy.logistics,
            enemy_coverage: enemy.coverage,
            enemy_gps: enemy.gps,
            enemy_comms: enemy.comms,
            enemy_fire: enemy.fire,
            enemy_pattern: enemy.pattern,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_record_defaults() {
        let json = r#"{"ID": 5, "Name": "1st Bn", "UnitType": "Armor"}"#;
        let record: UnitRecord = serde_json::from_str(json).unwrap();
        let profile = record.to_profile();
        assert_eq!(profile.id, UnitId(5));
        assert_eq!(profile.health, 180.0);
        assert_eq!(profile.modifiers, UnitModifiers::default());
    }

    #[test]
    fn test_unit_record_full_profile() {
        let json = r#"{
            "id": 9, "name": "HQ", "unitType": "Command and Control",
            "roleType": "Headquarters", "unitSize": "Company",
            "forcePosture": "Defensive Only", "forceMobility": "Fixed",
            "forceReadiness": "Medium", "forceSkill": "Elite", "health": 42.5
        }"#;
        let record: UnitRecord = serde_json::from_str(json).unwrap();
        let profile = record.to_profile();
        assert_eq!(profile.unit_type, UnitType::CommandAndControl);
        assert_eq!(profile.modifiers.role_type, RoleType::Headquarters);
        assert_eq!(profile.modifiers.force_mobility, ForceMobility::Fixed);
        assert_eq!(profile.health, 42.5);
    }

    #[test]
    fn test_unknown_unit_type_is_inert() {
        let json = r#"{"ID": 1, "UnitType": "Hovercraft", "Health": 10}"#;
        let record: UnitRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.unit_type, UnitType::Other);
    }

    #[test]
    fn test_engagement_record_field_names() {
        let record = EngagementRecord {
            section_id: SectionId(3),
            friendly_id: UnitId(1),
            enemy_id: UnitId(2),
            friendly_base_score: 80,
            enemy_base_score: 0,
            friendly_tactics_score: 4,
            enemy_tactics_score: 2,
            friendly_total_score: 84,
            enemy_total_score: 2,
            is_win: true,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["SectionID"], 3);
        assert_eq!(json["FriendlyTotalScore"], 84);
        assert_eq!(json["isWin"], true);
    }

    #[test]
    fn test_tactics_record_has_fourteen_answers() {
        let record = TacticsRecord::new(
            SectionId(1),
            UnitId(1),
            UnitId(2),
            &TacticsAnswers::default(),
            &TacticsAnswers {
                gps: true,
                ..Default::default()
            },
        );
        let json = serde_json::to_value(&record).unwrap();
        let answers = json
            .as_object()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with("Friendly") || k.starts_with("Enemy"))
            .filter(|k| !k.ends_with("ID"))
            .count();
        assert_eq!(answers, 14);
        assert_eq!(json["EnemyGPS"], true);
        assert_eq!(json["FriendlyGPS"], false);
    }
}
