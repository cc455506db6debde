//! Engagement integration tests
//!
//! Full rounds driven through the state machine with a fixed random factor,
//! checked against hand-computed reference values.

use wargame_engagement::core::error::EngageError;
use wargame_engagement::core::types::{Side, UnitId};
use wargame_engagement::engagement::{
    FirstStrikePolicy, FixedFactor, ForceMobility, MathParams, OutcomeContext, Phase, RoleType,
    Round, RoundAction, RoundOutcome, TacticsAnswers, UnitProfile, UnitType,
};

const TOLERANCE: f64 = 1e-3;

fn infantry(id: u32) -> UnitProfile {
    UnitProfile::new(UnitId(id), format!("Infantry {}", id), UnitType::Infantry)
}

fn open(friendly: UnitProfile, enemy: UnitProfile, policy: FirstStrikePolicy) -> Round {
    Round::new(friendly, vec![enemy], policy, MathParams::default()).unwrap()
}

/// Select enemy 2 and play every phase with all answers "no"
fn play_round(round: Round, factors: &mut FixedFactor) -> Round {
    play_round_against(round, 2, factors)
}

fn play_round_against(round: Round, enemy_id: u32, factors: &mut FixedFactor) -> Round {
    let script = [
        RoundAction::SelectEnemy {
            unit_id: UnitId(enemy_id),
            tactics: TacticsAnswers::default(),
        },
        RoundAction::StartEngagement,
        RoundAction::Next,
        RoundAction::CalculateEngagement,
        RoundAction::Next,
        RoundAction::CalculateAccuracy,
        RoundAction::Next,
    ];
    script
        .into_iter()
        .fold(round, |round, action| round.apply(action, factors).unwrap())
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < TOLERANCE,
        "expected {}, got {}",
        expected,
        actual
    );
}

/// Infantry vs Infantry at baseline: both sides identical, no first strike
#[test]
fn test_infantry_mirror_match() {
    let round = play_round(open(infantry(1), infantry(2), FirstStrikePolicy::EveryRound), &mut FixedFactor(1.0));
    assert_eq!(round.phase(), Phase::Summary);

    let friendly = round.friendly().data;
    let enemy = round.enemy().unwrap().data;

    assert_close(friendly.t, 0.5625);
    assert_close(friendly.p, 0.1393);
    assert_close(friendly.ph, 1.0);
    assert_close(friendly.d_r, 0.7261);
    assert_close(friendly.d, 18.15);
    assert_close(friendly.f_n, 100.0 - 18.1536);

    assert_eq!(friendly.p, enemy.p);
    assert_eq!(friendly.d, enemy.d);
    assert_eq!(friendly.f_n, enemy.f_n);
    assert!(round.first_strike().is_none());
    assert_eq!(friendly.first_strike_taken, 0.0);
}

/// A supply unit carries no damage potential
#[test]
fn test_supply_unit_deals_no_damage() {
    let mut supply = infantry(1);
    supply.modifiers.role_type = RoleType::SupplyMaterials;

    let round = play_round(open(supply, infantry(2), FirstStrikePolicy::EveryRound), &mut FixedFactor(1.0));
    let friendly = round.friendly().data;
    let enemy = round.enemy().unwrap().data;

    assert_eq!(friendly.d_mi, 0.0);
    assert_eq!(friendly.d, 0.0);
    assert_eq!(enemy.f_n, enemy.f_i);
    assert!(friendly.f_n < friendly.f_i);
}

/// A fixed site has a known footprint, so it is far easier to detect with
/// and gains the first strike
#[test]
fn test_fixed_site_detection_and_first_strike() {
    let mut site = infantry(1);
    site.modifiers.force_mobility = ForceMobility::Fixed;

    let round = play_round(open(site, infantry(2), FirstStrikePolicy::EveryRound), &mut FixedFactor(1.0));
    let friendly = round.friendly().data;
    let enemy = round.enemy().unwrap().data;

    assert_eq!(friendly.a, 5.0);
    assert_close(friendly.p, 0.7408);
    assert!(friendly.p > enemy.p);

    let strike = round.first_strike().unwrap();
    assert_eq!(strike.striker, Side::Friendly);
    assert_close(strike.damage, 0.3 * 18.1536);
    assert_close(enemy.first_strike_taken, strike.damage);
    assert_close(enemy.f_n, 100.0 - strike.damage - 18.1536);
    assert_close(friendly.f_n, 100.0 - 18.1536);
}

/// Under first-round-only, later rounds skip the first strike
#[test]
fn test_first_round_only_policy() {
    let mut site = infantry(1);
    site.modifiers.force_mobility = ForceMobility::Fixed;
    let mut factors = FixedFactor(1.0);

    let first = play_round(open(site, infantry(2), FirstStrikePolicy::FirstRoundOnly), &mut factors);
    assert!(first.first_strike().is_some());

    let second = first.apply(RoundAction::Continue, &mut factors).unwrap();
    assert_eq!(second.round_number(), 2);
    let second = play_round(second, &mut factors);
    assert!(second.first_strike().is_none());
    assert_eq!(second.enemy().unwrap().data.first_strike_taken, 0.0);
}

/// Health only goes down across rounds, and the engagement ends at zero
#[test]
fn test_repeated_rounds_until_destroyed() {
    let mut factors = FixedFactor(1.0);
    let mut round = open(infantry(1), infantry(2), FirstStrikePolicy::EveryRound);
    let mut last_health = 100.0;
    let mut last_outcome = None;

    for _ in 0..20 {
        round = play_round(round, &mut factors);
        let outcome = RoundOutcome::from_round(&round, &OutcomeContext::default()).unwrap();
        assert!(outcome.friendly.f_n <= last_health);
        assert!(outcome.friendly.f_n >= 0.0);
        last_health = outcome.friendly.f_n;
        last_outcome = Some(outcome);

        round = round.apply(RoundAction::Continue, &mut factors).unwrap();
        if round.is_finished() {
            break;
        }
    }

    assert!(round.is_finished());
    let outcome = last_outcome.unwrap();
    // 18.15 per round: five full rounds, then the sixth finishes both
    assert_eq!(outcome.round_number, 6);
    assert_eq!(outcome.friendly.f_n, 0.0);
    assert_eq!(outcome.enemy.f_n, 0.0);
    assert!(!outcome.is_win());

    // Nothing but Exit is accepted once finished
    let result = round.apply(RoundAction::Next, &mut factors);
    assert!(matches!(result, Err(EngageError::InvalidTransition { .. })));

    // Our unit is gone too, so Exit leaves a closed round with nobody to fight
    let closed = round.apply(RoundAction::Exit, &mut factors).unwrap();
    assert!(closed.is_finished());
    assert_eq!(closed.phase(), Phase::Setup);
    assert!(closed.enemy().is_none());
    assert!(closed.roster().is_empty());
    assert!(!closed.can_start());
    assert!(closed.apply(RoundAction::Exit, &mut factors).is_ok());
}

/// A destroyed enemy stays out of the roster after the round is exited
#[test]
fn test_destroyed_enemy_not_offered_after_exit() {
    let mut factors = FixedFactor(1.0);
    let mut round = Round::new(
        infantry(1),
        vec![infantry(2), infantry(3)],
        FirstStrikePolicy::EveryRound,
        MathParams::default(),
    )
    .unwrap();

    for _ in 0..20 {
        round = [
            RoundAction::SelectEnemy {
                unit_id: UnitId(2),
                tactics: TacticsAnswers::default(),
            },
            RoundAction::StartEngagement,
            RoundAction::AnswerDetection {
                did_isr: true,
                comms_good: true,
            },
            RoundAction::Next,
            RoundAction::CalculateEngagement,
            RoundAction::Next,
            RoundAction::CalculateAccuracy,
            RoundAction::Next,
            RoundAction::Continue,
        ]
        .into_iter()
        .fold(round, |round, action| round.apply(action, &mut factors).unwrap());
        if round.is_finished() {
            break;
        }
    }
    assert!(round.is_finished());
    assert!(round.friendly().data.f_n > 0.0);

    let fresh = round.apply(RoundAction::Exit, &mut factors).unwrap();
    assert!(!fresh.is_finished());
    assert_eq!(fresh.round_number(), 1);
    assert!(fresh.roster().iter().all(|u| u.id != UnitId(2)));
    assert_eq!(fresh.roster().len(), 1);
    // The survivor carries its wounds into the next engagement
    assert!(fresh.friendly().unit.health < 100.0);
}

/// Under first-round-only, switching opponents starts a new engagement
#[test]
fn test_first_round_only_resets_for_new_opponent() {
    let mut site = infantry(1);
    site.modifiers.force_mobility = ForceMobility::Fixed;
    let mut factors = FixedFactor(1.0);

    let round = Round::new(
        site,
        vec![infantry(2), infantry(3)],
        FirstStrikePolicy::FirstRoundOnly,
        MathParams::default(),
    )
    .unwrap();
    let first = play_round_against(round, 2, &mut factors);
    assert!(first.first_strike().is_some());

    let next = first.apply(RoundAction::Continue, &mut factors).unwrap();
    assert_eq!(next.round_number(), 2);
    let fresh = play_round_against(next, 3, &mut factors);
    assert_eq!(fresh.engagement_round(), 1);
    let strike = fresh.first_strike().unwrap();
    assert_eq!(strike.striker, Side::Friendly);
}

/// Dead enemies are dropped from the roster at round start
#[test]
fn test_dead_units_are_not_selectable() {
    let mut dead = infantry(3);
    dead.health = 0.0;
    let round = Round::new(
        infantry(1),
        vec![infantry(2), dead],
        FirstStrikePolicy::EveryRound,
        MathParams::default(),
    )
    .unwrap();

    assert_eq!(round.roster().len(), 1);
    let result = round.apply(
        RoundAction::SelectEnemy {
            unit_id: UnitId(3),
            tactics: TacticsAnswers::default(),
        },
        &mut FixedFactor(1.0),
    );
    assert!(matches!(result, Err(EngageError::UnknownUnit(UnitId(3)))));
}

/// Changing an answer after calculating throws the calculation away
#[test]
fn test_answer_change_invalidates_accuracy() {
    let mut factors = FixedFactor(1.0);
    let round = play_round(open(infantry(1), infantry(2), FirstStrikePolicy::EveryRound), &mut factors);
    // Summary has no Back
    assert!(round.apply(RoundAction::Back, &mut factors).is_err());

    let round = open(infantry(1), infantry(2), FirstStrikePolicy::EveryRound);
    let script = [
        RoundAction::SelectEnemy {
            unit_id: UnitId(2),
            tactics: TacticsAnswers::default(),
        },
        RoundAction::StartEngagement,
        RoundAction::Next,
        RoundAction::CalculateEngagement,
        RoundAction::Next,
        RoundAction::CalculateAccuracy,
        RoundAction::AnswerAccuracy {
            target_in_outer_soi: true,
            fire: false,
        },
    ];
    let round = script
        .into_iter()
        .fold(round, |round, action| round.apply(action, &mut factors).unwrap());

    assert_eq!(round.friendly().data.d, 0.0);
    let result = round.apply(RoundAction::Next, &mut factors);
    assert!(matches!(result, Err(EngageError::CalculationPending("Accuracy"))));

    let round = round.apply(RoundAction::CalculateAccuracy, &mut factors).unwrap();
    // b shrinks to 7.5, so accuracy falls off faster
    assert!(round.friendly().data.d_r < 0.7261);
}

/// Preset enemy answers feed the enemy side's modifiers
#[test]
fn test_enemy_tactics_applied() {
    let tactics = TacticsAnswers {
        awareness: true,
        comms: true,
        ..Default::default()
    };
    let round = open(infantry(1), infantry(2), FirstStrikePolicy::EveryRound);
    let mut factors = FixedFactor(1.0);
    let round = [
        RoundAction::SelectEnemy {
            unit_id: UnitId(2),
            tactics,
        },
        RoundAction::StartEngagement,
        RoundAction::Next,
    ]
    .into_iter()
    .fold(round, |round, action| round.apply(action, &mut factors).unwrap());

    assert_close(round.enemy().unwrap().detected.t, 1.5625);
    assert_close(round.friendly().detected.t, 0.5625);
}
