//! Session integration tests
//!
//! An in-memory backend stands in for the REST API so the full flow of
//! load -> open -> select -> phases -> continue -> report can be checked,
//! including what is (and is not) sent over the wire.

use std::sync::Mutex;

use wargame_engagement::api::{EngagementApi, EngagementRecord, TacticsRecord, UnitRecord};
use wargame_engagement::core::config::EngineConfig;
use wargame_engagement::core::error::{EngageError, Result};
use wargame_engagement::core::types::{SectionId, UnitId};
use wargame_engagement::engagement::{
    report, FirstStrikePolicy, FixedFactor, MathParams, OutcomeContext, Phase, Round, RoundAction,
    RoundOutcome, TacticsAnswers,
};
use wargame_engagement::session::{ContinueOutcome, EngagementSession};

#[derive(Default)]
struct FakeBackend {
    friendly: Vec<UnitRecord>,
    enemy: Vec<UnitRecord>,
    tactics: TacticsAnswers,
    fail_posts: bool,
    engagements: Mutex<Vec<EngagementRecord>>,
    tactics_posts: Mutex<Vec<TacticsRecord>>,
    tactics_fetches: Mutex<Vec<UnitId>>,
}

impl FakeBackend {
    fn with_rosters() -> Self {
        Self {
            friendly: vec![unit(1, "1st Rifles", 100.0)],
            enemy: vec![unit(7, "Red Rifles", 100.0), unit(8, "Red Reserve", 0.0)],
            ..Default::default()
        }
    }
}

fn unit(id: u32, name: &str, health: f64) -> UnitRecord {
    let json = format!(
        r#"{{"ID": {}, "Name": "{}", "UnitType": "Infantry", "Health": {}}}"#,
        id, name, health
    );
    serde_json::from_str(&json).unwrap()
}

impl EngagementApi for FakeBackend {
    async fn friendly_units(&self, _section: SectionId) -> Result<Vec<UnitRecord>> {
        Ok(self.friendly.clone())
    }

    async fn enemy_units(&self, _section: SectionId) -> Result<Vec<UnitRecord>> {
        Ok(self.enemy.clone())
    }

    async fn unit_tactics(&self, unit: UnitId) -> Result<TacticsAnswers> {
        self.tactics_fetches.lock().unwrap().push(unit);
        Ok(self.tactics)
    }

    async fn post_engagement(&self, record: &EngagementRecord) -> Result<()> {
        if self.fail_posts {
            return Err(EngageError::Transport("connection refused".into()));
        }
        self.engagements.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn post_tactics(&self, record: &TacticsRecord) -> Result<()> {
        if self.fail_posts {
            return Err(EngageError::Transport("connection refused".into()));
        }
        self.tactics_posts.lock().unwrap().push(record.clone());
        Ok(())
    }
}

type Session = EngagementSession<FakeBackend, FixedFactor>;

fn session(backend: FakeBackend) -> Session {
    EngagementSession::new(backend, EngineConfig::default(), FixedFactor(1.0))
}

async fn play_to_summary(session: &mut Session) {
    session.select_enemy(UnitId(7)).await.unwrap();
    for action in [
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
    ] {
        session.act(action).unwrap();
    }
    assert_eq!(session.round().unwrap().phase(), Phase::Summary);
}

async fn play_to_end(session: &mut Session) -> ContinueOutcome {
    for _ in 0..20 {
        play_to_summary(session).await;
        match session.continue_round().await.unwrap() {
            ContinueOutcome::NextRound => continue,
            ended => return ended,
        }
    }
    panic!("engagement never ended");
}

#[tokio::test]
async fn test_load_section_filters_dead_enemies() {
    let mut session = session(FakeBackend::with_rosters());
    session.load_section(SectionId(3)).await.unwrap();

    assert_eq!(session.section(), Some(SectionId(3)));
    assert_eq!(session.friendly_units().len(), 1);
    let roster = session.enemy_roster();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].id, UnitId(7));
}

#[tokio::test]
async fn test_select_fetches_enemy_tactics() {
    let mut backend = FakeBackend::with_rosters();
    backend.tactics = TacticsAnswers {
        awareness: true,
        gps: true,
        ..Default::default()
    };
    let mut session = session(backend);
    session.load_section(SectionId(3)).await.unwrap();
    session.open(UnitId(1)).unwrap();

    let round = session.select_enemy(UnitId(7)).await.unwrap();
    assert!(round.can_start());
    assert!(round.enemy().unwrap().answers.gps);
    assert_eq!(*session.api().tactics_fetches.lock().unwrap(), vec![UnitId(7)]);
}

#[tokio::test]
async fn test_select_outside_setup_makes_no_request() {
    let mut session = session(FakeBackend::with_rosters());
    session.load_section(SectionId(3)).await.unwrap();
    session.open(UnitId(1)).unwrap();
    session.select_enemy(UnitId(7)).await.unwrap();
    session.act(RoundAction::StartEngagement).unwrap();

    let result = session.select_enemy(UnitId(7)).await;
    assert!(matches!(result, Err(EngageError::InvalidTransition { .. })));
    assert_eq!(session.api().tactics_fetches.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_act_without_round() {
    let mut session = session(FakeBackend::with_rosters());
    let result = session.act(RoundAction::Next);
    assert!(matches!(result, Err(EngageError::NoActiveRound)));
}

#[tokio::test]
async fn test_unknown_friendly_cannot_open() {
    let mut session = session(FakeBackend::with_rosters());
    session.load_section(SectionId(3)).await.unwrap();
    assert!(matches!(session.open(UnitId(99)), Err(EngageError::UnknownUnit(UnitId(99)))));
}

#[tokio::test]
async fn test_intermediate_rounds_are_not_reported() {
    let mut session = session(FakeBackend::with_rosters());
    session.load_section(SectionId(3)).await.unwrap();
    session.open(UnitId(1)).unwrap();

    play_to_summary(&mut session).await;
    let outcome = session.continue_round().await.unwrap();

    assert_eq!(outcome, ContinueOutcome::NextRound);
    assert_eq!(session.round().unwrap().round_number(), 2);
    assert!(session.api().engagements.lock().unwrap().is_empty());
    assert!(session.api().tactics_posts.lock().unwrap().is_empty());

    // The cached rosters follow the round
    assert!(session.friendly_units()[0].health < 100.0);
    assert!(session.enemy_roster()[0].health < 100.0);
}

#[tokio::test]
async fn test_finished_engagement_is_reported_once() {
    let mut session = session(FakeBackend::with_rosters());
    session.load_section(SectionId(3)).await.unwrap();
    session.open(UnitId(1)).unwrap();

    let ContinueOutcome::Ended { outcome, submit_error } = play_to_end(&mut session).await else {
        unreachable!()
    };
    assert!(submit_error.is_none());
    assert!(session.round().is_none());

    let engagements = session.api().engagements.lock().unwrap();
    assert_eq!(engagements.len(), 1);
    let record = &engagements[0];
    assert_eq!(record.section_id, SectionId(3));
    assert_eq!(record.friendly_id, UnitId(1));
    assert_eq!(record.enemy_id, UnitId(7));
    assert_eq!(record.friendly_total_score, outcome.friendly_total_score());
    assert_eq!(record.is_win, outcome.is_win());

    let tactics = session.api().tactics_posts.lock().unwrap();
    assert_eq!(tactics.len(), 1);
    assert_eq!(tactics[0].enemy_id, UnitId(7));
}

#[tokio::test]
async fn test_detection_answers_decide_the_duel() {
    // Our side answered yes to ISR and comms every round, the enemy did not,
    // so we strike first each round and win.
    let mut session = session(FakeBackend::with_rosters());
    session.load_section(SectionId(3)).await.unwrap();
    session.open(UnitId(1)).unwrap();

    let ContinueOutcome::Ended { outcome, .. } = play_to_end(&mut session).await else {
        unreachable!()
    };
    assert_eq!(outcome.enemy.f_n, 0.0);
    assert!(outcome.friendly.f_n > 0.0);
    assert!(outcome.is_win());
    assert!(session.enemy_roster().is_empty());
}

#[tokio::test]
async fn test_transport_failure_keeps_health() {
    let mut backend = FakeBackend::with_rosters();
    backend.fail_posts = true;
    let mut session = session(backend);
    session.load_section(SectionId(3)).await.unwrap();
    session.open(UnitId(1)).unwrap();

    let ContinueOutcome::Ended { submit_error, .. } = play_to_end(&mut session).await else {
        unreachable!()
    };
    assert!(submit_error.unwrap().contains("connection refused"));
    // No rollback: the destroyed enemy stays destroyed locally
    assert!(session.enemy_roster().is_empty());
}

#[tokio::test]
async fn test_missing_fields_block_any_request() {
    let mut backend = FakeBackend::with_rosters();
    backend.friendly = vec![unit(0, "Unnumbered", 100.0)];
    let mut session = session(backend);
    session.load_section(SectionId(3)).await.unwrap();
    session.open(UnitId(0)).unwrap();

    let ContinueOutcome::Ended { submit_error, .. } = play_to_end(&mut session).await else {
        unreachable!()
    };
    assert!(submit_error.unwrap().contains("FriendlyID"));
    assert!(session.api().engagements.lock().unwrap().is_empty());
    assert!(session.api().tactics_posts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_report_without_section_sends_nothing() {
    let backend = FakeBackend::with_rosters();
    let friendly = backend.friendly[0].to_profile();
    let enemy = backend.enemy[0].to_profile();
    let mut factors = FixedFactor(1.0);

    let mut round = Round::new(friendly, vec![enemy], FirstStrikePolicy::EveryRound, MathParams::default()).unwrap();
    for action in [
        RoundAction::SelectEnemy {
            unit_id: UnitId(7),
            tactics: TacticsAnswers::default(),
        },
        RoundAction::StartEngagement,
        RoundAction::Next,
        RoundAction::CalculateEngagement,
        RoundAction::Next,
        RoundAction::CalculateAccuracy,
        RoundAction::Next,
    ] {
        round = round.apply(action, &mut factors).unwrap();
    }

    let outcome = RoundOutcome::from_round(&round, &OutcomeContext::default()).unwrap();
    let result = report(&backend, &outcome).await;
    assert!(matches!(result, Err(EngageError::MissingField("SectionID"))));
    assert!(backend.engagements.lock().unwrap().is_empty());
    assert!(backend.tactics_posts.lock().unwrap().is_empty());
}
