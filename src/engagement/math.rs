//! Engagement math: detection, hit, accuracy falloff and damage exchange
//!
//! All functions are pure apart from `resolve_exchange`, which draws one
//! random factor per side from an injected `FactorSource`.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::EngineConfig;
use crate::core::types::Side;
use crate::engagement::constants::{
    DIVISION_EPSILON, FIRST_STRIKE_FRACTION, RANDOM_FACTOR_MAX, RANDOM_FACTOR_MIN,
};
use crate::engagement::modifiers::ResolvedStats;

/// When the higher-detection side is granted a first strike
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FirstStrikePolicy {
    /// Every round of an engagement opens with a first-strike check
    #[default]
    EveryRound,
    /// Only the opening round of an engagement
    FirstRoundOnly,
}

impl FirstStrikePolicy {
    /// Whether a first strike is checked in the given 1-based round
    pub fn applies(&self, round_number: u32) -> bool {
        match self {
            FirstStrikePolicy::EveryRound => true,
            FirstStrikePolicy::FirstRoundOnly => round_number <= 1,
        }
    }
}

/// Source of the per-side damage random factor
pub trait FactorSource {
    fn next_factor(&mut self) -> f64;
}

/// Uniform draws from `[min, max]` on a seeded ChaCha stream
#[derive(Debug, Clone)]
pub struct SeededFactor {
    rng: ChaCha8Rng,
    min: f64,
    max: f64,
}

impl SeededFactor {
    pub fn new(seed: u64, min: f64, max: f64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            min,
            max,
        }
    }

    pub fn from_entropy(min: f64, max: f64) -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
            min,
            max,
        }
    }

    /// Build from config; seeded when the config carries a seed
    pub fn from_config(config: &EngineConfig) -> Self {
        match config.seed {
            Some(seed) => Self::new(seed, config.random_factor_min, config.random_factor_max),
            None => Self::from_entropy(config.random_factor_min, config.random_factor_max),
        }
    }
}

impl Default for SeededFactor {
    fn default() -> Self {
        Self::from_entropy(RANDOM_FACTOR_MIN, RANDOM_FACTOR_MAX)
    }
}

impl FactorSource for SeededFactor {
    fn next_factor(&mut self) -> f64 {
        // Empty, inverted or non-finite bands cannot be sampled
        if !(self.min.is_finite() && self.max.is_finite() && self.max > self.min) {
            return self.min;
        }
        self.rng.gen_range(self.min..=self.max)
    }
}

/// Always returns the same factor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedFactor(pub f64);

impl FactorSource for FixedFactor {
    fn next_factor(&mut self) -> f64 {
        self.0
    }
}

/// Tunables used by the damage exchange
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MathParams {
    pub epsilon: f64,
    pub first_strike_fraction: f64,
}

impl Default for MathParams {
    fn default() -> Self {
        Self {
            epsilon: DIVISION_EPSILON,
            first_strike_fraction: FIRST_STRIKE_FRACTION,
        }
    }
}

impl From<&EngineConfig> for MathParams {
    fn from(config: &EngineConfig) -> Self {
        Self {
            epsilon: config.epsilon,
            first_strike_fraction: config.first_strike_fraction,
        }
    }
}

/// Divisor with zero (or NaN) replaced by `epsilon`
pub fn safe_divisor(value: f64, epsilon: f64) -> f64 {
    if value > 0.0 {
        value
    } else {
        epsilon
    }
}

/// P = 1 - exp(-w*t / A)
pub fn detection_probability(w: f64, t: f64, a: f64, epsilon: f64) -> f64 {
    let p = 1.0 - (-(w * t) / safe_divisor(a, epsilon)).exp();
    p.clamp(0.0, 1.0)
}

/// Ph = 1 - exp(-r^2 / (2*sigma^2))
pub fn hit_probability(r: f64, sigma: f64, epsilon: f64) -> f64 {
    let sigma = safe_divisor(sigma, epsilon);
    let ph = 1.0 - (-(r * r) / (2.0 * sigma * sigma)).exp();
    ph.clamp(0.0, 1.0)
}

/// d_r = exp(-r^2 / (2*b^2))
pub fn accuracy_falloff(r: f64, b: f64, epsilon: f64) -> f64 {
    let b = safe_divisor(b, epsilon);
    (-(r * r) / (2.0 * b * b)).exp().clamp(0.0, 1.0)
}

/// Damage before the random factor: D_mi * Ph * d_r
pub fn expected_damage(d_mi: f64, ph: f64, d_r: f64) -> f64 {
    (d_mi * ph * d_r).max(0.0)
}

/// Per-side engagement record for one round
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EngagementData {
    pub w: f64,
    #[serde(rename = "A")]
    pub a: f64,
    pub t: f64,
    #[serde(rename = "P")]
    pub p: f64,
    pub r: f64,
    pub sigma: f64,
    #[serde(rename = "Ph")]
    pub ph: f64,
    pub b: f64,
    pub d_r: f64,
    pub d_mi: f64,
    /// Damage dealt to the opponent in the mutual exchange
    #[serde(rename = "D")]
    pub d: f64,
    /// Health at round start
    #[serde(rename = "Fi")]
    pub f_i: f64,
    /// Health at round end
    #[serde(rename = "Fn")]
    pub f_n: f64,
    /// Damage received from the opponent's first strike
    pub first_strike_taken: f64,
    pub random_factor: f64,
}

impl EngagementData {
    /// Zeroed record for a side entering a round with `health`
    pub fn neutral(health: f64) -> Self {
        let health = health.max(0.0);
        Self {
            f_i: health,
            f_n: health,
            ..Default::default()
        }
    }

    /// Copy the resolved stats that feed the math into this record
    pub fn load_stats(&mut self, stats: &ResolvedStats) {
        self.w = stats.w;
        self.a = stats.a;
        self.t = stats.t;
        self.r = stats.r;
        self.sigma = stats.v;
        self.b = stats.b;
        self.d_mi = stats.d_mi;
    }

    /// Health after the opponent's first strike
    pub fn health_after_first_strike(&self) -> f64 {
        (self.f_i - self.first_strike_taken).max(0.0)
    }

    /// Bounds every record must satisfy against its opponent
    pub fn satisfies_invariants(&self, opponent: &EngagementData) -> bool {
        let finite = [self.p, self.ph, self.d_r, self.d, self.f_i, self.f_n]
            .iter()
            .all(|v| v.is_finite());
        finite
            && (0.0..=1.0).contains(&self.p)
            && (0.0..=1.0).contains(&self.ph)
            && self.d >= 0.0
            && self.d <= opponent.f_i
            && self.f_n >= 0.0
            && self.f_n <= self.f_i
    }
}

/// Inputs one side brings to the damage exchange
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Combatant {
    pub p: f64,
    pub ph: f64,
    pub d_r: f64,
    pub d_mi: f64,
    pub health: f64,
}

impl Combatant {
    pub fn from_data(data: &EngagementData) -> Self {
        Self {
            p: data.p,
            ph: data.ph,
            d_r: data.d_r,
            d_mi: data.d_mi,
            health: data.f_i,
        }
    }
}

/// A preemptive one-sided hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FirstStrike {
    pub striker: Side,
    pub damage: f64,
}

/// Outcome of one side in the exchange
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SideExchange {
    pub initial_health: f64,
    pub first_strike_taken: f64,
    pub random_factor: f64,
    /// Damage dealt to the opponent in the mutual phase
    pub damage_dealt: f64,
    pub final_health: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExchangeResult {
    pub first_strike: Option<FirstStrike>,
    pub friendly: SideExchange,
    pub enemy: SideExchange,
}

/// Decide the first strike, if any. Equal detection gives none.
pub fn first_strike(
    friendly: &Combatant,
    enemy: &Combatant,
    fraction: f64,
) -> Option<FirstStrike> {
    let (striker, attacker, target) = if friendly.p > enemy.p {
        (Side::Friendly, friendly, enemy)
    } else if enemy.p > friendly.p {
        (Side::Enemy, enemy, friendly)
    } else {
        return None;
    };

    let raw = fraction * expected_damage(attacker.d_mi, attacker.ph, attacker.d_r);
    let damage = raw.min(target.health.max(0.0)).max(0.0);
    Some(FirstStrike { striker, damage })
}

/// First strike, then simultaneous mutual damage.
///
/// Both sides' mutual damage is computed from the same post-first-strike
/// snapshot. The friendly factor is drawn before the enemy factor.
pub fn resolve_exchange<F: FactorSource + ?Sized>(
    friendly: &Combatant,
    enemy: &Combatant,
    with_first_strike: bool,
    params: &MathParams,
    factors: &mut F,
) -> ExchangeResult {
    let strike = if with_first_strike {
        first_strike(friendly, enemy, params.first_strike_fraction)
    } else {
        None
    };

    let (friendly_taken, enemy_taken) = match strike {
        Some(FirstStrike { striker: Side::Friendly, damage }) => (0.0, damage),
        Some(FirstStrike { striker: Side::Enemy, damage }) => (damage, 0.0),
        None => (0.0, 0.0),
    };

    let friendly_snapshot = (friendly.health - friendly_taken).max(0.0);
    let enemy_snapshot = (enemy.health - enemy_taken).max(0.0);

    let friendly_factor = factors.next_factor();
    let enemy_factor = factors.next_factor();

    let friendly_damage = (expected_damage(friendly.d_mi, friendly.ph, friendly.d_r) * friendly_factor)
        .max(0.0)
        .min(enemy_snapshot);
    let enemy_damage = (expected_damage(enemy.d_mi, enemy.ph, enemy.d_r) * enemy_factor)
        .max(0.0)
        .min(friendly_snapshot);

    ExchangeResult {
        first_strike: strike,
        friendly: SideExchange {
            initial_health: friendly.health,
            first_strike_taken: friendly_taken,
            random_factor: friendly_factor,
            damage_dealt: friendly_damage,
            final_health: (friendly_snapshot - enemy_damage).max(0.0),
        },
        enemy: SideExchange {
            initial_health: enemy.health,
            first_strike_taken: enemy_taken,
            random_factor: enemy_factor,
            damage_dealt: enemy_damage,
            final_health: (enemy_snapshot - friendly_damage).max(0.0),
        },
    }
}
