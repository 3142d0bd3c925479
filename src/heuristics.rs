use std::fmt;
use std::sync::Arc;

use crate::model::PlayerStats;

pub const ELO_CONDITION: &str = "elo";
pub const KDR_CONDITION: &str = "k/d";
pub const FLAWLESS_CONDITION: &str = "flawless";

type Predicate = Box<dyn Fn(&[Arc<PlayerStats>]) -> bool + Send + Sync>;

/// A named, pure check over the opposing roster of one match.
pub struct CarryCondition {
    name: &'static str,
    predicate: Predicate,
}

impl CarryCondition {
    pub fn new(
        name: &'static str,
        predicate: impl Fn(&[Arc<PlayerStats>]) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            predicate: Box::new(predicate),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn check(&self, roster: &[Arc<PlayerStats>]) -> bool {
        (self.predicate)(roster)
    }
}

impl fmt::Debug for CarryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CarryCondition")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicThresholds {
    pub elo_spread: f64,
    pub kdr_spread: f64,
    pub flawless_low: u32,
    pub flawless_high: u32,
}

impl Default for HeuristicThresholds {
    fn default() -> Self {
        Self {
            elo_spread: 500.0,
            kdr_spread: 1.0,
            flawless_low: 5,
            flawless_high: 20,
        }
    }
}

/// Ordered set of carry conditions. Every condition sees the whole roster and
/// is judged on its own; combining the results is up to the caller.
#[derive(Debug)]
pub struct CarryHeuristicEngine {
    conditions: Vec<CarryCondition>,
}

impl Default for CarryHeuristicEngine {
    fn default() -> Self {
        Self::with_thresholds(HeuristicThresholds::default())
    }
}

impl CarryHeuristicEngine {
    pub fn empty() -> Self {
        Self {
            conditions: Vec::new(),
        }
    }

    pub fn with_thresholds(t: HeuristicThresholds) -> Self {
        let mut engine = Self::empty();
        engine
            .register(CarryCondition::new(ELO_CONDITION, move |roster| {
                elo_spread(roster).is_some_and(|spread| spread >= t.elo_spread)
            }))
            .register(CarryCondition::new(KDR_CONDITION, move |roster| {
                kdr_spread(roster).is_some_and(|spread| spread >= t.kdr_spread)
            }))
            .register(CarryCondition::new(FLAWLESS_CONDITION, move |roster| {
                flawless_mix(roster, t.flawless_low, t.flawless_high)
            }));
        engine
    }

    /// Adds `condition`, replacing any registered condition with the same name.
    pub fn register(&mut self, condition: CarryCondition) -> &mut Self {
        match self
            .conditions
            .iter_mut()
            .find(|existing| existing.name == condition.name)
        {
            Some(existing) => *existing = condition,
            None => self.conditions.push(condition),
        }
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.conditions.iter().map(CarryCondition::name).collect()
    }

    /// Names of the triggered conditions, in registration order.
    pub fn evaluate(&self, roster: &[Arc<PlayerStats>]) -> Vec<&'static str> {
        self.conditions
            .iter()
            .filter(|condition| condition.check(roster))
            .map(CarryCondition::name)
            .collect()
    }
}

/// ELO spread across players with a usable skill rating; `None` below two.
pub fn elo_spread(roster: &[Arc<PlayerStats>]) -> Option<f64> {
    spread(
        roster
            .iter()
            .filter(|p| p.skill_source.is_ok())
            .map(|p| p.elo),
    )
}

/// KDR spread across players with a defined ratio; `None` below two.
pub fn kdr_spread(roster: &[Arc<PlayerStats>]) -> Option<f64> {
    spread(
        roster
            .iter()
            .filter(|p| p.skill_source.is_ok())
            .filter_map(|p| p.kdr),
    )
}

pub fn flawless_mix(roster: &[Arc<PlayerStats>], low: u32, high: u32) -> bool {
    let mut has_low = false;
    let mut has_high = false;
    for player in roster.iter().filter(|p| p.trials_source.is_ok()) {
        has_low |= player.flawless <= low;
        has_high |= player.flawless >= high;
    }
    has_low && has_high
}

fn spread(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut count = 0usize;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for value in values.filter(|v| v.is_finite()) {
        count += 1;
        min = min.min(value);
        max = max.max(value);
    }
    (count >= 2).then(|| max - min)
}

#[cfg(test)]
mod tests {
    use super::spread;

    #[test]
    fn spread_ignores_non_finite_values() {
        assert_eq!(spread([1.0, f64::NAN, 3.5].into_iter()), Some(2.5));
        assert_eq!(spread([f64::INFINITY, 2.0].into_iter()), None);
        assert_eq!(spread(std::iter::empty()), None);
    }
}
