//! ESG score computation.
//!
//! Pure function of a user's summed impact and the scoring parameters; no
//! state is kept between requests.

use serde::Serialize;

use crate::config::ScoringConfig;
use crate::models::ImpactTotals;

/// Sub-score per pillar before weighting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PillarScores {
    pub carbon: f64,
    pub water: f64,
    pub minerals: f64,
    pub social: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EsgScore {
    pub totals: ImpactTotals,
    pub pillars: PillarScores,
    pub total_score: i64,
    pub tier: String,
    pub next_tier: Option<String>,
    /// Points still needed for `next_tier`; `None` at the top tier.
    pub points_to_next_tier: Option<i64>,
}

/// `(total / base_unit) * multiplier`, clamping negative totals to zero.
fn pillar(total: f64, base_unit: f64, multiplier: f64) -> f64 {
    if !total.is_finite() || total <= 0.0 {
        return 0.0;
    }
    total / base_unit * multiplier
}

pub fn pillar_scores(totals: &ImpactTotals, config: &ScoringConfig) -> PillarScores {
    let units = &config.base_units;
    let mult = &config.multipliers;
    PillarScores {
        carbon: pillar(totals.carbon_kg, units.carbon_kg, mult.carbon),
        water: pillar(totals.water_liters, units.water_liters, mult.water),
        minerals: pillar(totals.minerals_kg, units.minerals_kg, mult.minerals),
        social: pillar(totals.families_helped as f64, units.families, mult.social),
    }
}

/// Weighted sum of the pillars, rounded half away from zero.
pub fn weighted_total(pillars: &PillarScores, config: &ScoringConfig) -> i64 {
    let w = &config.weights;
    let sum = pillars.carbon * w.carbon
        + pillars.water * w.water
        + pillars.minerals * w.minerals
        + pillars.social * w.social;
    (sum / 100.0).round() as i64
}

/// Index of the highest tier whose threshold the score reaches.
fn tier_index(score: i64, config: &ScoringConfig) -> usize {
    config
        .tiers
        .iter()
        .rposition(|t| t.min_score <= score)
        .unwrap_or(0)
}

pub fn compute_score(totals: ImpactTotals, config: &ScoringConfig) -> EsgScore {
    let pillars = pillar_scores(&totals, config);
    let total_score = weighted_total(&pillars, config);

    let idx = tier_index(total_score, config);
    let tier = config
        .tiers
        .get(idx)
        .map(|t| t.name.clone())
        .unwrap_or_default();
    let next = config.tiers.get(idx + 1);

    EsgScore {
        totals,
        pillars,
        total_score,
        tier,
        next_tier: next.map(|t| t.name.clone()),
        points_to_next_tier: next.map(|t| t.min_score - total_score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(carbon: f64, water: f64, minerals: f64, families: i64) -> ImpactTotals {
        ImpactTotals {
            carbon_kg: carbon,
            water_liters: water,
            minerals_kg: minerals,
            families_helped: families,
        }
    }

    #[test]
    fn test_zero_impact_is_first_tier() {
        let score = compute_score(ImpactTotals::default(), &ScoringConfig::default());
        assert_eq!(score.total_score, 0);
        assert_eq!(score.tier, "Explorer");
        assert_eq!(score.next_tier.as_deref(), Some("Contributor"));
        assert_eq!(score.points_to_next_tier, Some(100));
    }

    #[test]
    fn test_known_values() {
        // carbon 100/10*10 = 100, water 2000/1000*5 = 10,
        // minerals 5/1*8 = 40, social 3/1*20 = 60
        // total = (100*40 + 10*25 + 40*20 + 60*15) / 100 = 59.5 -> 60
        let score = compute_score(totals(100.0, 2000.0, 5.0, 3), &ScoringConfig::default());
        assert_eq!(score.pillars.carbon, 100.0);
        assert_eq!(score.pillars.water, 10.0);
        assert_eq!(score.pillars.minerals, 40.0);
        assert_eq!(score.pillars.social, 60.0);
        assert_eq!(score.total_score, 60);
        assert_eq!(score.tier, "Explorer");
        assert_eq!(score.points_to_next_tier, Some(40));
    }

    #[test]
    fn test_total_is_rounded_weighted_sum() {
        let config = ScoringConfig::default();
        for t in [
            totals(12.3, 456.0, 0.7, 1),
            totals(999.0, 123_456.0, 42.0, 17),
            totals(0.4, 0.0, 0.0, 0),
        ] {
            let score = compute_score(t, &config);
            let p = score.pillars;
            let expected = (p.carbon * 0.40 + p.water * 0.25 + p.minerals * 0.20 + p.social * 0.15)
                .round() as i64;
            assert_eq!(score.total_score, expected);
        }
    }

    #[test]
    fn test_monotonic_per_pillar() {
        let config = ScoringConfig::default();
        let base = compute_score(totals(50.0, 5000.0, 5.0, 2), &config).total_score;
        for bumped in [
            totals(500.0, 5000.0, 5.0, 2),
            totals(50.0, 50_000.0, 5.0, 2),
            totals(50.0, 5000.0, 50.0, 2),
            totals(50.0, 5000.0, 5.0, 20),
        ] {
            assert!(compute_score(bumped, &config).total_score >= base);
        }
    }

    #[test]
    fn test_tier_boundaries() {
        let config = ScoringConfig::default();
        // social only: families * 20 * 0.15 = families * 3
        let at = |families| compute_score(totals(0.0, 0.0, 0.0, families), &config);
        assert_eq!(at(33).total_score, 99);
        assert_eq!(at(33).tier, "Explorer");
        assert_eq!(at(34).tier, "Contributor");
        assert_eq!(at(100).total_score, 300);
        assert_eq!(at(100).tier, "Steward");

        let top = at(1000);
        assert_eq!(top.tier, "Champion");
        assert_eq!(top.next_tier, None);
        assert_eq!(top.points_to_next_tier, None);
    }

    #[test]
    fn test_negative_totals_clamped() {
        let score = compute_score(totals(-100.0, -1.0, -5.0, -3), &ScoringConfig::default());
        assert_eq!(score.total_score, 0);
        assert_eq!(score.pillars.social, 0.0);
    }

    #[test]
    fn test_custom_weights() {
        let mut config = ScoringConfig::default();
        config.weights.carbon = 100.0;
        config.weights.water = 0.0;
        config.weights.minerals = 0.0;
        config.weights.social = 0.0;
        let score = compute_score(totals(25.0, 1e9, 1e9, 1000), &config);
        assert_eq!(score.total_score, 25);
    }
}
