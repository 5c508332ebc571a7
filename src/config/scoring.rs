//! ESG score parameters.
//!
//! A pillar's raw score is `(total / base_unit) * multiplier`; the overall
//! score is the weighted sum of the four pillars, with weights in percent.

use serde::Deserialize;

use super::ConfigError;

/// Per-pillar scale factors applied after dividing by the base unit.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Multipliers {
    pub carbon: f64,
    pub water: f64,
    pub minerals: f64,
    pub social: f64,
}

impl Default for Multipliers {
    fn default() -> Self {
        Self {
            carbon: 10.0,
            water: 5.0,
            minerals: 8.0,
            social: 20.0,
        }
    }
}

impl Multipliers {
    fn pillars(&self) -> [(&'static str, f64); 4] {
        [
            ("carbon", self.carbon),
            ("water", self.water),
            ("minerals", self.minerals),
            ("social", self.social),
        ]
    }
}

/// Per-pillar weights in percent.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PillarWeights {
    pub carbon: f64,
    pub water: f64,
    pub minerals: f64,
    pub social: f64,
}

impl Default for PillarWeights {
    fn default() -> Self {
        Self {
            carbon: 40.0,
            water: 25.0,
            minerals: 20.0,
            social: 15.0,
        }
    }
}

impl PillarWeights {
    pub fn sum(&self) -> f64 {
        self.carbon + self.water + self.minerals + self.social
    }

    fn pillars(&self) -> [(&'static str, f64); 4] {
        [
            ("carbon", self.carbon),
            ("water", self.water),
            ("minerals", self.minerals),
            ("social", self.social),
        ]
    }
}

/// Amount of each impact total that counts as one unit.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct BaseUnits {
    pub carbon_kg: f64,
    pub water_liters: f64,
    pub minerals_kg: f64,
    pub families: f64,
}

impl Default for BaseUnits {
    fn default() -> Self {
        Self {
            carbon_kg: 10.0,
            water_liters: 1000.0,
            minerals_kg: 1.0,
            families: 1.0,
        }
    }
}

/// A named score band starting at `min_score`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TierConfig {
    pub name: String,
    pub min_score: i64,
}

impl TierConfig {
    fn new(name: &str, min_score: i64) -> Self {
        Self {
            name: name.to_string(),
            min_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub base_units: BaseUnits,
    pub multipliers: Multipliers,
    pub weights: PillarWeights,
    /// Ascending by `min_score`, first tier at 0.
    pub tiers: Vec<TierConfig>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_units: BaseUnits::default(),
            multipliers: Multipliers::default(),
            weights: PillarWeights::default(),
            tiers: vec![
                TierConfig::new("Explorer", 0),
                TierConfig::new("Contributor", 100),
                TierConfig::new("Steward", 300),
                TierConfig::new("Guardian", 750),
                TierConfig::new("Champion", 1500),
            ],
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let units = [
            ("carbon_kg", self.base_units.carbon_kg),
            ("water_liters", self.base_units.water_liters),
            ("minerals_kg", self.base_units.minerals_kg),
            ("families", self.base_units.families),
        ];
        for (name, value) in units {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(format!("base unit {name} must be positive")));
            }
        }

        for (name, value) in self.multipliers.pillars() {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(format!("multiplier {name} must not be negative")));
            }
        }

        for (name, value) in self.weights.pillars() {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(format!("weight {name} must not be negative")));
            }
        }
        if (self.weights.sum() - 100.0).abs() > 1e-6 {
            return Err(invalid(format!(
                "weights must sum to 100, got {}",
                self.weights.sum()
            )));
        }

        match self.tiers.first() {
            None => return Err(invalid("at least one tier is required".to_string())),
            Some(first) if first.min_score != 0 => {
                return Err(invalid("first tier must start at 0".to_string()))
            }
            Some(_) => {}
        }
        if self
            .tiers
            .windows(2)
            .any(|pair| pair[1].min_score <= pair[0].min_score)
        {
            return Err(invalid("tier thresholds must be strictly ascending".to_string()));
        }

        Ok(())
    }
}

fn invalid(message: String) -> ConfigError {
    ConfigError::InvalidScoring(message)
}
