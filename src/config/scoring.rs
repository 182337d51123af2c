use serde::{Deserialize, Serialize};

/// Scoring configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Normalized value assigned to every row when a source column is
    /// constant (min == max). Applied before the memory inversion.
    pub constant_column_value: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            constant_column_value: 0.0,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.constant_column_value) {
            anyhow::bail!(
                "constant_column_value must be in range [0.0, 1.0], got {}",
                self.constant_column_value
            );
        }
        Ok(())
    }
}
