//! Cross-city temperature statistics

use serde::{Deserialize, Serialize};

use crate::models::ObservationSet;

/// Mean and population standard deviation of the observed temperatures
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    /// Arithmetic mean in Celsius
    pub mean: f64,
    /// Population standard deviation in Celsius
    pub std_dev: f64,
}

impl SummaryStatistics {
    /// Lower edge of the ±1 standard deviation band
    #[must_use]
    pub fn lower(&self) -> f64 {
        self.mean - self.std_dev
    }

    /// Upper edge of the ±1 standard deviation band
    #[must_use]
    pub fn upper(&self) -> f64 {
        self.mean + self.std_dev
    }
}

/// Summarize the temperatures of an observation set.
///
/// An empty set yields zero for both values and a single observation has no
/// spread. Neither is chartable.
#[must_use]
pub fn summarize(observations: &ObservationSet) -> SummaryStatistics {
    summarize_temperatures(&observations.temperatures())
}

#[must_use]
pub fn summarize_temperatures(temperatures: &[f64]) -> SummaryStatistics {
    if temperatures.is_empty() {
        return SummaryStatistics {
            mean: 0.0,
            std_dev: 0.0,
        };
    }

    let count = temperatures.len() as f64;
    let mean = temperatures.iter().sum::<f64>() / count;
    let variance = temperatures
        .iter()
        .map(|t| {
            let delta = t - mean;
            delta * delta
        })
        .sum::<f64>()
        / count;

    SummaryStatistics {
        mean,
        std_dev: variance.sqrt(),
    }
}
