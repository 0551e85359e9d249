//! Ordered collection of successfully fetched observations

use serde::{Deserialize, Serialize};

use super::WeatherObservation;

/// Observations in the order the user entered the cities.
///
/// Only successful lookups are ever inserted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObservationSet {
    observations: Vec<WeatherObservation>,
}

impl ObservationSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, observation: WeatherObservation) {
        self.observations.push(observation);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// A comparative chart needs at least two cities
    #[must_use]
    pub fn is_chartable(&self) -> bool {
        self.observations.len() >= 2
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WeatherObservation> {
        self.observations.iter()
    }

    /// City names in input order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.observations.iter().map(|o| o.city()).collect()
    }

    #[must_use]
    pub fn temperatures(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.temperature()).collect()
    }

    /// First observation whose city name matches exactly
    #[must_use]
    pub fn find(&self, city: &str) -> Option<&WeatherObservation> {
        self.observations.iter().find(|o| o.city() == city)
    }
}

impl FromIterator<WeatherObservation> for ObservationSet {
    fn from_iter<T: IntoIterator<Item = WeatherObservation>>(iter: T) -> Self {
        Self {
            observations: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ObservationSet {
    type Item = &'a WeatherObservation;
    type IntoIter = std::slice::Iter<'a, WeatherObservation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}
