//! Data models for weather observations
//!
//! This module contains the observation snapshot produced by the weather client
//! and the ordered set of observations the dashboard works on.

pub mod observation;
pub mod observation_set;

pub use observation::{WeatherObservation, format_measurement};
pub use observation_set::ObservationSet;
