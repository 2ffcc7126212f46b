//! # Generation Config
//!
//! Tuning parameters for one island, loadable from TOML.
//!
//! Every field has a default, so a config file only lists what it changes:
//!
//! ```toml
//! seed = 777
//! min_distance = 6.0
//! neighbor_strategy = "mesh_adjacency"
//!
//! [bounds]
//! min_x = 0.0
//! min_y = 0.0
//! max_x = 200.0
//! max_y = 120.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ProcgenError, ProcgenResult};
use crate::geometry::Bounds;
use crate::hydrology::NeighborStrategy;

/// Parameters for [`IslandGenerator`](crate::IslandGenerator).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// World seed.
    pub seed: u64,
    /// World box.
    pub bounds: Bounds,
    /// Poisson minimum distance.
    pub min_distance: f64,
    /// Candidates per active point (`k`).
    pub attempts: u32,
    /// Spacing of an extra ring of sites on the box edges.
    pub boundary_spacing: Option<f64>,
    /// Island mask exponent.
    pub island_exponent: f64,
    /// Elevation noise base frequency.
    pub elevation_frequency: f64,
    /// Rainfall before noise, in `[0, 1]`.
    pub base_rainfall: f64,
    /// Prevailing wind direction in degrees.
    pub wind_angle_deg: f64,
    /// Flow at which river segments are recorded.
    pub min_flow_for_river: f64,
    /// Downslope candidate search.
    pub neighbor_strategy: NeighborStrategy,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            bounds: Bounds::new(0.0, 0.0, 100.0, 100.0),
            min_distance: 10.0,
            attempts: 30,
            boundary_spacing: None,
            island_exponent: 2.0,
            elevation_frequency: 1.0,
            base_rainfall: 0.5,
            wind_angle_deg: 0.0,
            min_flow_for_river: 0.01,
            neighbor_strategy: NeighborStrategy::Radius,
        }
    }
}

impl GenerationConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`ProcgenError::ConfigIo`] on malformed TOML, [`ProcgenError::InvalidConfig`]
    /// when a value fails validation.
    pub fn from_toml_str(text: &str) -> ProcgenResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ProcgenError::ConfigIo(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`ProcgenError::ConfigIo`] when the file cannot be read or parsed,
    /// [`ProcgenError::InvalidConfig`] when a value fails validation.
    pub fn load(path: impl AsRef<Path>) -> ProcgenResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ProcgenError::ConfigIo(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Serializes to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ProcgenError::ConfigIo`] if serialization fails.
    pub fn to_toml_string(&self) -> ProcgenResult<String> {
        toml::to_string(self).map_err(|e| ProcgenError::ConfigIo(e.to_string()))
    }

    /// Checks value ranges.
    ///
    /// Zero-area bounds are allowed; they simply produce an empty island.
    ///
    /// # Errors
    ///
    /// Returns [`ProcgenError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> ProcgenResult<()> {
        let finite = [
            ("bounds.min_x", self.bounds.min_x),
            ("bounds.min_y", self.bounds.min_y),
            ("bounds.max_x", self.bounds.max_x),
            ("bounds.max_y", self.bounds.max_y),
            ("min_distance", self.min_distance),
            ("island_exponent", self.island_exponent),
            ("elevation_frequency", self.elevation_frequency),
            ("base_rainfall", self.base_rainfall),
            ("wind_angle_deg", self.wind_angle_deg),
            ("min_flow_for_river", self.min_flow_for_river),
        ];
        if let Some((name, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(invalid(format!("{name} must be finite, got {value}")));
        }

        if !(self.min_distance * self.min_distance).is_finite() {
            return Err(invalid(format!("min_distance is too large, got {}", self.min_distance)));
        }
        if self.attempts == 0 {
            return Err(invalid("attempts must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.base_rainfall) {
            return Err(invalid(format!(
                "base_rainfall must be within [0, 1], got {}",
                self.base_rainfall
            )));
        }
        if self.min_flow_for_river < 0.0 {
            return Err(invalid(format!(
                "min_flow_for_river must not be negative, got {}",
                self.min_flow_for_river
            )));
        }
        if let Some(spacing) = self.boundary_spacing {
            if !spacing.is_finite() || spacing <= 0.0 {
                return Err(invalid(format!("boundary_spacing must be positive, got {spacing}")));
            }
        }
        Ok(())
    }
}

fn invalid(message: String) -> ProcgenError {
    ProcgenError::InvalidConfig(message)
}
