//! # Biome Classification
//!
//! Assigns rainfall, moisture and a biome to every site.
//!
//! Uses a simple climate model based on:
//! - Rainfall (base value plus a noise perturbation)
//! - Moisture (rainfall plus an independent noise channel)
//! - Elevation (from the elevation stage)
//!
//! Wind direction is accepted but not modeled: there is no rain shadow.

use serde::{Deserialize, Serialize};

use crate::mesh::MeshData;
use crate::noise::NoiseBank;

/// Biome types on the island.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Biome {
    /// Open sea (water, elevation < -0.4)
    DeepWater = 0,
    /// Coastal water
    ShallowWater = 1,
    /// Dry lowland
    Beach = 2,
    /// Plains/grassland
    Grassland = 3,
    /// Forest
    Forest = 4,
    /// Bare rock
    Rocky = 5,
    /// Snowy peaks
    Snow = 6,
    /// Not classified yet
    #[default]
    Unknown = 7,
}

impl Biome {
    /// Returns whether this biome is a water biome.
    #[must_use]
    pub const fn is_water(self) -> bool {
        matches!(self, Self::DeepWater | Self::ShallowWater)
    }

    /// Single-character glyph for text previews.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::DeepWater => '~',
            Self::ShallowWater => '-',
            Self::Beach => '.',
            Self::Grassland => '"',
            Self::Forest => 'T',
            Self::Rocky => '^',
            Self::Snow => '*',
            Self::Unknown => '?',
        }
    }

    /// Converts from u8.
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::DeepWater,
            1 => Self::ShallowWater,
            2 => Self::Beach,
            3 => Self::Grassland,
            4 => Self::Forest,
            5 => Self::Rocky,
            6 => Self::Snow,
            _ => Self::Unknown,
        }
    }
}

/// Climate model that classifies every site of a mesh.
pub struct BiomeClassifier<'a> {
    /// Noise channels of this run.
    noise: &'a NoiseBank,
    /// Rainfall before perturbation, in `[0, 1]`.
    base_rainfall: f64,
    /// Prevailing wind direction in degrees (logged only).
    wind_angle_deg: f64,
}

impl<'a> BiomeClassifier<'a> {
    /// Default base rainfall.
    pub const DEFAULT_BASE_RAINFALL: f64 = 0.5;

    /// Rainfall noise frequency multiplier.
    const RAINFALL_SCALE: f64 = 2.5;
    /// Maximum rainfall perturbation.
    const RAINFALL_STRENGTH: f64 = 0.4;
    /// Moisture noise frequency multiplier.
    const MOISTURE_SCALE: f64 = 3.0;
    /// Maximum moisture perturbation.
    const MOISTURE_STRENGTH: f64 = 0.2;

    /// Creates a classifier. `base_rainfall` is clamped to `[0, 1]`.
    #[must_use]
    pub fn new(noise: &'a NoiseBank, base_rainfall: f64, wind_angle_deg: f64) -> Self {
        let base_rainfall = if base_rainfall.is_nan() {
            Self::DEFAULT_BASE_RAINFALL
        } else {
            base_rainfall.clamp(0.0, 1.0)
        };
        Self {
            noise,
            base_rainfall,
            wind_angle_deg,
        }
    }

    /// Clamped base rainfall.
    #[must_use]
    pub const fn base_rainfall(&self) -> f64 {
        self.base_rainfall
    }

    /// Assigns rainfall, moisture and biome to every site.
    pub fn assign(&self, mesh: &mut MeshData) {
        tracing::debug!(
            base_rainfall = self.base_rainfall,
            wind_angle_deg = self.wind_angle_deg,
            "assigning biomes"
        );

        // Noise coordinates: 10% of the box extent is one unit.
        let scale_x = positive_or_one(mesh.bounds.width() * 0.1);
        let scale_y = positive_or_one(mesh.bounds.height() * 0.1);

        for site in &mut mesh.sites {
            if site.is_water {
                site.rainfall = self.base_rainfall;
                site.moisture = 1.0;
            } else {
                let nx = (site.position.x - mesh.bounds.min_x) / scale_x;
                let ny = (site.position.y - mesh.bounds.min_y) / scale_y;

                let rain_noise = self
                    .noise
                    .rainfall
                    .sample(nx * Self::RAINFALL_SCALE, ny * Self::RAINFALL_SCALE);
                site.rainfall =
                    (self.base_rainfall + rain_noise * Self::RAINFALL_STRENGTH).clamp(0.0, 1.0);

                let moisture_noise = self
                    .noise
                    .moisture
                    .sample(nx * Self::MOISTURE_SCALE, ny * Self::MOISTURE_SCALE);
                site.moisture =
                    (site.rainfall + moisture_noise * Self::MOISTURE_STRENGTH).clamp(0.0, 1.0);
            }

            site.biome = Self::classify(site.elevation, site.moisture, site.is_water);
        }
    }

    /// The biome decision table.
    #[must_use]
    pub fn classify(elevation: f64, moisture: f64, is_water: bool) -> Biome {
        if is_water {
            return if elevation < -0.4 {
                Biome::DeepWater
            } else {
                Biome::ShallowWater
            };
        }

        if elevation > 0.75 {
            if moisture < 0.2 { Biome::Rocky } else { Biome::Snow }
        } else if elevation > 0.5 {
            match moisture {
                m if m < 0.25 => Biome::Rocky,
                m if m > 0.5 => Biome::Forest,
                _ => Biome::Grassland,
            }
        } else {
            match moisture {
                m if m < 0.15 => Biome::Beach,
                m if m > 0.6 => Biome::Forest,
                _ => Biome::Grassland,
            }
        }
    }
}

#[inline]
fn positive_or_one(v: f64) -> f64 {
    if v > 0.0 { v } else { 1.0 }
}
