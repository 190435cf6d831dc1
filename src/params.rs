//! Parameter registry for species and terrain constants.
//!
//! Tables live in one [`ParamRegistry`] owned by the island and are read
//! by reference, so an update is visible to the very next computation.
//! Updates are all-or-nothing: the batch is applied to a copy of the
//! table, and the copy replaces the live table only if every entry passed.

use crate::animal::Species;
use crate::error::ParameterError;
use crate::terrain::Terrain;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-species constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesParams {
    /// Mean birth weight
    pub w_birth: f64,
    /// Birth weight standard deviation
    pub sigma_birth: f64,
    /// Fraction of eaten food turned into weight
    pub beta: f64,
    /// Fraction of weight lost each year
    pub eta: f64,
    /// Age midpoint of the fitness curve
    pub a_half: f64,
    /// Age steepness of the fitness curve
    pub phi_age: f64,
    /// Weight midpoint of the fitness curve
    pub w_half: f64,
    /// Weight steepness of the fitness curve
    pub phi_weight: f64,
    /// Migration propensity
    pub mu: f64,
    /// Birth probability scale
    pub gamma: f64,
    /// Minimum parent weight, in units of `w_birth + sigma_birth`
    pub zeta: f64,
    /// Parent weight lost per unit of newborn weight
    pub xi: f64,
    /// Death probability scale
    pub omega: f64,
    /// Appetite
    #[serde(rename = "F")]
    pub appetite: f64,
    /// Catch steepness. Only predators carry it.
    #[serde(rename = "DeltaPhiMax", default, skip_serializing_if = "Option::is_none")]
    pub catch_steepness: Option<f64>,
}

impl SpeciesParams {
    pub fn herbivore() -> Self {
        Self {
            w_birth: 8.0,
            sigma_birth: 1.5,
            beta: 0.9,
            eta: 0.05,
            a_half: 40.0,
            phi_age: 0.6,
            w_half: 10.0,
            phi_weight: 0.1,
            mu: 0.25,
            gamma: 0.2,
            zeta: 3.5,
            xi: 1.2,
            omega: 0.4,
            appetite: 10.0,
            catch_steepness: None,
        }
    }

    pub fn carnivore() -> Self {
        Self {
            w_birth: 6.0,
            sigma_birth: 1.0,
            beta: 0.75,
            eta: 0.125,
            a_half: 40.0,
            phi_age: 0.3,
            w_half: 4.0,
            phi_weight: 0.4,
            mu: 0.4,
            gamma: 0.8,
            zeta: 3.5,
            xi: 1.1,
            omega: 0.8,
            appetite: 50.0,
            catch_steepness: Some(10.0),
        }
    }

    /// Minimum weight a parent needs before it can give birth
    pub fn birth_threshold(&self) -> f64 {
        self.zeta * (self.w_birth + self.sigma_birth)
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut f64> {
        match key {
            "w_birth" => Some(&mut self.w_birth),
            "sigma_birth" => Some(&mut self.sigma_birth),
            "beta" => Some(&mut self.beta),
            "eta" => Some(&mut self.eta),
            "a_half" => Some(&mut self.a_half),
            "phi_age" => Some(&mut self.phi_age),
            "w_half" => Some(&mut self.w_half),
            "phi_weight" => Some(&mut self.phi_weight),
            "mu" => Some(&mut self.mu),
            "gamma" => Some(&mut self.gamma),
            "zeta" => Some(&mut self.zeta),
            "xi" => Some(&mut self.xi),
            "omega" => Some(&mut self.omega),
            "F" => Some(&mut self.appetite),
            "DeltaPhiMax" => self.catch_steepness.as_mut(),
            _ => None,
        }
    }
}

/// Per-terrain food capacity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainParams {
    pub f_max: f64,
}

impl TerrainParams {
    pub fn default_for(terrain: Terrain) -> Self {
        Self {
            f_max: terrain.default_capacity(),
        }
    }
}

/// Check a single `(key, value)` pair against the range rules.
fn check_value(key: &str, value: f64) -> Result<(), ParameterError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ParameterError::Negative {
            key: key.to_string(),
            value,
        });
    }
    if key == "DeltaPhiMax" && value <= 0.0 {
        return Err(ParameterError::NotPositive {
            key: key.to_string(),
            value,
        });
    }
    if key == "eta" && value > 1.0 {
        return Err(ParameterError::AboveOne {
            key: key.to_string(),
            value,
        });
    }
    Ok(())
}

/// All mutable constant tables of a simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamRegistry {
    herbivore: SpeciesParams,
    carnivore: SpeciesParams,
    lowland: TerrainParams,
    highland: TerrainParams,
    desert: TerrainParams,
}

impl Default for ParamRegistry {
    fn default() -> Self {
        Self {
            herbivore: SpeciesParams::herbivore(),
            carnivore: SpeciesParams::carnivore(),
            lowland: TerrainParams::default_for(Terrain::Lowland),
            highland: TerrainParams::default_for(Terrain::Highland),
            desert: TerrainParams::default_for(Terrain::Desert),
        }
    }
}

impl ParamRegistry {
    #[inline]
    pub fn species(&self, species: Species) -> &SpeciesParams {
        match species {
            Species::Herbivore => &self.herbivore,
            Species::Carnivore => &self.carnivore,
        }
    }

    /// Food capacity of a terrain kind. Water never holds food.
    #[inline]
    pub fn capacity(&self, terrain: Terrain) -> f64 {
        match terrain {
            Terrain::Water => 0.0,
            Terrain::Lowland => self.lowland.f_max,
            Terrain::Highland => self.highland.f_max,
            Terrain::Desert => self.desert.f_max,
        }
    }

    fn species_mut(&mut self, species: Species) -> &mut SpeciesParams {
        match species {
            Species::Herbivore => &mut self.herbivore,
            Species::Carnivore => &mut self.carnivore,
        }
    }

    fn terrain_mut(&mut self, terrain: Terrain) -> Option<&mut TerrainParams> {
        match terrain {
            Terrain::Water => None,
            Terrain::Lowland => Some(&mut self.lowland),
            Terrain::Highland => Some(&mut self.highland),
            Terrain::Desert => Some(&mut self.desert),
        }
    }

    /// Validate and apply a batch of species parameter updates.
    pub fn set_species_params(
        &mut self,
        species: Species,
        updates: &BTreeMap<String, f64>,
    ) -> Result<(), ParameterError> {
        let table = self.species_mut(species);
        let mut staged = table.clone();

        for (key, &value) in updates {
            let slot = staged.slot_mut(key).ok_or_else(|| ParameterError::UnknownKey {
                table: species.name().to_string(),
                key: key.clone(),
            })?;
            check_value(key, value)?;
            *slot = value;
        }

        *table = staged;
        log::info!("Updated {} parameters: {:?}", species.name(), updates);
        Ok(())
    }

    /// Validate and apply a batch of terrain parameter updates.
    pub fn set_terrain_params(
        &mut self,
        terrain: Terrain,
        updates: &BTreeMap<String, f64>,
    ) -> Result<(), ParameterError> {
        let table = self
            .terrain_mut(terrain)
            .ok_or(ParameterError::Immutable(terrain.code()))?;
        let mut staged = table.clone();

        for (key, &value) in updates {
            if key != "f_max" {
                return Err(ParameterError::UnknownKey {
                    table: terrain.code().to_string(),
                    key: key.clone(),
                });
            }
            check_value(key, value)?;
            staged.f_max = value;
        }

        *table = staged;
        log::info!("Updated terrain '{}' parameters: {:?}", terrain.code(), updates);
        Ok(())
    }
}
