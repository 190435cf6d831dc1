//! Scenario configuration.
//!
//! A scenario is a YAML file describing the island map, the initial
//! population, parameter overrides and run settings. Every section except
//! `island` falls back to defaults when omitted.

use crate::animal::Species;
use crate::cycle::YearCycle;
use crate::error::{ParameterError, SimError};
use crate::island::{Island, PopulationEntry};
use crate::params::ParamRegistry;
use crate::terrain::Terrain;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationConfig,
    pub island: IslandConfig,
    #[serde(default)]
    pub population: Vec<PopulationEntry>,
    /// Species name -> parameter overrides
    #[serde(default)]
    pub species_params: BTreeMap<Species, BTreeMap<String, f64>>,
    /// Terrain code -> parameter overrides
    #[serde(default)]
    pub terrain_params: BTreeMap<String, BTreeMap<String, f64>>,
    #[serde(default)]
    pub cycle: YearCycle,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Run settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Random seed; a random one is drawn when absent
    #[serde(default)]
    pub seed: Option<u64>,
    /// Years to simulate
    pub years: u32,
    /// Years between recorded stats snapshots
    pub stats_interval: u32,
}

/// Island geography
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IslandConfig {
    /// Terrain codes, one line per row
    pub map: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (off, error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            years: 100,
            stats_interval: 1,
        }
    }
}

impl Default for IslandConfig {
    fn default() -> Self {
        Self {
            map: ["WWWWWWW", "WLLHHLW", "WLDHLLW", "WHLLDLW", "WWWWWWW"].join("\n"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig {
                seed: Some(12345),
                ..Default::default()
            },
            island: IslandConfig::default(),
            population: vec![
                PopulationEntry::uniform((2, 2), Species::Herbivore, 150, 5, 20.0),
                PopulationEntry::uniform((3, 5), Species::Herbivore, 50, 5, 20.0),
                PopulationEntry::uniform((2, 2), Species::Carnivore, 20, 5, 20.0),
            ],
            species_params: BTreeMap::new(),
            terrain_params: BTreeMap::new(),
            cycle: YearCycle::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Parse a terrain code key such as `"L"`
pub fn parse_terrain_key(key: &str) -> Result<Terrain, ParameterError> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(code), None) => Terrain::from_code(code).ok_or(ParameterError::UnknownTerrain(code)),
        _ => Err(ParameterError::UnknownTerrain(key.chars().next().unwrap_or(' '))),
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SimError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SimError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parameter registry with this scenario's overrides applied
    pub fn registry(&self) -> Result<ParamRegistry, ParameterError> {
        let mut registry = ParamRegistry::default();
        for (&species, updates) in &self.species_params {
            registry.set_species_params(species, updates)?;
        }
        for (key, updates) in &self.terrain_params {
            registry.set_terrain_params(parse_terrain_key(key)?, updates)?;
        }
        Ok(registry)
    }

    /// Check the whole scenario: map shape, parameter overrides and
    /// placement of the initial population.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.simulation.stats_interval == 0 {
            return Err(SimError::Config("stats_interval must be > 0".to_string()));
        }
        if !LOG_LEVELS.contains(&self.logging.log_level.to_lowercase().as_str()) {
            return Err(SimError::Config(format!(
                "unknown log level '{}'",
                self.logging.log_level
            )));
        }

        let registry = self.registry()?;
        let mut scratch = Island::new_with_seed(&self.island.map, registry, 0)?;
        scratch.place_population(&self.population)?;
        Ok(())
    }
}
