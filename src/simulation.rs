//! High-level simulation driver.
//!
//! [`BioSim`] wraps an [`Island`] with string-keyed parameter setters,
//! multi-year runs and a stats history.

use crate::animal::Species;
use crate::config::{parse_terrain_key, Config};
use crate::cycle::{Phase, YearCycle};
use crate::error::{ParameterError, PlacementError, SimError, ValidationError};
use crate::island::{Island, PopulationEntry};
use crate::params::ParamRegistry;
use crate::stats::{StatsHistory, YearStats};
use std::collections::BTreeMap;

pub struct BioSim {
    island: Island,
    history: StatsHistory,
}

impl BioSim {
    /// Create a simulation on `map`, place the initial population and seed
    /// the generator.
    pub fn new(map: &str, ini_pop: &[PopulationEntry], seed: u64) -> Result<Self, SimError> {
        let island = Island::new_with_seed(map, ParamRegistry::default(), seed)?;
        Self::with_island(island, ini_pop)
    }

    /// Build a simulation from a validated scenario
    pub fn from_config(config: &Config) -> Result<Self, SimError> {
        let registry = config.registry()?;
        let mut island = match config.simulation.seed {
            Some(seed) => Island::new_with_seed(&config.island.map, registry, seed)?,
            None => Island::new(&config.island.map, registry)?,
        };
        island.set_cycle(config.cycle.clone());

        let mut sim = Self::with_island(island, &config.population)?;
        sim.history = StatsHistory::new(config.simulation.stats_interval);
        Ok(sim)
    }

    fn with_island(mut island: Island, ini_pop: &[PopulationEntry]) -> Result<Self, SimError> {
        island.place_population(ini_pop)?;
        log::info!(
            "Simulation ready: {}x{} island, seed {}, {} animals",
            island.height(),
            island.width(),
            island.seed(),
            island.population()
        );
        Ok(Self {
            island,
            history: StatsHistory::new(1),
        })
    }

    /// Update parameters of a species given by name (`"Herbivore"`, `"Carnivore"`)
    pub fn set_animal_parameters(
        &mut self,
        species: &str,
        params: &BTreeMap<String, f64>,
    ) -> Result<(), ParameterError> {
        let species: Species = species.parse()?;
        self.island.set_species_params(species, params)
    }

    /// Update parameters of a terrain kind given by its code (`"L"`, `"H"`, `"D"`)
    pub fn set_landscape_parameters(
        &mut self,
        code: &str,
        params: &BTreeMap<String, f64>,
    ) -> Result<(), ParameterError> {
        let terrain = parse_terrain_key(code)?;
        self.island.set_terrain_params(terrain, params)
    }

    pub fn add_population(&mut self, population: &[PopulationEntry]) -> Result<(), PlacementError> {
        self.island.place_population(population)
    }

    /// Replace the phase order used from the next year on
    pub fn set_cycle(&mut self, phases: Vec<Phase>) -> Result<(), ValidationError> {
        self.island.set_cycle(YearCycle::new(phases)?);
        Ok(())
    }

    /// Run `num_years` further years
    pub fn simulate(&mut self, num_years: u32) {
        self.simulate_with_callback(num_years, |_, _| {});
    }

    /// Run `num_years` further years, calling `callback` after each one
    pub fn simulate_with_callback<F>(&mut self, num_years: u32, mut callback: F)
    where
        F: FnMut(&BioSim, &YearStats),
    {
        for _ in 0..num_years {
            let events = self.island.advance_year();
            let stats = YearStats::capture(&self.island, events);
            if self.history.should_record(stats.year) {
                self.history.record(stats.clone());
            }
            callback(self, &stats);
        }
        log::info!(
            "Simulated to year {}: {} herbivores, {} carnivores",
            self.year(),
            self.island.total(Species::Herbivore),
            self.island.total(Species::Carnivore)
        );
    }

    /// Last simulated year
    pub fn year(&self) -> u32 {
        self.island.year()
    }

    /// Total number of animals on the island
    pub fn num_animals(&self) -> usize {
        self.island.population()
    }

    /// Number of animals per species
    pub fn num_animals_per_species(&self) -> BTreeMap<Species, usize> {
        Species::ALL
            .into_iter()
            .map(|s| (s, self.island.total(s)))
            .collect()
    }

    pub fn island(&self) -> &Island {
        &self.island
    }

    pub fn history(&self) -> &StatsHistory {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: &str = "WWWW
                       WLHW
                       WWWW";

    fn population() -> Vec<PopulationEntry> {
        vec![PopulationEntry::uniform((2, 2), Species::Herbivore, 10, 5, 20.0)]
    }

    #[test]
    fn test_new_and_counts() {
        let sim = BioSim::new(MAP, &population(), 1).unwrap();
        assert_eq!(sim.year(), 0);
        assert_eq!(sim.num_animals(), 10);
        let per_species = sim.num_animals_per_species();
        assert_eq!(per_species[&Species::Herbivore], 10);
        assert_eq!(per_species[&Species::Carnivore], 0);
    }

    #[test]
    fn test_new_rejects_bad_input() {
        assert!(matches!(
            BioSim::new("WWW\nWLL\nWWW", &[], 1),
            Err(SimError::Validation(_))
        ));
        let off_map = vec![PopulationEntry::uniform((9, 9), Species::Herbivore, 1, 1, 5.0)];
        assert!(matches!(BioSim::new(MAP, &off_map, 1), Err(SimError::Placement(_))));
    }

    #[test]
    fn test_simulate_accumulates_years() {
        let mut sim = BioSim::new(MAP, &population(), 5).unwrap();
        sim.simulate(3);
        sim.simulate(2);
        assert_eq!(sim.year(), 5);
        assert_eq!(sim.history().snapshots.len(), 5);
        assert_eq!(sim.history().latest().unwrap().year, 5);
    }

    #[test]
    fn test_callback_sees_every_year() {
        let mut sim = BioSim::new(MAP, &population(), 5).unwrap();
        let mut years = Vec::new();
        sim.simulate_with_callback(4, |s, stats| {
            assert_eq!(s.year(), stats.year);
            years.push(stats.year);
        });
        assert_eq!(years, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_parameter_setters_by_name() {
        let mut sim = BioSim::new(MAP, &population(), 1).unwrap();
        let params: BTreeMap<String, f64> = [("F".to_string(), 20.0)].into();
        sim.set_animal_parameters("Herbivore", &params).unwrap();
        assert_eq!(
            sim.island().registry().species(Species::Herbivore).appetite,
            20.0
        );

        assert!(matches!(
            sim.set_animal_parameters("Omnivore", &params),
            Err(ParameterError::UnknownSpecies(_))
        ));

        let f_max: BTreeMap<String, f64> = [("f_max".to_string(), 200.0)].into();
        sim.set_landscape_parameters("H", &f_max).unwrap();
        assert!(matches!(
            sim.set_landscape_parameters("W", &f_max),
            Err(ParameterError::Immutable('W'))
        ));
        assert!(matches!(
            sim.set_landscape_parameters("Q", &f_max),
            Err(ParameterError::UnknownTerrain('Q'))
        ));
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.simulation.stats_interval = 5;
        let mut sim = BioSim::from_config(&config).unwrap();
        assert_eq!(sim.island().seed(), 12345);
        assert_eq!(sim.num_animals(), 220);

        sim.simulate(10);
        let recorded: Vec<u32> = sim.history().snapshots.iter().map(|s| s.year).collect();
        assert_eq!(recorded, vec![5, 10]);
    }

    #[test]
    fn test_set_cycle() {
        let mut sim = BioSim::new(MAP, &population(), 1).unwrap();
        assert!(sim.set_cycle(vec![Phase::Forage]).is_err());
        let mut phases = Phase::CANONICAL.to_vec();
        phases.swap(5, 6);
        sim.set_cycle(phases).unwrap();
        assert_eq!(sim.island().cycle().phases()[5], Phase::Die);
        sim.simulate(1);
        assert_eq!(sim.year(), 1);
    }
}
