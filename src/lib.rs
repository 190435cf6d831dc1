//! # biosim
//!
//! Spatial predator-prey simulation on a gridded island.
//!
//! ## Features
//!
//! - **Two species**: herbivores graze the terrain, carnivores hunt herbivores
//! - **Yearly cycle**: foraging, hunting, reproduction, migration, aging and death
//! - **Configurable**: YAML scenario files and runtime parameter updates
//! - **Reproducible**: seeded random number generation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use biosim::{BioSim, PopulationEntry, Species};
//!
//! let map = "WWWWW\nWLHLW\nWWWWW";
//! let population = vec![
//!     PopulationEntry::uniform((2, 2), Species::Herbivore, 50, 5, 20.0),
//!     PopulationEntry::uniform((2, 3), Species::Carnivore, 5, 5, 20.0),
//! ];
//!
//! let mut sim = BioSim::new(map, &population, 42).unwrap();
//! sim.simulate(50);
//!
//! println!("Year {}: {:?}", sim.year(), sim.num_animals_per_species());
//! ```
//!
//! ## Parameters
//!
//! ```rust
//! use biosim::BioSim;
//! use std::collections::BTreeMap;
//!
//! let mut sim = BioSim::new("WWW\nWLW\nWWW", &[], 1).unwrap();
//! let params: BTreeMap<String, f64> = [("f_max".to_string(), 500.0)].into();
//! sim.set_landscape_parameters("L", &params).unwrap();
//! ```

pub mod animal;
pub mod cell;
pub mod config;
pub mod cycle;
pub mod error;
pub mod export;
pub mod island;
pub mod params;
pub mod simulation;
pub mod stats;
pub mod terrain;

// Re-export main types
pub use animal::{Animal, Attribute, Species};
pub use cell::{Cell, Coord};
pub use config::Config;
pub use cycle::{Phase, YearCycle};
pub use error::{ParameterError, PlacementError, SimError, ValidationError};
pub use island::{AnimalRecord, Island, PopulationEntry, YearEvents};
pub use params::{ParamRegistry, SpeciesParams, TerrainParams};
pub use simulation::BioSim;
pub use stats::{StatsHistory, YearStats};
pub use terrain::Terrain;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
