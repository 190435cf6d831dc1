//! The island: grid ownership, population loading and the yearly cycle.
//!
//! Cells are stored by value in row-major order and addressed by 1-based
//! `(row, col)` coordinates; neighbors are found by coordinate arithmetic.
//! All randomness comes from one seeded generator advanced in a fixed
//! order (row-major over cells, then list order within a cell), so equal
//! seeds and equal call sequences give identical trajectories.

use crate::animal::{Animal, Attribute, Species};
use crate::cell::{Cell, Coord};
use crate::cycle::{Phase, YearCycle};
use crate::error::{ParameterError, PlacementError, ValidationError};
use crate::params::ParamRegistry;
use crate::terrain::{Terrain, TerrainGrid};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Redraws allowed when a drawn placement weight is not positive
const MAX_WEIGHT_DRAWS: usize = 1000;

/// Orthogonal neighbor offsets: north, south, west, east
const NEIGHBOR_OFFSETS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Age and optional weight of one animal to place. Without a weight, one
/// is drawn from the species' birth-weight distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalRecord {
    pub age: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl AnimalRecord {
    pub fn new(age: u32, weight: f64) -> Self {
        Self {
            age,
            weight: Some(weight),
        }
    }
}

/// A batch of animals of one species for one cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationEntry {
    pub loc: Coord,
    pub species: Species,
    pub animals: Vec<AnimalRecord>,
}

impl PopulationEntry {
    /// `count` identical animals
    pub fn uniform(loc: Coord, species: Species, count: usize, age: u32, weight: f64) -> Self {
        Self {
            loc,
            species,
            animals: vec![AnimalRecord::new(age, weight); count],
        }
    }
}

/// Counts from one pass of the yearly cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YearEvents {
    pub births: usize,
    pub kills: usize,
    pub migrations: usize,
    pub deaths: usize,
}

/// The simulated island
pub struct Island {
    terrain: TerrainGrid,
    cells: Vec<Cell>,
    registry: ParamRegistry,
    cycle: YearCycle,
    year: u32,
    rng: ChaCha8Rng,
    seed: u64,
}

impl Island {
    /// Create an island with a random seed
    pub fn new(map: &str, registry: ParamRegistry) -> Result<Self, ValidationError> {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(map, registry, seed)
    }

    /// Create an island with a specific seed for reproducibility
    pub fn new_with_seed(
        map: &str,
        registry: ParamRegistry,
        seed: u64,
    ) -> Result<Self, ValidationError> {
        let terrain = TerrainGrid::parse(map)?;

        let mut cells = Vec::with_capacity(terrain.width * terrain.height);
        for (i, row) in terrain.grid.iter().enumerate() {
            for (j, &kind) in row.iter().enumerate() {
                cells.push(Cell::new((i + 1, j + 1), kind, registry.capacity(kind)));
            }
        }

        log::debug!(
            "Island created: {}x{} cells, seed {}",
            terrain.height,
            terrain.width,
            seed
        );

        Ok(Self {
            terrain,
            cells,
            registry,
            cycle: YearCycle::default(),
            year: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.terrain.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.terrain.height
    }

    /// Years simulated so far
    #[inline]
    pub fn year(&self) -> u32 {
        self.year
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn registry(&self) -> &ParamRegistry {
        &self.registry
    }

    pub fn cycle(&self) -> &YearCycle {
        &self.cycle
    }

    pub fn set_cycle(&mut self, cycle: YearCycle) {
        self.cycle = cycle;
    }

    pub fn terrain(&self) -> &TerrainGrid {
        &self.terrain
    }

    /// Row-major index of a coordinate inside the grid
    fn index(&self, (row, col): Coord) -> Option<usize> {
        if row == 0 || col == 0 || row > self.height() || col > self.width() {
            return None;
        }
        Some((row - 1) * self.width() + (col - 1))
    }

    /// Index of the cell at `offset` from `coord`, if inside the grid
    fn neighbor(&self, (row, col): Coord, (dr, dc): (isize, isize)) -> Option<usize> {
        let row = row.checked_add_signed(dr)?;
        let col = col.checked_add_signed(dc)?;
        self.index((row, col))
    }

    pub fn cell(&self, coord: Coord) -> Option<&Cell> {
        self.index(coord).map(|idx| &self.cells[idx])
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Validate and apply species parameter updates, then refresh the
    /// cached fitness of every animal of that species.
    pub fn set_species_params(
        &mut self,
        species: Species,
        updates: &BTreeMap<String, f64>,
    ) -> Result<(), ParameterError> {
        if let Err(e) = self.registry.set_species_params(species, updates) {
            log::warn!("Rejected {} parameter update: {}", species, e);
            return Err(e);
        }
        for cell in &mut self.cells {
            cell.refresh_fitness(species, &self.registry);
        }
        Ok(())
    }

    /// Validate and apply terrain parameter updates.
    pub fn set_terrain_params(
        &mut self,
        terrain: Terrain,
        updates: &BTreeMap<String, f64>,
    ) -> Result<(), ParameterError> {
        if let Err(e) = self.registry.set_terrain_params(terrain, updates) {
            log::warn!("Rejected terrain '{}' parameter update: {}", terrain.code(), e);
            return Err(e);
        }
        for cell in self.cells.iter_mut().filter(|c| c.terrain() == terrain) {
            cell.clamp_food(&self.registry);
        }
        Ok(())
    }

    /// Place a list of population batches.
    ///
    /// Every entry is checked, and every missing weight drawn, before
    /// anything is placed, so a failing entry leaves the island unchanged.
    pub fn place_population(&mut self, entries: &[PopulationEntry]) -> Result<(), PlacementError> {
        let mut targets = Vec::with_capacity(entries.len());
        for entry in entries {
            let (row, col) = entry.loc;
            let idx = self
                .index(entry.loc)
                .ok_or(PlacementError::OutOfRange { row, col })?;
            for record in &entry.animals {
                self.cells[idx].check_placement(record.weight)?;
            }
            targets.push(idx);
        }

        let mut weights = Vec::with_capacity(entries.len());
        for entry in entries {
            let batch = entry
                .animals
                .iter()
                .map(|record| match record.weight {
                    Some(w) => Ok(w),
                    None => self.draw_positive_weight(entry.species),
                })
                .collect::<Result<Vec<f64>, _>>()?;
            weights.push(batch);
        }

        let mut placed = 0;
        for ((entry, idx), batch) in entries.iter().zip(targets).zip(weights) {
            for (record, weight) in entry.animals.iter().zip(batch) {
                self.cells[idx].place(entry.species, record.age, weight, &self.registry)?;
                placed += 1;
            }
        }

        log::info!("Placed {} animals in {} batches", placed, entries.len());
        Ok(())
    }

    /// Draw a birth weight for a placed animal, redrawing non-positive
    /// values a bounded number of times.
    fn draw_positive_weight(&mut self, species: Species) -> Result<f64, PlacementError> {
        let params = self.registry.species(species);
        if params.sigma_birth <= 0.0 && params.w_birth <= 0.0 {
            return Err(PlacementError::NoBirthWeight(species));
        }
        for _ in 0..MAX_WEIGHT_DRAWS {
            let w = Animal::draw_birth_weight(params, &mut self.rng);
            if w > 0.0 {
                return Ok(w);
            }
        }
        Err(PlacementError::NoBirthWeight(species))
    }

    /// Run one full year: every phase of the cycle across all cells.
    pub fn advance_year(&mut self) -> YearEvents {
        let mut events = YearEvents::default();
        let phases = self.cycle.phases().to_vec();
        for phase in phases {
            self.run_phase(phase, &mut events);
        }
        self.settle_newborns();
        self.year += 1;

        log::debug!(
            "Year {}: herbivores={} carnivores={} births={} kills={} migrations={} deaths={}",
            self.year,
            self.total(Species::Herbivore),
            self.total(Species::Carnivore),
            events.births,
            events.kills,
            events.migrations,
            events.deaths
        );
        events
    }

    /// Move this year's newborns into the resident lists. Called by
    /// [`advance_year`](Self::advance_year) after the last phase.
    pub fn settle_newborns(&mut self) {
        for cell in &mut self.cells {
            cell.settle_newborns();
        }
    }

    /// Run one phase across the whole grid.
    pub fn run_phase(&mut self, phase: Phase, events: &mut YearEvents) {
        if phase == Phase::Emigrate {
            events.migrations += self.emigrate_all();
            return;
        }

        let registry = &self.registry;
        let rng = &mut self.rng;
        for cell in self.cells.iter_mut().filter(|c| c.is_traversable()) {
            match phase {
                Phase::Forage => {
                    cell.forage(registry);
                }
                Phase::Hunt => events.kills += cell.hunt(registry, rng),
                Phase::Reproduce => events.births += cell.reproduce(registry, rng),
                Phase::Immigrate => cell.settle_immigrants(),
                Phase::Age => cell.age_all(registry),
                Phase::Die => events.deaths += cell.cull(registry, rng),
                Phase::Emigrate => {}
            }
        }
    }

    /// Move emigrants into the incoming buffer of a random orthogonal
    /// neighbor, or back into their own cell's buffer when that neighbor
    /// is not traversable. Returns the number of animals that changed cell.
    fn emigrate_all(&mut self) -> usize {
        let mut moved = 0;

        for idx in 0..self.cells.len() {
            if !self.cells[idx].is_traversable() {
                continue;
            }
            let leaving = self.cells[idx].emigrate(&self.registry, &mut self.rng);
            let origin = self.cells[idx].coord();

            for animal in leaving {
                let offset = NEIGHBOR_OFFSETS[self.rng.gen_range(0..NEIGHBOR_OFFSETS.len())];
                let target = self
                    .neighbor(origin, offset)
                    .filter(|&t| self.cells[t].is_traversable())
                    .unwrap_or(idx);
                if target != idx {
                    moved += 1;
                }
                self.cells[target].receive(animal);
            }
        }

        moved
    }

    /// Number of animals of a species on the whole island
    pub fn total(&self, species: Species) -> usize {
        self.cells.iter().map(|c| c.count(species)).sum()
    }

    /// Number of animals of both species
    pub fn population(&self) -> usize {
        self.cells.iter().map(Cell::population).sum()
    }

    pub fn is_extinct(&self) -> bool {
        self.population() == 0
    }

    /// Per-cell counts, one inner vector per row
    pub fn grid_snapshot(&self, species: Species) -> Vec<Vec<usize>> {
        self.cells
            .chunks(self.width())
            .map(|row| row.iter().map(|c| c.count(species)).collect())
            .collect()
    }

    /// One attribute of every animal of a species, row-major over cells
    pub fn attribute_list(&self, species: Species, attribute: Attribute) -> Vec<f64> {
        self.cells
            .iter()
            .flat_map(|c| c.list_attribute(species, attribute))
            .collect()
    }

    /// Terrain map as text
    pub fn render_map(&self) -> String {
        self.terrain.render()
    }
}
