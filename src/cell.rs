//! A single grid location and its part of the yearly cycle.
//!
//! Each phase method touches only this cell. The one exception to
//! cell-locality is migration: emigrants are handed back to the island,
//! which routes them into neighbors' incoming buffers. Buffers are merged
//! into the resident lists only after every cell has emigrated, so an
//! animal moves at most once per year.

use crate::animal::{Animal, Attribute, Species};
use crate::error::PlacementError;
use crate::params::ParamRegistry;
use crate::terrain::Terrain;
use rand::seq::SliceRandom;
use rand::Rng;

/// 1-based `(row, col)` grid coordinate
pub type Coord = (usize, usize);

#[derive(Debug, Clone)]
pub struct Cell {
    coord: Coord,
    terrain: Terrain,
    food_available: f64,
    /// Resident animals, indexed by [`Species::index`]
    residents: [Vec<Animal>; 2],
    /// Animals that arrived this year and are not yet residents
    incoming: [Vec<Animal>; 2],
    /// Animals born this year; they join the residents once the year ends
    newborns: [Vec<Animal>; 2],
}

impl Cell {
    pub fn new(coord: Coord, terrain: Terrain, capacity: f64) -> Self {
        Self {
            coord,
            terrain,
            food_available: capacity,
            residents: [Vec::new(), Vec::new()],
            incoming: [Vec::new(), Vec::new()],
            newborns: [Vec::new(), Vec::new()],
        }
    }

    #[inline]
    pub fn coord(&self) -> Coord {
        self.coord
    }

    #[inline]
    pub fn terrain(&self) -> Terrain {
        self.terrain
    }

    #[inline]
    pub fn is_traversable(&self) -> bool {
        self.terrain.is_traversable()
    }

    /// Fodder left after this year's grazing
    #[inline]
    pub fn food_available(&self) -> f64 {
        self.food_available
    }

    #[inline]
    pub fn count(&self, species: Species) -> usize {
        self.residents[species.index()].len()
    }

    /// Number of animals of both species
    pub fn population(&self) -> usize {
        self.residents.iter().map(Vec::len).sum()
    }

    pub fn animals(&self, species: Species) -> &[Animal] {
        &self.residents[species.index()]
    }

    /// Animals waiting in the immigration buffer
    pub fn incoming(&self, species: Species) -> &[Animal] {
        &self.incoming[species.index()]
    }

    /// Animals born this year, not yet residents
    pub fn newborns(&self, species: Species) -> &[Animal] {
        &self.newborns[species.index()]
    }

    /// One attribute of every resident of a species, in list order
    pub fn list_attribute(&self, species: Species, attribute: Attribute) -> Vec<f64> {
        self.residents[species.index()]
            .iter()
            .map(|animal| animal.attribute(attribute))
            .collect()
    }

    /// Check that an animal of the given weight may be placed here.
    /// `None` means the weight is drawn from the birth-weight distribution.
    pub fn check_placement(&self, weight: Option<f64>) -> Result<(), PlacementError> {
        if !self.is_traversable() {
            let (row, col) = self.coord;
            return Err(PlacementError::NotTraversable { row, col });
        }
        match weight {
            Some(w) if !(w.is_finite() && w > 0.0) => Err(PlacementError::InvalidWeight(w)),
            _ => Ok(()),
        }
    }

    /// Add a resident animal
    pub fn place(
        &mut self,
        species: Species,
        age: u32,
        weight: f64,
        registry: &ParamRegistry,
    ) -> Result<(), PlacementError> {
        self.check_placement(Some(weight))?;
        let animal = Animal::new(species, age, weight, registry.species(species));
        self.residents[species.index()].push(animal);
        Ok(())
    }

    /// Recompute cached fitness after a parameter change
    pub fn refresh_fitness(&mut self, species: Species, registry: &ParamRegistry) {
        let params = registry.species(species);
        for animal in self.residents[species.index()]
            .iter_mut()
            .chain(self.incoming[species.index()].iter_mut())
            .chain(self.newborns[species.index()].iter_mut())
        {
            animal.update_fitness(params);
        }
    }

    /// Keep leftover food within a (possibly lowered) capacity
    pub fn clamp_food(&mut self, registry: &ParamRegistry) {
        let capacity = registry.capacity(self.terrain);
        self.food_available = self.food_available.clamp(0.0, capacity);
    }

    /// Grazing: refill fodder, then the fittest herbivores eat first.
    ///
    /// Returns the total amount eaten.
    pub fn forage(&mut self, registry: &ParamRegistry) -> f64 {
        let capacity = registry.capacity(self.terrain);
        let params = registry.species(Species::Herbivore);
        self.food_available = capacity;

        let herbivores = &mut self.residents[Species::Herbivore.index()];
        herbivores.sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));

        for grazer in herbivores.iter_mut() {
            if self.food_available <= 0.0 {
                break;
            }
            let portion = params.appetite.min(self.food_available);
            self.food_available -= portion;
            grazer.feed(portion, params);
        }

        capacity - self.food_available
    }

    /// Predation: each carnivore, in shuffled order, stalks herbivores from
    /// the weakest up until its appetite is met.
    ///
    /// Capture probability is `(hunter_fitness - prey_fitness) / DeltaPhiMax`
    /// clamped to `[0, 1]`. A hunter eats at most its remaining appetite from
    /// a caught prey; prey eaten whole is removed, otherwise it survives
    /// lighter. Returns the number of herbivores killed.
    pub fn hunt<R: Rng + ?Sized>(&mut self, registry: &ParamRegistry, rng: &mut R) -> usize {
        let prey_params = registry.species(Species::Herbivore);
        let hunter_params = registry.species(Species::Carnivore);
        let Some(steepness) = hunter_params.catch_steepness else {
            return 0;
        };

        let [herbivores, carnivores] = &mut self.residents;
        if herbivores.is_empty() || carnivores.is_empty() {
            return 0;
        }

        herbivores.sort_by(|a, b| a.fitness().total_cmp(&b.fitness()));
        carnivores.shuffle(rng);

        let mut kills = 0;
        for hunter in carnivores.iter_mut() {
            let mut hunger = hunter_params.appetite;
            let mut i = 0;

            while hunger > 0.0 && i < herbivores.len() {
                let advantage = hunter.fitness() - herbivores[i].fitness();
                let probability = (advantage / steepness).clamp(0.0, 1.0);

                if rng.gen::<f64>() < probability {
                    let prey_weight = herbivores[i].weight();
                    let eaten = prey_weight.min(hunger);
                    hunter.feed(eaten, hunter_params);
                    hunger -= eaten;

                    if eaten >= prey_weight {
                        herbivores.remove(i);
                        kills += 1;
                        continue;
                    }
                    herbivores[i].lose_weight(eaten, prey_params);
                }
                i += 1;
            }
        }

        kills
    }

    /// Births for both species against the pre-birth population counts.
    ///
    /// Newborns are held apart from the residents until
    /// [`settle_newborns`](Self::settle_newborns), so they skip the rest of
    /// their birth year. Returns the number of newborns.
    pub fn reproduce<R: Rng + ?Sized>(&mut self, registry: &ParamRegistry, rng: &mut R) -> usize {
        let mut births = 0;

        for species in Species::ALL {
            let params = registry.species(species);
            let parents = &mut self.residents[species.index()];
            let population = parents.len();

            let before = self.newborns[species.index()].len();
            self.newborns[species.index()].extend(
                parents
                    .iter_mut()
                    .filter_map(|parent| parent.attempt_birth(population, params, rng))
                    .map(|birth_weight| Animal::new(species, 0, birth_weight, params)),
            );
            births += self.newborns[species.index()].len() - before;
        }

        births
    }

    /// Move this year's newborns into the resident lists
    pub fn settle_newborns(&mut self) {
        for (residents, newborns) in self.residents.iter_mut().zip(self.newborns.iter_mut()) {
            residents.append(newborns);
        }
    }

    /// Remove and return every resident that decides to migrate.
    pub fn emigrate<R: Rng + ?Sized>(
        &mut self,
        registry: &ParamRegistry,
        rng: &mut R,
    ) -> Vec<Animal> {
        let mut leaving = Vec::new();

        for species in Species::ALL {
            let params = registry.species(species);
            let residents = std::mem::take(&mut self.residents[species.index()]);
            let (moving, staying): (Vec<Animal>, Vec<Animal>) = residents
                .into_iter()
                .partition(|animal| animal.decide_migrate(params, rng));

            self.residents[species.index()] = staying;
            leaving.extend(moving);
        }

        leaving
    }

    /// Stage an arriving animal
    pub fn receive(&mut self, animal: Animal) {
        self.incoming[animal.species().index()].push(animal);
    }

    /// Merge the immigration buffers into the resident lists
    pub fn settle_immigrants(&mut self) {
        for (residents, incoming) in self.residents.iter_mut().zip(self.incoming.iter_mut()) {
            residents.append(incoming);
        }
    }

    /// Age every resident by one year
    pub fn age_all(&mut self, registry: &ParamRegistry) {
        for species in Species::ALL {
            let params = registry.species(species);
            for animal in &mut self.residents[species.index()] {
                animal.age_and_metabolize(params);
            }
        }
    }

    /// Remove residents that die this year. Returns the number of deaths.
    pub fn cull<R: Rng + ?Sized>(&mut self, registry: &ParamRegistry, rng: &mut R) -> usize {
        let mut deaths = 0;
        for species in Species::ALL {
            let params = registry.species(species);
            let animals = &mut self.residents[species.index()];
            let before = animals.len();
            animals.retain(|animal| !animal.decide_death(params, rng));
            deaths += before - animals.len();
        }
        deaths
    }
}
