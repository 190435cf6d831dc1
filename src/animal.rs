//! Individual animals and their yearly behaviors.
//!
//! Behavior is selected by a [`Species`] tag looking up its constants in
//! the [`ParamRegistry`](crate::params::ParamRegistry); there is one
//! animal type for both species. Every stochastic decision draws from the
//! RNG handle passed in by the caller.

use crate::params::SpeciesParams;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Animal species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    Herbivore,
    Carnivore,
}

impl Species {
    pub const ALL: [Species; 2] = [Species::Herbivore, Species::Carnivore];

    /// Slot in per-species arrays
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Species::Herbivore => 0,
            Species::Carnivore => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Species::Herbivore => "Herbivore",
            Species::Carnivore => "Carnivore",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Species {
    type Err = crate::error::ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Herbivore" => Ok(Species::Herbivore),
            "Carnivore" => Ok(Species::Carnivore),
            other => Err(crate::error::ParameterError::UnknownSpecies(other.to_string())),
        }
    }
}

/// Per-individual attribute exposed by snapshot queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Age,
    Weight,
    Fitness,
}

/// Logistic factor `1 / (1 + e^(phi * (x - half)))`
#[inline]
fn logistic(x: f64, half: f64, phi: f64) -> f64 {
    1.0 / (1.0 + (phi * (x - half)).exp())
}

/// A single organism
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    species: Species,
    age: u32,
    weight: f64,
    fitness: f64,
}

impl Animal {
    /// Create an animal and compute its fitness
    pub fn new(species: Species, age: u32, weight: f64, params: &SpeciesParams) -> Self {
        let mut animal = Self {
            species,
            age,
            weight,
            fitness: 0.0,
        };
        animal.update_fitness(params);
        animal
    }

    /// Draw a birth weight from N(`w_birth`, `sigma_birth`)
    pub fn draw_birth_weight<R: Rng + ?Sized>(params: &SpeciesParams, rng: &mut R) -> f64 {
        let z: f64 = rng.sample(StandardNormal);
        params.w_birth + params.sigma_birth * z
    }

    #[inline]
    pub fn species(&self) -> Species {
        self.species
    }

    #[inline]
    pub fn age(&self) -> u32 {
        self.age
    }

    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    #[inline]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn attribute(&self, attribute: Attribute) -> f64 {
        match attribute {
            Attribute::Age => self.age as f64,
            Attribute::Weight => self.weight,
            Attribute::Fitness => self.fitness,
        }
    }

    /// Recompute the cached fitness from age and weight
    pub fn update_fitness(&mut self, params: &SpeciesParams) {
        self.fitness = if self.weight <= 0.0 {
            0.0
        } else {
            let age_term = logistic(self.age as f64, params.a_half, params.phi_age);
            let weight_term = logistic(params.w_half, self.weight, params.phi_weight);
            age_term * weight_term
        };
    }

    /// Gain weight from `amount` of eaten food
    pub fn feed(&mut self, amount: f64, params: &SpeciesParams) {
        self.weight += amount * params.beta;
        self.update_fitness(params);
    }

    /// Lose `amount` of weight to a predator
    pub(crate) fn lose_weight(&mut self, amount: f64, params: &SpeciesParams) {
        self.weight -= amount;
        self.update_fitness(params);
    }

    /// One year older, minus the yearly metabolic loss
    pub fn age_and_metabolize(&mut self, params: &SpeciesParams) {
        self.age += 1;
        self.weight -= self.weight * params.eta;
        self.update_fitness(params);
    }

    /// Does this animal want to leave its cell this year?
    pub fn decide_migrate<R: Rng + ?Sized>(&self, params: &SpeciesParams, rng: &mut R) -> bool {
        rng.gen::<f64>() < params.mu * self.fitness
    }

    /// Try to give birth.
    ///
    /// `population` is the species count in the cell before any birth this
    /// year. Returns the newborn's weight on success, after the parent has
    /// paid `xi` times that weight.
    pub fn attempt_birth<R: Rng + ?Sized>(
        &mut self,
        population: usize,
        params: &SpeciesParams,
        rng: &mut R,
    ) -> Option<f64> {
        if self.weight < params.birth_threshold() {
            return None;
        }

        let mates = population.saturating_sub(1) as f64;
        let probability = (params.gamma * self.fitness * mates).min(1.0);
        if rng.gen::<f64>() >= probability {
            return None;
        }

        let birth_weight = Self::draw_birth_weight(params, rng);
        if birth_weight >= self.weight || birth_weight <= 0.0 {
            return None;
        }

        self.weight -= params.xi * birth_weight;
        self.update_fitness(params);
        Some(birth_weight)
    }

    /// Does this animal die this year? Starved animals always do.
    pub fn decide_death<R: Rng + ?Sized>(&self, params: &SpeciesParams, rng: &mut R) -> bool {
        if self.weight <= 0.0 {
            return true;
        }
        rng.gen::<f64>() < params.omega * (1.0 - self.fitness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn herb() -> SpeciesParams {
        SpeciesParams::herbivore()
    }

    /// RNG whose `gen::<f64>()` is always 0.0
    fn always_low() -> StepRng {
        StepRng::new(0, 0)
    }

    /// RNG whose `gen::<f64>()` is always just below 1.0
    fn always_high() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    #[test]
    fn test_species_parse() {
        assert_eq!("Herbivore".parse::<Species>().unwrap(), Species::Herbivore);
        assert_eq!("Carnivore".parse::<Species>().unwrap(), Species::Carnivore);
        assert!("Omnivore".parse::<Species>().is_err());
        assert_eq!(Species::Carnivore.to_string(), "Carnivore");
    }

    #[test]
    fn test_fitness_formula() {
        let params = herb();
        let animal = Animal::new(Species::Herbivore, 5, 20.0, &params);

        let expected = 1.0 / (1.0 + (0.6f64 * (5.0 - 40.0)).exp())
            * 1.0 / (1.0 + (0.1f64 * (10.0 - 20.0)).exp());
        assert!((animal.fitness() - expected).abs() < 1e-12);
        assert!(animal.fitness() > 0.0 && animal.fitness() < 1.0);
    }

    #[test]
    fn test_fitness_zero_weight() {
        let animal = Animal::new(Species::Herbivore, 5, 0.0, &herb());
        assert_eq!(animal.fitness(), 0.0);

        let animal = Animal::new(Species::Herbivore, 5, -3.0, &herb());
        assert_eq!(animal.fitness(), 0.0);
    }

    #[test]
    fn test_fitness_monotonic() {
        let params = herb();
        let young = Animal::new(Species::Herbivore, 1, 20.0, &params);
        let old = Animal::new(Species::Herbivore, 60, 20.0, &params);
        let light = Animal::new(Species::Herbivore, 1, 5.0, &params);

        assert!(young.fitness() > old.fitness());
        assert!(young.fitness() > light.fitness());
    }

    #[test]
    fn test_feed() {
        let params = herb();
        let mut animal = Animal::new(Species::Herbivore, 5, 20.0, &params);
        let before = animal.fitness();

        animal.feed(10.0, &params);
        assert!((animal.weight() - 29.0).abs() < 1e-12);
        assert!(animal.fitness() > before);
    }

    #[test]
    fn test_age_and_metabolize() {
        let params = herb();
        let mut animal = Animal::new(Species::Herbivore, 7, 35.0, &params);
        animal.age_and_metabolize(&params);

        assert_eq!(animal.age(), 8);
        assert!((animal.weight() - (35.0 - 35.0 * 0.05)).abs() < 1e-12);
    }

    #[test]
    fn test_metabolism_to_zero() {
        let mut params = herb();
        params.eta = 1.0;
        let mut animal = Animal::new(Species::Herbivore, 3, 12.0, &params);
        animal.age_and_metabolize(&params);

        assert_eq!(animal.weight(), 0.0);
        assert_eq!(animal.fitness(), 0.0);
        assert!(animal.decide_death(&params, &mut always_high()));
    }

    #[test]
    fn test_decide_migrate() {
        let mut params = herb();
        let animal = Animal::new(Species::Herbivore, 5, 20.0, &params);

        params.mu = 0.0;
        assert!(!animal.decide_migrate(&params, &mut always_low()));

        params.mu = 1.0;
        assert!(animal.decide_migrate(&params, &mut always_low()));
        assert!(!animal.decide_migrate(&params, &mut always_high()));

        // Propensity large enough to dominate any draw
        params.mu = 1000.0;
        assert!(animal.decide_migrate(&params, &mut always_high()));
    }

    #[test]
    fn test_birth_below_threshold() {
        let params = herb();
        let mut animal = Animal::new(Species::Herbivore, 5, 20.0, &params);

        assert_eq!(animal.attempt_birth(100, &params, &mut always_low()), None);
        assert_eq!(animal.weight(), 20.0);
    }

    #[test]
    fn test_birth_needs_company() {
        let params = herb();
        let mut animal = Animal::new(Species::Herbivore, 5, 50.0, &params);

        // Probability is zero with a single animal in the cell
        assert_eq!(animal.attempt_birth(1, &params, &mut always_low()), None);
        assert_eq!(animal.weight(), 50.0);
    }

    #[test]
    fn test_birth_deducts_parent_weight() {
        let mut params = herb();
        params.gamma = 10.0;
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let mut births = 0;
        for _ in 0..50 {
            let mut animal = Animal::new(Species::Herbivore, 5, 50.0, &params);
            if let Some(birth_weight) = animal.attempt_birth(10, &params, &mut rng) {
                births += 1;
                assert!(birth_weight > 0.0 && birth_weight < 50.0);
                let expected = 50.0 - params.xi * birth_weight;
                assert!((animal.weight() - expected).abs() < 1e-9);
            } else {
                assert_eq!(animal.weight(), 50.0);
            }
        }
        assert!(births > 40);
    }

    #[test]
    fn test_birth_aborted_when_newborn_too_heavy() {
        let mut params = herb();
        params.gamma = 10.0;
        params.zeta = 0.0;
        params.w_birth = 100.0;
        params.sigma_birth = 0.0;

        let mut animal = Animal::new(Species::Herbivore, 5, 50.0, &params);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(animal.attempt_birth(10, &params, &mut rng), None);
        assert_eq!(animal.weight(), 50.0);
    }

    #[test]
    fn test_decide_death() {
        let mut params = herb();
        let fit = Animal::new(Species::Herbivore, 5, 20.0, &params);

        params.omega = 0.0;
        assert!(!fit.decide_death(&params, &mut always_low()));

        params.omega = 1.0;
        assert!(fit.decide_death(&params, &mut always_low()));
        assert!(!fit.decide_death(&params, &mut always_high()));
    }

    #[test]
    fn test_birth_weight_distribution() {
        let params = herb();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let n = 5000;
        let mean = (0..n)
            .map(|_| Animal::draw_birth_weight(&params, &mut rng))
            .sum::<f64>()
            / n as f64;
        assert!((mean - params.w_birth).abs() < 0.1);
    }
}
