//! Yearly population statistics.

use crate::animal::{Attribute, Species};
use crate::island::{Island, YearEvents};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Statistics snapshot taken after a year
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct YearStats {
    /// Years simulated when the snapshot was taken
    pub year: u32,
    pub herbivores: usize,
    pub carnivores: usize,
    pub herbivore_weight_mean: f64,
    pub carnivore_weight_mean: f64,
    pub herbivore_fitness_mean: f64,
    pub carnivore_fitness_mean: f64,
    pub herbivore_age_mean: f64,
    pub carnivore_age_mean: f64,
    /// Food left on the island after the year
    pub total_food: f64,
    pub births: usize,
    pub kills: usize,
    pub migrations: usize,
    pub deaths: usize,
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl YearStats {
    /// Capture the current state of an island
    pub fn capture(island: &Island, events: YearEvents) -> Self {
        let mean_of = |species, attribute| mean(&island.attribute_list(species, attribute));

        Self {
            year: island.year(),
            herbivores: island.total(Species::Herbivore),
            carnivores: island.total(Species::Carnivore),
            herbivore_weight_mean: mean_of(Species::Herbivore, Attribute::Weight),
            carnivore_weight_mean: mean_of(Species::Carnivore, Attribute::Weight),
            herbivore_fitness_mean: mean_of(Species::Herbivore, Attribute::Fitness),
            carnivore_fitness_mean: mean_of(Species::Carnivore, Attribute::Fitness),
            herbivore_age_mean: mean_of(Species::Herbivore, Attribute::Age),
            carnivore_age_mean: mean_of(Species::Carnivore, Attribute::Age),
            total_food: island.cells().map(|c| c.food_available()).sum(),
            births: events.births,
            kills: events.kills,
            migrations: events.migrations,
            deaths: events.deaths,
        }
    }

    pub fn population(&self) -> usize {
        self.herbivores + self.carnivores
    }

    pub fn count(&self, species: Species) -> usize {
        match species {
            Species::Herbivore => self.herbivores,
            Species::Carnivore => self.carnivores,
        }
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "Y:{:5} | Herb:{:6} | Carn:{:6} | W:{:5.1}/{:5.1} | Fit:{:.2}/{:.2} | Births:{} Kills:{} Deaths:{}",
            self.year,
            self.herbivores,
            self.carnivores,
            self.herbivore_weight_mean,
            self.carnivore_weight_mean,
            self.herbivore_fitness_mean,
            self.carnivore_fitness_mean,
            self.births,
            self.kills,
            self.deaths,
        )
    }
}

/// Recorded yearly snapshots
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsHistory {
    pub snapshots: Vec<YearStats>,
    /// Record every `interval` years
    pub interval: u32,
}

impl StatsHistory {
    pub fn new(interval: u32) -> Self {
        Self {
            snapshots: Vec::new(),
            interval: interval.max(1),
        }
    }

    /// Whether a snapshot is due for this year
    pub fn should_record(&self, year: u32) -> bool {
        year % self.interval.max(1) == 0
    }

    pub fn record(&mut self, stats: YearStats) {
        self.snapshots.push(stats);
    }

    pub fn latest(&self) -> Option<&YearStats> {
        self.snapshots.last()
    }

    /// (year, count) pairs for one species
    pub fn population_series(&self, species: Species) -> Vec<(u32, usize)> {
        self.snapshots
            .iter()
            .map(|s| (s.year, s.count(species)))
            .collect()
    }

    /// Save history as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Load history from JSON
    pub fn load(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
