//! Data export for analysis in external tools.

use crate::animal::Species;
use crate::island::Island;
use crate::stats::StatsHistory;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Result, Write};
use std::path::Path;

/// Export system for saving simulation data
pub struct ExportSystem;

/// Per-cell counts of both species at one point in time
#[derive(Serialize)]
struct GridSnapshot {
    year: u32,
    herbivores: Vec<Vec<usize>>,
    carnivores: Vec<Vec<usize>>,
}

impl ExportSystem {
    /// Export recorded yearly counts to CSV
    pub fn export_counts_csv<P: AsRef<Path>>(history: &StatsHistory, path: P) -> Result<()> {
        let mut file = BufWriter::new(File::create(path)?);

        writeln!(file, "year,herbivores,carnivores")?;
        for stats in &history.snapshots {
            writeln!(file, "{},{},{}", stats.year, stats.herbivores, stats.carnivores)?;
        }

        file.flush()
    }

    /// Export every living animal to CSV
    pub fn export_animals_csv<P: AsRef<Path>>(island: &Island, path: P) -> Result<()> {
        let mut file = BufWriter::new(File::create(path)?);

        writeln!(file, "species,age,weight,fitness")?;
        for cell in island.cells() {
            for species in Species::ALL {
                for animal in cell.animals(species) {
                    writeln!(
                        file,
                        "{},{},{:.4},{:.4}",
                        species,
                        animal.age(),
                        animal.weight(),
                        animal.fitness(),
                    )?;
                }
            }
        }

        file.flush()
    }

    /// Export per-cell population grids to JSON
    pub fn export_grid_json<P: AsRef<Path>>(island: &Island, path: P) -> Result<()> {
        let snapshot = GridSnapshot {
            year: island.year(),
            herbivores: island.grid_snapshot(Species::Herbivore),
            carnivores: island.grid_snapshot(Species::Carnivore),
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(path, json)
    }
}
