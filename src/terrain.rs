//! Terrain kinds and the parsed island map.
//!
//! The island map is a block of equal-length text lines, one character per
//! cell. Every border character must be water so that no animal can leave
//! the grid.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Terrain types
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Terrain {
    Water,
    Lowland,
    Highland,
    Desert,
}

impl Terrain {
    pub const ALL: [Terrain; 4] = [
        Terrain::Water,
        Terrain::Lowland,
        Terrain::Highland,
        Terrain::Desert,
    ];

    /// Parse a map code (`W`, `L`, `H`, `D`)
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'W' => Some(Terrain::Water),
            'L' => Some(Terrain::Lowland),
            'H' => Some(Terrain::Highland),
            'D' => Some(Terrain::Desert),
            _ => None,
        }
    }

    /// Map code for this terrain
    pub fn code(&self) -> char {
        match self {
            Terrain::Water => 'W',
            Terrain::Lowland => 'L',
            Terrain::Highland => 'H',
            Terrain::Desert => 'D',
        }
    }

    /// Can animals live on and migrate into this terrain?
    pub fn is_traversable(&self) -> bool {
        !matches!(self, Terrain::Water)
    }

    /// Fodder available at the start of each year before any update
    pub fn default_capacity(&self) -> f64 {
        match self {
            Terrain::Water => 0.0,
            Terrain::Lowland => 800.0,
            Terrain::Highland => 300.0,
            Terrain::Desert => 0.0,
        }
    }

    /// Get color code for visualization (ANSI)
    pub fn color_code(&self) -> &'static str {
        match self {
            Terrain::Water => "\x1b[34m",    // Blue
            Terrain::Lowland => "\x1b[32m",  // Green
            Terrain::Highland => "\x1b[90m", // Gray
            Terrain::Desert => "\x1b[33m",   // Yellow
        }
    }
}

/// Parsed, validated terrain layout. Rows are stored top to bottom.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainGrid {
    pub grid: Vec<Vec<Terrain>>,
    pub width: usize,
    pub height: usize,
}

impl TerrainGrid {
    /// Parse a multi-line map.
    ///
    /// Leading and trailing whitespace on each line is ignored, as are blank
    /// lines, so indented literals can be passed directly. Reported
    /// coordinates are 1-based `(row, col)`.
    pub fn parse(map: &str) -> Result<Self, ValidationError> {
        let lines: Vec<&str> = map
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        if lines.is_empty() {
            return Err(ValidationError::EmptyMap);
        }

        let width = lines[0].chars().count();
        let height = lines.len();
        let mut grid = Vec::with_capacity(height);

        for (i, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(ValidationError::UnequalRows {
                    row: i + 1,
                    expected: width,
                    found,
                });
            }

            let mut row = Vec::with_capacity(width);
            for (j, code) in line.chars().enumerate() {
                let terrain = Terrain::from_code(code).ok_or(ValidationError::UnknownTerrain {
                    row: i + 1,
                    col: j + 1,
                    code,
                })?;

                let on_boundary = i == 0 || i == height - 1 || j == 0 || j == width - 1;
                if on_boundary && terrain != Terrain::Water {
                    return Err(ValidationError::NonWaterBoundary {
                        row: i + 1,
                        col: j + 1,
                        code,
                    });
                }
                row.push(terrain);
            }
            grid.push(row);
        }

        Ok(Self {
            grid,
            width,
            height,
        })
    }

    /// Terrain at a 1-based `(row, col)`, if inside the grid
    pub fn get(&self, row: usize, col: usize) -> Option<Terrain> {
        if row == 0 || col == 0 {
            return None;
        }
        self.grid.get(row - 1)?.get(col - 1).copied()
    }

    /// Count terrain types
    pub fn terrain_counts(&self) -> HashMap<Terrain, usize> {
        let mut counts = HashMap::new();
        for terrain in self.grid.iter().flatten() {
            *counts.entry(*terrain).or_insert(0) += 1;
        }
        counts
    }

    /// Render back to map codes, one line per row
    pub fn render(&self) -> String {
        self.grid
            .iter()
            .map(|row| row.iter().map(Terrain::code).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_roundtrip() {
        for terrain in Terrain::ALL {
            assert_eq!(Terrain::from_code(terrain.code()), Some(terrain));
        }
        assert_eq!(Terrain::from_code('X'), None);
    }

    #[test]
    fn test_traversable() {
        assert!(!Terrain::Water.is_traversable());
        assert!(Terrain::Lowland.is_traversable());
        assert!(Terrain::Highland.is_traversable());
        assert!(Terrain::Desert.is_traversable());
    }

    #[test]
    fn test_parse_valid_map() {
        let grid = TerrainGrid::parse(
            "WWWW
             WLHW
             WDLW
             WWWW",
        )
        .unwrap();

        assert_eq!(grid.width, 4);
        assert_eq!(grid.height, 4);
        assert_eq!(grid.get(2, 2), Some(Terrain::Lowland));
        assert_eq!(grid.get(2, 3), Some(Terrain::Highland));
        assert_eq!(grid.get(3, 2), Some(Terrain::Desert));
        assert_eq!(grid.get(0, 1), None);
        assert_eq!(grid.get(5, 1), None);

        let counts = grid.terrain_counts();
        assert_eq!(counts[&Terrain::Water], 12);
        assert_eq!(counts[&Terrain::Lowland], 2);
    }

    #[test]
    fn test_parse_unequal_rows() {
        let err = TerrainGrid::parse("WWW\nWLLW\nWWW").unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnequalRows {
                row: 2,
                expected: 3,
                found: 4
            }
        );
    }

    #[test]
    fn test_parse_non_water_boundary() {
        let err = TerrainGrid::parse("WWW\nLLW\nWWW").unwrap_err();
        assert!(matches!(
            err,
            ValidationError::NonWaterBoundary { row: 2, col: 1, .. }
        ));

        // A single interior row not bordered by water
        assert!(TerrainGrid::parse("L").is_err());
    }

    #[test]
    fn test_parse_unknown_code() {
        let err = TerrainGrid::parse("WWW\nWXW\nWWW").unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownTerrain {
                row: 2,
                col: 2,
                code: 'X'
            }
        );
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(TerrainGrid::parse("  \n "), Err(ValidationError::EmptyMap));
    }

    #[test]
    fn test_render() {
        let map = "WWW\nWLW\nWWW";
        assert_eq!(TerrainGrid::parse(map).unwrap().render(), map);
    }
}
