//! Ordering of the yearly phases.
//!
//! Each phase runs across the whole grid before the next one starts. The
//! default order is: forage, hunt, reproduce, emigrate, immigrate, age, die.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// One grid-wide step of the yearly cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Forage,
    Hunt,
    Reproduce,
    Emigrate,
    Immigrate,
    Age,
    Die,
}

impl Phase {
    pub const CANONICAL: [Phase; 7] = [
        Phase::Forage,
        Phase::Hunt,
        Phase::Reproduce,
        Phase::Emigrate,
        Phase::Immigrate,
        Phase::Age,
        Phase::Die,
    ];
}

/// Validated phase order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Phase>", into = "Vec<Phase>")]
pub struct YearCycle {
    phases: Vec<Phase>,
}

impl Default for YearCycle {
    fn default() -> Self {
        Self {
            phases: Phase::CANONICAL.to_vec(),
        }
    }
}

impl YearCycle {
    /// Every phase must appear exactly once, and immigration must directly
    /// follow emigration so no animal is left in a buffer between phases.
    pub fn new(phases: Vec<Phase>) -> Result<Self, ValidationError> {
        for phase in Phase::CANONICAL {
            let n = phases.iter().filter(|&&p| p == phase).count();
            if n != 1 {
                return Err(ValidationError::InvalidCycle(format!(
                    "phase {:?} appears {} times",
                    phase, n
                )));
            }
        }

        let emigrate = phases.iter().position(|&p| p == Phase::Emigrate);
        let immigrate = phases.iter().position(|&p| p == Phase::Immigrate);
        match (emigrate, immigrate) {
            (Some(e), Some(i)) if i == e + 1 => Ok(Self { phases }),
            _ => Err(ValidationError::InvalidCycle(
                "immigrate must directly follow emigrate".to_string(),
            )),
        }
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }
}

impl TryFrom<Vec<Phase>> for YearCycle {
    type Error = ValidationError;

    fn try_from(phases: Vec<Phase>) -> Result<Self, Self::Error> {
        Self::new(phases)
    }
}

impl From<YearCycle> for Vec<Phase> {
    fn from(cycle: YearCycle) -> Self {
        cycle.phases
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_canonical() {
        assert_eq!(YearCycle::default().phases(), &Phase::CANONICAL);
    }

    #[test]
    fn test_alternative_order() {
        let cycle = YearCycle::new(vec![
            Phase::Forage,
            Phase::Hunt,
            Phase::Emigrate,
            Phase::Immigrate,
            Phase::Reproduce,
            Phase::Die,
            Phase::Age,
        ])
        .unwrap();
        assert_eq!(cycle.phases()[2], Phase::Emigrate);
    }

    #[test]
    fn test_rejects_missing_phase() {
        let err = YearCycle::new(vec![Phase::Forage, Phase::Emigrate, Phase::Immigrate]).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidCycle(_)));
    }

    #[test]
    fn test_rejects_duplicate_phase() {
        let mut phases = Phase::CANONICAL.to_vec();
        phases.push(Phase::Forage);
        assert!(YearCycle::new(phases).is_err());
    }

    #[test]
    fn test_rejects_split_migration() {
        let phases = vec![
            Phase::Emigrate,
            Phase::Forage,
            Phase::Immigrate,
            Phase::Hunt,
            Phase::Reproduce,
            Phase::Age,
            Phase::Die,
        ];
        assert!(YearCycle::new(phases).is_err());
    }

    #[test]
    fn test_yaml() {
        let cycle: YearCycle =
            serde_yaml::from_str("[forage, hunt, reproduce, emigrate, immigrate, age, die]").unwrap();
        assert_eq!(cycle, YearCycle::default());

        let bad: Result<YearCycle, _> = serde_yaml::from_str("[forage]");
        assert!(bad.is_err());
    }
}
