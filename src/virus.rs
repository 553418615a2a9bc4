use serde::{Deserialize, Serialize};

use crate::error::SimulationError;

/// An immutable description of the infectious agent being simulated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Virus {
    name: String,
    transmission_probability: f64,
    mortality_probability: f64,
}

impl Virus {
    /// Creates a virus after checking both probabilities lie in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if the name is empty or either probability is outside
    /// `[0, 1]` (NaN included).
    pub fn new(
        name: impl Into<String>,
        transmission_probability: f64,
        mortality_probability: f64,
    ) -> Result<Self, SimulationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SimulationError::ConfigurationError(
                "virus name must not be empty".to_string(),
            ));
        }
        check_probability("transmission probability", transmission_probability)?;
        check_probability("mortality probability", mortality_probability)?;
        Ok(Virus {
            name,
            transmission_probability,
            mortality_probability,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Probability that a single interaction with a susceptible person infects them.
    #[must_use]
    pub fn transmission_probability(&self) -> f64 {
        self.transmission_probability
    }

    /// Probability that an infected person dies when their infection is resolved.
    #[must_use]
    pub fn mortality_probability(&self) -> f64 {
        self.mortality_probability
    }
}

pub(crate) fn check_probability(label: &str, value: f64) -> Result<(), SimulationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimulationError::ConfigurationError(format!(
            "{label} must be within [0, 1], got {value}"
        )))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn creates_virus() {
        let virus = Virus::new("HIV", 0.8, 0.3).unwrap();
        assert_eq!(virus.name(), "HIV");
        assert_eq!(virus.transmission_probability(), 0.8);
        assert_eq!(virus.mortality_probability(), 0.3);
    }

    #[test]
    fn boundary_probabilities_are_valid() {
        assert!(Virus::new("Ebola", 0.0, 1.0).is_ok());
        assert!(Virus::new("Ebola", 1.0, 0.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range_probabilities() {
        assert!(matches!(
            Virus::new("Flu", 1.5, 0.1),
            Err(SimulationError::ConfigurationError(_))
        ));
        assert!(matches!(
            Virus::new("Flu", 0.5, -0.1),
            Err(SimulationError::ConfigurationError(_))
        ));
        assert!(Virus::new("Flu", f64::NAN, 0.1).is_err());
    }

    #[test]
    fn rejects_empty_name() {
        assert!(Virus::new("  ", 0.5, 0.5).is_err());
    }
}
