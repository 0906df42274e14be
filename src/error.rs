//! Error types shared across the crate.

use thiserror::Error;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The hardware motor was asked to drive its outputs while disarmed.
    #[error("motor is not armed")]
    NotArmed,
    /// A duty ratio could not be converted to the peripheral's duty type.
    #[error("duty ratio {0} is not representable by the PWM peripheral")]
    Duty(f64),
}

/// Errors raised while running a simulation.
#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error("stop time must be positive, got {0}")]
    InvalidStopTime(f64),
    #[error("integration step must be positive, got {0}")]
    InvalidStep(f64),
    #[error("sampling period must be positive, got {0}")]
    InvalidSamplingPeriod(f64),
    /// A state variable became NaN or infinite.
    #[error("solution diverged at t = {t} s")]
    Diverged { t: f64 },
}

/// Errors raised while validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("unsupported number of converter levels: {0} (expected 2 or 3)")]
    Levels(usize),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Check that a parameter is finite and strictly positive.
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0. {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

/// Check that a converter level count is supported.
pub(crate) fn ensure_levels(n_levels: usize) -> Result<(), ConfigError> {
    match n_levels {
        2 | 3 => Ok(()),
        n => Err(ConfigError::Levels(n)),
    }
}
