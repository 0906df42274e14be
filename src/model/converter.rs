use crate::{abc_to_complex, error::ensure_levels, ConfigError};
use num_complex::Complex64;

/// Voltage-source inverter with a stiff DC bus.
///
/// Each phase is connected to one of `n_levels` evenly spaced potentials
/// between the negative and positive DC rail.
#[derive(Debug, Clone, PartialEq)]
pub struct Inverter {
    /// DC-bus voltage (V)
    pub u_dc: f64,

    /// Number of output levels per phase, 2 or 3
    n_levels: usize,

    /// Phase potentials relative to the negative rail, per unit of `u_dc`.
    /// These are discrete switching states with PWM and duty ratios
    /// without it.
    pub q: [f64; 3],
}

impl Inverter {
    /// Two-level inverter.
    pub fn new(u_dc: f64) -> Self {
        Self {
            u_dc,
            n_levels: 2,
            q: [0.; 3],
        }
    }

    /// Inverter with 2 or 3 levels per phase.
    pub fn multilevel(u_dc: f64, n_levels: usize) -> Result<Self, ConfigError> {
        ensure_levels(n_levels)?;

        Ok(Self {
            n_levels,
            ..Self::new(u_dc)
        })
    }

    pub fn n_levels(&self) -> usize {
        self.n_levels
    }

    /// Stator voltage space vector for the present switching state.
    pub fn ac_voltage(&self) -> Complex64 {
        self.u_dc * abc_to_complex(self.q)
    }

    pub fn meas_dc_voltage(&self) -> f64 {
        self.u_dc
    }
}
