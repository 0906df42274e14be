//! Control of induction machines.

use core::f64::consts::PI;
use serde::{Deserialize, Serialize};

mod current_ref;
pub use current_ref::CurrentReference;

mod observer;
pub use observer::Observer;

mod vector;
pub use vector::VectorCtrl;

mod vhz;
pub use vhz::VhzCtrl;

/// Inverse-Γ model parameters used by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPars {
    /// Stator resistance
    pub r_s: f64,
    /// Rotor resistance
    pub r_r: f64,
    /// Leakage inductance
    pub l_sgm: f64,
    /// Magnetizing inductance
    pub l_m: f64,
    /// Number of pole pairs
    pub n_p: u32,
    /// Total moment of inertia
    pub j: f64,
}

impl ModelPars {
    /// Inverse rotor time constant.
    pub fn alpha(&self) -> f64 {
        self.r_r / self.l_m
    }

    /// Stator inductance.
    pub fn l_s(&self) -> f64 {
        self.l_m + self.l_sgm
    }
}

/// Nominal values and limits for the current reference generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentReferencePars {
    /// Maximum stator current (peak)
    pub i_s_max: f64,
    /// Nominal stator voltage (peak)
    pub u_s_nom: f64,
    /// Nominal stator angular frequency
    pub w_s_nom: f64,
    /// Nominal rotor flux
    pub psi_r_nom: f64,
    /// Voltage utilization factor for field weakening
    pub k_u: f64,
    /// Field-weakening integral gain (A/Vs)
    pub k_fw: f64,
}

impl CurrentReferencePars {
    pub fn new(par: &ModelPars, i_s_max: f64, u_s_nom: f64, w_s_nom: f64) -> Self {
        Self {
            i_s_max,
            u_s_nom,
            w_s_nom,
            psi_r_nom: par.l_m / par.l_s() * u_s_nom / w_s_nom,
            k_u: 0.95,
            k_fw: 2. * PI * 2. / (w_s_nom * par.l_s()),
        }
    }

    /// Nominal magnetizing current.
    pub fn i_sd_nom(&self, par: &ModelPars) -> f64 {
        self.psi_r_nom / par.l_m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn nominal_flux_from_voltage_and_frequency() {
        let par = ModelPars {
            r_s: 3.7,
            r_r: 2.1,
            l_sgm: 0.021,
            l_m: 0.224,
            n_p: 2,
            j: 0.015,
        };
        let base = crate::BaseValues::new(400., 5., 50., 14.6, 2.2e3, 2);
        let pars = CurrentReferencePars::new(&par, 1.5 * base.i, base.u, base.w);

        assert_relative_eq!(pars.psi_r_nom, 0.224 / 0.245 * base.psi, max_relative = 1e-12);
        assert_relative_eq!(pars.i_sd_nom(&par), pars.psi_r_nom / 0.224);
        assert!(pars.i_sd_nom(&par) < pars.i_s_max);
    }
}
