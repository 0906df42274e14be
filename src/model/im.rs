use crate::complex_to_abc;
use num_complex::Complex64;
use num_traits::Zero;

/// Induction machine using the Γ-equivalent circuit.
///
/// Fluxes are the state variables and are expressed in stator coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct InductionMachine {
    /// Stator resistance
    pub r_s: f64,

    /// Rotor resistance
    pub r_r: f64,

    /// Leakage inductance
    pub l_ell: f64,

    /// Stator inductance
    pub l_s: f64,

    /// Number of pole pairs
    pub n_p: u32,

    /// Stator flux
    pub psi_ss: Complex64,

    /// Rotor flux
    pub psi_rs: Complex64,
}

impl InductionMachine {
    pub fn new(r_s: f64, r_r: f64, l_ell: f64, l_s: f64, n_p: u32) -> Self {
        Self {
            r_s,
            r_r,
            l_ell,
            l_s,
            n_p,
            psi_ss: Complex64::zero(),
            psi_rs: Complex64::zero(),
        }
    }

    /// Create the machine from its inverse-Γ parameters.
    pub fn inv_gamma(r_s: f64, r_rr: f64, l_sgm: f64, l_m: f64, n_p: u32) -> Self {
        let gamma = l_m / (l_m + l_sgm);

        Self::new(
            r_s,
            r_rr / gamma.powi(2),
            l_sgm / gamma,
            l_m + l_sgm,
            n_p,
        )
    }

    /// Stator and rotor currents for the given fluxes.
    pub fn currents(&self, psi_ss: Complex64, psi_rs: Complex64) -> (Complex64, Complex64) {
        let i_rs = (psi_rs - psi_ss) / self.l_ell;
        let i_ss = psi_ss / self.l_s - i_rs;

        (i_ss, i_rs)
    }

    /// Electromagnetic torque.
    pub fn torque(&self, psi_ss: Complex64, i_ss: Complex64) -> f64 {
        1.5 * self.n_p as f64 * (psi_ss.conj() * i_ss).im
    }

    /// Flux derivatives for the stator voltage `u_ss` and the electrical
    /// rotor speed `w_m`.
    pub fn f(
        &self,
        psi_ss: Complex64,
        psi_rs: Complex64,
        u_ss: Complex64,
        w_m: f64,
    ) -> [Complex64; 2] {
        let (i_ss, i_rs) = self.currents(psi_ss, psi_rs);

        let dpsi_ss = u_ss - self.r_s * i_ss;
        let dpsi_rs = -self.r_r * i_rs + Complex64::i() * w_m * psi_rs;

        [dpsi_ss, dpsi_rs]
    }

    /// Stator current of the present state.
    pub fn stator_current(&self) -> Complex64 {
        self.currents(self.psi_ss, self.psi_rs).0
    }

    /// Phase currents, as a current sensor would see them.
    pub fn meas_currents(&self) -> [f64; 3] {
        complex_to_abc(self.stator_current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn inverse_gamma_matches_gamma_parameters() {
        let machine = InductionMachine::inv_gamma(3.7, 2.1, 0.021, 0.224, 2);

        assert_abs_diff_eq!(machine.l_s, 0.245, epsilon = 1e-12);
        assert_abs_diff_eq!(machine.l_ell, 0.023, epsilon = 1e-3);
        assert_abs_diff_eq!(machine.r_r, 2.5, epsilon = 0.02);
    }

    #[test]
    fn steady_magnetization_draws_magnetizing_current() {
        let mut machine = InductionMachine::new(3.7, 2.5, 0.023, 0.245, 2);
        machine.psi_ss = Complex64::new(1., 0.);
        machine.psi_rs = Complex64::new(1., 0.);

        let i_ss = machine.stator_current();
        assert_abs_diff_eq!(i_ss.re, 1. / 0.245, epsilon = 1e-12);
        assert_abs_diff_eq!(i_ss.im, 0., epsilon = 1e-12);
        assert_abs_diff_eq!(machine.torque(machine.psi_ss, i_ss), 0., epsilon = 1e-12);

        // No rotor current, so the rotor flux is at rest at standstill
        let [_, dpsi_rs] = machine.f(machine.psi_ss, machine.psi_rs, Complex64::zero(), 0.);
        assert_abs_diff_eq!(dpsi_rs.norm(), 0., epsilon = 1e-12);
    }

    #[test]
    fn stator_flux_leading_rotor_flux_motors() {
        let machine = InductionMachine::new(3.7, 2.5, 0.023, 0.245, 2);
        let psi_ss = Complex64::new(1., 0.05);
        let psi_rs = Complex64::new(0.95, 0.);

        let (i_ss, _) = machine.currents(psi_ss, psi_rs);
        assert!(machine.torque(psi_ss, i_ss) > 0.);
    }
}
