use super::{CurrentReferencePars, ModelPars};
use log::debug;
use num_complex::Complex64;

/// Current reference generation in rotor flux coordinates.
///
/// The flux-producing current is reduced by an integral controller when the
/// voltage reference exceeds the available voltage (field weakening). The
/// torque-producing current is limited by the maximum current and by the
/// breakdown torque of the machine.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentReference {
    par: ModelPars,
    pub pars: CurrentReferencePars,
    i_sd_ref: f64,
    i_sd_min: f64,
    i_sd_max: f64,
    weakening: bool,
}

impl CurrentReference {
    pub fn new(par: ModelPars, pars: CurrentReferencePars) -> Self {
        let i_sd_max = pars.i_sd_nom(&par).min(pars.i_s_max);

        Self {
            par,
            pars,
            i_sd_ref: i_sd_max,
            i_sd_min: 0.2 * i_sd_max,
            i_sd_max,
            weakening: false,
        }
    }

    /// Flux-producing current reference.
    pub fn i_sd_ref(&self) -> f64 {
        self.i_sd_ref
    }

    /// Stator current reference and the torque it produces.
    ///
    /// `psi_r` is the (estimated) rotor flux magnitude.
    pub fn output(&self, tau_m_ref: f64, psi_r: f64) -> (Complex64, f64) {
        let psi_r = psi_r.max(0.1 * self.pars.psi_r_nom);
        let k_tau = 1.5 * self.par.n_p as f64 * psi_r;
        let i_sd = self.i_sd_ref;

        // Current limit and breakdown torque limit
        let i_sq_max = (self.pars.i_s_max.powi(2) - i_sd.powi(2))
            .max(0.)
            .sqrt()
            .min(self.par.l_s() / self.par.l_sgm * i_sd);
        let i_sq = (tau_m_ref / k_tau).clamp(-i_sq_max, i_sq_max);

        (Complex64::new(i_sd, i_sq), k_tau * i_sq)
    }

    /// Field-weakening update.
    ///
    /// `u_s_ref` is the unlimited voltage reference and `u_dc` the
    /// measured DC-bus voltage.
    pub fn update(&mut self, t_s: f64, u_s_ref: Complex64, u_dc: f64) {
        let u_s_max = self.pars.k_u * u_dc / 3f64.sqrt();

        self.i_sd_ref += t_s * self.pars.k_fw * (u_s_max - u_s_ref.norm());
        self.i_sd_ref = self.i_sd_ref.clamp(self.i_sd_min, self.i_sd_max);

        let weakening = self.i_sd_ref < self.i_sd_max;
        if weakening != self.weakening {
            debug!(
                "field weakening {} (i_sd_ref = {:.3} A)",
                if weakening { "engaged" } else { "released" },
                self.i_sd_ref
            );
            self.weakening = weakening;
        }
    }
}
