use super::ModelPars;
use crate::{
    abc_to_complex,
    control::{ControlSample, Output, Pwm, RateLimiter},
    error::{ensure_levels, ensure_positive},
    reference::{self, Signal},
    wrap, ConfigError, Control, Model,
};
use core::f64::consts::PI;
use num_complex::Complex64;
use num_traits::Zero;

pub struct Builder {
    par: ModelPars,
    psi_s_nom: f64,
    k_u: f64,
    k_w: f64,
    t_s: f64,
    n_levels: usize,
    six_step: bool,
}

impl Builder {
    /// Nominal stator flux (Vs).
    pub fn psi_s_nom(mut self, psi_s_nom: f64) -> Self {
        self.psi_s_nom = psi_s_nom;
        self
    }

    /// Gain of the current feedback (0 for open loop).
    pub fn k_u(mut self, k_u: f64) -> Self {
        self.k_u = k_u;
        self
    }

    /// Gain of the slip frequency feedback.
    pub fn k_w(mut self, k_w: f64) -> Self {
        self.k_w = k_w;
        self
    }

    pub fn t_s(mut self, t_s: f64) -> Self {
        self.t_s = t_s;
        self
    }

    pub fn n_levels(mut self, n_levels: usize) -> Self {
        self.n_levels = n_levels;
        self
    }

    pub fn six_step(mut self, six_step: bool) -> Self {
        self.six_step = six_step;
        self
    }

    pub fn build(self) -> Result<VhzCtrl, ConfigError> {
        ensure_positive("T_s", self.t_s)?;
        ensure_positive("psi_s_nom", self.psi_s_nom)?;
        ensure_levels(self.n_levels)?;

        let par = self.par;
        let w_rb = par.r_r * (par.l_m + par.l_sgm) / (par.l_sgm * par.l_m);

        Ok(VhzCtrl {
            par,
            t_s: self.t_s,
            w_m_ref: reference::zero(),
            rate_limiter: RateLimiter::new(2. * PI * 120.),
            pwm: Pwm::new(self.n_levels, self.six_step),
            psi_s_ref: self.psi_s_nom,
            k_u: self.k_u,
            k_w: self.k_w,
            alpha_i: 0.1 * w_rb,
            alpha_f: 0.1 * w_rb,
            i_s_ref: Complex64::zero(),
            w_r_ref: 0.,
            theta_s: 0.,
            t: 0.,
        })
    }
}

/// V/Hz control for induction motor drives.
///
/// Open-loop frequency control with slip compensation and current feedback
/// damping. No speed measurement is needed.
pub struct VhzCtrl {
    /// Controller model parameters.
    pub par: ModelPars,

    /// Sampling period.
    pub t_s: f64,

    /// Speed reference (electrical rad/s) as a function of time.
    pub w_m_ref: Signal,

    /// Frequency reference rate limiter.
    pub rate_limiter: RateLimiter,

    /// PWM duty cycle control.
    pub pwm: Pwm,

    /// Reference stator flux
    pub psi_s_ref: f64,

    pub k_u: f64,

    pub k_w: f64,

    /// Bandwidth of the stator current low-pass filter.
    alpha_i: f64,

    /// Bandwidth of the slip frequency low-pass filter.
    alpha_f: f64,

    /// Low-pass filtered stator current
    i_s_ref: Complex64,

    /// Low-pass filtered slip frequency
    w_r_ref: f64,

    /// Angle of the synchronous coordinates
    theta_s: f64,

    t: f64,
}

impl VhzCtrl {
    pub fn builder(par: ModelPars, psi_s_nom: f64) -> Builder {
        Builder {
            par,
            psi_s_nom,
            k_u: 1.,
            k_w: 4.,
            t_s: 250e-6,
            n_levels: 2,
            six_step: false,
        }
    }

    /// Calculate the dynamic stator frequency (used in the coordinate
    /// transformations) and the slip frequency.
    pub fn stator_freq(&self, w_s_ref: f64, i_s: Complex64) -> (f64, f64) {
        // Operating-point quantities
        let psi_r_ref = self.psi_s_ref - self.par.l_sgm * self.i_s_ref;
        let psi_r_ref_sqr = psi_r_ref.norm_sqr();

        // Compute the dynamic stator frequency
        if psi_r_ref_sqr > 0. {
            // Slip estimate based on the measured current
            let w_r = self.par.r_r * (i_s * psi_r_ref.conj()).im / psi_r_ref_sqr;
            // Dynamic frequency
            let w_s = w_s_ref + self.k_w * (self.w_r_ref - w_r);

            (w_s, w_r)
        } else {
            (0., 0.)
        }
    }

    /// Calculate the stator voltage reference.
    pub fn voltage_reference(&self, w_s: f64, i_s: Complex64) -> Complex64 {
        let ModelPars {
            r_s, r_r, l_sgm, l_m, ..
        } = self.par;

        // Nominal magnetizing current
        let i_sd_nom = self.psi_s_ref / (l_m + l_sgm);

        // Operating-point current for RI compensation
        let i_s_ref0 = Complex64::new(i_sd_nom, self.i_s_ref.im);

        // Term -R_s omitted to avoid problems due to the voltage saturation
        // k = -R_s + k_u*L_sgm*(alpha + 1j*w_m0)
        let k = self.k_u * l_sgm * Complex64::new(r_r / l_m, w_s);

        r_s * i_s_ref0 + Complex64::new(0., w_s) * self.psi_s_ref + k * (self.i_s_ref - i_s)
    }
}

impl<M: Model> Control<M> for VhzCtrl {
    fn control(&mut self, model: &mut M) -> Output {
        let t_s = self.t_s;
        let i_s_abc = model.phase_currents();
        let u_dc = model.dc_bus_voltage();

        // Rate limit the frequency reference
        let w_m_ref = self.w_m_ref.at(self.t);
        let w_m_lim = self.rate_limiter.rate_limit(t_s, w_m_ref);

        // Space vector transformation
        let i_s = Complex64::from_polar(1., -self.theta_s) * abc_to_complex(i_s_abc);

        // Slip compensation
        let w_s_ref = w_m_lim + self.w_r_ref;

        // Dynamic stator frequency and slip frequency
        let (w_s, w_r) = self.stator_freq(w_s_ref, i_s);

        // Voltage reference
        let u_s_ref = self.voltage_reference(w_s, i_s);

        // Compute the duty ratios
        let (d_abc_ref, _) = self
            .pwm
            .duty_ratios(t_s, u_s_ref, u_dc, self.theta_s, w_s);

        let sample = ControlSample {
            t: self.t,
            w_m_ref,
            w_m: w_m_lim,
            i_s_ref: self.i_s_ref,
            i_s,
            u_s_ref,
            psi: self.psi_s_ref,
            tau_m_ref: 0.,
            theta_s: self.theta_s,
            w_s,
            u_dc,
            d_abc_ref,
        };

        // Update the states
        self.i_s_ref += t_s * self.alpha_i * (i_s - self.i_s_ref);
        self.w_r_ref += t_s * self.alpha_f * (w_r - self.w_r_ref);
        self.theta_s = wrap(self.theta_s + t_s * w_s);
        self.t += t_s;

        Output {
            t_s,
            d_abc_ref,
            sample,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn par() -> ModelPars {
        ModelPars {
            r_s: 3.7,
            r_r: 2.1,
            l_sgm: 0.021,
            l_m: 0.224,
            n_p: 2,
            j: 0.015,
        }
    }

    #[test]
    fn no_load_voltage_is_back_emf_plus_resistive_drop() {
        let ctrl = VhzCtrl::builder(par(), 1.04).build().unwrap();
        let i_sd_nom = 1.04 / 0.245;

        // At the no-load operating point the current feedback is inactive
        let u_s_ref = ctrl.voltage_reference(314., Complex64::zero());
        assert_abs_diff_eq!(u_s_ref.re, 3.7 * i_sd_nom, epsilon = 1e-9);
        assert_abs_diff_eq!(u_s_ref.im, 314. * 1.04, epsilon = 1e-9);
    }

    #[test]
    fn slip_is_compensated_from_torque_current() {
        let ctrl = VhzCtrl::builder(par(), 1.04).k_w(0.).build().unwrap();
        let i_s = Complex64::new(4., 5.);

        let (w_s, w_r) = ctrl.stator_freq(300., i_s);
        assert_abs_diff_eq!(w_r, 2.1 * 5. / 1.04, epsilon = 1e-9);
        assert_eq!(w_s, 300.);
    }

    #[test]
    fn reference_is_rate_limited() {
        let mut ctrl = VhzCtrl::builder(par(), 1.04).build().unwrap();
        ctrl.w_m_ref = Box::new(|_: f64| 314.);

        struct Idle;
        impl Model for Idle {
            fn phase_currents(&mut self) -> [f64; 3] {
                [0.; 3]
            }
            fn dc_bus_voltage(&mut self) -> f64 {
                540.
            }
        }

        let output = ctrl.control(&mut Idle);
        assert_abs_diff_eq!(output.sample.w_m, 250e-6 * 2. * PI * 120., epsilon = 1e-9);
        assert_eq!(output.sample.w_m_ref, 314.);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        assert!(VhzCtrl::builder(par(), 1.04).n_levels(4).build().is_err());
        assert!(VhzCtrl::builder(par(), 1.04).t_s(0.).build().is_err());
    }
}
