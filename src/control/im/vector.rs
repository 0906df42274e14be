use super::{CurrentReference, CurrentReferencePars, ModelPars, Observer};
use crate::{
    abc_to_complex,
    control::{ComplexPiCtrl, ControlSample, Output, PiCtrl, Pwm},
    error::{ensure_levels, ensure_positive},
    reference::{self, Signal},
    ConfigError, Control, Model,
};
use core::f64::consts::PI;
use num_complex::Complex64;

/// Vector control for induction motor drives.
///
/// The stator current is controlled in estimated rotor flux coordinates, the
/// speed by a 2DOF PI controller producing the torque reference. The flux
/// orientation comes from [`Observer`], which also estimates the rotor speed
/// in sensorless mode.
pub struct VectorCtrl {
    /// Controller model parameters.
    pub par: ModelPars,

    /// Sampling period (s).
    pub t_s: f64,

    /// Estimate the rotor speed instead of measuring it.
    pub sensorless: bool,

    /// Speed reference (electrical rad/s) as a function of time.
    pub w_m_ref: Signal,

    pub speed_ctrl: PiCtrl,

    pub current_ctrl: ComplexPiCtrl,

    pub current_ref: CurrentReference,

    pub observer: Observer,

    /// PWM duty cycle control.
    pub pwm: Pwm,

    /// Time of the next execution.
    t: f64,
}

impl VectorCtrl {
    pub fn new(
        par: ModelPars,
        pars: CurrentReferencePars,
        t_s: f64,
        sensorless: bool,
        n_levels: usize,
    ) -> Result<Self, ConfigError> {
        ensure_positive("T_s", t_s)?;
        ensure_levels(n_levels)?;

        // Speed control bandwidth
        let alpha_s = 2. * PI * 4.;
        // Current control bandwidth
        let alpha_c = 2. * PI * 200.;

        Ok(Self {
            par,
            t_s,
            sensorless,
            w_m_ref: reference::zero(),
            speed_ctrl: PiCtrl::new(
                2. * alpha_s * par.j,
                alpha_s.powi(2) * par.j,
                alpha_s * par.j,
                f64::INFINITY,
            ),
            current_ctrl: ComplexPiCtrl::new(
                2. * alpha_c * par.l_sgm,
                alpha_c.powi(2) * par.l_sgm,
                alpha_c * par.l_sgm,
                par.l_sgm,
            ),
            current_ref: CurrentReference::new(par, pars),
            observer: Observer::new(par, pars.psi_r_nom),
            pwm: Pwm::new(n_levels, false),
            t: 0.,
        })
    }

    /// Time of the next controller execution.
    pub fn t(&self) -> f64 {
        self.t
    }
}

impl<M: Model> Control<M> for VectorCtrl {
    fn control(&mut self, model: &mut M) -> Output {
        let t_s = self.t_s;
        let n_p = self.par.n_p as f64;

        // Measure the feedback signals
        let i_ss = abc_to_complex(model.phase_currents());
        let u_dc = model.dc_bus_voltage();
        let w_m_meas = if self.sensorless {
            None
        } else {
            model.rotor_speed()
        };

        // Flux and speed estimates over the period that just ended
        self.observer
            .update(t_s, self.pwm.realized_voltage(), i_ss, w_m_meas);
        let psi_r = self.observer.psi_r;
        let theta_s = self.observer.theta_s;
        let w_s = self.observer.w_s;
        let w_m = self.observer.w_m;

        // Current vector in estimated rotor flux coordinates
        let i_s = Complex64::from_polar(1., -theta_s) * i_ss;

        // Torque reference from the speed controller (mechanical speeds)
        let w_m_ref = self.w_m_ref.at(self.t);
        let tau_m_ref = self.speed_ctrl.output(w_m_ref / n_p, w_m / n_p);

        // Current reference and the torque it realizes
        let (i_s_ref, tau_m) = self.current_ref.output(tau_m_ref, psi_r);

        // Voltage reference
        let u_s_ref = self.current_ctrl.output(i_s_ref, i_s, w_s);

        // Compute the duty ratios
        let (d_abc_ref, u_s_ref_lim) = self.pwm.duty_ratios(t_s, u_s_ref, u_dc, theta_s, w_s);

        // Update the states
        self.speed_ctrl.update(t_s, tau_m);
        self.current_ctrl.update(t_s, u_s_ref_lim);
        self.current_ref.update(t_s, u_s_ref, u_dc);

        let sample = ControlSample {
            t: self.t,
            w_m_ref,
            w_m,
            i_s_ref,
            i_s,
            u_s_ref,
            psi: psi_r,
            tau_m_ref,
            theta_s,
            w_s,
            u_dc,
            d_abc_ref,
        };
        self.t += t_s;

        Output {
            t_s,
            d_abc_ref,
            sample,
        }
    }
}
