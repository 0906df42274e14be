use super::ModelPars;
use crate::wrap;
use core::f64::consts::PI;
use num_complex::Complex64;
use num_traits::Zero;

/// Reduced-order flux observer in estimated rotor flux coordinates.
///
/// The rotor flux is estimated from the voltage model (stator voltage
/// equation), corrected towards the current model (rotor equation) by the
/// gain `k`. In sensorless mode the gain depends on the speed estimate,
/// which is the low-pass filtered difference of the flux angular speed and
/// the slip; otherwise the measured speed is used.
#[derive(Debug, Clone, PartialEq)]
pub struct Observer {
    par: ModelPars,

    /// Weight of the current model with a speed sensor, between 0 and 1
    pub g: f64,

    /// Bandwidth of the speed estimate (rad/s)
    pub alpha_o: f64,

    /// Flux magnitude used instead of smaller estimates in divisions
    pub psi_min: f64,

    /// Rotor flux magnitude estimate
    pub psi_r: f64,

    /// Angle of the rotor flux estimate
    pub theta_s: f64,

    /// Angular speed of the rotor flux estimate
    pub w_s: f64,

    /// Electrical rotor speed, estimated or measured
    pub w_m: f64,

    i_ss_old: Complex64,
}

impl Observer {
    pub fn new(par: ModelPars, psi_r_nom: f64) -> Self {
        Self {
            par,
            g: 0.5,
            alpha_o: 2. * PI * 40.,
            psi_min: 0.1 * psi_r_nom,
            psi_r: 0.,
            theta_s: 0.,
            w_s: 0.,
            w_m: 0.,
            i_ss_old: Complex64::zero(),
        }
    }

    /// Sensorless observer gain at the electrical rotor speed `w_m`.
    pub fn gain(&self, w_m: f64) -> Complex64 {
        let alpha = self.par.alpha();

        (0.5 * alpha + 0.2 * w_m.abs()) / Complex64::new(alpha, -w_m)
    }

    /// Update the estimates over the sampling period that just ended.
    ///
    /// `u_ss` is the stator voltage applied during the period and `i_ss` the
    /// stator current sampled at its end, both in stator coordinates.
    /// `w_m` is the measured electrical rotor speed, if available.
    pub fn update(&mut self, t_s: f64, u_ss: Complex64, i_ss: Complex64, w_m: Option<f64>) {
        let ModelPars { r_s, r_r, l_sgm, .. } = self.par;
        let alpha = self.par.alpha();

        // Back-EMF from the voltage model, rotated to the flux coordinates
        // at the middle of the period
        let i_avg = 0.5 * (i_ss + self.i_ss_old);
        let e_s = u_ss - r_s * i_avg - l_sgm * (i_ss - self.i_ss_old) / t_s;
        let rot = Complex64::from_polar(1., -(self.theta_s + 0.5 * t_s * self.w_s));
        let e_v = rot * e_s;
        let i_s = rot * i_avg;

        let sensorless = w_m.is_none();
        let (w_m, k) = match w_m {
            Some(w_m) => (w_m, Complex64::new(self.g, 0.)),
            None => (self.w_m, self.gain(self.w_m)),
        };

        // Back-EMF from the current model
        let e_c = r_r * i_s - Complex64::new(alpha, -w_m) * self.psi_r;
        let e = e_v + k * (e_c - e_v);

        let psi_r = self.psi_r.max(self.psi_min);
        self.w_s = e.im / psi_r;
        self.w_m = if sensorless {
            // Flux angular speed minus the slip
            let w_r = r_r * i_s.im / psi_r;
            w_m + t_s * self.alpha_o * (self.w_s - w_r - w_m)
        } else {
            w_m
        };
        self.psi_r = (self.psi_r + t_s * e.re).max(0.);
        self.theta_s = wrap(self.theta_s + t_s * self.w_s);
        self.i_ss_old = i_ss;
    }

    /// Estimated rotor flux in stator coordinates.
    pub fn psi_rs(&self) -> Complex64 {
        Complex64::from_polar(self.psi_r, self.theta_s)
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
    fn dc_current_builds_flux_along_current() {
        let mut observer = Observer::new(par(), 0.95);
        let i_ss = Complex64::new(4., 0.);
        let t_s = 250e-6;

        for _ in 0..8000 {
            // Steady DC magnetization: only the resistive drop
            observer.update(t_s, 3.7 * i_ss, i_ss, Some(0.));
        }
        // psi_R = L_M i_sd in steady state
        assert_abs_diff_eq!(observer.psi_r, 0.224 * 4., epsilon = 1e-3);
        assert_abs_diff_eq!(observer.theta_s, 0., epsilon = 1e-9);
    }

    #[test]
    fn sensorless_speed_follows_back_emf() {
        let mut observer = Observer::new(par(), 0.95);
        let t_s = 250e-6;
        let (psi_r, w_s) = (0.9, 100.);

        // Rotating no-load operating point: i_s = psi_R/L_M along the flux
        let i_s = psi_r / 0.224;
        let psi_s = psi_r + 0.021 * i_s;
        observer.psi_r = psi_r;
        observer.i_ss_old = Complex64::from_polar(i_s, -w_s * t_s);
        for k in 0..8000 {
            let theta = w_s * k as f64 * t_s;
            // Voltage averaged over the period, at its midpoint angle
            let theta_mid = theta - 0.5 * w_s * t_s;
            let u_ss = Complex64::from_polar(3.7 * i_s, theta_mid)
                + Complex64::i() * w_s * Complex64::from_polar(psi_s, theta_mid);
            observer.update(t_s, u_ss, Complex64::from_polar(i_s, theta), None);
        }
        assert_abs_diff_eq!(observer.w_m, w_s, epsilon = 2.);
        assert_abs_diff_eq!(observer.w_s, w_s, epsilon = 2.);
        assert_abs_diff_eq!(observer.psi_r, psi_r, epsilon = 0.05);
    }

    #[test]
    fn sensorless_speed_excludes_slip_under_load() {
        let mut observer = Observer::new(par(), 0.95);
        let t_s = 250e-6;
        let (psi_r, w_s) = (0.9, 100.);

        // Torque-producing current: the rotor lags the flux by the slip
        let i_s = Complex64::new(psi_r / 0.224, 3.);
        let psi_s = psi_r + 0.021 * i_s;
        observer.psi_r = psi_r;
        observer.i_ss_old = Complex64::from_polar(1., -w_s * t_s) * i_s;
        for k in 0..8000 {
            let theta = w_s * k as f64 * t_s;
            let rot_mid = Complex64::from_polar(1., theta - 0.5 * w_s * t_s);
            let u_ss = rot_mid * (3.7 * i_s + Complex64::i() * w_s * psi_s);
            observer.update(t_s, u_ss, Complex64::from_polar(1., theta) * i_s, None);
        }
        assert_abs_diff_eq!(observer.w_s, w_s, epsilon = 0.1);
        assert_abs_diff_eq!(observer.w_m, w_s - 2.1 * 3. / psi_r, epsilon = 0.1);
        assert_abs_diff_eq!(observer.psi_r, psi_r, epsilon = 1e-3);
    }

    #[test]
    fn sensorless_gain_weights_current_model_at_standstill() {
        let observer = Observer::new(par(), 0.95);

        assert_abs_diff_eq!(observer.gain(0.).re, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(observer.gain(0.).im, 0., epsilon = 1e-12);
        // Mostly the voltage model at high speed
        assert!(observer.gain(314.).norm() < 0.25);
        assert!(observer.gain(314.).im > 0.);
        assert!(observer.gain(-314.).im < 0.);
    }
}
