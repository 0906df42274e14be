use crate::reference::{self, Signal};

/// Function of the mechanical angular speed (rad/s).
pub type SpeedFunction = Box<dyn Fn(f64) -> f64>;

/// Rigid rotor with a load torque.
///
/// The load torque is `tau_l_t(t) + tau_l_w(w_m)`. Both functions can be
/// replaced after construction.
pub struct Mechanics {
    /// Total moment of inertia (kgm²)
    pub j: f64,

    /// Viscous friction coefficient (Nm s)
    pub b: f64,

    /// Load torque as a function of time
    pub tau_l_t: Signal,

    /// Load torque as a function of the mechanical speed
    pub tau_l_w: SpeedFunction,

    /// Mechanical angular speed (rad/s)
    pub w_m: f64,

    /// Mechanical angle (rad)
    pub theta_m: f64,
}

impl Mechanics {
    pub fn new(j: f64) -> Self {
        Self {
            j,
            b: 0.,
            tau_l_t: reference::zero(),
            tau_l_w: Box::new(|_| 0.),
            w_m: 0.,
            theta_m: 0.,
        }
    }

    /// Total load torque at time `t` and speed `w_m`.
    pub fn load_torque(&self, t: f64, w_m: f64) -> f64 {
        self.tau_l_t.at(t) + (self.tau_l_w)(w_m)
    }

    /// Derivatives of the speed and the angle.
    pub fn f(&self, t: f64, w_m: f64, tau_m: f64) -> [f64; 2] {
        let tau_l = self.load_torque(t, w_m);

        [(tau_m - self.b * w_m - tau_l) / self.j, w_m]
    }

    pub fn meas_speed(&self) -> f64 {
        self.w_m
    }
}

impl core::fmt::Debug for Mechanics {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Mechanics")
            .field("j", &self.j)
            .field("b", &self.b)
            .field("w_m", &self.w_m)
            .field("theta_m", &self.theta_m)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Step;

    #[test]
    fn load_step_decelerates_free_rotor() {
        let mut mechanics = Mechanics::new(0.015);
        mechanics.tau_l_t = Box::new(Step::new(0.75, 14.6));

        assert_eq!(mechanics.f(0.75, 10., 0.)[0], 0.);
        let [dw_m, dtheta_m] = mechanics.f(0.8, 10., 0.);
        assert!((dw_m + 14.6 / 0.015).abs() < 1e-9);
        assert_eq!(dtheta_m, 10.);
    }

    #[test]
    fn speed_dependent_load_adds_to_time_load() {
        let mut mechanics = Mechanics::new(1.);
        mechanics.tau_l_t = Box::new(|_: f64| 1.);
        mechanics.tau_l_w = Box::new(|w_m| 0.1 * w_m);

        assert!((mechanics.load_torque(0., 20.) - 3.).abs() < 1e-12);
    }
}
