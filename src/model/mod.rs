//! Continuous-time models of the controlled system.

mod converter;
pub use converter::Inverter;

pub mod im;
pub use im::InductionMachine;

mod mechanics;
pub use mechanics::{Mechanics, SpeedFunction};

pub mod pwm;
pub use pwm::{CarrierComparison, Delay};

mod simulation;
pub use simulation::{PlantSample, Simulation, SimulationResult};

use num_complex::Complex64;

/// Feedback signals a controller can measure.
pub trait Model {
    fn phase_currents(&mut self) -> [f64; 3];

    fn dc_bus_voltage(&mut self) -> f64;

    /// Electrical rotor speed (rad/s), if a speed sensor is available.
    fn rotor_speed(&mut self) -> Option<f64> {
        None
    }
}

/// State variables of a [`Drive`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct State {
    pub psi_ss: Complex64,
    pub psi_rs: Complex64,
    pub w_m: f64,
    pub theta_m: f64,
}

impl State {
    /// `self + h * dx`
    pub fn add_scaled(&self, dx: &State, h: f64) -> State {
        State {
            psi_ss: self.psi_ss + h * dx.psi_ss,
            psi_rs: self.psi_rs + h * dx.psi_rs,
            w_m: self.w_m + h * dx.w_m,
            theta_m: self.theta_m + h * dx.theta_m,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.psi_ss.is_finite()
            && self.psi_rs.is_finite()
            && self.w_m.is_finite()
            && self.theta_m.is_finite()
    }
}

/// Induction motor drive: machine, mechanics and converter.
#[derive(Debug)]
pub struct Drive {
    pub machine: InductionMachine,
    pub mechanics: Mechanics,
    pub converter: Inverter,
}

impl Drive {
    pub fn new(machine: InductionMachine, mechanics: Mechanics, converter: Inverter) -> Self {
        Self {
            machine,
            mechanics,
            converter,
        }
    }

    pub fn state(&self) -> State {
        State {
            psi_ss: self.machine.psi_ss,
            psi_rs: self.machine.psi_rs,
            w_m: self.mechanics.w_m,
            theta_m: self.mechanics.theta_m,
        }
    }

    pub fn set_state(&mut self, x: State) {
        self.machine.psi_ss = x.psi_ss;
        self.machine.psi_rs = x.psi_rs;
        self.mechanics.w_m = x.w_m;
        self.mechanics.theta_m = crate::wrap(x.theta_m);
    }

    /// State derivative at time `t` for the present switching state.
    pub fn f(&self, t: f64, x: &State) -> State {
        let u_ss = self.converter.ac_voltage();
        let w_m = self.machine.n_p as f64 * x.w_m;

        let [dpsi_ss, dpsi_rs] = self.machine.f(x.psi_ss, x.psi_rs, u_ss, w_m);
        let (i_ss, _) = self.machine.currents(x.psi_ss, x.psi_rs);
        let tau_m = self.machine.torque(x.psi_ss, i_ss);
        let [dw_m, dtheta_m] = self.mechanics.f(t, x.w_m, tau_m);

        State {
            psi_ss: dpsi_ss,
            psi_rs: dpsi_rs,
            w_m: dw_m,
            theta_m: dtheta_m,
        }
    }
}

impl Model for Drive {
    fn phase_currents(&mut self) -> [f64; 3] {
        self.machine.meas_currents()
    }

    fn dc_bus_voltage(&mut self) -> f64 {
        self.converter.meas_dc_voltage()
    }

    fn rotor_speed(&mut self) -> Option<f64> {
        Some(self.machine.n_p as f64 * self.mechanics.meas_speed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive() -> Drive {
        Drive::new(
            InductionMachine::inv_gamma(3.7, 2.1, 0.021, 0.224, 2),
            Mechanics::new(0.015),
            Inverter::new(540.),
        )
    }

    #[test]
    fn drives_do_not_share_state() {
        let mut a = drive();
        let b = drive();

        a.machine.psi_ss = Complex64::new(1., 0.);
        a.mechanics.w_m = 100.;
        a.converter.q = [1., 0., 0.];

        assert_eq!(b.machine.psi_ss, Complex64::new(0., 0.));
        assert_eq!(b.mechanics.w_m, 0.);
        assert_eq!(b.converter.q, [0.; 3]);
    }

    #[test]
    fn de_energized_drive_is_at_rest() {
        let mut mdl = drive();
        let dx = mdl.f(0., &mdl.state());

        assert_eq!(dx, mdl.state());
        assert_eq!(mdl.phase_currents(), [0.; 3]);
        assert_eq!(mdl.dc_bus_voltage(), 540.);
        assert_eq!(mdl.rotor_speed(), Some(0.));
    }

    #[test]
    fn set_state_wraps_rotor_angle() {
        let mut mdl = drive();
        let mut x = mdl.state();
        x.theta_m = 7.;
        mdl.set_state(x);

        assert!(mdl.mechanics.theta_m < core::f64::consts::PI);
        assert!((mdl.mechanics.theta_m - (7. - 2. * core::f64::consts::PI)).abs() < 1e-12);
    }
}
