use super::{CarrierComparison, Delay, Drive, State};
use crate::{control::ControlSample, Control, SimulationError};
use log::{debug, info};
use num_complex::Complex64;

/// Plant signals recorded at the end of every switching interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlantSample {
    pub t: f64,
    /// Stator current
    pub i_ss: Complex64,
    /// Stator flux
    pub psi_ss: Complex64,
    /// Rotor flux (Γ model)
    pub psi_rs: Complex64,
    /// Stator voltage applied during the preceding interval
    pub u_ss: Complex64,
    /// Switching state applied during the preceding interval
    pub q_abc: [f64; 3],
    pub u_dc: f64,
    /// Mechanical angular speed (rad/s)
    pub w_m: f64,
    /// Mechanical angle (rad)
    pub theta_m: f64,
    /// Electromagnetic torque
    pub tau_m: f64,
    /// Load torque
    pub tau_l: f64,
}

/// Recorded signals of a simulation run.
#[derive(Debug, Clone, Default)]
pub struct SimulationResult {
    pub plant: Vec<PlantSample>,
    pub ctrl: Vec<ControlSample>,
    /// Number of pole pairs of the simulated machine
    pub n_p: u32,
}

impl SimulationResult {
    pub fn is_empty(&self) -> bool {
        self.plant.is_empty() || self.ctrl.is_empty()
    }

    /// Final time of the recorded signals.
    pub fn t_end(&self) -> f64 {
        self.plant.last().map(|s| s.t).unwrap_or(0.)
    }
}

/// Fixed-step simulation of a drive and its digital controller.
pub struct Simulation<C> {
    pub mdl: Drive,
    pub ctrl: C,
    /// Carrier comparison, or `None` to apply the duty ratios as averages
    pub pwm: Option<CarrierComparison>,
    /// Computational delay of the controller
    pub delay: Delay,
    /// Maximum integration step, defaults to an eighth of the sampling period
    pub max_step: Option<f64>,
}

impl<C: Control<Drive>> Simulation<C> {
    pub fn new(mdl: Drive, ctrl: C, pwm: bool) -> Self {
        let pwm = pwm.then(|| CarrierComparison::for_inverter(&mdl.converter));

        Self {
            mdl,
            ctrl,
            pwm,
            delay: Delay::default(),
            max_step: None,
        }
    }

    pub fn max_step(mut self, max_step: f64) -> Self {
        self.max_step = Some(max_step);
        self
    }

    /// Run the simulation until the controller time exceeds `t_stop`.
    pub fn simulate(&mut self, t_stop: f64) -> Result<SimulationResult, SimulationError> {
        if !(t_stop > 0.) {
            return Err(SimulationError::InvalidStopTime(t_stop));
        }
        if let Some(max_step) = self.max_step {
            if !(max_step > 0.) {
                return Err(SimulationError::InvalidStep(max_step));
            }
        }

        info!(
            "simulating {} s (pwm: {}, levels: {})",
            t_stop,
            self.pwm.is_some(),
            self.mdl.converter.n_levels()
        );

        let mut result = SimulationResult {
            n_p: self.mdl.machine.n_p,
            ..Default::default()
        };
        result.plant.push(self.sample(0.));

        let mut t = 0.;
        let mut decile = 1;
        while t <= t_stop {
            // Run the digital controller
            let output = self.ctrl.control(&mut self.mdl);
            let t_s = output.t_s;
            if !(t_s > 0.) {
                return Err(SimulationError::InvalidSamplingPeriod(t_s));
            }
            result.ctrl.push(output.sample);

            // Computational delay, then either switching or averaged voltages
            let d_abc = self.delay.push(output.d_abc_ref);
            let sequence = match &self.pwm {
                Some(pwm) => pwm.compare(t_s, d_abc),
                None => vec![(t_s, d_abc)],
            };

            let max_step = self.max_step.unwrap_or(t_s / 8.);
            let mut t0 = t;
            for (dt, q) in sequence {
                self.mdl.converter.q = q;

                let n = (dt / max_step).ceil().max(1.) as usize;
                let h = dt / n as f64;
                let mut x = self.mdl.state();
                for k in 0..n {
                    x = rk4(&self.mdl, t0 + k as f64 * h, &x, h);
                }
                if !x.is_finite() {
                    return Err(SimulationError::Diverged { t: t0 + dt });
                }
                self.mdl.set_state(x);

                t0 += dt;
                result.plant.push(self.sample(t0));
            }

            t += t_s;
            if t >= decile as f64 * 0.1 * t_stop {
                debug!("t = {:.4} s, w_m = {:.2} rad/s", t, self.mdl.mechanics.w_m);
                decile += 1;
            }
        }

        info!(
            "simulation done: {} plant samples, {} control samples",
            result.plant.len(),
            result.ctrl.len()
        );

        Ok(result)
    }

    fn sample(&self, t: f64) -> PlantSample {
        let machine = &self.mdl.machine;
        let mechanics = &self.mdl.mechanics;
        let i_ss = machine.stator_current();

        PlantSample {
            t,
            i_ss,
            psi_ss: machine.psi_ss,
            psi_rs: machine.psi_rs,
            u_ss: self.mdl.converter.ac_voltage(),
            q_abc: self.mdl.converter.q,
            u_dc: self.mdl.converter.u_dc,
            w_m: mechanics.w_m,
            theta_m: mechanics.theta_m,
            tau_m: machine.torque(machine.psi_ss, i_ss),
            tau_l: mechanics.load_torque(t, mechanics.w_m),
        }
    }
}

/// One classical Runge-Kutta step.
fn rk4(mdl: &Drive, t: f64, x: &State, h: f64) -> State {
    let k1 = mdl.f(t, x);
    let k2 = mdl.f(t + 0.5 * h, &x.add_scaled(&k1, 0.5 * h));
    let k3 = mdl.f(t + 0.5 * h, &x.add_scaled(&k2, 0.5 * h));
    let k4 = mdl.f(t + h, &x.add_scaled(&k3, h));

    x.add_scaled(&k1, h / 6.)
        .add_scaled(&k2, h / 3.)
        .add_scaled(&k3, h / 3.)
        .add_scaled(&k4, h / 6.)
}
