//! Scenario configuration.
//!
//! [`DemoConfig::default`] reproduces the 2.2-kW, three-level sensorless
//! vector control demo. Any subset of the fields can be overridden from a
//! JSON file.

use crate::{
    base::{BaseValues, Ratings},
    control::{CurrentReferencePars, ModelPars, VectorCtrl},
    error::{ensure_levels, ensure_positive},
    model::{Drive, InductionMachine, Inverter, Mechanics},
    ConfigError, Step,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Machine parameters in either equivalent-circuit form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum MachineConfig {
    /// Inverse-Γ parameters
    InvGamma {
        r_s: f64,
        r_r: f64,
        l_sgm: f64,
        l_m: f64,
    },
    /// Γ parameters
    Gamma {
        r_s: f64,
        r_r: f64,
        l_ell: f64,
        l_s: f64,
    },
}

impl MachineConfig {
    pub fn build(&self, n_p: u32) -> InductionMachine {
        match *self {
            MachineConfig::InvGamma {
                r_s,
                r_r,
                l_sgm,
                l_m,
            } => InductionMachine::inv_gamma(r_s, r_r, l_sgm, l_m, n_p),
            MachineConfig::Gamma {
                r_s,
                r_r,
                l_ell,
                l_s,
            } => InductionMachine::new(r_s, r_r, l_ell, l_s, n_p),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let params = match *self {
            MachineConfig::InvGamma {
                r_s,
                r_r,
                l_sgm,
                l_m,
            } => [("R_s", r_s), ("R_R", r_r), ("L_sgm", l_sgm), ("L_M", l_m)],
            MachineConfig::Gamma {
                r_s,
                r_r,
                l_ell,
                l_s,
            } => [("R_s", r_s), ("R_r", r_r), ("L_ell", l_ell), ("L_s", l_s)],
        };

        params
            .into_iter()
            .try_for_each(|(name, value)| ensure_positive(name, value))
    }
}

/// Runtime configuration for the demo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub ratings: Ratings,
    pub machine: MachineConfig,
    /// Total moment of inertia of the plant (kgm²)
    pub j: f64,
    /// DC-bus voltage (V)
    pub u_dc: f64,
    /// Parameter estimates used by the controller
    pub ctrl: ModelPars,
    /// Maximum stator current (multiple of the base current)
    pub i_s_max: f64,
    /// Sampling period (s)
    pub t_s: f64,
    pub sensorless: bool,
    /// Converter levels per phase (2 or 3)
    pub n_levels: usize,
    /// Time of the speed reference step (s)
    pub speed_step_t: f64,
    /// Speed reference after the step (multiple of the base speed)
    pub speed_step: f64,
    /// Time of the load torque step (s)
    pub load_step_t: f64,
    /// Load torque after the step (multiple of the nominal torque)
    pub load_step: f64,
    /// Simulate the switching instead of averaged voltages
    pub pwm: bool,
    /// Simulation stop time (s)
    pub t_stop: f64,
    /// Time window of the zoomed plot (s)
    pub t_span: (f64, f64),
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            ratings: Ratings {
                u_nom: 400.,
                i_nom: 5.,
                f_nom: 50.,
                tau_nom: 14.6,
                p_nom: 2.2e3,
                n_p: 2,
            },
            machine: MachineConfig::InvGamma {
                r_s: 3.7,
                r_r: 2.1,
                l_sgm: 0.021,
                l_m: 0.224,
            },
            j: 0.015,
            u_dc: 540.,
            ctrl: ModelPars {
                r_s: 3.7,
                r_r: 2.1,
                l_sgm: 0.021,
                l_m: 0.224,
                n_p: 2,
                j: 0.015,
            },
            i_s_max: 1.5,
            t_s: 250e-6,
            sensorless: true,
            n_levels: 3,
            speed_step_t: 0.2,
            speed_step: 1.,
            load_step_t: 0.75,
            load_step: 1.,
            pwm: true,
            t_stop: 1.5,
            t_span: (1.1, 1.14),
        }
    }
}

impl DemoConfig {
    /// Read a configuration from a JSON file and validate it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let cfg: Self = serde_json::from_str(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.ratings;
        ensure_positive("U_nom", r.u_nom)?;
        ensure_positive("I_nom", r.i_nom)?;
        ensure_positive("f_nom", r.f_nom)?;
        ensure_positive("tau_nom", r.tau_nom)?;
        ensure_positive("P_nom", r.p_nom)?;
        ensure_positive("n_p", r.n_p as f64)?;

        self.machine.validate()?;
        ensure_positive("J", self.j)?;
        ensure_positive("u_dc", self.u_dc)?;

        let c = &self.ctrl;
        ensure_positive("ctrl.R_s", c.r_s)?;
        ensure_positive("ctrl.R_R", c.r_r)?;
        ensure_positive("ctrl.L_sgm", c.l_sgm)?;
        ensure_positive("ctrl.L_M", c.l_m)?;
        ensure_positive("ctrl.n_p", c.n_p as f64)?;
        ensure_positive("ctrl.J", c.j)?;

        ensure_positive("i_s_max", self.i_s_max)?;
        ensure_positive("T_s", self.t_s)?;
        ensure_levels(self.n_levels)?;
        ensure_positive("t_stop", self.t_stop)?;
        ensure_positive("t_span width", self.t_span.1 - self.t_span.0)?;

        Ok(())
    }

    pub fn base(&self) -> BaseValues {
        BaseValues::from_ratings(&self.ratings)
    }

    /// Plant model with the load torque step attached.
    pub fn drive(&self) -> Result<Drive, ConfigError> {
        self.validate()?;
        let base = self.base();

        let machine = self.machine.build(self.ratings.n_p);
        let mut mechanics = Mechanics::new(self.j);
        mechanics.tau_l_t = Box::new(Step::new(
            self.load_step_t,
            self.load_step * base.tau_nom,
        ));
        let converter = Inverter::multilevel(self.u_dc, self.n_levels)?;

        Ok(Drive::new(machine, mechanics, converter))
    }

    /// Vector controller with the speed reference step attached.
    pub fn controller(&self) -> Result<VectorCtrl, ConfigError> {
        self.validate()?;
        let base = self.base();

        let pars = CurrentReferencePars::new(&self.ctrl, self.i_s_max * base.i, base.u, base.w);
        let mut ctrl = VectorCtrl::new(self.ctrl, pars, self.t_s, self.sensorless, self.n_levels)?;
        ctrl.w_m_ref = Box::new(Step::new(self.speed_step_t, self.speed_step * base.w));

        Ok(ctrl)
    }

    /// Plant and controller of the scenario.
    pub fn build(&self) -> Result<(Drive, VectorCtrl), ConfigError> {
        Ok((self.drive()?, self.controller()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TimeFunction;
    use approx::assert_relative_eq;

    #[test]
    fn default_is_valid() {
        assert!(DemoConfig::default().validate().is_ok());
    }

    #[test]
    fn gamma_form_matches_inverse_gamma() {
        let inv = MachineConfig::InvGamma {
            r_s: 3.7,
            r_r: 2.1,
            l_sgm: 0.021,
            l_m: 0.224,
        }
        .build(2);
        let gamma = MachineConfig::Gamma {
            r_s: 3.7,
            r_r: 2.5,
            l_ell: 0.023,
            l_s: 0.245,
        }
        .build(2);

        assert_relative_eq!(inv.l_s, gamma.l_s, max_relative = 1e-12);
        assert_relative_eq!(inv.l_ell, gamma.l_ell, max_relative = 1e-2);
        assert_relative_eq!(inv.r_r, gamma.r_r, max_relative = 1e-2);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let cfg = DemoConfig {
            n_levels: 5,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Levels(5))));

        let cfg = DemoConfig {
            t_s: -1.,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NonPositive { name: "T_s", .. })
        ));

        let cfg = DemoConfig {
            machine: MachineConfig::Gamma {
                r_s: 3.7,
                r_r: 0.,
                l_ell: 0.023,
                l_s: 0.245,
            },
            ..Default::default()
        };
        assert!(cfg.build().is_err());
    }

    #[test]
    fn steps_are_attached() {
        let cfg = DemoConfig::default();
        let base = cfg.base();
        let (drive, ctrl) = cfg.build().unwrap();

        assert_eq!(ctrl.w_m_ref.at(0.2), 0.);
        assert_eq!(ctrl.w_m_ref.at(0.21), base.w);
        assert_eq!(drive.mechanics.tau_l_t.at(0.75), 0.);
        assert_eq!(drive.mechanics.tau_l_t.at(0.76), 14.6);
        assert_eq!(drive.converter.n_levels(), 3);
    }

    #[test]
    fn partial_json_overrides_defaults() {
        let cfg: DemoConfig = serde_json::from_str(
            r#"{
                "n_levels": 2,
                "machine": { "model": "gamma", "r_s": 3.7, "r_r": 2.5, "l_ell": 0.023, "l_s": 0.245 }
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.n_levels, 2);
        assert!(matches!(cfg.machine, MachineConfig::Gamma { .. }));
        assert_eq!(cfg.t_stop, 1.5);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = DemoConfig::from_file("/nonexistent/motorsim.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
