//! Discrete-time control systems.

use crate::Model;
use num_complex::Complex64;

pub mod im;
pub use im::{CurrentReferencePars, ModelPars, VectorCtrl, VhzCtrl};

mod pi;
pub use pi::{ComplexPiCtrl, PiCtrl};

pub mod pwm;
pub use pwm::Pwm;

mod rate_limiter;
pub use rate_limiter::RateLimiter;

pub trait Control<M: Model> {
    /// Measure the feedback signals and calculate the 3-phase PWM duty
    /// ratios for the next sampling period.
    fn control(&mut self, model: &mut M) -> Output;
}

/// Result of one controller execution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Output {
    /// Sampling period until the next execution
    pub t_s: f64,
    /// Duty ratio references
    pub d_abc_ref: [f64; 3],
    /// Internal signals for post-processing
    pub sample: ControlSample,
}

/// Controller signals recorded at every sampling instant.
///
/// Vector quantities are in the controller's synchronous coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlSample {
    pub t: f64,
    /// Speed reference (electrical rad/s)
    pub w_m_ref: f64,
    /// Speed used by the controller, measured or estimated (electrical rad/s)
    pub w_m: f64,
    pub i_s_ref: Complex64,
    pub i_s: Complex64,
    pub u_s_ref: Complex64,
    /// Flux magnitude used for the orientation
    pub psi: f64,
    pub tau_m_ref: f64,
    /// Angle of the synchronous coordinates
    pub theta_s: f64,
    /// Angular speed of the synchronous coordinates
    pub w_s: f64,
    pub u_dc: f64,
    pub d_abc_ref: [f64; 3],
}
