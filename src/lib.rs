//! Continuous-time simulation of induction motor drives with discrete-time
//! control.
//!
//! The plant ([`model`]) is integrated between sampling instants while the
//! controller ([`control`]) runs once per sampling period, the way it would
//! on a microcontroller.

use num_complex::Complex64;

pub mod base;
pub use base::BaseValues;

pub mod config;

pub mod control;
pub use control::Control;

pub mod error;
pub use error::{ConfigError, Error, SimulationError};

pub mod export;

pub mod hal;

pub mod model;
pub use model::{Model, Simulation, SimulationResult};

pub mod plot;
pub use plot::{plot, plot_extra};

pub mod reference;
pub use reference::{Step, TimeFunction};

/// Convert a space vector to phase quantities (zero-sequence omitted).
pub fn complex_to_abc(u: Complex64) -> [f64; 3] {
    [
        u.re,
        0.5 * (-u.re + 3f64.sqrt() * u.im),
        0.5 * (-u.re - 3f64.sqrt() * u.im),
    ]
}

/// Convert phase quantities to a space vector (peak-value scaled).
pub fn abc_to_complex(u: [f64; 3]) -> Complex64 {
    Complex64::new(
        (2. / 3.) * u[0] - (u[1] + u[2]) / 3.,
        (u[1] - u[2]) / 3f64.sqrt(),
    )
}

/// Wrap an angle into [-pi, pi).
pub fn wrap(theta: f64) -> f64 {
    use core::f64::consts::PI;

    (theta + PI).rem_euclid(2. * PI) - PI
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use core::f64::consts::PI;

    #[test]
    fn space_vector_roundtrip_drops_zero_sequence() {
        let u = abc_to_complex([1.5, -0.25, 0.75]);
        let u_abc = complex_to_abc(u);
        // Zero-sequence component (2/3) is removed
        assert_abs_diff_eq!(u_abc[0], 1.5 - 2. / 3., epsilon = 1e-12);
        assert_abs_diff_eq!(u_abc[1], -0.25 - 2. / 3., epsilon = 1e-12);
        assert_abs_diff_eq!(u_abc[2], 0.75 - 2. / 3., epsilon = 1e-12);
    }

    #[test]
    fn balanced_set_maps_to_rotating_vector() {
        let theta: f64 = 0.3;
        let u_abc = [
            theta.cos(),
            (theta - 2. * PI / 3.).cos(),
            (theta + 2. * PI / 3.).cos(),
        ];
        let u = abc_to_complex(u_abc);
        assert_abs_diff_eq!(u.norm(), 1., epsilon = 1e-12);
        assert_abs_diff_eq!(u.arg(), theta, epsilon = 1e-12);
    }

    #[test]
    fn wrap_limits_to_half_open_interval() {
        assert_abs_diff_eq!(wrap(3. * PI / 2.), -PI / 2., epsilon = 1e-12);
        assert_abs_diff_eq!(wrap(PI), -PI, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap(-PI), -PI, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap(0.5), 0.5, epsilon = 1e-12);
    }
}
