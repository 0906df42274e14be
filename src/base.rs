use core::f64::consts::PI;
use serde::{Deserialize, Serialize};

/// Nominal ratings of a drive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ratings {
    /// Line-to-line rms voltage (V).
    pub u_nom: f64,
    /// Rms current (A).
    pub i_nom: f64,
    /// Frequency (Hz).
    pub f_nom: f64,
    /// Torque (Nm).
    pub tau_nom: f64,
    /// Power (W).
    pub p_nom: f64,
    /// Number of pole pairs.
    pub n_p: u32,
}

/// Base values for per-unit scaling.
///
/// Voltages and currents are peak-value scaled, so a balanced nominal
/// operating point has a space vector of magnitude 1 p.u.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseValues {
    /// Base voltage (V, peak phase).
    pub u: f64,
    /// Base current (A, peak phase).
    pub i: f64,
    /// Base angular frequency (rad/s, electrical).
    pub w: f64,
    /// Base flux linkage (Vs).
    pub psi: f64,
    /// Base power (W).
    pub p: f64,
    /// Base impedance (Ohm).
    pub z: f64,
    /// Base inductance (H).
    pub l: f64,
    /// Base torque (Nm).
    pub tau: f64,
    /// Nominal torque (Nm).
    pub tau_nom: f64,
    /// Nominal power (W).
    pub p_nom: f64,
    /// Number of pole pairs.
    pub n_p: u32,
}

impl BaseValues {
    pub fn new(u_nom: f64, i_nom: f64, f_nom: f64, tau_nom: f64, p_nom: f64, n_p: u32) -> Self {
        let u = (2. / 3f64).sqrt() * u_nom;
        let i = 2f64.sqrt() * i_nom;
        let w = 2. * PI * f_nom;
        let p = 1.5 * u * i;
        let z = u / i;

        Self {
            u,
            i,
            w,
            psi: u / w,
            p,
            z,
            l: z / w,
            tau: n_p as f64 * p / w,
            tau_nom,
            p_nom,
            n_p,
        }
    }

    pub fn from_ratings(ratings: &Ratings) -> Self {
        Self::new(
            ratings.u_nom,
            ratings.i_nom,
            ratings.f_nom,
            ratings.tau_nom,
            ratings.p_nom,
            ratings.n_p,
        )
    }

    /// Base mechanical angular speed (rad/s).
    pub fn w_mech(&self) -> f64 {
        self.w / self.n_p as f64
    }
}
