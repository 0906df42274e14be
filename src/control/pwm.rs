use crate::{abc_to_complex, complex_to_abc};
use core::f64::consts::PI;
use num_complex::Complex64;
use num_traits::Zero;

/// Duty ratio references and realized voltage for three-phase PWM.
/// This contains the computation of the duty ratio references and the realized voltage.
/// The digital delay effects are taken into account in the realized voltage.
#[derive(Debug, Clone, PartialEq)]
pub struct Pwm {
    /// Number of converter output levels per phase (2 or 3)
    pub n_levels: usize,
    is_six_step: bool,
    /// Limited stator voltages of the two latest executions, newest first
    u_s_lim_old: [Complex64; 2],
}

impl Default for Pwm {
    fn default() -> Self {
        Self::new(2, false)
    }
}

impl Pwm {
    pub fn new(n_levels: usize, is_six_step: bool) -> Self {
        Self {
            n_levels,
            is_six_step,
            u_s_lim_old: [Zero::zero(); 2],
        }
    }

    /// Stator voltage (in stator coordinates) that was applied during the
    /// sampling period that just ended.
    ///
    /// Due to the one-period computational delay, this is the voltage
    /// computed two executions ago.
    pub fn realized_voltage(&self) -> Complex64 {
        self.u_s_lim_old[1]
    }

    /// Calculate the duty ratios and update the state.
    /// Arguments:
    /// `u_ref` : Voltage reference in synchronous coordinates.
    /// `u_dc` : DC-bus voltage.
    /// `theta` : Angle of synchronous coordinates.
    /// `w` : Angular speed of synchronous coordinates.
    ///
    /// Returns the duty ratios and the limited voltage reference in
    /// synchronous coordinates.
    pub fn duty_ratios(
        &mut self,
        t_s: f64,
        u_ref: Complex64,
        u_dc: f64,
        theta: f64,
        w: f64,
    ) -> ([f64; 3], Complex64) {
        let (d_abc_ref, u_ref_lim, u_s_ref_lim) = self.output(t_s, u_ref, u_dc, theta, w);
        self.update(u_s_ref_lim);

        (d_abc_ref, u_ref_lim)
    }

    /// Calculate the duty ratio limited voltage reference, both in
    /// synchronous and in stator coordinates.
    pub fn output(
        &self,
        t_s: f64,
        u_ref: Complex64,
        u_dc: f64,
        theta: f64,
        w: f64,
    ) -> ([f64; 3], Complex64, Complex64) {
        //  Advance the angle due to the computational delay (T_s) and the ZOH (PWM) delay (0.5*T_s)
        let theta_comp = theta + 1.5 * t_s * w;

        // Voltage reference in stator coordinates
        let mut u_s_ref = Complex64::from_polar(1., theta_comp) * u_ref;

        // Modify angle in the overmodulation region
        if self.is_six_step {
            u_s_ref = six_step_overmodulation(u_s_ref, u_dc);
        }

        // Duty ratios
        let d_abc_ref = duty_ratios(u_s_ref, u_dc, self.n_levels);

        // Realizable voltage
        let u_s_ref_lim = abc_to_complex(d_abc_ref) * u_dc;
        let u_ref_lim = Complex64::from_polar(1., -theta_comp) * u_s_ref_lim;

        (d_abc_ref, u_ref_lim, u_s_ref_lim)
    }

    /// Store the limited stator voltage for the realized voltage estimate.
    pub fn update(&mut self, u_s_ref_lim: Complex64) {
        self.u_s_lim_old = [u_s_ref_lim, self.u_s_lim_old[0]];
    }
}

pub fn six_step_overmodulation(u_s_ref: Complex64, u_dc: f64) -> Complex64 {
    // Limited magnitude
    let r = u_s_ref.norm().min(2. / 3. * u_dc);

    if 3f64.sqrt() * r > u_dc {
        // Angle and sector of the reference vector
        let theta = u_s_ref.arg();
        let sector = (3. * theta / PI).floor();

        // Angle reduced to the first sector (at which sector == 0)
        let mut theta0 = theta - sector * PI / 3.;

        // Intersection angle, see Eq. (9)
        let alpha_g = PI / 6. - (u_dc / (3f64.sqrt() * r)).acos();

        // Modify the angle according to Eq. (4)
        if alpha_g <= theta0 && theta0 <= PI / 6. {
            theta0 = alpha_g;
        } else if PI / 6. <= theta0 && theta0 <= PI / 3. - alpha_g {
            theta0 = PI / 3. - alpha_g;
        }

        // Modified reference voltage
        Complex64::from_polar(r, theta0 + sector * PI / 3.)
    } else {
        u_s_ref
    }
}

/// Calculate the duty ratios for multilevel PWM.
/// This computes the duty ratios using a symmetrical suboscillation method.
/// For two levels, this method is identical to the standard space-vector PWM.
/// For more levels, a second zero-sequence offset centers the phase
/// references within their carrier bands, which is the carrier-based
/// equivalent of multilevel space-vector PWM (Lee, Kim, Hyun, 2000).
///
/// Arguments
/// `u_s_ref`: Voltage reference in stator coordinates.
/// `u_dc` : DC-bus voltage.
/// `n_levels` : Number of output levels per phase.
pub fn duty_ratios(u_s_ref: Complex64, u_dc: f64, n_levels: usize) -> [f64; 3] {
    // Phase voltages without the zero-sequence voltage
    let mut u_abc = complex_to_abc(u_s_ref);

    // Symmetrization by adding the zero-sequence voltage
    let u_0 = 0.5 * (max3(u_abc) + min3(u_abc));
    u_abc = u_abc.map(|u| u - u_0);

    // Preventing overmodulation by means of a minimum phase error method
    let m = (2. / u_dc) * max3(u_abc);
    if m > 1. {
        u_abc = u_abc.map(|u| u / m);
    }

    // Duty ratios
    let mut d_abc = u_abc.map(|u| u / u_dc + 0.5);

    if n_levels > 2 {
        // Center the references within their carrier bands
        let h = 1. / (n_levels - 1) as f64;
        let r_abc = d_abc.map(|d| d.rem_euclid(h));
        let d_0 = 0.5 * h - 0.5 * (max3(r_abc) + min3(r_abc));
        d_abc = d_abc.map(|d| d + d_0);
    }

    d_abc.map(|d| d.clamp(0., 1.))
}

fn max3(x: [f64; 3]) -> f64 {
    x[0].max(x[1]).max(x[2])
}

fn min3(x: [f64; 3]) -> f64 {
    x[0].min(x[1]).min(x[2])
}
