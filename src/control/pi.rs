use num_complex::Complex64;
use num_traits::Zero;

/// 2DOF PI controller with anti-windup.
///
/// `u = k_t*r - k_p*y + u_i`, where the integral state is updated with the
/// realized (limited) output so it never winds up. With `k_t = k_p` this is
/// the ordinary PI controller.
#[derive(Debug, Clone, PartialEq)]
pub struct PiCtrl {
    pub k_p: f64,
    pub k_i: f64,
    pub k_t: f64,

    /// Output limit
    pub u_max: f64,

    u_i: f64,
    y: f64,
}

impl PiCtrl {
    pub fn new(k_p: f64, k_i: f64, k_t: f64, u_max: f64) -> Self {
        Self {
            k_p,
            k_i,
            k_t,
            u_max,
            u_i: 0.,
            y: 0.,
        }
    }

    /// Limited controller output.
    pub fn output(&mut self, r: f64, y: f64) -> f64 {
        self.y = y;
        let u = self.k_t * r - self.k_p * y + self.u_i;

        u.clamp(-self.u_max, self.u_max)
    }

    /// Update the integral state with the output that was actually realized.
    pub fn update(&mut self, t_s: f64, u_lim: f64) {
        let alpha_i = self.k_i / self.k_t;
        self.u_i += t_s * alpha_i * (u_lim - self.u_i + (self.k_p - self.k_t) * self.y);
    }
}

/// Complex-vector 2DOF PI controller for synchronous coordinates.
///
/// `u = k_t*r - (k_p - j*w*k_w)*y + u_i`, where the `k_w` term decouples the
/// cross-coupling of the controlled first-order plant.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexPiCtrl {
    pub k_p: f64,
    pub k_i: f64,
    pub k_t: f64,

    /// Cross-coupling compensation gain
    pub k_w: f64,

    u_i: Complex64,
    y: Complex64,
    w: f64,
}

impl ComplexPiCtrl {
    pub fn new(k_p: f64, k_i: f64, k_t: f64, k_w: f64) -> Self {
        Self {
            k_p,
            k_i,
            k_t,
            k_w,
            u_i: Complex64::zero(),
            y: Complex64::zero(),
            w: 0.,
        }
    }

    fn k_p_eff(&self) -> Complex64 {
        Complex64::new(self.k_p, -self.w * self.k_w)
    }

    /// Unlimited controller output. `w` is the angular speed of the
    /// coordinates.
    pub fn output(&mut self, r: Complex64, y: Complex64, w: f64) -> Complex64 {
        self.y = y;
        self.w = w;

        self.k_t * r - self.k_p_eff() * y + self.u_i
    }

    pub fn update(&mut self, t_s: f64, u_lim: Complex64) {
        let alpha_i = self.k_i / self.k_t;
        let k = self.k_p_eff() - self.k_t;
        self.u_i += t_s * alpha_i * (u_lim - self.u_i + k * self.y);
    }
}
