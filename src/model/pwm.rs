use super::Inverter;
use crate::{error::ensure_levels, ConfigError};

/// Carrier comparison for multilevel PWM.
///
/// Each phase compares its duty ratio with `n_levels - 1` level-shifted
/// triangular carriers. Within one sampling period a phase therefore only
/// toggles between two adjacent levels, with the pulse centered in the
/// period so that the currents sampled at the period edges are free of
/// switching ripple.
#[derive(Debug, Clone, PartialEq)]
pub struct CarrierComparison {
    /// Duty ratio resolution (counter steps per sampling period)
    pub n: u32,

    /// Number of output levels per phase, 2 or 3
    n_levels: usize,
}

impl Default for CarrierComparison {
    fn default() -> Self {
        Self {
            n: 1 << 12,
            n_levels: 2,
        }
    }
}

impl CarrierComparison {
    pub fn new(n_levels: usize) -> Result<Self, ConfigError> {
        ensure_levels(n_levels)?;

        Ok(Self {
            n_levels,
            ..Self::default()
        })
    }

    /// Carrier comparison matching the levels of `converter`.
    pub fn for_inverter(converter: &Inverter) -> Self {
        Self {
            n_levels: converter.n_levels(),
            ..Self::default()
        }
    }

    pub fn n_levels(&self) -> usize {
        self.n_levels
    }

    /// Switching sequence for one sampling period.
    ///
    /// Returns `(duration, q_abc)` pairs whose durations sum to `t_s`. The
    /// switching states are per unit of the DC-bus voltage.
    pub fn compare(&self, t_s: f64, d_abc: [f64; 3]) -> Vec<(f64, [f64; 3])> {
        let bands = (self.n_levels - 1) as f64;
        let n = self.n as f64;

        let mut low = [0.; 3];
        let mut on = [0.; 3];
        let mut off = [0.; 3];
        let mut edges: Vec<f64> = Vec::with_capacity(8);
        edges.push(0.);
        for (x, d) in d_abc.into_iter().enumerate() {
            // Quantize to the counter resolution
            let d = ((n * d.clamp(0., 1.)).round() / n) * bands;

            // Carrier band and the fraction of the period spent above it
            let k = d.floor().min(bands - 1.);
            let frac = d - k;

            low[x] = k;
            on[x] = 0.5 * (1. - frac) * t_s;
            off[x] = 0.5 * (1. + frac) * t_s;
            if frac > 0. {
                edges.push(on[x]);
                edges.push(off[x]);
            }
        }
        edges.push(t_s);
        edges.sort_by(f64::total_cmp);
        edges.dedup();

        edges
            .windows(2)
            .filter(|w| w[1] > w[0])
            .map(|w| {
                let mid = 0.5 * (w[0] + w[1]);
                let mut q = [0.; 3];
                for x in 0..3 {
                    let high = on[x] <= mid && mid < off[x];
                    q[x] = (low[x] + if high { 1. } else { 0. }) / bands;
                }
                (w[1] - w[0], q)
            })
            .collect()
    }
}

/// Computational delay of a digital controller, in sampling periods.
#[derive(Debug, Clone, PartialEq)]
pub struct Delay {
    buffer: Vec<[f64; 3]>,
}

impl Default for Delay {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Delay {
    pub fn new(length: usize) -> Self {
        Self {
            buffer: vec![[0.; 3]; length],
        }
    }

    /// Push a new input and return the one from `length` periods ago.
    pub fn push(&mut self, u: [f64; 3]) -> [f64; 3] {
        if self.buffer.is_empty() {
            return u;
        }
        self.buffer.push(u);
        self.buffer.remove(0)
    }
}
