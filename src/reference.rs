//! Time-varying inputs: references and disturbances as functions of the
//! simulated time.

/// A signal evaluated at simulated time `t` (in seconds).
///
/// The simulation engine decides when and how often the signal is sampled,
/// so implementations must be pure functions of `t`.
pub trait TimeFunction {
    fn at(&self, t: f64) -> f64;
}

impl<F> TimeFunction for F
where
    F: Fn(f64) -> f64,
{
    fn at(&self, t: f64) -> f64 {
        self(t)
    }
}

/// Step from zero to `value` after `t0`.
///
/// The comparison is strict: the output is still zero at `t == t0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub t0: f64,
    pub value: f64,
}

impl Step {
    pub fn new(t0: f64, value: f64) -> Self {
        Self { t0, value }
    }
}

impl TimeFunction for Step {
    fn at(&self, t: f64) -> f64 {
        if t > self.t0 {
            self.value
        } else {
            0.
        }
    }
}

/// Boxed signal stored by models and controllers.
pub type Signal = Box<dyn TimeFunction>;

/// The zero signal.
pub fn zero() -> Signal {
    Box::new(|_: f64| 0.)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_is_zero_up_to_and_including_t0() {
        let step = Step::new(0.2, 314.);
        assert_eq!(step.at(0.), 0.);
        assert_eq!(step.at(0.2), 0.);
        assert_eq!(step.at(0.2 + 1e-12), 314.);
        assert_eq!(step.at(1.5), 314.);
    }

    #[test]
    fn closures_are_signals() {
        let ramp: Signal = Box::new(|t: f64| 2. * t);
        assert_eq!(ramp.at(0.25), 0.5);
        assert_eq!(zero().at(10.), 0.);
    }
}
