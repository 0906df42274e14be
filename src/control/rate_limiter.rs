/// Limits the rate of change of a signal.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimiter {
    /// Maximum rate of change (units per second)
    pub limit: f64,
    y: f64,
}

impl RateLimiter {
    pub fn new(limit: f64) -> Self {
        Self { limit, y: 0. }
    }

    pub fn rate_limit(&mut self, t_s: f64, u: f64) -> f64 {
        let rate = (u - self.y) / t_s;

        self.y = if rate > self.limit {
            // Limit rising rate
            self.y + t_s * self.limit
        } else if rate < -self.limit {
            // Limit falling rate
            self.y - t_s * self.limit
        } else {
            u
        };

        self.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_becomes_ramp() {
        let mut limiter = RateLimiter::new(100.);
        assert!((limiter.rate_limit(0.01, 10.) - 1.).abs() < 1e-12);
        assert!((limiter.rate_limit(0.01, 10.) - 2.).abs() < 1e-12);
        assert!((limiter.rate_limit(0.01, -10.) - 1.).abs() < 1e-12);
        // Slow changes pass through
        assert_eq!(limiter.rate_limit(0.01, 1.5), 1.5);
    }
}
