//! Source-term kinetics
//!
//! Rate laws attached to nodes through
//! [`SourceTerms`](crate::solver::SourceTerms). Positive rates inject, negative
//! rates consume. Each model provides its analytic slope so the Picard loop can
//! linearize it by the tangent at the latest iterate.
//!
//! | Model                 | `rate(x)`               |
//! |-----------------------|-------------------------|
//! | [`ConstantRate`]      | `r`                     |
//! | [`LinearKinetics`]    | `A1·x + A2`             |
//! | [`PowerLaw`]          | `A1·x^A2 + A3`          |
//! | [`NaturalExponential`]| `A1·exp(A2·x) + A3`     |

use crate::physics::SourceModel;

fn check_finite(name: &str, values: &[f64]) {
    assert!(
        values.iter().all(|v| v.is_finite()),
        "{} coefficients must be finite, got {:?}",
        name,
        values
    );
}

// =================================================================================================
// Constant rate
// =================================================================================================

/// Fixed injection or withdrawal, independent of the local value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantRate {
    rate: f64,
}

impl ConstantRate {
    /// # Panics
    ///
    /// Panics if `rate` is not finite.
    pub fn new(rate: f64) -> Self {
        check_finite("ConstantRate", &[rate]);
        Self { rate }
    }
}

impl SourceModel for ConstantRate {
    fn rate(&self, _x: f64) -> f64 {
        self.rate
    }

    fn slope(&self, _x: f64) -> f64 {
        0.0
    }

    fn is_linear(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "constant_rate"
    }
}

// =================================================================================================
// Linear kinetics
// =================================================================================================

/// First-order kinetics `A1·x + A2`
///
/// A negative `A1` is a first-order sink (e.g. a surface reaction).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearKinetics {
    a1: f64,
    a2: f64,
}

impl LinearKinetics {
    /// # Panics
    ///
    /// Panics if a coefficient is not finite.
    pub fn new(a1: f64, a2: f64) -> Self {
        check_finite("LinearKinetics", &[a1, a2]);
        Self { a1, a2 }
    }
}

impl SourceModel for LinearKinetics {
    fn rate(&self, x: f64) -> f64 {
        self.a1 * x + self.a2
    }

    fn slope(&self, _x: f64) -> f64 {
        self.a1
    }

    fn is_linear(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "linear_kinetics"
    }
}

// =================================================================================================
// Power law
// =================================================================================================

/// n-th order kinetics `A1·x^A2 + A3`
///
/// With `A3 = 0` this is the standard kinetics `k·x^n`. Negative `x` values
/// are clamped to zero before evaluation so fractional orders stay real.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLaw {
    a1: f64,
    a2: f64,
    a3: f64,
}

impl PowerLaw {
    /// # Panics
    ///
    /// Panics if a coefficient is not finite.
    pub fn new(a1: f64, a2: f64, a3: f64) -> Self {
        check_finite("PowerLaw", &[a1, a2, a3]);
        Self { a1, a2, a3 }
    }

    /// Standard kinetics `prefactor · x^order`
    pub fn standard(prefactor: f64, order: f64) -> Self {
        Self::new(prefactor, order, 0.0)
    }
}

impl SourceModel for PowerLaw {
    fn rate(&self, x: f64) -> f64 {
        self.a1 * x.max(0.0).powf(self.a2) + self.a3
    }

    fn slope(&self, x: f64) -> f64 {
        if self.a2 == 0.0 {
            return 0.0;
        }
        // may be infinite at x = 0 for orders below one
        self.a1 * self.a2 * x.max(0.0).powf(self.a2 - 1.0)
    }

    fn is_linear(&self) -> bool {
        self.a2 == 0.0 || self.a2 == 1.0
    }

    fn name(&self) -> &str {
        "power_law"
    }
}

// =================================================================================================
// Natural exponential
// =================================================================================================

/// Exponential kinetics `A1·exp(A2·x) + A3`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NaturalExponential {
    a1: f64,
    a2: f64,
    a3: f64,
}

impl NaturalExponential {
    /// # Panics
    ///
    /// Panics if a coefficient is not finite.
    pub fn new(a1: f64, a2: f64, a3: f64) -> Self {
        check_finite("NaturalExponential", &[a1, a2, a3]);
        Self { a1, a2, a3 }
    }
}

impl SourceModel for NaturalExponential {
    fn rate(&self, x: f64) -> f64 {
        self.a1 * (self.a2 * x).exp() + self.a3
    }

    fn slope(&self, x: f64) -> f64 {
        self.a1 * self.a2 * (self.a2 * x).exp()
    }

    fn is_linear(&self) -> bool {
        self.a1 == 0.0 || self.a2 == 0.0
    }

    fn name(&self) -> &str {
        "natural_exponential"
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::Linearization;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_kinetics_linearization_is_exact() {
        let model = LinearKinetics::new(-2.0, 0.5);
        let lin = model.linearize(10.0);
        assert_eq!(lin, Linearization::new(0.5, -2.0));
        assert!(model.is_linear());
    }

    #[test]
    fn test_constant_rate() {
        let lin = ConstantRate::new(3.0).linearize(42.0);
        assert_eq!(lin, Linearization::new(3.0, 0.0));
    }

    #[test]
    fn test_power_law_tangent() {
        let model = PowerLaw::standard(-1.0, 2.0);
        let lin = model.linearize(3.0);
        assert_relative_eq!(lin.a1, -6.0);
        assert_relative_eq!(lin.a0, 9.0);
        assert_relative_eq!(lin.evaluate(3.0), model.rate(3.0));
    }

    #[test]
    fn test_power_law_fractional_order_at_zero() {
        let model = PowerLaw::new(-1.0, 0.5, 0.0);
        let lin = model.linearize(0.0);
        assert!(lin.a0.is_finite());
        assert!(lin.a1.is_finite());
    }

    #[test]
    fn test_power_law_clamps_negative_values() {
        let model = PowerLaw::new(1.0, 0.5, 1.0);
        assert_relative_eq!(model.rate(-4.0), 1.0);
    }

    #[test]
    fn test_natural_exponential_tangent() {
        let model = NaturalExponential::new(2.0, -1.0, 0.5);
        let lin = model.linearize(0.0);
        assert_relative_eq!(lin.a1, -2.0);
        assert_relative_eq!(lin.a0, 2.5);
        assert!(!model.is_linear());
    }

    #[test]
    #[should_panic(expected = "coefficients must be finite")]
    fn test_non_finite_coefficient_panics() {
        LinearKinetics::new(f64::NAN, 0.0);
    }
}
