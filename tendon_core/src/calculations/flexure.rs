//! # Ultimate-Moment Prestress Estimate
//!
//! First-pass sizing of the prestress force needed to carry a factored
//! moment, using a rectangular concrete stress block and ignoring mild
//! reinforcement:
//!
//! ```text
//! x = h0 − √(h0² − 2·M / (α1·fcd·b))
//! F = α1·fcd·b·x
//! ```
//!
//! `h0` runs from the compression fiber to the tendon resultant. This is an
//! estimate for choosing a starting strand count, not a capacity check.

use serde::{Deserialize, Serialize};

use crate::calculations::envelope::Side;
use crate::errors::{TendonError, TendonResult};
use crate::section::SectionGeometry;
use crate::units::{KiloPascals, MegaPascals};

fn default_stress_block_factor() -> f64 {
    1.0
}

/// ## JSON Example
///
/// ```json
/// {
///   "side": "Bottom",
///   "factored_moment_knm": 51154.0,
///   "design_compressive_strength_mpa": 22.4,
///   "compression_width_m": 2.5,
///   "eccentricity_m": -1.2
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlexureInput {
    /// Tendon side
    pub side: Side,

    /// Factored moment (kN·m, sagging positive)
    pub factored_moment_knm: f64,

    /// Concrete design compressive strength fcd (MPa)
    pub design_compressive_strength_mpa: f64,

    /// Width of the compression zone (m)
    pub compression_width_m: f64,

    /// Eccentricity of the tendon resultant (m)
    pub eccentricity_m: f64,

    /// α1: 1.0 up to C50, reducing linearly to 0.94 at C80
    #[serde(default = "default_stress_block_factor")]
    pub stress_block_factor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlexureEstimate {
    /// Compression fiber to tendon resultant (m)
    pub effective_depth_m: f64,

    /// Depth of the stress block (m)
    pub compression_depth_m: f64,

    /// Estimated prestress force (kN)
    pub required_force_kn: f64,
}

impl FlexureInput {
    pub fn validate(&self) -> TendonResult<()> {
        for (field, value) in [
            ("design_compressive_strength_mpa", self.design_compressive_strength_mpa),
            ("compression_width_m", self.compression_width_m),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TendonError::invalid_input(field, value.to_string(), "Must be positive"));
            }
        }
        if !self.stress_block_factor.is_finite() || self.stress_block_factor <= 0.0 || self.stress_block_factor > 1.0 {
            return Err(TendonError::invalid_input(
                "stress_block_factor",
                self.stress_block_factor.to_string(),
                "Factor must lie in (0, 1]",
            ));
        }
        if !self.factored_moment_knm.is_finite() || !self.eccentricity_m.is_finite() {
            return Err(TendonError::invalid_input(
                "factored_moment_knm",
                self.factored_moment_knm.to_string(),
                "Moment and eccentricity must be finite",
            ));
        }
        Ok(())
    }
}

/// Estimate the prestress force for `input` on `section`.
pub fn estimate_required_force(section: &SectionGeometry, input: &FlexureInput) -> TendonResult<FlexureEstimate> {
    section.validate()?;
    input.validate()?;

    let (h0, moment) = match input.side {
        Side::Bottom => (section.top_fiber_distance - input.eccentricity_m, input.factored_moment_knm),
        Side::Top => (section.bottom_fiber_distance + input.eccentricity_m, -input.factored_moment_knm),
    };
    if h0 <= 0.0 {
        return Err(TendonError::invalid_input(
            "eccentricity_m",
            input.eccentricity_m.to_string(),
            "Tendon resultant lies outside the section",
        ));
    }

    let fcd = KiloPascals::from(MegaPascals(input.design_compressive_strength_mpa)).0;
    let block = input.stress_block_factor * fcd * input.compression_width_m;
    let discriminant = h0.powi(2) - 2.0 * moment / block;
    if discriminant < 0.0 {
        return Err(TendonError::calculation_failed(
            "flexure estimate",
            format!(
                "moment {:.0} kN·m exceeds the stress-block capacity of the compression zone",
                input.factored_moment_knm
            ),
        ));
    }

    let x = h0 - discriminant.sqrt();
    Ok(FlexureEstimate {
        effective_depth_m: h0,
        compression_depth_m: x,
        required_force_kn: block * x,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn section() -> SectionGeometry {
        SectionGeometry::rectangular(2.5, 2.8).unwrap()
    }

    fn input() -> FlexureInput {
        FlexureInput {
            side: Side::Bottom,
            factored_moment_knm: 51154.0,
            design_compressive_strength_mpa: 22.4,
            compression_width_m: 2.5,
            eccentricity_m: -1.2,
            stress_block_factor: 1.0,
        }
    }

    #[test]
    fn test_bottom_estimate_balances_moment() {
        let est = estimate_required_force(&section(), &input()).unwrap();
        assert_relative_eq!(est.effective_depth_m, 2.6, epsilon = 1e-12);
        // F · (h0 − x/2) = M
        let lever = est.effective_depth_m - est.compression_depth_m / 2.0;
        assert_relative_eq!(est.required_force_kn * lever, 51154.0, max_relative = 1e-9);
        // x ≈ 0.379 m, F ≈ 21 221 kN
        assert_relative_eq!(est.compression_depth_m, 0.379, epsilon = 1e-3);
        assert_relative_eq!(est.required_force_kn, 21221.0, max_relative = 1e-3);
    }

    #[test]
    fn test_top_side_mirrors_bottom() {
        let mut top = input();
        top.side = Side::Top;
        top.factored_moment_knm = -51154.0;
        top.eccentricity_m = 1.2;
        let a = estimate_required_force(&section(), &input()).unwrap();
        let b = estimate_required_force(&section(), &top).unwrap();
        assert_relative_eq!(a.required_force_kn, b.required_force_kn, max_relative = 1e-12);
    }

    #[test]
    fn test_oversized_moment_fails() {
        let mut big = input();
        big.factored_moment_knm = 1.0e6;
        let err = estimate_required_force(&section(), &big).unwrap_err();
        assert_eq!(err.error_code(), "CALCULATION_FAILED");
    }

    #[test]
    fn test_invalid_factor() {
        let mut bad = input();
        bad.stress_block_factor = 1.2;
        assert!(estimate_required_force(&section(), &bad).is_err());
    }
}
