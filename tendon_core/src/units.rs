//! # Unit Types
//!
//! Lightweight SI wrappers used at the edges of the API. Internally every
//! computation runs on plain `f64` in a single consistent unit set:
//!
//! - Length: metres (m)
//! - Force: kilonewtons (kN)
//! - Moment: kilonewton-metres (kN·m)
//! - Stress: kilopascals (kPa = kN/m²)
//!
//! Strand data and concrete strengths are usually quoted in mm² and MPa,
//! so those get wrappers and conversions.
//!
//! ## Example
//!
//! ```rust
//! use tendon_core::units::{KiloNewtons, MegaPascals, SqMillimeters, KiloPascals};
//!
//! // One 15.2 mm strand tensioned to 1395 MPa
//! let force: KiloNewtons = SqMillimeters(140.0) * MegaPascals(1395.0);
//! assert!((force.0 - 195.3).abs() < 1e-9);
//!
//! let stress: KiloPascals = MegaPascals(22.4).into();
//! assert!((stress.0 - 22400.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::Mul;

// ============================================================================
// Force Units
// ============================================================================

/// Force in kilonewtons
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KiloNewtons(pub f64);

impl Mul<f64> for KiloNewtons {
    type Output = KiloNewtons;
    fn mul(self, rhs: f64) -> KiloNewtons {
        KiloNewtons(self.0 * rhs)
    }
}

// ============================================================================
// Stress Units
// ============================================================================

/// Stress in kilopascals (kN/m²)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KiloPascals(pub f64);

/// Stress in megapascals (N/mm²)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MegaPascals(pub f64);

impl From<MegaPascals> for KiloPascals {
    fn from(mpa: MegaPascals) -> Self {
        KiloPascals(mpa.0 * 1000.0)
    }
}

// ============================================================================
// Area Units
// ============================================================================

/// Area in square millimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SqMillimeters(pub f64);

/// mm² × MPa = N, reported in kN
impl Mul<MegaPascals> for SqMillimeters {
    type Output = KiloNewtons;
    fn mul(self, rhs: MegaPascals) -> KiloNewtons {
        KiloNewtons(self.0 * rhs.0 / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strand_force() {
        // 22 strands of 140 mm² at 1395 MPa = 4296.6 kN
        let one = SqMillimeters(140.0) * MegaPascals(1395.0);
        let bundle = one * 22.0;
        assert!((bundle.0 - 4296.6).abs() < 1e-6);
    }

    #[test]
    fn test_stress_conversion() {
        let kpa: KiloPascals = MegaPascals(22.41).into();
        assert!((kpa.0 - 22410.0).abs() < 1e-9);
    }

    #[test]
    fn test_serialization_transparent() {
        let json = serde_json::to_string(&KiloNewtons(12.5)).unwrap();
        assert_eq!(json, "12.5");
        let mpa: MegaPascals = serde_json::from_str("1395.0").unwrap();
        assert_eq!(mpa, MegaPascals(1395.0));
    }
}
