//! # Section Geometry
//!
//! Geometric properties of the concrete cross-section. These come from an
//! external section-analysis engine; this module only carries them and
//! checks they are self-consistent.
//!
//! Coordinates follow the usual convention for prestressed beams: the
//! vertical axis points up, eccentricity is measured from the centroid and
//! is positive towards the top fiber, negative towards the bottom fiber.
//!
//! ## Example
//!
//! ```rust
//! use tendon_core::section::SectionGeometry;
//!
//! let section = SectionGeometry::rectangular(2.5, 2.8).unwrap();
//! assert!((section.area - 7.0).abs() < 1e-12);
//! assert!((section.top_fiber_distance - 1.4).abs() < 1e-12);
//! assert!((section.height() - 2.8).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{TendonError, TendonResult};

/// Cross-section properties for one analysis.
///
/// ## JSON Example
///
/// ```json
/// {
///   "area": 7.0,
///   "centroid_height": 1.4,
///   "moment_of_inertia": 4.5733,
///   "radius_of_gyration": 0.8083,
///   "top_fiber_distance": 1.4,
///   "bottom_fiber_distance": 1.4
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionGeometry {
    /// Gross area (m²)
    pub area: f64,

    /// Height of the centroid above the bottom fiber (m)
    pub centroid_height: f64,

    /// Moment of inertia about the horizontal centroidal axis (m⁴)
    pub moment_of_inertia: f64,

    /// Radius of gyration about the same axis (m)
    pub radius_of_gyration: f64,

    /// Centroid to top fiber (m)
    pub top_fiber_distance: f64,

    /// Centroid to bottom fiber (m)
    pub bottom_fiber_distance: f64,
}

impl SectionGeometry {
    /// Build from engine output plus the fiber coordinates of the section.
    ///
    /// `top` and `bottom` are the vertical coordinates of the extreme
    /// fibers in the same frame as `centroid_y`.
    pub fn from_properties(
        area: f64,
        centroid_y: f64,
        moment_of_inertia: f64,
        radius_of_gyration: f64,
        top: f64,
        bottom: f64,
    ) -> TendonResult<Self> {
        let section = SectionGeometry {
            area,
            centroid_height: centroid_y - bottom,
            moment_of_inertia,
            radius_of_gyration,
            top_fiber_distance: top - centroid_y,
            bottom_fiber_distance: centroid_y - bottom,
        };
        section.validate()?;
        Ok(section)
    }

    /// Solid rectangle `width × height`, bottom fiber at zero.
    pub fn rectangular(width: f64, height: f64) -> TendonResult<Self> {
        if !width.is_finite() || width <= 0.0 {
            return Err(TendonError::invalid_input(
                "width",
                width.to_string(),
                "Width must be positive",
            ));
        }
        if !height.is_finite() || height <= 0.0 {
            return Err(TendonError::invalid_input(
                "height",
                height.to_string(),
                "Height must be positive",
            ));
        }
        let area = width * height;
        let inertia = width * height.powi(3) / 12.0;
        Self::from_properties(area, height / 2.0, inertia, (inertia / area).sqrt(), height, 0.0)
    }

    /// Validate the property set.
    pub fn validate(&self) -> TendonResult<()> {
        let positive = [
            ("area", self.area),
            ("moment_of_inertia", self.moment_of_inertia),
            ("radius_of_gyration", self.radius_of_gyration),
            ("top_fiber_distance", self.top_fiber_distance),
            ("bottom_fiber_distance", self.bottom_fiber_distance),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(TendonError::invalid_input(
                    field,
                    value.to_string(),
                    "Section property must be a positive finite number",
                ));
            }
        }
        // centroid_height is measured from the bottom fiber
        if (self.centroid_height - self.bottom_fiber_distance).abs() > 1e-6 * self.height() {
            return Err(TendonError::invalid_input(
                "centroid_height",
                self.centroid_height.to_string(),
                "Centroid height must equal the bottom fiber distance",
            ));
        }
        Ok(())
    }

    /// Overall section height (m)
    pub fn height(&self) -> f64 {
        self.top_fiber_distance + self.bottom_fiber_distance
    }

    /// Squared radius of gyration i² (m²)
    pub fn gyration_squared(&self) -> f64 {
        self.radius_of_gyration.powi(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rectangular_properties() {
        let s = SectionGeometry::rectangular(2.5, 2.8).unwrap();
        // I = 2.5 * 2.8³ / 12 = 4.57333
        assert_relative_eq!(s.moment_of_inertia, 4.573333, epsilon = 1e-5);
        // i² = I / A = 0.65333
        assert_relative_eq!(s.gyration_squared(), 0.653333, epsilon = 1e-5);
        assert_relative_eq!(s.top_fiber_distance, 1.4);
        assert_relative_eq!(s.bottom_fiber_distance, 1.4);
    }

    #[test]
    fn test_from_properties_offsets() {
        // T-beam like: centroid at 1.9 m in a frame where the bottom sits at 0.5
        let s = SectionGeometry::from_properties(3.0, 1.9, 2.0, (2.0f64 / 3.0).sqrt(), 3.0, 0.5).unwrap();
        assert_relative_eq!(s.top_fiber_distance, 1.1, epsilon = 1e-12);
        assert_relative_eq!(s.bottom_fiber_distance, 1.4, epsilon = 1e-12);
        assert_relative_eq!(s.height(), 2.5, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_sections() {
        assert!(SectionGeometry::rectangular(-1.0, 2.0).is_err());
        assert!(SectionGeometry::rectangular(1.0, 0.0).is_err());
        // centroid above the top fiber
        assert!(SectionGeometry::from_properties(1.0, 3.0, 1.0, 1.0, 2.0, 0.0).is_err());

        let mut s = SectionGeometry::rectangular(1.0, 1.0).unwrap();
        s.centroid_height = 0.9;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_serialization() {
        let s = SectionGeometry::rectangular(2.5, 2.8).unwrap();
        let json = serde_json::to_string_pretty(&s).unwrap();
        let roundtrip: SectionGeometry = serde_json::from_str(&json).unwrap();
        assert_eq!(s, roundtrip);
    }
}
